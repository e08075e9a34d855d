//! Event consumers
//!
//! [`EventSink`] has one hook per event with empty defaults, so a consumer
//! only overrides what it shows. [`ChannelSink`] forwards events to an async
//! receiver.

use hiit_types::PhaseKind;
use tokio::sync::mpsc;

use super::TimerEvent;

/// Trait for collaborators that react to engine events.
///
/// Every callback defaults to a no-op, so implementors only override what
/// they display. The engine calls [`EventSink::handle_event`], which routes
/// to the typed callbacks unless overridden.
pub trait EventSink {
    fn on_phase_change(&mut self, _kind: PhaseKind, _set_index: Option<u32>, _sets_planned: u32) {}

    fn on_tick(
        &mut self,
        _remaining: u32,
        _total_remaining: u64,
        _sets_remaining: u32,
        _progress: f32,
    ) {
    }

    fn on_phase_ending_soon(&mut self, _kind: PhaseKind, _secs_left: u32) {}

    fn on_next_phase_soon(&mut self, _kind: PhaseKind, _secs_left: u32) {}

    fn on_cue_threshold(&mut self, _kind: PhaseKind, _threshold: u32) {}

    fn on_finished(&mut self) {}

    fn on_paused(&mut self) {}

    fn on_resumed(&mut self) {}

    fn on_reset(&mut self) {}

    /// Route a single event to its callback
    fn handle_event(&mut self, event: &TimerEvent) {
        match *event {
            TimerEvent::PhaseChanged {
                kind,
                set_index,
                sets_planned,
            } => self.on_phase_change(kind, set_index, sets_planned),
            TimerEvent::Tick {
                remaining,
                total_remaining,
                sets_remaining,
                progress,
            } => self.on_tick(remaining, total_remaining, sets_remaining, progress),
            TimerEvent::PhaseEndingSoon { kind, secs_left } => {
                self.on_phase_ending_soon(kind, secs_left)
            }
            TimerEvent::NextPhaseSoon { kind, secs_left } => {
                self.on_next_phase_soon(kind, secs_left)
            }
            TimerEvent::CueThreshold { kind, threshold } => self.on_cue_threshold(kind, threshold),
            TimerEvent::Finished => self.on_finished(),
            TimerEvent::Paused => self.on_paused(),
            TimerEvent::Resumed => self.on_resumed(),
            TimerEvent::Reset => self.on_reset(),
        }
    }
}

/// Forwards events over a channel to an async consumer.
///
/// A dropped receiver is not an error: events are simply discarded.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<TimerEvent>,
}

impl ChannelSink {
    pub fn new(tx: mpsc::UnboundedSender<TimerEvent>) -> Self {
        Self { tx }
    }

    /// Create a sink together with the receiving end
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<TimerEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }
}

impl EventSink for ChannelSink {
    fn handle_event(&mut self, event: &TimerEvent) {
        if self.tx.send(event.clone()).is_err() {
            tracing::trace!("Event receiver dropped, discarding event");
        }
    }
}
