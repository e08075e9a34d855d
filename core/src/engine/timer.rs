//! Engine that performs the state machine's effects

use hiit_types::{PhaseKind, Settings};

use crate::cues::{CueHandle, CuePlayer, CueRegistry};
use crate::events::{EventSink, TimerEvent};

use super::{Effect, EngineError, Input, RunSnapshot, RunState, RunStatus, reduce};

/// Owns one run's state plus the collaborators its effects go to.
///
/// All mutation goes through [`reduce`]; this type only performs the
/// returned effects. It does not keep time itself: whoever owns it calls
/// [`TimerEngine::tick`] once per second while [`TimerEngine::is_ticking`]
/// is true (see [`spawn_engine`](super::spawn_engine)).
#[derive(Debug)]
pub struct TimerEngine<P, S> {
    state: RunState,
    cues: CueRegistry,
    player: P,
    sink: S,
    ticking: bool,
    ticker_epoch: u64,
}

impl<P: CuePlayer, S: EventSink> TimerEngine<P, S> {
    pub fn new(player: P, sink: S) -> Self {
        Self::with_registry(player, sink, CueRegistry::new())
    }

    pub fn with_registry(player: P, sink: S, cues: CueRegistry) -> Self {
        Self {
            state: RunState::new(),
            cues,
            player,
            sink,
            ticking: false,
            ticker_epoch: 0,
        }
    }

    /// Start a run. Fails with [`EngineError::EmptyPlan`] (leaving any
    /// current run untouched) when the settings produce no phases.
    pub fn start(&mut self, settings: Settings) -> Result<(), EngineError> {
        let effects = reduce(&mut self.state, &self.cues, Input::Start(settings))?;
        tracing::info!(
            phases = self.state.plan().len(),
            total_secs = self.state.total_remaining(),
            sets = self.state.sets_planned(),
            "Workout started"
        );
        self.apply(effects);
        Ok(())
    }

    /// Advance one second
    pub fn tick(&mut self) {
        self.dispatch(Input::Tick);
    }

    pub fn pause(&mut self) {
        self.dispatch(Input::Pause);
    }

    pub fn resume(&mut self) {
        self.dispatch(Input::Resume);
    }

    /// Pause when running, resume when paused, otherwise nothing
    pub fn toggle_pause(&mut self) {
        match self.state.status() {
            RunStatus::Running => self.pause(),
            RunStatus::Paused => self.resume(),
            RunStatus::Idle | RunStatus::Finished => {}
        }
    }

    /// Cancel any run and return to idle. Always succeeds.
    pub fn reset(&mut self) {
        self.dispatch(Input::Reset);
    }

    /// Cue playback reached its end on its own
    pub fn cue_ended(&mut self, handle: CueHandle) {
        self.dispatch(Input::CueEnded(handle));
    }

    /// Cue playback failed; the phase runs to its countdown zero instead
    pub fn cue_failed(&mut self, handle: CueHandle) {
        self.dispatch(Input::CueFailed(handle));
    }

    /// A cue asset's real duration became known
    pub fn cue_duration_discovered(&mut self, kind: PhaseKind, secs: f64) {
        self.cues.mark_loaded(kind, secs);
    }

    /// A cue asset failed to load; its last known duration stays in use
    pub fn cue_unavailable(&mut self, kind: PhaseKind) {
        self.cues.mark_unavailable(kind);
    }

    pub fn state(&self) -> &RunState {
        &self.state
    }

    pub fn status(&self) -> RunStatus {
        self.state.status()
    }

    pub fn snapshot(&self) -> RunSnapshot {
        self.state.snapshot()
    }

    pub fn cues(&self) -> &CueRegistry {
        &self.cues
    }

    pub fn player(&self) -> &P {
        &self.player
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Whether the one-second tick source should be running
    pub fn is_ticking(&self) -> bool {
        self.ticking
    }

    /// Bumped every time the tick source is (re)started, so a driver can
    /// tell it must restart its timer even if it never saw it stop.
    pub fn ticker_epoch(&self) -> u64 {
        self.ticker_epoch
    }

    fn dispatch(&mut self, input: Input) {
        match reduce(&mut self.state, &self.cues, input) {
            Ok(effects) => self.apply(effects),
            Err(e) => tracing::error!(?input, error = %e, "Unexpected engine failure"),
        }
    }

    fn apply(&mut self, effects: Vec<Effect>) {
        let mut effects = effects.into_iter().peekable();
        while let Some(effect) = effects.next() {
            match effect {
                Effect::Emit(event) => {
                    if event == TimerEvent::Finished {
                        tracing::info!("Workout finished");
                    }
                    self.sink.handle_event(&event);
                }
                Effect::StartTicker => {
                    self.ticking = true;
                    self.ticker_epoch += 1;
                }
                Effect::StopTicker => self.ticking = false,
                Effect::PlayCue { handle, kind } => {
                    if let Err(e) = self.player.play_cue(handle, kind) {
                        tracing::warn!(%handle, %kind, error = %e, "Failed to start cue");
                        // CueFailed never produces effects
                        let _ = reduce(&mut self.state, &self.cues, Input::CueFailed(handle));
                        // No cue is playing, so there is no threshold to announce
                        if matches!(
                            effects.peek(),
                            Some(Effect::Emit(TimerEvent::CueThreshold { .. }))
                        ) {
                            effects.next();
                        }
                    }
                }
                Effect::StopCue(handle) => self.player.stop_cue(handle),
                Effect::PauseCue(handle) => self.player.pause_cue(handle),
                Effect::ResumeCue(handle) => self.player.resume_cue(handle),
                Effect::PlayTone(tone) => self.player.play_tone(tone),
                Effect::PlayFinish => self.player.play_finish(),
            }
        }
    }
}
