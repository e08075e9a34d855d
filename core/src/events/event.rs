//! Events emitted by the engine

use hiit_types::PhaseKind;
use serde::Serialize;

use crate::engine::NEAR_END_NOTICE_SECS;

/// Things that happened during a run, in emission order
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TimerEvent {
    /// A new phase began
    PhaseChanged {
        kind: PhaseKind,
        set_index: Option<u32>,
        sets_planned: u32,
    },

    /// One second elapsed
    Tick {
        remaining: u32,
        total_remaining: u64,
        sets_remaining: u32,
        progress: f32,
    },

    /// The current phase ends in `secs_left` seconds
    PhaseEndingSoon { kind: PhaseKind, secs_left: u32 },

    /// The phase after the current one starts in `secs_left` seconds
    NextPhaseSoon { kind: PhaseKind, secs_left: u32 },

    /// The phase cue was started with `threshold` seconds remaining
    CueThreshold { kind: PhaseKind, threshold: u32 },

    /// The whole circuit completed
    Finished,

    Paused,
    Resumed,
    Reset,
}

/// Title/body pair for a desktop or push notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub body: String,
}

impl Notification {
    fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
        }
    }
}

impl TimerEvent {
    /// Notification text for events worth interrupting the user for.
    ///
    /// A cue threshold equal to the near-end notice is skipped since the
    /// near-end notification already covers that moment.
    pub fn notification(&self) -> Option<Notification> {
        match *self {
            TimerEvent::PhaseChanged {
                kind,
                set_index,
                sets_planned,
            } => {
                let set = set_index.map_or_else(|| "-".to_string(), |s| s.to_string());
                Some(Notification::new(
                    format!("Start: {kind}"),
                    format!("Set {set}/{sets_planned}"),
                ))
            }
            TimerEvent::NextPhaseSoon { kind, secs_left } => Some(Notification::new(
                format!("{kind} starts in {secs_left}s"),
                format!("Get ready for {}.", kind.label().to_lowercase()),
            )),
            TimerEvent::PhaseEndingSoon { kind, secs_left } => Some(Notification::new(
                format!("{kind} ends in {secs_left}s"),
                format!("Last seconds of {}.", kind.label().to_lowercase()),
            )),
            TimerEvent::CueThreshold { kind, threshold } => {
                (threshold != NEAR_END_NOTICE_SECS).then(|| {
                    Notification::new(
                        format!("{kind} ends in {threshold}s"),
                        "Final audio countdown.",
                    )
                })
            }
            TimerEvent::Finished => Some(Notification::new(
                "Workout complete",
                "Well done! Circuit finished.",
            )),
            TimerEvent::Tick { .. }
            | TimerEvent::Paused
            | TimerEvent::Resumed
            | TimerEvent::Reset => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phase_change_notification_names_set() {
        let event = TimerEvent::PhaseChanged {
            kind: PhaseKind::Exercise,
            set_index: Some(2),
            sets_planned: 4,
        };
        let n = event.notification().unwrap();
        assert_eq!(n.title, "Start: Exercise");
        assert_eq!(n.body, "Set 2/4");

        let prepare = TimerEvent::PhaseChanged {
            kind: PhaseKind::Prepare,
            set_index: None,
            sets_planned: 4,
        };
        assert_eq!(prepare.notification().unwrap().body, "Set -/4");
    }

    #[test]
    fn cue_threshold_at_near_end_is_not_notified_twice() {
        let duplicate = TimerEvent::CueThreshold {
            kind: PhaseKind::Rest,
            threshold: NEAR_END_NOTICE_SECS,
        };
        assert!(duplicate.notification().is_none());

        let distinct = TimerEvent::CueThreshold {
            kind: PhaseKind::Rest,
            threshold: 3,
        };
        assert_eq!(distinct.notification().unwrap().title, "Rest ends in 3s");
    }

    #[test]
    fn ticks_are_silent() {
        let tick = TimerEvent::Tick {
            remaining: 3,
            total_remaining: 40,
            sets_remaining: 2,
            progress: 0.5,
        };
        assert!(tick.notification().is_none());
        assert!(TimerEvent::Paused.notification().is_none());
    }
}
