//! Tests for the engine transition function
//!
//! Drives `reduce` directly and checks both the resulting state and the
//! exact effects requested.

use hiit_types::{PhaseKind, Settings};

use super::{Effect, EngineError, Input, NEAR_END_NOTICE_SECS, RunState, RunStatus, reduce};
use crate::cues::{CueHandle, CueRegistry, Tone};
use crate::events::TimerEvent;

fn settings(prepare: u32, exercise: u32, rest: u32, sets: u32) -> Settings {
    Settings {
        prepare,
        exercise,
        rest,
        sets,
    }
}

fn step(state: &mut RunState, cues: &CueRegistry, input: Input) -> Vec<Effect> {
    reduce(state, cues, input).expect("only start can fail")
}

fn start(settings: Settings, cues: &CueRegistry) -> (RunState, Vec<Effect>) {
    let mut state = RunState::new();
    let effects = reduce(&mut state, cues, Input::Start(settings)).expect("plan is not empty");
    (state, effects)
}

fn ticks(state: &mut RunState, cues: &CueRegistry, n: u32) -> Vec<Effect> {
    (0..n).flat_map(|_| step(state, cues, Input::Tick)).collect()
}

fn events(effects: &[Effect]) -> Vec<TimerEvent> {
    effects
        .iter()
        .filter_map(|e| match e {
            Effect::Emit(event) => Some(event.clone()),
            _ => None,
        })
        .collect()
}

fn count<F: Fn(&Effect) -> bool>(effects: &[Effect], pred: F) -> usize {
    effects.iter().filter(|e| pred(e)).count()
}

// ═══════════════════════════════════════════════════════════════════════════
// Start
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn start_enters_first_phase_before_ticker() {
    let cues = CueRegistry::new();
    let (state, effects) = start(settings(0, 20, 10, 2), &cues);

    assert_eq!(
        effects,
        vec![
            Effect::Emit(TimerEvent::PhaseChanged {
                kind: PhaseKind::Exercise,
                set_index: Some(1),
                sets_planned: 2,
            }),
            Effect::StartTicker,
        ]
    );
    assert_eq!(state.status(), RunStatus::Running);
    assert_eq!(state.phase_index(), Some(0));
    assert_eq!(state.remaining(), 20);
    assert_eq!(state.phase_total(), 20);
    assert_eq!(state.sets_remaining(), 2);
    assert_eq!(state.total_remaining(), 50);
}

#[test]
fn start_initializes_total_from_plan() {
    let cues = CueRegistry::new();
    let (state, _) = start(settings(5, 20, 10, 2), &cues);

    assert_eq!(state.total_remaining(), state.plan().total_secs());
    assert_eq!(state.total_remaining(), 55);
}

#[test]
fn start_with_empty_plan_fails_and_stays_idle() {
    let cues = CueRegistry::new();
    let mut state = RunState::new();

    let result = reduce(&mut state, &cues, Input::Start(settings(0, 0, 0, 5)));

    assert_eq!(result, Err(EngineError::EmptyPlan));
    assert_eq!(state.status(), RunStatus::Idle);
    assert!(state.plan().is_empty());
}

#[test]
fn failed_start_leaves_running_workout_untouched() {
    let cues = CueRegistry::new();
    let (mut state, _) = start(settings(0, 30, 0, 1), &cues);
    ticks(&mut state, &cues, 4);

    let result = reduce(&mut state, &cues, Input::Start(settings(0, 0, 0, 1)));

    assert_eq!(result, Err(EngineError::EmptyPlan));
    assert_eq!(state.status(), RunStatus::Running);
    assert_eq!(state.remaining(), 26);
}

#[test]
fn start_clamps_sets() {
    let cues = CueRegistry::new();
    let (state, _) = start(settings(0, 1, 0, 0), &cues);
    assert_eq!(state.sets_planned(), 1);
    assert_eq!(state.plan().len(), 1);

    let (state, _) = start(settings(0, 1, 0, 5000), &cues);
    assert_eq!(state.sets_planned(), 999);
}

#[test]
fn restart_while_running_stops_previous_cue_and_ticker() {
    let cues = CueRegistry::new();
    let (mut state, _) = start(settings(0, 10, 0, 1), &cues);
    ticks(&mut state, &cues, 5);
    let old_cue = state.active_cue().expect("cue starts at 5s remaining");

    let effects = step(&mut state, &cues, Input::Start(settings(3, 8, 0, 1)));

    assert_eq!(effects[0], Effect::StopCue(old_cue));
    assert_eq!(effects[1], Effect::StopTicker);
    assert_eq!(effects.last(), Some(&Effect::StartTicker));
    assert_eq!(state.current_phase().map(|p| p.kind()), Some(PhaseKind::Prepare));
    assert_eq!(state.total_remaining(), 11);
}

// ═══════════════════════════════════════════════════════════════════════════
// Ticking and phase transitions
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn full_circuit_scenario() {
    let cues = CueRegistry::new();
    let (mut state, _) = start(settings(5, 20, 10, 2), &cues);

    ticks(&mut state, &cues, 5);
    assert_eq!(state.current_phase().map(|p| p.kind()), Some(PhaseKind::Exercise));
    assert_eq!(state.sets_remaining(), 2);

    ticks(&mut state, &cues, 20);
    assert_eq!(state.current_phase().map(|p| p.kind()), Some(PhaseKind::Rest));
    assert_eq!(state.sets_remaining(), 1);

    ticks(&mut state, &cues, 10);
    assert_eq!(
        state.current_phase().and_then(|p| p.set_index()),
        Some(2),
        "second exercise block"
    );

    let effects = ticks(&mut state, &cues, 20);
    assert_eq!(state.status(), RunStatus::Finished);
    assert_eq!(state.sets_remaining(), 0);
    assert_eq!(state.total_remaining(), 0);
    assert_eq!(state.remaining(), 0);
    assert_eq!(count(&effects, |e| *e == Effect::Emit(TimerEvent::Finished)), 1);
    assert_eq!(count(&effects, |e| *e == Effect::PlayFinish), 1);
    assert!(effects.contains(&Effect::StopTicker));
    assert!(effects.contains(&Effect::PlayTone(Tone::CircuitComplete)));
}

#[test]
fn exercise_only_plan_counts_down_every_set() {
    let cues = CueRegistry::new();
    let (mut state, _) = start(settings(0, 10, 0, 3), &cues);
    assert_eq!(state.plan().len(), 3);
    assert_eq!(state.total_remaining(), 30);

    let mut sets_seen = vec![state.sets_remaining()];
    for _ in 0..3 {
        ticks(&mut state, &cues, 10);
        sets_seen.push(state.sets_remaining());
    }

    assert_eq!(sets_seen, vec![3, 2, 1, 0]);
    assert_eq!(state.status(), RunStatus::Finished);
}

#[test]
fn remaining_and_total_are_monotonic() {
    let cues = CueRegistry::new();
    let (mut state, _) = start(settings(3, 7, 4, 3), &cues);
    let mut last_total = state.total_remaining();
    let mut last_index = state.phase_index();
    let mut last_remaining = state.remaining();

    while state.status() == RunStatus::Running {
        step(&mut state, &cues, Input::Tick);

        assert_eq!(state.total_remaining(), last_total - 1);
        if state.phase_index() == last_index {
            assert!(state.remaining() < last_remaining);
        } else if let Some(phase) = state.current_phase() {
            assert_eq!(state.remaining(), phase.duration);
        }

        last_total = state.total_remaining();
        last_index = state.phase_index();
        last_remaining = state.remaining();
    }

    assert_eq!(state.status(), RunStatus::Finished);
    assert_eq!(state.total_remaining(), 0);
}

#[test]
fn tick_event_reports_progress_within_phase() {
    let cues = CueRegistry::new();
    let (mut state, _) = start(settings(0, 20, 0, 1), &cues);

    let effects = ticks(&mut state, &cues, 5);

    assert_eq!(
        events(&effects).last(),
        Some(&TimerEvent::Tick {
            remaining: 15,
            total_remaining: 15,
            sets_remaining: 1,
            progress: 0.25,
        })
    );
}

#[test]
fn near_end_notice_names_next_phase() {
    let cues = CueRegistry::new();
    let (mut state, _) = start(settings(0, 20, 10, 2), &cues);

    let effects = ticks(&mut state, &cues, 20 - NEAR_END_NOTICE_SECS);

    let notices: Vec<_> = events(&effects)
        .into_iter()
        .filter(|e| {
            matches!(
                e,
                TimerEvent::PhaseEndingSoon { .. } | TimerEvent::NextPhaseSoon { .. }
            )
        })
        .collect();
    assert_eq!(
        notices,
        vec![
            TimerEvent::PhaseEndingSoon {
                kind: PhaseKind::Exercise,
                secs_left: 5,
            },
            TimerEvent::NextPhaseSoon {
                kind: PhaseKind::Rest,
                secs_left: 5,
            },
        ]
    );
    assert!(effects.contains(&Effect::PlayTone(Tone::NextPhaseSoon)));
}

#[test]
fn near_end_notice_on_last_phase_has_no_next() {
    let cues = CueRegistry::new();
    let (mut state, _) = start(settings(0, 8, 0, 1), &cues);

    let effects = ticks(&mut state, &cues, 8);

    let evs = events(&effects);
    assert_eq!(
        count(&effects, |e| matches!(
            e,
            Effect::Emit(TimerEvent::PhaseEndingSoon { .. })
        )),
        1
    );
    assert!(!evs.iter().any(|e| matches!(e, TimerEvent::NextPhaseSoon { .. })));
    assert!(effects.contains(&Effect::PlayTone(Tone::PhaseEndingSoon)));
}

#[test]
fn near_end_notice_fires_once_per_phase() {
    let cues = CueRegistry::new();
    let (mut state, _) = start(settings(6, 12, 9, 3), &cues);
    let phases = state.plan().len();

    let mut effects = Vec::new();
    while state.status() == RunStatus::Running {
        effects.extend(step(&mut state, &cues, Input::Tick));
    }

    let ending = count(&effects, |e| {
        matches!(e, Effect::Emit(TimerEvent::PhaseEndingSoon { .. }))
    });
    let next = count(&effects, |e| {
        matches!(e, Effect::Emit(TimerEvent::NextPhaseSoon { .. }))
    });
    assert_eq!(ending, phases);
    assert_eq!(next, phases - 1);
}

#[test]
fn phase_shorter_than_notice_gets_no_notice() {
    let cues = CueRegistry::new();
    let (mut state, _) = start(settings(0, 3, 0, 2), &cues);

    let effects = ticks(&mut state, &cues, 6);

    assert!(!events(&effects)
        .iter()
        .any(|e| matches!(e, TimerEvent::PhaseEndingSoon { .. })));
    assert_eq!(state.status(), RunStatus::Finished);
}

// ═══════════════════════════════════════════════════════════════════════════
// Cue threshold and synchronization
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn cue_starts_when_remaining_reaches_threshold() {
    let mut cues = CueRegistry::new();
    cues.mark_loaded(PhaseKind::Exercise, 3.2);
    let (mut state, _) = start(settings(0, 20, 0, 1), &cues);

    let before = ticks(&mut state, &cues, 15);
    assert!(!state.cue_started());
    assert_eq!(count(&before, |e| matches!(e, Effect::PlayCue { .. })), 0);

    let effects = step(&mut state, &cues, Input::Tick);
    assert_eq!(state.remaining(), 4);
    assert!(state.cue_started());
    assert!(effects.contains(&Effect::PlayCue {
        handle: CueHandle(0),
        kind: PhaseKind::Exercise,
    }));
    assert!(effects.contains(&Effect::Emit(TimerEvent::CueThreshold {
        kind: PhaseKind::Exercise,
        threshold: 4,
    })));
}

#[test]
fn cue_as_long_as_phase_starts_on_entry() {
    let cues = CueRegistry::new();
    let (state, effects) = start(settings(5, 20, 0, 1), &cues);

    assert!(state.cue_started());
    assert_eq!(
        effects,
        vec![
            Effect::Emit(TimerEvent::PhaseChanged {
                kind: PhaseKind::Prepare,
                set_index: None,
                sets_planned: 1,
            }),
            Effect::PlayCue {
                handle: CueHandle(0),
                kind: PhaseKind::Prepare,
            },
            Effect::Emit(TimerEvent::CueThreshold {
                kind: PhaseKind::Prepare,
                threshold: 5,
            }),
            Effect::StartTicker,
        ]
    );
}

#[test]
fn one_second_phase_is_well_defined() {
    let cues = CueRegistry::new();
    let (mut state, effects) = start(settings(0, 1, 0, 1), &cues);
    assert!(effects.contains(&Effect::Emit(TimerEvent::CueThreshold {
        kind: PhaseKind::Exercise,
        threshold: 1,
    })));

    let effects = step(&mut state, &cues, Input::Tick);
    assert!(effects.contains(&Effect::StopCue(CueHandle(0))));
    assert_eq!(state.status(), RunStatus::Finished);
}

#[test]
fn countdown_zero_stops_cue_before_next_phase() {
    let cues = CueRegistry::new();
    let (mut state, _) = start(settings(0, 10, 10, 2), &cues);
    ticks(&mut state, &cues, 9);
    let cue = state.active_cue().expect("cue running");

    let effects = step(&mut state, &cues, Input::Tick);

    let stop = effects.iter().position(|e| *e == Effect::StopCue(cue));
    let change = effects
        .iter()
        .position(|e| matches!(e, Effect::Emit(TimerEvent::PhaseChanged { .. })));
    assert!(stop.is_some() && change.is_some());
    assert!(stop < change);
    assert_eq!(state.active_cue(), None);
}

#[test]
fn cue_end_forces_phase_end_and_debits_total() {
    let mut cues = CueRegistry::new();
    cues.mark_loaded(PhaseKind::Exercise, 3.0);
    let (mut state, _) = start(settings(0, 10, 0, 2), &cues);

    ticks(&mut state, &cues, 8);
    let cue = state.active_cue().expect("cue started at 3s");
    assert_eq!(state.remaining(), 2);
    assert_eq!(state.total_remaining(), 12);

    let effects = step(&mut state, &cues, Input::CueEnded(cue));

    assert_eq!(state.total_remaining(), 10);
    assert_eq!(state.sets_remaining(), 1);
    assert_eq!(state.phase_index(), Some(1));
    assert_eq!(state.remaining(), 10);
    assert!(!effects.contains(&Effect::StopCue(cue)), "cue already ended");
    assert_eq!(
        events(&effects),
        vec![TimerEvent::PhaseChanged {
            kind: PhaseKind::Exercise,
            set_index: Some(2),
            sets_planned: 2,
        }]
    );
}

#[test]
fn cue_end_debits_exactly_the_remaining_seconds() {
    for cue_secs in [1.0, 2.0, 4.0, 6.0, 9.0] {
        let mut cues = CueRegistry::new();
        cues.mark_loaded(PhaseKind::Rest, cue_secs);
        let (mut state, _) = start(settings(0, 5, 12, 2), &cues);
        ticks(&mut state, &cues, 5);
        assert_eq!(state.current_phase().map(|p| p.kind()), Some(PhaseKind::Rest));

        ticks(&mut state, &cues, 12 - cue_secs as u32);
        let cue = state.active_cue().expect("rest cue started");
        let remaining = state.remaining() as u64;
        let total = state.total_remaining();

        step(&mut state, &cues, Input::CueEnded(cue));

        assert_eq!(state.total_remaining(), total - remaining);
        assert_eq!(state.total_remaining(), 5, "only the last exercise is left");
    }
}

#[test]
fn cue_end_on_last_phase_finishes() {
    let cues = CueRegistry::new();
    let (mut state, _) = start(settings(0, 10, 0, 1), &cues);
    ticks(&mut state, &cues, 6);
    let cue = state.active_cue().unwrap();

    let effects = step(&mut state, &cues, Input::CueEnded(cue));

    assert_eq!(state.status(), RunStatus::Finished);
    assert_eq!(state.total_remaining(), 0);
    assert!(effects.contains(&Effect::Emit(TimerEvent::Finished)));
}

#[test]
fn stale_cue_end_is_ignored() {
    let cues = CueRegistry::new();
    let (mut state, _) = start(settings(0, 10, 0, 2), &cues);
    ticks(&mut state, &cues, 5);
    let old = state.active_cue().unwrap();
    ticks(&mut state, &cues, 5);
    assert_eq!(state.phase_index(), Some(1));
    let total = state.total_remaining();

    let effects = step(&mut state, &cues, Input::CueEnded(old));

    assert!(effects.is_empty());
    assert_eq!(state.phase_index(), Some(1));
    assert_eq!(state.total_remaining(), total);
}

#[test]
fn failed_cue_lets_phase_run_to_zero() {
    let cues = CueRegistry::new();
    let (mut state, _) = start(settings(0, 10, 0, 1), &cues);
    ticks(&mut state, &cues, 5);
    let cue = state.active_cue().unwrap();

    assert!(step(&mut state, &cues, Input::CueFailed(cue)).is_empty());
    assert_eq!(state.active_cue(), None);
    assert!(state.cue_started(), "a failed cue is not retried");

    let paused = step(&mut state, &cues, Input::Pause);
    assert_eq!(paused, vec![Effect::Emit(TimerEvent::Paused)]);
    let resumed = step(&mut state, &cues, Input::Resume);
    assert_eq!(resumed, vec![Effect::Emit(TimerEvent::Resumed)]);

    ticks(&mut state, &cues, 5);
    assert_eq!(state.status(), RunStatus::Finished);
}

// ═══════════════════════════════════════════════════════════════════════════
// Pause / resume / reset
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn pause_freezes_time() {
    let cues = CueRegistry::new();
    let (mut state, _) = start(settings(5, 20, 10, 2), &cues);
    ticks(&mut state, &cues, 5 + 8);
    assert_eq!(state.current_phase().map(|p| p.kind()), Some(PhaseKind::Exercise));
    assert_eq!(state.remaining(), 12);

    step(&mut state, &cues, Input::Pause);
    assert_eq!(state.status(), RunStatus::Paused);
    assert!(ticks(&mut state, &cues, 4).is_empty());

    let effects = step(&mut state, &cues, Input::Resume);
    assert_eq!(effects, vec![Effect::Emit(TimerEvent::Resumed)]);
    assert_eq!(state.status(), RunStatus::Running);
    assert_eq!(state.remaining(), 12);
}

#[test]
fn pause_and_resume_carry_active_cue() {
    let cues = CueRegistry::new();
    let (mut state, _) = start(settings(0, 10, 0, 1), &cues);
    ticks(&mut state, &cues, 6);
    let cue = state.active_cue().unwrap();

    let paused = step(&mut state, &cues, Input::Pause);
    assert_eq!(
        paused,
        vec![Effect::PauseCue(cue), Effect::Emit(TimerEvent::Paused)]
    );

    let resumed = step(&mut state, &cues, Input::Resume);
    assert_eq!(
        resumed,
        vec![Effect::Emit(TimerEvent::Resumed), Effect::ResumeCue(cue)]
    );
}

#[test]
fn resume_starts_cue_when_threshold_passed_while_paused() {
    let mut cues = CueRegistry::new();
    let (mut state, _) = start(settings(0, 20, 0, 1), &cues);
    ticks(&mut state, &cues, 14);
    assert_eq!(state.remaining(), 6);
    assert!(!state.cue_started());

    step(&mut state, &cues, Input::Pause);
    // A longer cue was discovered during the pause
    cues.mark_loaded(PhaseKind::Exercise, 8.0);

    let effects = step(&mut state, &cues, Input::Resume);

    assert!(state.cue_started());
    assert!(effects.contains(&Effect::PlayCue {
        handle: CueHandle(0),
        kind: PhaseKind::Exercise,
    }));
    assert!(effects.contains(&Effect::Emit(TimerEvent::CueThreshold {
        kind: PhaseKind::Exercise,
        threshold: 8,
    })));
}

#[test]
fn cue_end_while_paused_advances_without_new_cue() {
    let mut cues = CueRegistry::new();
    cues.mark_loaded(PhaseKind::Exercise, 3.0);
    cues.mark_loaded(PhaseKind::Rest, 30.0);
    let (mut state, _) = start(settings(0, 10, 4, 2), &cues);
    ticks(&mut state, &cues, 8);
    let cue = state.active_cue().unwrap();
    step(&mut state, &cues, Input::Pause);

    let effects = step(&mut state, &cues, Input::CueEnded(cue));

    assert_eq!(state.status(), RunStatus::Paused);
    assert_eq!(state.current_phase().map(|p| p.kind()), Some(PhaseKind::Rest));
    assert!(!effects.iter().any(|e| matches!(e, Effect::PlayCue { .. })));

    let resumed = step(&mut state, &cues, Input::Resume);
    assert!(resumed.iter().any(|e| matches!(e, Effect::PlayCue { .. })));
}

#[test]
fn invalid_control_calls_are_noops() {
    let cues = CueRegistry::new();
    let mut state = RunState::new();
    assert!(step(&mut state, &cues, Input::Pause).is_empty());
    assert!(step(&mut state, &cues, Input::Resume).is_empty());
    assert!(step(&mut state, &cues, Input::Tick).is_empty());

    let (mut state, _) = start(settings(0, 10, 0, 1), &cues);
    assert!(step(&mut state, &cues, Input::Resume).is_empty());
    step(&mut state, &cues, Input::Pause);
    assert!(step(&mut state, &cues, Input::Pause).is_empty());
}

#[test]
fn reset_returns_to_idle_and_stops_everything() {
    let cues = CueRegistry::new();
    let (mut state, _) = start(settings(0, 10, 0, 1), &cues);
    ticks(&mut state, &cues, 6);
    let cue = state.active_cue().unwrap();

    let effects = step(&mut state, &cues, Input::Reset);

    assert_eq!(
        effects,
        vec![
            Effect::StopCue(cue),
            Effect::StopTicker,
            Effect::Emit(TimerEvent::Reset),
        ]
    );
    assert_eq!(state.status(), RunStatus::Idle);
    assert_eq!(state.phase_index(), None);
    assert_eq!(state.total_remaining(), 0);
    assert!(ticks(&mut state, &cues, 3).is_empty());
    assert!(step(&mut state, &cues, Input::CueEnded(cue)).is_empty());
}

#[test]
fn cue_handles_stay_unique_across_runs() {
    let cues = CueRegistry::new();
    let (mut state, _) = start(settings(0, 10, 0, 1), &cues);
    ticks(&mut state, &cues, 5);
    let first = state.active_cue().unwrap();
    step(&mut state, &cues, Input::Reset);

    step(&mut state, &cues, Input::Start(settings(0, 10, 0, 1)));
    ticks(&mut state, &cues, 5);
    let second = state.active_cue().unwrap();

    assert_ne!(first, second);
}

#[test]
fn completion_cue_plays_once_per_run() {
    let cues = CueRegistry::new();
    let (mut state, _) = start(settings(0, 2, 0, 1), &cues);
    let mut effects = ticks(&mut state, &cues, 2);
    effects.extend(ticks(&mut state, &cues, 3));
    effects.extend(step(&mut state, &cues, Input::Resume));
    assert_eq!(count(&effects, |e| *e == Effect::PlayFinish), 1);

    step(&mut state, &cues, Input::Start(settings(0, 2, 0, 1)));
    let again = ticks(&mut state, &cues, 2);
    assert_eq!(count(&again, |e| *e == Effect::PlayFinish), 1);
}
