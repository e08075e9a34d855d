//! The engine's transition function
//!
//! Every way the outside world can touch a run (control calls, the
//! one-second tick, cue callbacks) is an [`Input`] fed to [`reduce`]. The
//! function mutates the [`RunState`] and returns the [`Effect`]s the caller
//! must perform, in order. It performs no I/O itself, which keeps the
//! countdown-zero and cue-ended paths on one tested code path.

use hiit_types::{PhaseKind, Settings};

use crate::cues::{CueHandle, CueRegistry, Tone};
use crate::events::TimerEvent;
use crate::plan::build_plan;

use super::{EngineError, NEAR_END_NOTICE_SECS, RunState, RunStatus};

/// Everything that can drive the state machine
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Input {
    Start(Settings),
    Tick,
    Pause,
    Resume,
    Reset,
    /// Cue playback finished on its own
    CueEnded(CueHandle),
    /// Cue playback could not start or broke off
    CueFailed(CueHandle),
}

/// Side effects requested by a transition
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Emit(TimerEvent),
    /// (Re)start the one-second tick source; the first tick is one period away
    StartTicker,
    StopTicker,
    PlayCue { handle: CueHandle, kind: PhaseKind },
    StopCue(CueHandle),
    PauseCue(CueHandle),
    ResumeCue(CueHandle),
    PlayTone(Tone),
    PlayFinish,
}

/// Apply one input to the run.
///
/// Only [`Input::Start`] can fail, and when it does the state is untouched.
/// Inputs that make no sense in the current state are no-ops.
pub fn reduce(
    state: &mut RunState,
    cues: &CueRegistry,
    input: Input,
) -> Result<Vec<Effect>, EngineError> {
    let mut effects = Vec::new();
    match input {
        Input::Start(settings) => start(state, cues, settings, &mut effects)?,
        Input::Tick => tick(state, cues, &mut effects),
        Input::Pause => pause(state, &mut effects),
        Input::Resume => resume(state, cues, &mut effects),
        Input::Reset => reset(state, &mut effects),
        Input::CueEnded(handle) => cue_ended(state, cues, handle, &mut effects),
        Input::CueFailed(handle) => {
            if state.active_cue == Some(handle) {
                // The phase keeps counting down and ends at zero instead
                state.active_cue = None;
            }
        }
    }
    Ok(effects)
}

fn start(
    state: &mut RunState,
    cues: &CueRegistry,
    settings: Settings,
    effects: &mut Vec<Effect>,
) -> Result<(), EngineError> {
    let settings = settings.normalized();
    let plan = build_plan(&settings);
    if plan.is_empty() {
        return Err(EngineError::EmptyPlan);
    }

    if state.status.is_active() {
        stop_active_cue(state, effects);
        effects.push(Effect::StopTicker);
    }

    let total = plan.total_secs();
    *state = RunState {
        plan,
        status: RunStatus::Running,
        sets_planned: settings.sets,
        sets_remaining: settings.sets,
        total_remaining: total,
        ..RunState::idle_after(state)
    };

    advance(state, cues, effects);
    effects.push(Effect::StartTicker);
    Ok(())
}

fn tick(state: &mut RunState, cues: &CueRegistry, effects: &mut Vec<Effect>) {
    if state.status != RunStatus::Running {
        return;
    }
    let Some(phase) = state.current_phase().copied() else {
        return;
    };

    state.remaining = state.remaining.saturating_sub(1);
    state.total_remaining = state.total_remaining.saturating_sub(1);
    effects.push(Effect::Emit(TimerEvent::Tick {
        remaining: state.remaining,
        total_remaining: state.total_remaining,
        sets_remaining: state.sets_remaining,
        progress: state.progress(),
    }));

    let kind = phase.kind();
    if !state.cue_started {
        let threshold = cues.threshold(kind, state.phase_total);
        if state.remaining == threshold {
            start_cue(state, kind, threshold, effects);
        }
    }

    // Exact match: remaining strictly decreases, so this fires once per phase
    if state.remaining == NEAR_END_NOTICE_SECS {
        effects.push(Effect::Emit(TimerEvent::PhaseEndingSoon {
            kind,
            secs_left: NEAR_END_NOTICE_SECS,
        }));
        match state.next_phase() {
            Some(next) => {
                effects.push(Effect::Emit(TimerEvent::NextPhaseSoon {
                    kind: next.kind(),
                    secs_left: NEAR_END_NOTICE_SECS,
                }));
                effects.push(Effect::PlayTone(Tone::NextPhaseSoon));
            }
            None => effects.push(Effect::PlayTone(Tone::PhaseEndingSoon)),
        }
    }

    if state.remaining == 0 {
        end_phase(state, cues, effects);
    }
}

fn pause(state: &mut RunState, effects: &mut Vec<Effect>) {
    if state.status != RunStatus::Running {
        return;
    }
    state.status = RunStatus::Paused;
    if let Some(handle) = state.active_cue {
        effects.push(Effect::PauseCue(handle));
    }
    effects.push(Effect::Emit(TimerEvent::Paused));
}

fn resume(state: &mut RunState, cues: &CueRegistry, effects: &mut Vec<Effect>) {
    if state.status != RunStatus::Paused {
        return;
    }
    state.status = RunStatus::Running;
    effects.push(Effect::Emit(TimerEvent::Resumed));

    if let Some(handle) = state.active_cue {
        effects.push(Effect::ResumeCue(handle));
        return;
    }
    if state.cue_started {
        return;
    }
    // The trigger second may have passed while paused; start late rather
    // than skip the cue.
    if let Some(kind) = state.current_phase().map(|p| p.kind()) {
        let threshold = cues.threshold(kind, state.phase_total);
        if state.remaining <= threshold {
            start_cue(state, kind, threshold, effects);
        }
    }
}

fn reset(state: &mut RunState, effects: &mut Vec<Effect>) {
    stop_active_cue(state, effects);
    effects.push(Effect::StopTicker);
    *state = RunState::idle_after(state);
    effects.push(Effect::Emit(TimerEvent::Reset));
}

fn cue_ended(
    state: &mut RunState,
    cues: &CueRegistry,
    handle: CueHandle,
    effects: &mut Vec<Effect>,
) {
    if state.active_cue != Some(handle) || !state.status.is_active() {
        tracing::trace!(%handle, "Ignoring stale cue end");
        return;
    }
    // Playback already stopped by itself; nothing to stop
    state.active_cue = None;
    tracing::debug!(
        %handle,
        remaining = state.remaining,
        "Cue ended before countdown, ending phase"
    );
    end_phase(state, cues, effects);
}

/// Shared phase-ending path for countdown zero and cue end.
///
/// Debits whatever is left of the phase from the circuit total so the two
/// stay in step, then moves on.
fn end_phase(state: &mut RunState, cues: &CueRegistry, effects: &mut Vec<Effect>) {
    state.total_remaining = state.total_remaining.saturating_sub(state.remaining as u64);
    state.remaining = 0;

    if state.current_phase().map(|p| p.kind()) == Some(PhaseKind::Exercise) {
        state.sets_remaining = state.sets_remaining.saturating_sub(1);
    }

    stop_active_cue(state, effects);
    advance(state, cues, effects);
}

fn advance(state: &mut RunState, cues: &CueRegistry, effects: &mut Vec<Effect>) {
    let index = state.phase_index.map_or(0, |i| i + 1);
    state.phase_index = Some(index);

    let Some(phase) = state.plan.get(index).copied() else {
        finish(state, effects);
        return;
    };

    state.remaining = phase.duration;
    state.phase_total = phase.duration.max(1);
    state.cue_started = false;
    stop_active_cue(state, effects);

    let kind = phase.kind();
    tracing::debug!(
        index,
        %kind,
        set = ?phase.set_index(),
        duration = phase.duration,
        "Phase started"
    );
    effects.push(Effect::Emit(TimerEvent::PhaseChanged {
        kind,
        set_index: phase.set_index(),
        sets_planned: state.sets_planned,
    }));

    // A cue as long as the phase itself has to start right away, since no
    // tick will ever observe the full duration as remaining.
    if state.status == RunStatus::Running {
        let threshold = cues.threshold(kind, state.phase_total);
        if state.remaining == threshold {
            start_cue(state, kind, threshold, effects);
        }
    }
}

fn finish(state: &mut RunState, effects: &mut Vec<Effect>) {
    state.status = RunStatus::Finished;
    state.phase_index = Some(state.plan.len());
    state.remaining = 0;
    state.total_remaining = 0;
    state.sets_remaining = 0;
    stop_active_cue(state, effects);
    effects.push(Effect::StopTicker);
    effects.push(Effect::Emit(TimerEvent::Finished));

    if !state.finish_played {
        state.finish_played = true;
        effects.push(Effect::PlayFinish);
    }
    effects.push(Effect::PlayTone(Tone::CircuitComplete));
    tracing::debug!("Circuit finished");
}

fn start_cue(state: &mut RunState, kind: PhaseKind, threshold: u32, effects: &mut Vec<Effect>) {
    let handle = CueHandle(state.cue_serial);
    state.cue_serial += 1;
    state.cue_started = true;
    state.active_cue = Some(handle);
    effects.push(Effect::PlayCue { handle, kind });
    effects.push(Effect::Emit(TimerEvent::CueThreshold { kind, threshold }));
}

fn stop_active_cue(state: &mut RunState, effects: &mut Vec<Effect>) {
    if let Some(handle) = state.active_cue.take() {
        effects.push(Effect::StopCue(handle));
    }
}
