//! Run state owned by the engine

use serde::Serialize;

use crate::cues::CueHandle;
use crate::plan::{Phase, Plan};
use crate::progress::progress;

/// Where the engine is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    #[default]
    Idle,
    Running,
    Paused,
    Finished,
}

impl RunStatus {
    /// Running or paused: a run is in progress
    pub fn is_active(&self) -> bool {
        matches!(self, RunStatus::Running | RunStatus::Paused)
    }
}

/// Mutable state of one run.
///
/// Only the engine's transition function mutates it; everyone else sees it
/// through the read accessors or a [`RunSnapshot`].
#[derive(Debug, Clone, Default)]
pub struct RunState {
    pub(crate) plan: Plan,
    /// None before the first phase; `Some(plan.len())` once finished
    pub(crate) phase_index: Option<usize>,
    pub(crate) remaining: u32,
    pub(crate) phase_total: u32,
    pub(crate) status: RunStatus,
    pub(crate) sets_planned: u32,
    pub(crate) sets_remaining: u32,
    pub(crate) total_remaining: u64,
    pub(crate) cue_started: bool,
    pub(crate) active_cue: Option<CueHandle>,
    pub(crate) finish_played: bool,
    /// Next cue handle to hand out; survives resets so handles stay unique
    pub(crate) cue_serial: u64,
}

impl RunState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Idle state that keeps the cue handle sequence going
    pub(crate) fn idle_after(previous: &RunState) -> Self {
        Self {
            cue_serial: previous.cue_serial,
            ..Self::default()
        }
    }

    pub fn status(&self) -> RunStatus {
        self.status
    }

    pub fn plan(&self) -> &Plan {
        &self.plan
    }

    pub fn phase_index(&self) -> Option<usize> {
        self.phase_index
    }

    pub fn current_phase(&self) -> Option<&Phase> {
        self.phase_index.and_then(|i| self.plan.get(i))
    }

    /// The phase after the current one, if any
    pub fn next_phase(&self) -> Option<&Phase> {
        self.phase_index.and_then(|i| self.plan.get(i + 1))
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn phase_total(&self) -> u32 {
        self.phase_total
    }

    pub fn sets_planned(&self) -> u32 {
        self.sets_planned
    }

    pub fn sets_remaining(&self) -> u32 {
        self.sets_remaining
    }

    pub fn total_remaining(&self) -> u64 {
        self.total_remaining
    }

    pub fn cue_started(&self) -> bool {
        self.cue_started
    }

    pub fn active_cue(&self) -> Option<CueHandle> {
        self.active_cue
    }

    /// Seconds elapsed in the current phase
    pub fn elapsed(&self) -> u32 {
        self.phase_total.saturating_sub(self.remaining)
    }

    pub fn progress(&self) -> f32 {
        progress(self.elapsed(), self.phase_total)
    }

    pub fn snapshot(&self) -> RunSnapshot {
        RunSnapshot {
            status: self.status,
            phase: self.current_phase().copied(),
            phase_index: self.phase_index,
            phase_count: self.plan.len(),
            remaining: self.remaining,
            phase_total: self.phase_total,
            sets_planned: self.sets_planned,
            sets_remaining: self.sets_remaining,
            total_remaining: self.total_remaining,
            progress: self.progress(),
        }
    }
}

/// Read-only copy of the run for display collaborators
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSnapshot {
    pub status: RunStatus,
    pub phase: Option<Phase>,
    pub phase_index: Option<usize>,
    pub phase_count: usize,
    pub remaining: u32,
    pub phase_total: u32,
    pub sets_planned: u32,
    pub sets_remaining: u32,
    pub total_remaining: u64,
    pub progress: f32,
}
