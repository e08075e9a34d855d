//! Phase and plan types

use hiit_types::PhaseKind;
use serde::Serialize;

use super::total_time;

/// Which segment a phase is, with the set it belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PhaseStep {
    Prepare,
    Exercise { set: u32 },
    /// Rest separating set `set` from set `set + 1`
    Rest { set: u32 },
}

impl PhaseStep {
    pub fn kind(&self) -> PhaseKind {
        match self {
            PhaseStep::Prepare => PhaseKind::Prepare,
            PhaseStep::Exercise { .. } => PhaseKind::Exercise,
            PhaseStep::Rest { .. } => PhaseKind::Rest,
        }
    }

    /// 1-based set index (None for the prepare phase)
    pub fn set_index(&self) -> Option<u32> {
        match self {
            PhaseStep::Prepare => None,
            PhaseStep::Exercise { set } | PhaseStep::Rest { set } => Some(*set),
        }
    }
}

/// One timed segment of the workout. `duration` is always > 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Phase {
    pub step: PhaseStep,
    pub duration: u32,
}

impl Phase {
    pub fn kind(&self) -> PhaseKind {
        self.step.kind()
    }

    pub fn set_index(&self) -> Option<u32> {
        self.step.set_index()
    }
}

/// Ordered, immutable sequence of phases for one run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Plan {
    phases: Vec<Phase>,
}

impl Plan {
    pub(crate) fn from_phases(phases: Vec<Phase>) -> Self {
        Self { phases }
    }

    pub fn phases(&self) -> &[Phase] {
        &self.phases
    }

    pub fn get(&self, index: usize) -> Option<&Phase> {
        self.phases.get(index)
    }

    pub fn len(&self) -> usize {
        self.phases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phases.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Phase> {
        self.phases.iter()
    }

    /// Sum of all phase durations in seconds
    pub fn total_secs(&self) -> u64 {
        total_time(&self.phases)
    }

    /// Number of phases of the given kind
    pub fn count_of(&self, kind: PhaseKind) -> usize {
        self.phases.iter().filter(|p| p.kind() == kind).count()
    }
}

impl<'a> IntoIterator for &'a Plan {
    type Item = &'a Phase;
    type IntoIter = std::slice::Iter<'a, Phase>;

    fn into_iter(self) -> Self::IntoIter {
        self.phases.iter()
    }
}
