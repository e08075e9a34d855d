//! Plan construction from settings

use hiit_types::Settings;

use super::{Phase, PhaseStep, Plan};

/// Build the ordered phase list for a workout.
///
/// Emits Prepare once, then for each set an Exercise followed by a Rest,
/// except that no Rest trails the final set. Zero-length phases are left
/// out entirely. Pure: identical settings always give identical plans.
pub fn build_plan(settings: &Settings) -> Plan {
    let Settings {
        prepare,
        exercise,
        rest,
        sets,
    } = *settings;

    let mut phases = Vec::new();
    if prepare > 0 {
        phases.push(Phase {
            step: PhaseStep::Prepare,
            duration: prepare,
        });
    }

    for set in 1..=sets {
        if exercise > 0 {
            phases.push(Phase {
                step: PhaseStep::Exercise { set },
                duration: exercise,
            });
        }
        if set < sets && rest > 0 {
            phases.push(Phase {
                step: PhaseStep::Rest { set },
                duration: rest,
            });
        }
    }

    Plan::from_phases(phases)
}

/// Total circuit time in seconds
pub fn total_time(phases: &[Phase]) -> u64 {
    phases.iter().map(|p| p.duration as u64).sum()
}
