//! Workout plans
//!
//! A [`Plan`] is the ordered list of timed phases for one run, derived once
//! from validated [`Settings`](hiit_types::Settings) and never mutated while
//! the run executes.

mod builder;
mod phase;

pub use builder::{build_plan, total_time};
pub use phase::{Phase, PhaseStep, Plan};
