//! Timer engine
//!
//! This module provides:
//! - **State**: [`RunState`], the mutable heart of a run
//! - **Machine**: [`reduce`], the single transition function every input
//!   goes through, returning the side effects to perform
//! - **Engine**: [`TimerEngine`], which owns the state and performs effects
//!   against a [`CuePlayer`](crate::cues::CuePlayer) and an
//!   [`EventSink`](crate::events::EventSink)
//! - **Runner**: a tokio task that serializes commands, cue callbacks and
//!   one-second ticks onto one engine
//!
//! # States
//!
//! ```text
//!            start (non-empty plan)
//!   ┌──────┐ ───────────────────────▶ ┌─────────┐  pause   ┌────────┐
//!   │ Idle │                          │ Running │ ───────▶ │ Paused │
//!   └──────┘ ◀─────── reset ───────── └─────────┘ ◀─────── └────────┘
//!      ▲                                   │        resume      │
//!      │                     last phase ends│                   │
//!      │         reset                     ▼                    │
//!      └──────────────────────────── ┌──────────┐ ◀─────────────┘
//!                                    │ Finished │  (cue ended on last phase)
//!                                    └──────────┘
//! ```
//!
//! A phase ends at the earlier of its countdown reaching zero and its cue
//! reporting that playback ended. Both paths share the same phase-ending
//! transition.

mod error;
mod machine;
mod runner;
mod state;
mod timer;

#[cfg(test)]
mod machine_tests;

pub use error::{EngineError, RunnerError};
pub use machine::{Effect, Input, reduce};
pub use runner::{EngineHandle, EngineInbox, spawn_engine};
pub use state::{RunSnapshot, RunState, RunStatus};
pub use timer::TimerEngine;

/// Remaining seconds at which the near-end notices fire
pub const NEAR_END_NOTICE_SECS: u32 = 5;

/// Wall-clock length of one tick
pub const TICK_PERIOD: std::time::Duration = std::time::Duration::from_secs(1);
