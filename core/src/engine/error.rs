//! Error types for the timer engine

use thiserror::Error;

/// Errors returned by engine operations.
///
/// Only starting a run can fail; every other operation is total.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("nothing to run: every phase duration is zero")]
    EmptyPlan,
}

/// Errors from talking to an engine running in its own task
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RunnerError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("timer engine task has stopped")]
    Closed,
}
