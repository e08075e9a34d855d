//! Error types for cue playback

use std::path::PathBuf;
use thiserror::Error;

/// Errors reported by cue players.
///
/// The engine never propagates these: a failed cue is logged and the phase
/// simply runs to its natural end.
#[derive(Debug, Error)]
pub enum CueError {
    #[error("no cue asset configured for {kind}")]
    NoAsset { kind: hiit_types::PhaseKind },

    #[error("cue file not found: {path}")]
    NotFound { path: PathBuf },

    #[error("failed to decode cue file {path}: {reason}")]
    Decode { path: PathBuf, reason: String },

    #[error("audio output unavailable: {0}")]
    OutputUnavailable(String),

    #[error("audio service is not running")]
    ServiceClosed,
}
