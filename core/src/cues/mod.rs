//! Phase cues
//!
//! Each phase kind has an audio cue that should finish right as the phase
//! ends. The [`CueRegistry`] tracks how long each cue runs so the engine can
//! start it at the right moment; a [`CuePlayer`] is the external capability
//! that actually produces sound.

mod error;
mod player;
mod registry;

pub use error::CueError;
pub use player::{CueHandle, CuePlayer, NullCuePlayer, Tone};
pub use registry::{CueInfo, CueRegistry, FALLBACK_CUE_SECS, cue_threshold};
