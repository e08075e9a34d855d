//! Cue playback capability consumed by the engine

use hiit_types::PhaseKind;
use serde::Serialize;

use super::CueError;

/// Identifies one cue playback.
///
/// Handles are allocated by the engine and never reused within an engine's
/// lifetime, so a late "cue ended" report for an old playback can be told
/// apart from the current one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct CueHandle(pub u64);

impl std::fmt::Display for CueHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "cue#{}", self.0)
    }
}

/// Short synthesized tones requested at notable moments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Tone {
    /// Near-end notice when another phase follows (mid tone, then low tone)
    NextPhaseSoon,
    /// Near-end notice of the final phase (low tone)
    PhaseEndingSoon,
    /// Three-note sequence when the circuit completes
    CircuitComplete,
}

/// External audio capability.
///
/// The engine decides *when* cues run; implementations decide *how*. When a
/// cue started by `play_cue` finishes on its own, the implementation must
/// report it back to the engine as "cue ended" with the same handle.
/// Tone and finish playback are fire-and-forget.
pub trait CuePlayer {
    fn play_cue(&mut self, handle: CueHandle, kind: PhaseKind) -> Result<(), CueError>;

    fn stop_cue(&mut self, handle: CueHandle);

    /// Pause without losing the play position
    fn pause_cue(&mut self, handle: CueHandle);

    fn resume_cue(&mut self, handle: CueHandle);

    fn play_tone(&mut self, _tone: Tone) {}

    /// Completion sound, requested once per run
    fn play_finish(&mut self) {}
}

impl<P: CuePlayer + ?Sized> CuePlayer for Box<P> {
    fn play_cue(&mut self, handle: CueHandle, kind: PhaseKind) -> Result<(), CueError> {
        (**self).play_cue(handle, kind)
    }

    fn stop_cue(&mut self, handle: CueHandle) {
        (**self).stop_cue(handle)
    }

    fn pause_cue(&mut self, handle: CueHandle) {
        (**self).pause_cue(handle)
    }

    fn resume_cue(&mut self, handle: CueHandle) {
        (**self).resume_cue(handle)
    }

    fn play_tone(&mut self, tone: Tone) {
        (**self).play_tone(tone)
    }

    fn play_finish(&mut self) {
        (**self).play_finish()
    }
}

/// Player that produces no sound. Cues never end early, so every phase runs
/// to its countdown zero.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullCuePlayer;

impl CuePlayer for NullCuePlayer {
    fn play_cue(&mut self, _handle: CueHandle, _kind: PhaseKind) -> Result<(), CueError> {
        Ok(())
    }

    fn stop_cue(&mut self, _handle: CueHandle) {}

    fn pause_cue(&mut self, _handle: CueHandle) {}

    fn resume_cue(&mut self, _handle: CueHandle) {}
}
