//! Cue duration registry
//!
//! Cue assets load asynchronously, so their real length is unknown when a
//! run may already be underway. Until a duration is reported the registry
//! answers with [`FALLBACK_CUE_SECS`].

use hiit_types::PhaseKind;

/// Duration assumed for a cue whose real length is unknown or invalid
pub const FALLBACK_CUE_SECS: f64 = 5.0;

/// What the registry knows about one cue
#[derive(Debug, Clone, PartialEq)]
pub struct CueInfo {
    /// Asset reference (file name, URL, ...) as understood by the player
    pub asset: Option<String>,
    pub duration_secs: f64,
    /// True once the real duration has been discovered
    pub loaded: bool,
}

impl Default for CueInfo {
    fn default() -> Self {
        Self {
            asset: None,
            duration_secs: FALLBACK_CUE_SECS,
            loaded: false,
        }
    }
}

/// Per-kind cue metadata, shared by every run of an engine
#[derive(Debug, Clone, Default)]
pub struct CueRegistry {
    prepare: CueInfo,
    exercise: CueInfo,
    rest: CueInfo,
}

impl CueRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with an asset reference for every kind
    pub fn with_assets(mut assets: impl FnMut(PhaseKind) -> Option<String>) -> Self {
        let mut registry = Self::new();
        for kind in PhaseKind::ALL {
            registry.entry_mut(kind).asset = assets(kind);
        }
        registry
    }

    pub fn info(&self, kind: PhaseKind) -> &CueInfo {
        match kind {
            PhaseKind::Prepare => &self.prepare,
            PhaseKind::Exercise => &self.exercise,
            PhaseKind::Rest => &self.rest,
        }
    }

    fn entry_mut(&mut self, kind: PhaseKind) -> &mut CueInfo {
        match kind {
            PhaseKind::Prepare => &mut self.prepare,
            PhaseKind::Exercise => &mut self.exercise,
            PhaseKind::Rest => &mut self.rest,
        }
    }

    /// Expected cue length in seconds. Always finite and positive.
    pub fn duration(&self, kind: PhaseKind) -> f64 {
        let secs = self.info(kind).duration_secs;
        if secs.is_finite() && secs > 0.0 {
            secs
        } else {
            FALLBACK_CUE_SECS
        }
    }

    /// Record a discovered cue length. Non-finite or non-positive values are
    /// ignored; otherwise the last report wins. Returns whether it was applied.
    pub fn mark_loaded(&mut self, kind: PhaseKind, secs: f64) -> bool {
        if !secs.is_finite() || secs <= 0.0 {
            tracing::debug!(%kind, secs, "Ignoring invalid cue duration");
            return false;
        }
        let entry = self.entry_mut(kind);
        entry.duration_secs = secs;
        entry.loaded = true;
        tracing::debug!(%kind, secs, "Cue duration discovered");
        true
    }

    /// Record that the asset failed to load. The last known duration stays.
    pub fn mark_unavailable(&mut self, kind: PhaseKind) {
        self.entry_mut(kind).loaded = false;
    }

    /// Remaining-seconds value at which the cue for `kind` should start
    pub fn threshold(&self, kind: PhaseKind, phase_total: u32) -> u32 {
        cue_threshold(self.duration(kind), phase_total)
    }
}

/// `clamp(ceil(cue_secs), 1, phase_total)`.
///
/// Starting the cue when this many seconds remain lets it finish at the
/// phase boundary. Never below 1, never above the phase length.
pub fn cue_threshold(cue_secs: f64, phase_total: u32) -> u32 {
    let upper = phase_total.max(1);
    let secs = if cue_secs.is_finite() && cue_secs > 0.0 {
        cue_secs
    } else {
        FALLBACK_CUE_SECS
    };
    let ceiled = secs.ceil().min(u32::MAX as f64) as u32;
    ceiled.clamp(1, upper)
}
