//! Shared configuration types for the HIIT interval timer
//!
//! This crate contains the serializable types that are shared between the
//! timer core (hiit-core) and its front ends. Persistence methods live in
//! hiit-core via the `AppConfigExt` trait.

use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────────────────────────────────────
// Workout Settings
// ─────────────────────────────────────────────────────────────────────────────

/// Lowest accepted number of sets
pub const MIN_SETS: u32 = 1;

/// Highest accepted number of sets
pub const MAX_SETS: u32 = 999;

/// Validated workout settings. All durations are whole seconds.
///
/// Front ends parse raw user input into this struct; the timer engine only
/// ever sees values that went through [`Settings::new`] or
/// [`Settings::normalized`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub prepare: u32,
    #[serde(default)]
    pub exercise: u32,
    #[serde(default)]
    pub rest: u32,
    #[serde(default = "default_sets")]
    pub sets: u32,
}

fn default_sets() -> u32 {
    MIN_SETS
}

impl Settings {
    /// Build settings from possibly out-of-range input.
    ///
    /// Negative durations become 0 and `sets` is clamped to
    /// [`MIN_SETS`]..=[`MAX_SETS`].
    pub fn new(prepare: i64, exercise: i64, rest: i64, sets: i64) -> Self {
        Self {
            prepare: clamp_secs(prepare),
            exercise: clamp_secs(exercise),
            rest: clamp_secs(rest),
            sets: sets.clamp(MIN_SETS as i64, MAX_SETS as i64) as u32,
        }
    }

    /// Re-apply the set clamp (durations are already non-negative by type)
    pub fn normalized(self) -> Self {
        Self {
            sets: self.sets.clamp(MIN_SETS, MAX_SETS),
            ..self
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            prepare: 10,
            exercise: 20,
            rest: 10,
            sets: 8,
        }
    }
}

fn clamp_secs(value: i64) -> u32 {
    value.clamp(0, u32::MAX as i64) as u32
}

// ─────────────────────────────────────────────────────────────────────────────
// Phase Kind
// ─────────────────────────────────────────────────────────────────────────────

/// The three kinds of timed segment in a workout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseKind {
    Prepare,
    Exercise,
    Rest,
}

impl PhaseKind {
    pub const ALL: [PhaseKind; 3] = [PhaseKind::Prepare, PhaseKind::Exercise, PhaseKind::Rest];

    /// Human-readable label for display and notifications
    pub fn label(&self) -> &'static str {
        match self {
            PhaseKind::Prepare => "Prepare",
            PhaseKind::Exercise => "Exercise",
            PhaseKind::Rest => "Rest",
        }
    }
}

impl std::fmt::Display for PhaseKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Presets
// ─────────────────────────────────────────────────────────────────────────────

/// A preset duration as stored on disk.
///
/// Presets written by the app use plain seconds; hand-edited files may use
/// clock strings such as `"1:30"` or `"0:01:30"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PresetDuration {
    Seconds(u32),
    Clock(String),
}

impl Default for PresetDuration {
    fn default() -> Self {
        PresetDuration::Seconds(0)
    }
}

impl From<u32> for PresetDuration {
    fn from(secs: u32) -> Self {
        PresetDuration::Seconds(secs)
    }
}

/// A named workout preset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preset {
    pub name: String,
    #[serde(default)]
    pub prepare: PresetDuration,
    #[serde(default)]
    pub exercise: PresetDuration,
    #[serde(default)]
    pub rest: PresetDuration,
    #[serde(default = "default_sets")]
    pub sets: u32,
}

impl Preset {
    /// Capture settings under a name
    pub fn from_settings(name: impl Into<String>, settings: &Settings) -> Self {
        Self {
            name: name.into(),
            prepare: settings.prepare.into(),
            exercise: settings.exercise.into(),
            rest: settings.rest.into(),
            sets: settings.sets,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// App Config
// ─────────────────────────────────────────────────────────────────────────────

/// Audio settings for phase cues and tones
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioSettings {
    /// Master enable for all audio
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Volume level (0-100)
    #[serde(default = "default_audio_volume")]
    pub volume: u8,

    /// Enable the short near-end and completion tones
    #[serde(default = "default_true")]
    pub tones_enabled: bool,

    /// Directory holding the cue files (None = platform config dir)
    #[serde(default)]
    pub sounds_dir: Option<String>,

    /// Cue played so it ends with the prepare phase
    #[serde(default = "default_prepare_cue")]
    pub prepare_cue: String,

    /// Cue played so it ends with each exercise phase
    #[serde(default = "default_exercise_cue")]
    pub exercise_cue: String,

    /// Cue played so it ends with each rest phase
    #[serde(default = "default_rest_cue")]
    pub rest_cue: String,

    /// Played once when the whole circuit completes
    #[serde(default = "default_finish_cue")]
    pub finish_cue: String,
}

impl AudioSettings {
    /// Cue file name configured for a phase kind
    pub fn cue_file(&self, kind: PhaseKind) -> &str {
        match kind {
            PhaseKind::Prepare => &self.prepare_cue,
            PhaseKind::Exercise => &self.exercise_cue,
            PhaseKind::Rest => &self.rest_cue,
        }
    }
}

fn default_audio_volume() -> u8 {
    80
}

fn default_prepare_cue() -> String {
    "prepare.mp3".to_string()
}

fn default_exercise_cue() -> String {
    "exercise.mp3".to_string()
}

fn default_rest_cue() -> String {
    "rest.mp3".to_string()
}

fn default_finish_cue() -> String {
    "finish.mp3".to_string()
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            volume: 80,
            tones_enabled: true,
            sounds_dir: None,
            prepare_cue: default_prepare_cue(),
            exercise_cue: default_exercise_cue(),
            rest_cue: default_rest_cue(),
            finish_cue: default_finish_cue(),
        }
    }
}

/// Application configuration
///
/// Note: Persistence methods (load/save) and preset management are provided
/// by hiit-core via the `AppConfigExt` trait.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Settings of the last started workout, restored on the next launch
    #[serde(default)]
    pub last_settings: Option<Settings>,

    #[serde(default)]
    pub presets: Vec<Preset>,

    #[serde(default)]
    pub audio: AudioSettings,

    #[serde(default = "default_true")]
    pub notifications_enabled: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            last_settings: None,
            presets: Vec::new(),
            audio: AudioSettings::default(),
            notifications_enabled: true,
        }
    }
}

fn default_true() -> bool {
    true
}
