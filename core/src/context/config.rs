//! Application configuration
//!
//! Persistence and preset management for [`AppConfig`], which lives in
//! hiit-types so front ends can share it without depending on the engine.

use std::path::Path;

use hiit_types::{AppConfig, Preset, PresetDuration, Settings};

use super::ConfigError;
use crate::clock::parse_clock;

/// Application name used for the config directory
pub const APP_NAME: &str = "hiit";

const CONFIG_NAME: &str = "config";

// ─────────────────────────────────────────────────────────────────────────────
// Preset Conversion
// ─────────────────────────────────────────────────────────────────────────────

/// Seconds stored in a preset field. Malformed clock strings count as 0.
pub fn preset_seconds(duration: &PresetDuration) -> u32 {
    match duration {
        PresetDuration::Seconds(secs) => *secs,
        PresetDuration::Clock(text) => parse_clock(text).unwrap_or_else(|e| {
            tracing::warn!(value = %text, error = %e, "Invalid preset duration, using 0");
            0
        }),
    }
}

/// Settings described by a preset, normalized
pub fn preset_settings(preset: &Preset) -> Settings {
    Settings {
        prepare: preset_seconds(&preset.prepare),
        exercise: preset_seconds(&preset.exercise),
        rest: preset_seconds(&preset.rest),
        sets: preset.sets,
    }
    .normalized()
}

fn load_file(path: &Path) -> Result<AppConfig, ConfigError> {
    Ok(confy::load_path(path)?)
}

// ─────────────────────────────────────────────────────────────────────────────
// AppConfig Extensions
// ─────────────────────────────────────────────────────────────────────────────

/// Extension trait for AppConfig persistence and preset management
pub trait AppConfigExt {
    fn load() -> Self;
    fn try_load() -> Result<Self, ConfigError>
    where
        Self: Sized;
    fn save(&self) -> Result<(), ConfigError>;
    fn save_preset(&mut self, name: &str, settings: &Settings) -> Result<(), ConfigError>;
    fn delete_preset(&mut self, name: &str) -> Result<(), ConfigError>;
    fn find_preset(&self, name: &str) -> Option<Settings>;
    fn preset_names(&self) -> Vec<String>;
    fn remember_last_settings(&mut self, settings: Settings);
    fn initial_settings(&self) -> Settings;
}

impl AppConfigExt for AppConfig {
    /// Stored config, or the defaults when it cannot be read
    fn load() -> Self {
        Self::try_load().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Failed to load configuration, using defaults");
            Self::default()
        })
    }

    fn try_load() -> Result<Self, ConfigError> {
        let path = confy::get_configuration_file_path(APP_NAME, CONFIG_NAME)?;
        tracing::debug!(path = %path.display(), "Loading configuration");
        load_file(&path)
    }

    fn save(&self) -> Result<(), ConfigError> {
        confy::store(APP_NAME, CONFIG_NAME, self).map_err(ConfigError::Save)
    }

    fn save_preset(&mut self, name: &str, settings: &Settings) -> Result<(), ConfigError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ConfigError::EmptyPresetName);
        }

        let preset = Preset::from_settings(name, &settings.normalized());
        // Update in place so the list keeps its order
        if let Some(existing) = self.presets.iter_mut().find(|p| p.name == name) {
            *existing = preset;
        } else {
            self.presets.push(preset);
        }
        Ok(())
    }

    fn delete_preset(&mut self, name: &str) -> Result<(), ConfigError> {
        let len_before = self.presets.len();
        self.presets.retain(|p| p.name != name);
        if self.presets.len() == len_before {
            return Err(ConfigError::PresetNotFound {
                name: name.to_string(),
            });
        }
        Ok(())
    }

    fn find_preset(&self, name: &str) -> Option<Settings> {
        self.presets
            .iter()
            .find(|p| p.name == name)
            .map(preset_settings)
    }

    fn preset_names(&self) -> Vec<String> {
        self.presets.iter().map(|p| p.name.clone()).collect()
    }

    fn remember_last_settings(&mut self, settings: Settings) {
        self.last_settings = Some(settings.normalized());
    }

    /// Last started settings, or the defaults on a first launch
    fn initial_settings(&self) -> Settings {
        self.last_settings
            .map(Settings::normalized)
            .unwrap_or_default()
    }
}
