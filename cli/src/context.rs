use hiit_core::context::APP_NAME;
use hiit_core::{AppConfig, AppConfigExt};
use std::path::PathBuf;

/// Holds all shared state for the CLI application.
pub struct CliContext {
    pub config: AppConfig,
}

impl CliContext {
    pub fn new() -> Self {
        Self {
            config: AppConfig::load(),
        }
    }

    /// Directory cue files are read from: the configured one, else
    /// `~/.config/hiit/sounds` (or platform equivalent).
    pub fn sounds_dir(&self) -> PathBuf {
        match &self.config.audio.sounds_dir {
            Some(dir) => PathBuf::from(dir),
            None => dirs::config_dir()
                .map(|p| p.join(APP_NAME).join("sounds"))
                .unwrap_or_else(|| PathBuf::from("sounds")),
        }
    }

    /// Persist the config, logging rather than failing on error
    pub fn save_config(&self) {
        if let Err(e) = self.config.save() {
            tracing::warn!(error = %e, "Failed to save configuration");
        }
    }
}

impl Default for CliContext {
    fn default() -> Self {
        Self::new()
    }
}
