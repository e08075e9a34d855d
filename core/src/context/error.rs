//! Error types for configuration operations

use thiserror::Error;

/// Errors during configuration operations
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration")]
    Load(#[from] confy::ConfyError),

    #[error("failed to save configuration")]
    Save(#[source] confy::ConfyError),

    #[error("preset '{name}' not found")]
    PresetNotFound { name: String },

    #[error("preset name must not be empty")]
    EmptyPresetName,
}
