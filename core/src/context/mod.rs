mod config;
mod error;

pub use config::{APP_NAME, AppConfigExt, preset_seconds, preset_settings};
pub use error::ConfigError;
