//! Logging configuration with file-based output and size-based rotation.
//!
//! Writes logs to `~/.config/hiit/hiit.log` (or platform equivalent) with
//! 10 MB size-based rotation. The terminal belongs to the countdown display,
//! so logs only reach stderr when `DEBUG_LOGGING=1` is set or the log file
//! cannot be opened.

use rolling_file::{BasicRollingFileAppender, RollingConditionBasic};
use tracing_subscriber::{
    EnvFilter,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

const DEBUG_DIRECTIVE: &str = "info,hiit_core=debug,hiit_cli=debug";

/// Initialize logging.
///
/// Returns a `WorkerGuard` that MUST be held for the application lifetime
/// to ensure all buffered logs are flushed on shutdown.
///
/// # Behavior
/// - **File output:** written to `~/.config/hiit/hiit.log`
/// - **Stderr output:** only with `DEBUG_LOGGING=1`
/// - **Level:** INFO+, DEBUG+ for hiit crates when `DEBUG_LOGGING=1`
/// - **Rotation:** Size-based at 10 MB, keeps only latest rotated file
///
/// # Fallback
/// If the log file cannot be created, returns `None` and logs to stderr only.
pub fn init() -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let debug_logging = std::env::var("DEBUG_LOGGING").is_ok();

    let log_dir = match dirs::config_dir() {
        Some(config) => config.join(hiit_core::context::APP_NAME),
        None => {
            init_stderr_only(debug_logging);
            return None;
        }
    };

    if let Err(e) = std::fs::create_dir_all(&log_dir) {
        // Can't use tracing yet since subscriber not initialized
        eprintln!(
            "Failed to create log directory {:?}: {}, using stderr only",
            log_dir, e
        );
        init_stderr_only(debug_logging);
        return None;
    }

    // hiit.log and hiit.log.1
    let log_path = log_dir.join("hiit.log");
    let file_appender = match BasicRollingFileAppender::new(
        &log_path,
        RollingConditionBasic::new().max_size(10 * 1024 * 1024),
        1,
    ) {
        Ok(appender) => appender,
        Err(e) => {
            eprintln!("Failed to create log file at {:?}: {}", log_path, e);
            init_stderr_only(debug_logging);
            return None;
        }
    };

    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true)
        .with_span_events(FmtSpan::NONE);

    let stderr_layer = debug_logging.then(|| {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_span_events(FmtSpan::NONE)
    });

    tracing_subscriber::registry()
        .with(file_layer)
        .with(stderr_layer)
        .with(filter(debug_logging, "info"))
        .init();

    tracing::info!(log_file = ?log_path, debug_logging, "HIIT logging initialized");

    Some(guard)
}

/// Fallback when file logging is unavailable
fn init_stderr_only(debug_logging: bool) {
    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_span_events(FmtSpan::NONE);

    tracing_subscriber::registry()
        .with(stderr_layer)
        // Keep the countdown readable unless debugging
        .with(filter(debug_logging, "warn"))
        .init();

    tracing::info!(debug_logging, "HIIT logging initialized (stderr only)");
}

fn filter(debug_logging: bool, default_directive: &str) -> EnvFilter {
    if debug_logging {
        EnvFilter::new(DEBUG_DIRECTIVE)
    } else {
        EnvFilter::new(default_directive)
    }
}
