//! Interactive control while a workout runs

use clap::{Parser, Subcommand};
use std::io::BufRead;
use tokio::sync::mpsc;

#[derive(Parser, Debug)]
#[command(no_binary_name = true, disable_help_flag = true)]
struct ControlLine {
    #[command(subcommand)]
    command: Control,
}

/// Commands accepted on stdin during a run
#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    /// Pause, or resume when paused
    #[command(alias = "p")]
    Pause,
    /// Stop the run and return to idle
    #[command(alias = "r")]
    Reset,
    /// Start over with the same settings
    #[command(alias = "s")]
    Start,
    /// Show where the run is
    Status,
    /// Stop and leave
    #[command(alias = "q", alias = "exit")]
    Quit,
}

/// Parse one stdin line into a control command
pub fn parse_control(line: &str) -> Result<Control, String> {
    let args = shlex::split(line).ok_or("error: Invalid quoting")?;
    ControlLine::try_parse_from(args)
        .map(|parsed| parsed.command)
        .map_err(|e| e.to_string())
}

/// Read stdin lines on a blocking thread. The channel closes at EOF.
pub fn spawn_stdin_reader() -> mpsc::UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}
