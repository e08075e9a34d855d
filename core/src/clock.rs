//! Clock-style duration parsing and formatting
//!
//! Front ends accept durations as `"MM:SS"`, `"HH:MM:SS"` or plain seconds
//! and display countdowns as `"MM:SS"` (phase) or `"H:MM:SS"` (circuit).

use thiserror::Error;

/// Largest minutes value accepted in a `"MM:SS"` pair
pub const MAX_MINUTES: u32 = 999;

/// Errors from parsing a clock string
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClockError {
    #[error("empty duration")]
    Empty,

    #[error("invalid duration component '{part}' in '{input}'")]
    InvalidComponent { input: String, part: String },

    #[error("too many ':' separated components in '{0}'")]
    TooManyComponents(String),
}

/// Parse `"HH:MM:SS"`, `"MM:SS"` or `"SS"` into seconds.
///
/// Components must be non-negative integers. A `"MM:SS"` pair goes through
/// [`normalize_pair`], so `"0:90"` is 90 seconds and minutes stop at 999.
pub fn parse_clock(input: &str) -> Result<u32, ClockError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ClockError::Empty);
    }

    let parts = trimmed
        .split(':')
        .map(|part| {
            part.trim()
                .parse::<u32>()
                .map_err(|_| ClockError::InvalidComponent {
                    input: input.to_string(),
                    part: part.to_string(),
                })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let secs = match parts.as_slice() {
        [ss] => *ss as u64,
        [mm, ss] => {
            let (mm, ss) = normalize_pair(*mm as i64, *ss as i64);
            mm as u64 * 60 + ss as u64
        }
        [hh, mm, ss] => *hh as u64 * 3600 + *mm as u64 * 60 + *ss as u64,
        _ => return Err(ClockError::TooManyComponents(input.to_string())),
    };
    Ok(secs.min(u32::MAX as u64) as u32)
}

/// Carry seconds above 59 into minutes.
///
/// Seconds are first clamped to `0..=5999` and minutes to `0..=999`; the
/// carried minutes are clamped again.
pub fn normalize_pair(minutes: i64, seconds: i64) -> (u32, u32) {
    let mut mm = minutes.clamp(0, MAX_MINUTES as i64) as u32;
    let mut ss = seconds.clamp(0, 5999) as u32;
    if ss >= 60 {
        mm = (mm + ss / 60).min(MAX_MINUTES);
        ss %= 60;
    }
    (mm, ss)
}

/// `"MM:SS"` with zero padding; minutes grow past two digits if needed
pub fn format_mmss(secs: u32) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// `"H:MM:SS"` from one hour upward, `"MM:SS"` below
pub fn format_hmmss(secs: u64) -> String {
    let h = secs / 3600;
    let m = (secs % 3600) / 60;
    let s = secs % 60;
    if h > 0 {
        format!("{h}:{m:02}:{s:02}")
    } else {
        format!("{m:02}:{s:02}")
    }
}
