//! Display progress for the current phase

/// Fraction of the phase already elapsed, in `0.0..=1.0`.
///
/// `total` is the current phase's duration, not the circuit's. A zero total
/// is treated as one second so the result is always defined.
pub fn progress(elapsed: u32, total: u32) -> f32 {
    (elapsed as f32 / total.max(1) as f32).clamp(0.0, 1.0)
}
