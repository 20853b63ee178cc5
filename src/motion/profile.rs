// src/motion/profile.rs - Distance-dependent step delay
use std::time::Duration;

/// Delay in seconds for the `block`-th step of an uninterrupted journey.
///
/// The cumulative travel time after `n` blocks is `base * sqrt(n)`, so each
/// step costs `base * (sqrt(n) - sqrt(n - 1))`: the first block takes exactly
/// `base` and later blocks get cheaper, roughly `base / (2 * sqrt(n))`.
/// Block `0` is treated as the first block.
pub fn compute_delay(base_secs: f64, block: u32) -> f64 {
    if block <= 1 {
        return base_secs;
    }
    let n = f64::from(block);
    base_secs * (n.sqrt() - (n - 1.0).sqrt())
}

/// [`compute_delay`] as a sleep duration. Saturates instead of panicking when
/// the delay does not fit a `Duration`; non-positive or NaN delays become zero.
pub fn step_duration(base_secs: f64, block: u32) -> Duration {
    let secs = compute_delay(base_secs, block);
    Duration::try_from_secs_f64(secs).unwrap_or(if secs > 0.0 { Duration::MAX } else { Duration::ZERO })
}
