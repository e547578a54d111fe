//! Probabilistic Early Expiration
//!
//! Decides whether a live entry should be treated as expired ahead of its
//! physical TTL. The closer an entry is to expiring, the more likely a read
//! reports it expired, so concurrent readers refresh at staggered times
//! instead of all at the exact expiry instant.

/// Default recompute window in milliseconds.
pub const DEFAULT_DELTA_MS: i64 = 3_000;

/// Default aggressiveness weight.
pub const DEFAULT_BETA: f64 = 1.0;

// == PER Parameters ==
/// Tuning constants for early expiration.
///
/// `beta > 1.0` refreshes more eagerly, `beta < 1.0` more lazily.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerParams {
    /// Recompute window in milliseconds
    pub delta_ms: i64,
    /// Aggressiveness weight
    pub beta: f64,
}

impl PerParams {
    pub fn new(delta_ms: i64, beta: f64) -> Self {
        Self { delta_ms, beta }
    }

    /// `remaining_ms - |delta * beta * ln(u)|` for a draw `u` in `(0, 1]`.
    ///
    /// Never greater than `remaining_ms`.
    pub fn score(&self, remaining_ms: i64, u: f64) -> f64 {
        let penalty = (self.delta_ms as f64 * self.beta * u.ln()).abs();
        remaining_ms as f64 - penalty
    }

    /// True when the entry should be reported expired for this draw.
    pub fn expires_early(&self, remaining_ms: i64, u: f64) -> bool {
        self.score(remaining_ms, u) <= 0.0
    }
}

impl Default for PerParams {
    fn default() -> Self {
        Self::new(DEFAULT_DELTA_MS, DEFAULT_BETA)
    }
}
