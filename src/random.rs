//! Random Source Module
//!
//! Injected randomness for node selection and early expiration draws.

use std::sync::Mutex;

use rand::{distributions::OpenClosed01, rngs::StdRng, thread_rng, Rng, SeedableRng};

/// Source of the uniform draws the cache layer depends on.
pub trait RandomSource: Send + Sync {
    /// Uniform draw in `(0, 1]`.
    fn unit(&self) -> f64;

    /// Uniform index in `[0, n)`. `n` must be at least 1.
    fn index(&self, n: usize) -> usize;
}

/// Thread-local RNG backed source used in production.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn unit(&self) -> f64 {
        thread_rng().sample(OpenClosed01)
    }

    fn index(&self, n: usize) -> usize {
        thread_rng().gen_range(0..n)
    }
}

/// Deterministic source for reproducible runs.
#[derive(Debug)]
pub struct SeededRandom {
    rng: Mutex<StdRng>,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl RandomSource for SeededRandom {
    fn unit(&self) -> f64 {
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        rng.sample(OpenClosed01)
    }

    fn index(&self, n: usize) -> usize {
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        rng.gen_range(0..n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_draws_stay_in_open_closed_interval() {
        let source = SeededRandom::new(7);
        for _ in 0..10_000 {
            let u = source.unit();
            assert!(u > 0.0 && u <= 1.0, "draw out of range: {}", u);
        }
        let u = ThreadRandom.unit();
        assert!(u > 0.0 && u <= 1.0);
    }

    #[test]
    fn test_index_within_bounds() {
        let source = SeededRandom::new(7);
        for _ in 0..1_000 {
            assert!(source.index(3) < 3);
        }
        assert_eq!(ThreadRandom.index(1), 0);
    }

    #[test]
    fn test_seeded_source_is_reproducible() {
        let a = SeededRandom::new(99);
        let b = SeededRandom::new(99);
        for _ in 0..100 {
            assert_eq!(a.unit(), b.unit());
            assert_eq!(a.index(5), b.index(5));
        }
    }
}
