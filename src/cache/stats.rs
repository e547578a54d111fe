//! Cache Statistics Module
//!
//! Tracks per-node read outcomes, write counts and backend failures.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

// == Node Stats ==
/// Live counters for one node, shared by every task using it.
#[derive(Debug, Default)]
pub struct NodeStats {
    hits: AtomicU64,
    misses: AtomicU64,
    early_expirations: AtomicU64,
    errors: AtomicU64,
    writes: AtomicU64,
}

impl NodeStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    /// An early expiration is also counted as a miss.
    pub fn record_early_expiration(&self) {
        self.early_expirations.fetch_add(1, Ordering::Relaxed);
        self.record_miss();
    }

    pub fn record_error(&self) {
        self.errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Counts `n` keys written to the node.
    pub fn record_writes(&self, n: usize) {
        self.writes.fetch_add(n as u64, Ordering::Relaxed);
    }

    /// Point-in-time copy of the counters.
    pub fn snapshot(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            early_expirations: self.early_expirations.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
            writes: self.writes.load(Ordering::Relaxed),
        }
    }
}

// == Cache Stats ==
/// Counter snapshot for one node.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CacheStats {
    /// Reads answered from the node
    pub hits: u64,
    /// Reads that found nothing usable, early expirations included
    pub misses: u64,
    /// Live entries reported expired by the early expiration test
    pub early_expirations: u64,
    /// Backend failures and timeouts
    pub errors: u64,
    /// Keys written to the node
    pub writes: u64,
}

impl CacheStats {
    /// Returns hits / (hits + misses), or 0.0 if no reads have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_new() {
        let stats = NodeStats::new().snapshot();
        assert_eq!(stats, CacheStats::default());
    }

    #[test]
    fn test_hit_rate_no_requests() {
        assert_eq!(CacheStats::default().hit_rate(), 0.0);
    }

    #[test]
    fn test_hit_rate_mixed() {
        let stats = NodeStats::new();
        stats.record_hit();
        stats.record_miss();
        assert_eq!(stats.snapshot().hit_rate(), 0.5);
    }

    #[test]
    fn test_early_expiration_counts_as_miss() {
        let stats = NodeStats::new();
        stats.record_early_expiration();
        let snapshot = stats.snapshot();
        assert_eq!(snapshot.early_expirations, 1);
        assert_eq!(snapshot.misses, 1);
    }

    #[test]
    fn test_record_writes_and_errors() {
        let stats = NodeStats::new();
        stats.record_writes(10);
        stats.record_writes(1);
        stats.record_error();
        let snapshot = stats.snapshot();
        assert_eq!(snapshot.writes, 11);
        assert_eq!(snapshot.errors, 1);
    }
}
