//! Cache Module
//!
//! Per-node typed storage with probabilistic early expiration on reads.

mod node;
mod per;
mod stats;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use node::{NodeSet, NodeStore};
pub use per::{PerParams, DEFAULT_BETA, DEFAULT_DELTA_MS};
pub use stats::{CacheStats, NodeStats};
