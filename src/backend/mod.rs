//! Backend Module
//!
//! The key-value node interface consumed by node stores, and its implementations.

mod memory;
mod redis_node;

use std::time::Duration;

use async_trait::async_trait;

use crate::error::Result;

pub use self::memory::{MemoryBackend, MemoryEntry};
pub use self::redis_node::RedisBackend;

/// `pttl` result for a key that does not exist.
pub const KEY_MISSING: i64 = -2;

/// `pttl` result for a key stored without expiration.
pub const NO_EXPIRY: i64 = -1;

// == Key-Value Backend ==
/// One backing key-value node.
///
/// Implementations are long-lived and shared by every task talking to the node.
#[async_trait]
pub trait KvBackend: Send + Sync {
    /// Stores `value` under `key`, expiring `ttl` from now.
    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<()>;

    /// Stores every pair in a single round trip.
    async fn set_many(&self, pairs: Vec<(String, String)>, ttl: Duration) -> Result<()>;

    /// Remaining TTL in milliseconds, [`KEY_MISSING`] or [`NO_EXPIRY`].
    async fn pttl(&self, key: &str) -> Result<i64>;

    /// Raw stored value.
    async fn get(&self, key: &str) -> Result<Option<String>>;
}
