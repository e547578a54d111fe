//! In-Memory Backend
//!
//! A process-local key-value node with millisecond TTLs and failure injection.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{KvBackend, KEY_MISSING, NO_EXPIRY};
use crate::error::{CacheError, Result};

// == Memory Entry ==
/// A stored value with its absolute expiration.
#[derive(Debug, Clone)]
pub struct MemoryEntry {
    /// The stored value
    pub value: String,
    /// Expiration timestamp (Unix milliseconds), None = no expiration
    pub expires_at: Option<u64>,
}

impl MemoryEntry {
    /// Creates an entry expiring `ttl` from now.
    pub fn new(value: String, ttl: Option<Duration>) -> Self {
        let now = current_timestamp_ms();
        Self {
            value,
            expires_at: ttl.map(|ttl| now.saturating_add(duration_millis(ttl))),
        }
    }

    /// An entry is expired once the current time reaches its expiration.
    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(expires) => current_timestamp_ms() >= expires,
            None => false,
        }
    }

    /// Remaining TTL in milliseconds, `None` if the entry never expires.
    pub fn ttl_remaining_ms(&self) -> Option<u64> {
        self.expires_at
            .map(|expires| expires.saturating_sub(current_timestamp_ms()))
    }
}

/// Whole milliseconds of `ttl`, clamped to `u64::MAX`.
fn duration_millis(ttl: Duration) -> u64 {
    u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX)
}

/// Returns current Unix timestamp in milliseconds.
fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

// == Memory Backend ==
/// Key-value node living in the current process.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: RwLock<HashMap<String, MemoryEntry>>,
    fault: Mutex<Option<CacheError>>,
    latency: Mutex<Option<Duration>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every following command fail with `err`, or succeed again with `None`.
    pub fn fail_with(&self, err: Option<CacheError>) {
        *self.fault.lock().unwrap_or_else(|p| p.into_inner()) = err;
    }

    /// Delays every following command by `latency`.
    pub fn set_latency(&self, latency: Option<Duration>) {
        *self.latency.lock().unwrap_or_else(|p| p.into_inner()) = latency;
    }

    /// Stores an entry directly, bypassing faults. Intended for seeding.
    pub async fn insert(&self, key: impl Into<String>, entry: MemoryEntry) {
        self.entries.write().await.insert(key.into(), entry);
    }

    /// Returns the raw value when present and unexpired, bypassing faults.
    pub async fn peek(&self, key: &str) -> Option<String> {
        self.entries
            .read()
            .await
            .get(key)
            .filter(|entry| !entry.is_expired())
            .map(|entry| entry.value.clone())
    }

    /// Removes every expired entry and returns how many were dropped.
    pub async fn purge_expired(&self) -> usize {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired());
        before - entries.len()
    }

    /// Number of stored entries, expired ones included until purged.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Applies injected latency, then the injected fault if any.
    async fn enter(&self) -> Result<()> {
        let latency = *self.latency.lock().unwrap_or_else(|p| p.into_inner());
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
        match self.fault.lock().unwrap_or_else(|p| p.into_inner()).clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl KvBackend for MemoryBackend {
    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<()> {
        self.enter().await?;
        self.insert(key, MemoryEntry::new(value, Some(ttl))).await;
        Ok(())
    }

    async fn set_many(&self, pairs: Vec<(String, String)>, ttl: Duration) -> Result<()> {
        self.enter().await?;
        let mut entries = self.entries.write().await;
        for (key, value) in pairs {
            entries.insert(key, MemoryEntry::new(value, Some(ttl)));
        }
        Ok(())
    }

    async fn pttl(&self, key: &str) -> Result<i64> {
        self.enter().await?;
        let entries = self.entries.read().await;
        let ttl = match entries.get(key) {
            Some(entry) if entry.is_expired() => KEY_MISSING,
            Some(entry) => match entry.ttl_remaining_ms() {
                Some(ms) => i64::try_from(ms).unwrap_or(i64::MAX),
                None => NO_EXPIRY,
            },
            None => KEY_MISSING,
        };
        Ok(ttl)
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        self.enter().await?;
        Ok(self.peek(key).await)
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_huge_ttl_saturates_instead_of_overflowing() {
        let entry = MemoryEntry::new("v".to_string(), Some(Duration::MAX));
        assert_eq!(entry.expires_at, Some(u64::MAX));
        assert!(!entry.is_expired());
    }

    #[tokio::test]
    async fn test_pttl_of_huge_ttl_stays_positive() {
        let node = MemoryBackend::new();
        node.set("k", "v".to_string(), Duration::MAX).await.unwrap();
        assert_eq!(node.pttl("k").await.unwrap(), i64::MAX);
    }

    #[test]
    fn test_entry_without_ttl_never_expires() {
        let entry = MemoryEntry::new("v".to_string(), None);
        assert!(!entry.is_expired());
        assert!(entry.ttl_remaining_ms().is_none());
    }

    #[test]
    fn test_expiration_boundary_condition() {
        let entry = MemoryEntry {
            value: "v".to_string(),
            expires_at: Some(current_timestamp_ms()),
        };
        assert!(entry.is_expired(), "Entry should be expired at boundary");
        assert_eq!(entry.ttl_remaining_ms(), Some(0));
    }

    #[tokio::test]
    async fn test_set_then_get() {
        let node = MemoryBackend::new();
        node.set("k", "v".to_string(), Duration::from_secs(60))
            .await
            .unwrap();

        assert_eq!(node.get("k").await.unwrap(), Some("v".to_string()));
        let ttl = node.pttl("k").await.unwrap();
        assert!(ttl > 59_000 && ttl <= 60_000, "unexpected ttl {}", ttl);
    }

    #[tokio::test]
    async fn test_pttl_for_missing_and_persistent_keys() {
        let node = MemoryBackend::new();
        assert_eq!(node.pttl("missing").await.unwrap(), KEY_MISSING);

        node.insert("forever", MemoryEntry::new("v".to_string(), None))
            .await;
        assert_eq!(node.pttl("forever").await.unwrap(), NO_EXPIRY);
    }

    #[tokio::test]
    async fn test_expired_key_reads_as_missing() {
        let node = MemoryBackend::new();
        node.set("k", "v".to_string(), Duration::from_millis(20))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(40)).await;

        assert_eq!(node.pttl("k").await.unwrap(), KEY_MISSING);
        assert_eq!(node.get("k").await.unwrap(), None);
        assert_eq!(node.purge_expired().await, 1);
        assert!(node.is_empty().await);
    }

    #[tokio::test]
    async fn test_set_many_writes_all_pairs() {
        let node = MemoryBackend::new();
        let pairs = vec![
            ("a".to_string(), "1".to_string()),
            ("b".to_string(), "2".to_string()),
        ];
        node.set_many(pairs, Duration::from_secs(60)).await.unwrap();
        assert_eq!(node.len().await, 2);
        assert_eq!(node.peek("b").await, Some("2".to_string()));
    }

    #[tokio::test]
    async fn test_injected_fault_fails_commands() {
        let node = MemoryBackend::new();
        node.fail_with(Some(CacheError::BackendUnavailable("down".into())));

        let result = node.set("k", "v".to_string(), Duration::from_secs(1)).await;
        assert!(matches!(result, Err(CacheError::BackendUnavailable(_))));
        assert!(node.get("k").await.is_err());

        node.fail_with(None);
        assert!(node.get("k").await.unwrap().is_none());
    }
}
