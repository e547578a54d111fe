//! Node Store Module
//!
//! Typed reads and writes against one backing node, with the command timeout
//! and the early expiration test applied on reads.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures::future::try_join_all;
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

use crate::backend::{KvBackend, NO_EXPIRY};
use crate::cache::{CacheStats, NodeStats, PerParams};
use crate::codec::{Codec, JsonCodec};
use crate::error::{CacheError, Result};
use crate::random::RandomSource;

// == Node Store ==
/// One cache node. Instantiated once per configured backend.
pub struct NodeStore {
    index: usize,
    backend: Arc<dyn KvBackend>,
    per: PerParams,
    random: Arc<dyn RandomSource>,
    timeout: Duration,
    codec: JsonCodec,
    stats: NodeStats,
}

impl NodeStore {
    /// Creates a store for node `index`. Values are stored as JSON.
    pub fn new(
        index: usize,
        backend: Arc<dyn KvBackend>,
        per: PerParams,
        random: Arc<dyn RandomSource>,
        timeout: Duration,
    ) -> Self {
        Self {
            index,
            backend,
            per,
            random,
            timeout,
            codec: JsonCodec,
            stats: NodeStats::new(),
        }
    }

    /// Position of this node in its node set.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn stats(&self) -> CacheStats {
        self.stats.snapshot()
    }

    // == Set ==
    /// Writes one value expiring `ttl` from now.
    pub async fn set<T: Serialize + Sync>(&self, key: &str, value: &T, ttl: Duration) -> Result<()> {
        let raw = self.codec.encode(value)?;
        self.call(self.backend.set(key, raw, ttl)).await?;
        self.stats.record_writes(1);
        Ok(())
    }

    // == Set Bulk ==
    /// Writes every pair in one pipelined round trip. Not atomic across pairs.
    pub async fn set_bulk<T: Serialize + Sync>(
        &self,
        pairs: &[(String, T)],
        ttl: Duration,
    ) -> Result<()> {
        let encoded = pairs
            .iter()
            .map(|(key, value)| Ok((key.clone(), self.codec.encode(value)?)))
            .collect::<Result<Vec<_>>>()?;
        let count = encoded.len();
        self.call(self.backend.set_many(encoded, ttl)).await?;
        self.stats.record_writes(count);
        Ok(())
    }

    // == Get ==
    /// Reads one value, treating it as absent when missing, blank,
    /// undecodable, or expired early by the PER test.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let remaining_ms = self.call(self.backend.pttl(key)).await?;

        if remaining_ms != NO_EXPIRY {
            if remaining_ms < 0 {
                self.stats.record_miss();
                return Ok(None);
            }

            let u = self.random.unit();
            if self.per.expires_early(remaining_ms, u) {
                debug!(node = self.index, key, remaining_ms, "key needs refresh");
                self.stats.record_early_expiration();
                return Ok(None);
            }
        }

        let raw = match self.call(self.backend.get(key)).await? {
            Some(raw) if !raw.trim().is_empty() => raw,
            _ => {
                debug!(node = self.index, key, "value is missing or blank");
                self.stats.record_miss();
                return Ok(None);
            }
        };

        match self.codec.decode::<T>(&raw) {
            Ok(value) => {
                self.stats.record_hit();
                Ok(Some(value))
            }
            Err(err) => {
                warn!(node = self.index, key, error = %err, "undecodable value treated as miss");
                self.stats.record_miss();
                Ok(None)
            }
        }
    }

    // == Get Bulk ==
    /// Reads every key concurrently over the node's shared connection.
    ///
    /// Results follow the input order. Any backend failure fails the batch.
    pub async fn get_bulk<T: DeserializeOwned>(&self, keys: &[String]) -> Result<Vec<Option<T>>> {
        try_join_all(keys.iter().map(|key| self.get::<T>(key))).await
    }

    /// Runs one backend command under the command timeout.
    async fn call<T>(&self, command: impl Future<Output = Result<T>>) -> Result<T> {
        let result = match tokio::time::timeout(self.timeout, command).await {
            Ok(result) => result,
            Err(_) => Err(CacheError::BackendTimeout(format!(
                "node {} did not answer within {}ms",
                self.index,
                self.timeout.as_millis()
            ))),
        };
        if result.is_err() {
            self.stats.record_error();
        }
        result
    }
}

// == Node Set ==
/// Fixed, non-empty list of nodes. Indexes are stable for the set's lifetime.
#[derive(Clone)]
pub struct NodeSet {
    nodes: Arc<Vec<Arc<NodeStore>>>,
}

impl NodeSet {
    /// Builds a node set, rejecting an empty list.
    pub fn new(nodes: Vec<NodeStore>) -> Result<Self> {
        if nodes.is_empty() {
            return Err(CacheError::Config("a node set needs at least one node".into()));
        }
        Ok(Self {
            nodes: Arc::new(nodes.into_iter().map(Arc::new).collect()),
        })
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false: construction rejects empty sets.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Arc<NodeStore>> {
        self.nodes.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<NodeStore>> {
        self.nodes.iter()
    }
}
