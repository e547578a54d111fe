//! Redis Backend
//!
//! A key-value node served by one Redis instance over a multiplexed connection.

use std::time::Duration;

use async_trait::async_trait;
use redis::{aio::ConnectionManager, AsyncCommands, Client};
use tokio::sync::OnceCell;
use tracing::info;

use super::KvBackend;
use crate::error::{CacheError, Result};

/// Redis node reached at `host:port`.
///
/// The connection is established on first use, so a node that is down at
/// startup only fails the calls routed to it.
pub struct RedisBackend {
    address: String,
    client: Client,
    conn: OnceCell<ConnectionManager>,
}

impl RedisBackend {
    /// Creates a backend for `host:port` without connecting yet.
    pub fn open(address: &str) -> Result<Self> {
        let client = Client::open(format!("redis://{}/", address))
            .map_err(|e| CacheError::Config(format!("invalid node address '{}': {}", address, e)))?;
        Ok(Self {
            address: address.to_string(),
            client,
            conn: OnceCell::new(),
        })
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    /// Returns a handle on the shared multiplexed connection.
    async fn connection(&self) -> Result<ConnectionManager> {
        let conn = self
            .conn
            .get_or_try_init(|| async {
                let manager = ConnectionManager::new(self.client.clone()).await?;
                info!(node = %self.address, "connected to cache node");
                Ok::<_, redis::RedisError>(manager)
            })
            .await?;
        Ok(conn.clone())
    }
}

#[async_trait]
impl KvBackend for RedisBackend {
    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<()> {
        let mut conn = self.connection().await?;
        conn.pset_ex::<_, _, ()>(key, value, ttl_millis(ttl)).await?;
        Ok(())
    }

    async fn set_many(&self, pairs: Vec<(String, String)>, ttl: Duration) -> Result<()> {
        if pairs.is_empty() {
            return Ok(());
        }
        let mut conn = self.connection().await?;
        let millis = ttl_millis(ttl);
        let mut pipe = redis::pipe();
        for (key, value) in pairs {
            pipe.pset_ex(key, value, millis).ignore();
        }
        let _: () = pipe.query_async(&mut conn).await?;
        Ok(())
    }

    async fn pttl(&self, key: &str) -> Result<i64> {
        let mut conn = self.connection().await?;
        let ttl: i64 = conn.pttl(key).await?;
        Ok(ttl)
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.connection().await?;
        let value: Option<String> = conn.get(key).await?;
        Ok(value)
    }
}

/// Redis rejects a zero expiry, so sub-millisecond TTLs round up.
fn ttl_millis(ttl: Duration) -> u64 {
    u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX).max(1)
}
