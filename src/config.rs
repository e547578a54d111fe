//! Configuration Module
//!
//! Handles loading and managing cache layer configuration from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::cache::PerParams;
use crate::error::{CacheError, Result};

/// Largest member TTL whose millisecond value still fits a signed pttl reply.
pub const MAX_MEMBER_TTL_SECS: u64 = i64::MAX as u64 / 1_000;

/// Which kind of key-value node the process talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// One Redis server per configured address
    Redis,
    /// In-process nodes, one per configured address
    Memory,
}

impl FromStr for BackendKind {
    type Err = CacheError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "redis" => Ok(BackendKind::Redis),
            "memory" => Ok(BackendKind::Memory),
            other => Err(CacheError::Config(format!("unknown backend '{}'", other))),
        }
    }
}

/// When a fan-out write hands control back to its caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Return as soon as the fan-out is queued
    Detached,
    /// Return after every node write has finished
    Acknowledged,
}

impl FromStr for WriteMode {
    type Err = CacheError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "detached" => Ok(WriteMode::Detached),
            "acknowledged" => Ok(WriteMode::Acknowledged),
            other => Err(CacheError::Config(format!("unknown write mode '{}'", other))),
        }
    }
}

/// Cache layer configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Node addresses as `host:port`, one per replica
    pub nodes: Vec<String>,
    /// Backend implementation behind every node
    pub backend: BackendKind,
    /// TTL in seconds applied to every member entry
    pub member_ttl: u64,
    /// Early expiration window in milliseconds
    pub per_delta_ms: i64,
    /// Early expiration aggressiveness
    pub per_beta: f64,
    /// Per-command timeout in milliseconds
    pub command_timeout_ms: u64,
    /// Whether writes wait for the fan-out to finish
    pub write_mode: WriteMode,
    /// Capacity of the background write queue
    pub write_queue_capacity: usize,
    /// Upper bound of the synthetic member id range
    pub member_id_range: i64,
    /// HTTP server port
    pub server_port: u16,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_NODES` - Comma separated `host:port` list (default: three local nodes)
    /// - `CACHE_BACKEND` - `redis` or `memory` (default: redis)
    /// - `MEMBER_TTL` - Member TTL in seconds (default: 60)
    /// - `PER_DELTA_MS` - Early expiration window (default: 3000)
    /// - `PER_BETA` - Early expiration weight (default: 1.0)
    /// - `COMMAND_TIMEOUT_MS` - Per-command timeout (default: 1000)
    /// - `WRITE_MODE` - `detached` or `acknowledged` (default: detached)
    /// - `WRITE_QUEUE_CAPACITY` - Background write queue size (default: 1024)
    /// - `MEMBER_ID_RANGE` - Synthetic id range for bulk reads (default: 100)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let nodes = match env::var("CACHE_NODES") {
            Ok(raw) => raw
                .split(',')
                .map(str::trim)
                .filter(|node| !node.is_empty())
                .map(String::from)
                .collect(),
            Err(_) => defaults.nodes,
        };

        let config = Self {
            nodes,
            backend: parse_var("CACHE_BACKEND")?.unwrap_or(defaults.backend),
            member_ttl: parse_var("MEMBER_TTL")?.unwrap_or(defaults.member_ttl),
            per_delta_ms: parse_var("PER_DELTA_MS")?.unwrap_or(defaults.per_delta_ms),
            per_beta: parse_var("PER_BETA")?.unwrap_or(defaults.per_beta),
            command_timeout_ms: parse_var("COMMAND_TIMEOUT_MS")?
                .unwrap_or(defaults.command_timeout_ms),
            write_mode: parse_var("WRITE_MODE")?.unwrap_or(defaults.write_mode),
            write_queue_capacity: parse_var("WRITE_QUEUE_CAPACITY")?
                .unwrap_or(defaults.write_queue_capacity),
            member_id_range: parse_var("MEMBER_ID_RANGE")?.unwrap_or(defaults.member_id_range),
            server_port: parse_var("SERVER_PORT")?.unwrap_or(defaults.server_port),
        };

        config.validate()?;
        Ok(config)
    }

    /// Rejects configurations the cache layer cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.nodes.is_empty() {
            return Err(CacheError::Config("at least one cache node is required".into()));
        }
        if self.member_ttl == 0 || self.member_ttl > MAX_MEMBER_TTL_SECS {
            return Err(CacheError::Config(format!(
                "MEMBER_TTL must be between 1 and {} seconds",
                MAX_MEMBER_TTL_SECS
            )));
        }
        if self.per_delta_ms < 0 {
            return Err(CacheError::Config("PER_DELTA_MS must not be negative".into()));
        }
        if !(self.per_beta > 0.0) {
            return Err(CacheError::Config("PER_BETA must be positive".into()));
        }
        if self.command_timeout_ms == 0 {
            return Err(CacheError::Config("COMMAND_TIMEOUT_MS must be positive".into()));
        }
        if self.write_queue_capacity == 0 {
            return Err(CacheError::Config("WRITE_QUEUE_CAPACITY must be positive".into()));
        }
        if self.member_id_range < 1 {
            return Err(CacheError::Config("MEMBER_ID_RANGE must be positive".into()));
        }
        Ok(())
    }

    /// TTL applied to member entries.
    pub fn member_ttl(&self) -> Duration {
        Duration::from_secs(self.member_ttl)
    }

    /// Timeout applied to every node command.
    pub fn command_timeout(&self) -> Duration {
        Duration::from_millis(self.command_timeout_ms)
    }

    /// Early expiration tuning for node reads.
    pub fn per_params(&self) -> PerParams {
        PerParams::new(self.per_delta_ms, self.per_beta)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            nodes: vec![
                "127.0.0.1:6379".to_string(),
                "127.0.0.1:6380".to_string(),
                "127.0.0.1:6381".to_string(),
            ],
            backend: BackendKind::Redis,
            member_ttl: 60,
            per_delta_ms: 3_000,
            per_beta: 1.0,
            command_timeout_ms: 1_000,
            write_mode: WriteMode::Detached,
            write_queue_capacity: 1024,
            member_id_range: 100,
            server_port: 3000,
        }
    }
}

/// Reads and parses one variable; unset means `None`, unparsable is an error.
fn parse_var<T: FromStr>(name: &str) -> Result<Option<T>> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| CacheError::Config(format!("{} has an invalid value '{}'", name, raw))),
        Err(_) => Ok(None),
    }
}
