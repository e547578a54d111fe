//! Fanout Cache - A replicated member cache
//!
//! Replicates every write to all cache nodes, serves each read from one node
//! picked at random, and expires entries probabilistically ahead of their TTL
//! so hot keys are refreshed without a stampede.

pub mod api;
pub mod backend;
pub mod bootstrap;
pub mod cache;
pub mod codec;
pub mod config;
pub mod domain;
pub mod error;
pub mod models;
pub mod random;
pub mod repository;
pub mod service;
pub mod tasks;

pub use api::AppState;
pub use bootstrap::{bootstrap, Bootstrap};
pub use config::Config;
pub use domain::Member;
pub use error::{CacheError, Result};
