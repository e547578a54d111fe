//! Background Tasks Module
//!
//! Contains the tasks that run alongside request handling.
//!
//! # Tasks
//! - Write worker: applies queued replicated writes to every node
//! - Purge: drops expired entries from in-memory nodes at configured intervals

mod cleanup;
mod writer;

pub use cleanup::spawn_purge_task;
pub use writer::{spawn_write_worker, WriteQueue, WriteWorker};
