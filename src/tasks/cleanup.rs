//! Expired Entry Purge Task
//!
//! Reclaims memory held by expired entries on in-memory nodes. Reads already
//! hide expired entries, so the sweep only affects memory use.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use crate::backend::MemoryBackend;

/// Spawns the periodic sweep over every in-memory node.
///
/// The returned handle is aborted on shutdown; the task never exits by itself.
pub fn spawn_purge_task(nodes: Vec<Arc<MemoryBackend>>, interval_secs: u64) -> JoinHandle<()> {
    let period = Duration::from_secs(interval_secs.max(1));

    tokio::spawn(async move {
        info!(nodes = nodes.len(), period_secs = period.as_secs(), "purge task started");

        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // the first tick completes immediately
        ticker.tick().await;

        loop {
            ticker.tick().await;

            let mut total = 0;
            for (index, node) in nodes.iter().enumerate() {
                let removed = node.purge_expired().await;
                if removed > 0 {
                    debug!(node = index, removed, "expired entries purged");
                }
                total += removed;
            }
            if total > 0 {
                info!(removed = total, "purge sweep finished");
            }
        }
    })
}
