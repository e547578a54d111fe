//! Bootstrap Module
//!
//! Wires configuration into nodes, the fan-out repository and the service.

use std::sync::Arc;

use tracing::info;

use crate::api::AppState;
use crate::backend::{KvBackend, MemoryBackend, RedisBackend};
use crate::cache::{NodeSet, NodeStore};
use crate::config::{BackendKind, Config};
use crate::error::Result;
use crate::random::{RandomSource, ThreadRandom};
use crate::repository::FanOutRepository;
use crate::service::{MemberService, SyntheticSource};
use crate::tasks::WriteWorker;

/// Everything the server needs to run and shut down.
pub struct Bootstrap {
    /// Shared handler state
    pub state: AppState,
    /// Background write worker, drained on shutdown
    pub writer: WriteWorker,
    /// In-memory nodes, empty unless the memory backend is configured
    pub memory_nodes: Vec<Arc<MemoryBackend>>,
}

/// Builds one node store per configured address and the layers above them.
///
/// Must be called inside a Tokio runtime. Redis nodes connect lazily.
pub fn bootstrap(config: &Config) -> Result<Bootstrap> {
    config.validate()?;

    let random: Arc<dyn RandomSource> = Arc::new(ThreadRandom);
    let mut memory_nodes = Vec::new();
    let mut stores = Vec::with_capacity(config.nodes.len());

    for (index, address) in config.nodes.iter().enumerate() {
        let backend: Arc<dyn KvBackend> = match config.backend {
            BackendKind::Redis => Arc::new(RedisBackend::open(address)?),
            BackendKind::Memory => {
                let node = Arc::new(MemoryBackend::new());
                memory_nodes.push(Arc::clone(&node));
                node
            }
        };
        info!(node = index, %address, backend = ?config.backend, "cache node configured");

        stores.push(NodeStore::new(
            index,
            backend,
            config.per_params(),
            Arc::clone(&random),
            config.command_timeout(),
        ));
    }

    let nodes = NodeSet::new(stores)?;
    let (repository, writer) = FanOutRepository::new(
        nodes.clone(),
        random,
        config.member_ttl(),
        config.write_mode,
        config.write_queue_capacity,
    );
    let service = MemberService::new(
        Arc::new(repository),
        Arc::new(SyntheticSource),
        config.member_id_range,
    );

    Ok(Bootstrap {
        state: AppState::new(Arc::new(service), nodes),
        writer,
        memory_nodes,
    })
}
