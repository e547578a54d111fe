//! Fan-Out Repository
//!
//! Replicates every write to all nodes and serves each read from one node
//! picked at random per call.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::task::JoinSet;
use tracing::{debug, error, info};

use super::MemberCacheRepository;
use crate::cache::NodeSet;
use crate::config::WriteMode;
use crate::domain::{member_key, Member};
use crate::error::CacheError;
use crate::random::RandomSource;
use crate::tasks::{spawn_write_worker, WriteQueue, WriteWorker};

// == Write Job ==
/// One replicated write.
#[derive(Debug, Clone, PartialEq)]
pub enum WriteJob {
    One(Member),
    Bulk(Vec<Member>),
}

impl WriteJob {
    /// Number of members carried by the job.
    pub fn len(&self) -> usize {
        match self {
            WriteJob::One(_) => 1,
            WriteJob::Bulk(members) => members.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// == Replicator ==
/// Applies write jobs to every node, one task per node.
pub struct Replicator {
    nodes: NodeSet,
    ttl: Duration,
}

impl Replicator {
    pub fn new(nodes: NodeSet, ttl: Duration) -> Self {
        Self { nodes, ttl }
    }

    /// Writes the job to every node and waits for all of them.
    ///
    /// A failing or slow node never affects the writes to the others.
    /// Returns how many nodes accepted the write.
    pub async fn replicate(&self, job: WriteJob) -> usize {
        if job.is_empty() {
            return self.nodes.len();
        }

        let job = Arc::new(job);
        let mut writes = JoinSet::new();

        for node in self.nodes.iter() {
            let node = Arc::clone(node);
            let job = Arc::clone(&job);
            let ttl = self.ttl;

            writes.spawn(async move {
                let result = match job.as_ref() {
                    WriteJob::One(member) => node.set(&member.cache_key(), member, ttl).await,
                    WriteJob::Bulk(members) => {
                        let pairs: Vec<(String, Member)> = members
                            .iter()
                            .map(|member| (member.cache_key(), member.clone()))
                            .collect();
                        node.set_bulk(&pairs, ttl).await
                    }
                };
                (node.index(), result)
            });
        }

        let mut accepted = 0;
        while let Some(joined) = writes.join_next().await {
            match joined {
                Ok((index, Ok(()))) => {
                    debug!(node = index, members = job.len(), "member cache written");
                    accepted += 1;
                }
                Ok((index, Err(err))) => {
                    error!(node = index, members = job.len(), error = %err, "member cache write failed");
                }
                Err(err) => {
                    error!(error = %err, "member cache write task aborted");
                }
            }
        }
        accepted
    }
}

// == Fan-Out Repository ==
/// Replicated member cache over a fixed node set.
pub struct FanOutRepository {
    nodes: NodeSet,
    random: Arc<dyn RandomSource>,
    replicator: Arc<Replicator>,
    queue: WriteQueue,
    mode: WriteMode,
}

impl FanOutRepository {
    /// Creates the repository and starts its background write worker.
    ///
    /// Must be called inside a Tokio runtime. The returned worker should be
    /// drained on shutdown so queued writes are not lost.
    pub fn new(
        nodes: NodeSet,
        random: Arc<dyn RandomSource>,
        ttl: Duration,
        mode: WriteMode,
        queue_capacity: usize,
    ) -> (Self, WriteWorker) {
        let replicator = Arc::new(Replicator::new(nodes.clone(), ttl));
        let (queue, worker) = spawn_write_worker(Arc::clone(&replicator), queue_capacity);

        info!(
            nodes = nodes.len(),
            ttl_secs = ttl.as_secs(),
            ?mode,
            "fan-out repository ready"
        );

        let repository = Self {
            nodes,
            random,
            replicator,
            queue,
            mode,
        };
        (repository, worker)
    }

    pub fn nodes(&self) -> &NodeSet {
        &self.nodes
    }

    async fn dispatch(&self, job: WriteJob) {
        match self.mode {
            WriteMode::Detached => self.schedule(job),
            WriteMode::Acknowledged => {
                self.replicator.replicate(job).await;
            }
        }
    }

    fn pick_node(&self) -> usize {
        let index = self.random.index(self.nodes.len());
        debug!(node = index, "current node index");
        index
    }
}

/// Substitutes the degraded placeholder for a failed node read.
fn degrade(id: i64, node: usize, err: &CacheError) -> Option<Member> {
    error!(node, id, error = %err, "member cache read failed");
    Member::degraded(id, err)
}

#[async_trait]
impl MemberCacheRepository for FanOutRepository {
    async fn write_one(&self, member: Member) {
        self.dispatch(WriteJob::One(member)).await;
    }

    async fn write_bulk(&self, members: Vec<Member>) {
        if members.is_empty() {
            return;
        }
        self.dispatch(WriteJob::Bulk(members)).await;
    }

    fn schedule(&self, job: WriteJob) {
        if job.is_empty() {
            return;
        }
        // a rejected job is already logged by the queue
        self.queue.submit(job);
    }

    async fn read_one(&self, id: i64) -> Option<Member> {
        let index = self.pick_node();
        let node = self.nodes.get(index)?;

        match node.get::<Member>(&member_key(id)).await {
            Ok(found) => found,
            Err(err) => degrade(id, index, &err),
        }
    }

    async fn read_bulk(&self, ids: &[i64]) -> Vec<Option<Member>> {
        if ids.is_empty() {
            return Vec::new();
        }

        let index = self.pick_node();
        let Some(node) = self.nodes.get(index) else {
            return vec![None; ids.len()];
        };

        let keys: Vec<String> = ids.iter().map(|id| member_key(*id)).collect();
        match node.get_bulk::<Member>(&keys).await {
            Ok(found) => found,
            Err(err) => ids.iter().map(|id| degrade(*id, index, &err)).collect(),
        }
    }
}
