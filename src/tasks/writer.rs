//! Background Write Queue
//!
//! Bounded queue of replicated writes, consumed by a worker that applies
//! each job to every node without making the submitter wait.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, error, info, warn};

use crate::repository::{Replicator, WriteJob};

// == Write Queue ==
/// Submission side of the write queue. Cheap to clone.
#[derive(Clone)]
pub struct WriteQueue {
    tx: mpsc::Sender<WriteJob>,
}

impl WriteQueue {
    /// Queues a job without waiting. Returns false if the job was dropped
    /// because the queue is full or the worker has stopped.
    pub fn submit(&self, job: WriteJob) -> bool {
        match self.tx.try_send(job) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(job)) => {
                warn!(members = job.len(), "write queue full");
                false
            }
            Err(mpsc::error::TrySendError::Closed(job)) => {
                warn!(members = job.len(), "write queue closed");
                false
            }
        }
    }
}

// == Write Worker ==
/// Handle on the running worker.
///
/// Dropping the handle acts like [`WriteWorker::drain`] without waiting:
/// intake closes at once, then queued jobs are still applied in the
/// background.
pub struct WriteWorker {
    shutdown: oneshot::Sender<()>,
    handle: JoinHandle<usize>,
}

impl WriteWorker {
    /// Stops intake, applies every queued job, waits for in-flight node
    /// writes, and returns how many jobs the worker processed in total.
    pub async fn drain(self) -> usize {
        // the worker may already be gone, in which case there is nothing to signal
        let _ = self.shutdown.send(());
        match self.handle.await {
            Ok(processed) => processed,
            Err(err) => {
                error!(error = %err, "write worker failed");
                0
            }
        }
    }
}

/// Spawns the worker consuming the write queue.
///
/// Each job is replicated in its own task so a slow node delays only the
/// jobs it is part of, not the intake of new ones.
///
/// # Arguments
/// * `replicator` - Applies a job to every node
/// * `capacity` - Maximum number of queued jobs
pub fn spawn_write_worker(replicator: Arc<Replicator>, capacity: usize) -> (WriteQueue, WriteWorker) {
    let (tx, mut rx) = mpsc::channel::<WriteJob>(capacity.max(1));
    let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();

    let handle = tokio::spawn(async move {
        info!(capacity, "write worker started");

        let mut in_flight = JoinSet::new();
        let mut processed = 0usize;

        loop {
            tokio::select! {
                job = rx.recv() => match job {
                    Some(job) => {
                        processed += 1;
                        let replicator = Arc::clone(&replicator);
                        in_flight.spawn(async move { replicator.replicate(job).await });
                    }
                    None => break,
                },
                _ = &mut shutdown_rx => {
                    rx.close();
                    while let Some(job) = rx.recv().await {
                        processed += 1;
                        let replicator = Arc::clone(&replicator);
                        in_flight.spawn(async move { replicator.replicate(job).await });
                    }
                    break;
                }
                Some(_) = in_flight.join_next(), if !in_flight.is_empty() => {}
            }
        }

        while in_flight.join_next().await.is_some() {}
        debug!(processed, "write queue drained");
        info!("write worker stopped");
        processed
    });

    (
        WriteQueue { tx },
        WriteWorker {
            shutdown: shutdown_tx,
            handle,
        },
    )
}
