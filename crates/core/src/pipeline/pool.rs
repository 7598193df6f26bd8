//! Fixed-size pool of submission workers.

use std::sync::Arc;

use chrono::Utc;
use tokio::task::JoinHandle;
use tracing::{debug, trace, warn};

use super::progress::ProgressState;
use super::queue::QueueReceiver;
use super::shutdown::Shutdown;
use super::types::{PipelineError, WorkerStats};
use crate::chain::AssembledChain;
use crate::sink::SubmissionSink;

/// Workers draining the submission queue through a sink.
pub struct WorkerPool {
    handles: Vec<JoinHandle<WorkerStats>>,
}

impl WorkerPool {
    /// Spawn `workers` tasks sharing `queue`.
    ///
    /// The pool keeps no queue handle of its own: once every worker has
    /// returned the queue's consumer side is gone.
    pub fn spawn(
        workers: usize,
        queue: QueueReceiver<AssembledChain>,
        sink: Arc<dyn SubmissionSink>,
        progress: Arc<ProgressState>,
        shutdown: Shutdown,
    ) -> Self {
        let handles = (0..workers)
            .map(|worker_id| {
                tokio::spawn(worker_loop(
                    worker_id,
                    queue.clone(),
                    Arc::clone(&sink),
                    Arc::clone(&progress),
                    shutdown.clone(),
                ))
            })
            .collect();

        Self { handles }
    }

    pub fn size(&self) -> usize {
        self.handles.len()
    }

    /// Wait for every worker to return and sum their counts.
    pub async fn join(self) -> Result<WorkerStats, PipelineError> {
        let mut total = WorkerStats::default();
        let mut failure = None;

        for handle in self.handles {
            match handle.await {
                Ok(stats) => total += stats,
                Err(e) if failure.is_none() => {
                    failure = Some(PipelineError::task_failed("worker", e));
                }
                Err(e) => warn!("Another worker task failed: {}", e),
            }
        }

        match failure {
            Some(e) => Err(e),
            None => Ok(total),
        }
    }
}

/// Submit chains until the queue is closed and drained or shutdown fires.
///
/// Failed submissions are logged and dropped; only successes touch the
/// shared progress.
async fn worker_loop(
    worker_id: usize,
    queue: QueueReceiver<AssembledChain>,
    sink: Arc<dyn SubmissionSink>,
    progress: Arc<ProgressState>,
    shutdown: Shutdown,
) -> WorkerStats {
    trace!("Worker {worker_id} started");
    let mut stats = WorkerStats::default();

    loop {
        let chain = tokio::select! {
            biased;
            _ = shutdown.triggered() => {
                debug!("Worker {worker_id} received shutdown signal");
                break;
            }
            chain = queue.pop() => match chain {
                Some(chain) => chain,
                None => break,
            },
        };

        stats.attempted += 1;
        match sink.submit(&chain).await {
            Ok(outcome) => {
                stats.succeeded += 1;
                progress.record_success(
                    chain.sequence_id(),
                    outcome.timestamp,
                    Utc::now().timestamp_millis(),
                );
            }
            Err(e) => {
                stats.failed += 1;
                warn!(
                    worker = worker_id,
                    chain_id = chain.sequence_id(),
                    chain_fp = %chain.identity.fingerprint,
                    "Submission failed, dropping chain: {}",
                    e
                );
            }
        }
    }

    trace!("Worker {worker_id} stopped");
    stats
}
