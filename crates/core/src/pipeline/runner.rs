//! Pipeline orchestrator implementation.
//!
//! Wires the stages together:
//! - Source: blocking thread, one store page at a time
//! - Assembly: blocking thread, one chain at a time in page order
//! - Submission: `workers` async tasks sharing one queue
//! - Stats: one async task, read-only

use std::sync::Arc;

use tracing::{debug, error, info};

use super::pool::WorkerPool;
use super::progress::{ExitHook, ProgressRecorder, ProgressState};
use super::queue::{self, QueueReceiver, QueueSender};
use super::shutdown::Shutdown;
use super::source::ChainSource;
use super::stats::StatsReporter;
use super::types::{AssemblySummary, PipelineError, RunSummary};
use crate::chain::{AssembleError, AssembledChain, ChainAssembler, ChainIdentity};
use crate::config::{validate_pipeline, PipelineConfig};
use crate::sink::SubmissionSink;
use crate::store::{ChainStore, StoreError};

/// Runs one pass of the submission pipeline over the store.
pub struct Orchestrator {
    config: PipelineConfig,
    store: Arc<dyn ChainStore>,
    sink: Arc<dyn SubmissionSink>,
    progress: Arc<ProgressState>,
    exit_hook: Option<ExitHook>,
    shutdown: Shutdown,
}

impl Orchestrator {
    /// Create a new orchestrator.
    pub fn new(
        config: PipelineConfig,
        store: Arc<dyn ChainStore>,
        sink: Arc<dyn SubmissionSink>,
    ) -> Self {
        Self {
            config,
            store,
            sink,
            progress: Arc::new(ProgressState::new()),
            exit_hook: None,
            shutdown: Shutdown::new(),
        }
    }

    /// Set a callback receiving the final progress, on success and failure alike.
    pub fn with_exit_hook(mut self, hook: ExitHook) -> Self {
        self.exit_hook = Some(hook);
        self
    }

    /// Shared progress counters of this orchestrator.
    pub fn progress(&self) -> Arc<ProgressState> {
        Arc::clone(&self.progress)
    }

    /// Handle that stops a running pipeline.
    ///
    /// After `trigger()`, no new chain is read, assembled or submitted. Keep
    /// awaiting [`run`](Self::run): it returns [`PipelineError::Interrupted`]
    /// once in-flight submissions have finished. A triggered orchestrator
    /// stays stopped.
    pub fn shutdown_handle(&self) -> Shutdown {
        self.shutdown.clone()
    }

    /// Run until the store is exhausted and every queued chain has been
    /// attempted, or until the first fatal error.
    ///
    /// Invalid pipeline settings fail before any stage starts. The last
    /// submitted chain ID is recorded on every exit path. Dropping the
    /// returned future stops the pipeline.
    pub async fn run(&self) -> Result<RunSummary, PipelineError> {
        let shutdown = self.shutdown.clone();
        let _recorder = ProgressRecorder::new(self.progress(), self.exit_hook.clone())
            .with_shutdown(shutdown.clone());
        validate_pipeline(&self.config)?;

        info!(
            sink = self.sink.name(),
            workers = self.config.workers,
            offset = self.config.initial_chain_id,
            "Starting chain submission"
        );

        let (batch_tx, batch_rx) = queue::bounded(self.config.batch_buffer);
        let (chain_tx, chain_rx) = queue::bounded(self.config.submission_buffer);

        let stats = StatsReporter::new(
            self.progress(),
            batch_rx.depth(),
            chain_rx.depth(),
            self.config.page_size,
            self.config.stats_interval(),
        )
        .spawn(shutdown.clone());

        let pool = WorkerPool::spawn(
            self.config.workers,
            chain_rx,
            Arc::clone(&self.sink),
            self.progress(),
            shutdown.clone(),
        );

        let source = ChainSource::new(
            Arc::clone(&self.store),
            self.config.page_size,
            self.config.initial_chain_id,
        );
        let source_handle = {
            let shutdown = shutdown.clone();
            tokio::task::spawn_blocking(move || source.run(batch_tx, &shutdown))
        };

        let assembler = ChainAssembler::new(Arc::clone(&self.store));
        let assembly_handle = {
            let shutdown = shutdown.clone();
            tokio::task::spawn_blocking(move || {
                assembly_loop(&assembler, batch_rx, chain_tx, &shutdown)
            })
        };

        let assembly = flatten(assembly_handle.await, "assembly");
        let source = flatten(source_handle.await, "source");
        if assembly.is_err() || source.is_err() {
            shutdown.trigger();
        }

        let submissions = pool.join().await;
        // Stages only trigger on errors, so a trigger seen here on a clean
        // run came from the shutdown handle.
        let interrupted = shutdown.is_triggered();
        shutdown.trigger();
        if let Err(e) = stats.await {
            debug!("Stats reporter ended abnormally: {}", e);
        }

        let summary = RunSummary {
            source: source?,
            assembly: assembly?,
            submissions: submissions?,
            progress: self.progress.snapshot(),
        };

        if interrupted {
            info!(
                chains = summary.source.identities,
                submitted = summary.submissions.succeeded,
                "Chain submission interrupted"
            );
            return Err(PipelineError::Interrupted);
        }

        info!(
            chains = summary.source.identities,
            skipped = summary.assembly.skipped,
            submitted = summary.submissions.succeeded,
            failed = summary.submissions.failed,
            "Chain submission finished"
        );
        Ok(summary)
    }
}

fn flatten<T>(
    joined: Result<Result<T, StoreError>, tokio::task::JoinError>,
    stage: &'static str,
) -> Result<T, PipelineError> {
    match joined {
        Ok(result) => result.map_err(PipelineError::from),
        Err(e) => {
            error!("{} task failed: {}", stage, e);
            Err(PipelineError::task_failed(stage, e))
        }
    }
}

/// Assemble every listed chain and hand it to the workers.
///
/// Returns when the batch channel is exhausted, the workers are gone, or
/// shutdown fires. Dropping `chains` on return closes the submission queue.
fn assembly_loop(
    assembler: &ChainAssembler,
    batches: QueueReceiver<Vec<ChainIdentity>>,
    chains: QueueSender<AssembledChain>,
    shutdown: &Shutdown,
) -> Result<AssemblySummary, StoreError> {
    let mut summary = AssemblySummary::default();

    while let Some(batch) = batches.blocking_pop() {
        summary.batches += 1;

        for identity in batch {
            if shutdown.is_triggered() {
                debug!("Assembly loop received shutdown signal");
                return Ok(summary);
            }
            summary.identities += 1;

            let sequence_id = identity.sequence_id;
            let chain = match assembler.assemble(identity) {
                Ok(chain) => chain,
                Err(AssembleError::Validation(e)) => {
                    debug!(chain_id = sequence_id, "Skipping chain: {}", e);
                    summary.skipped += 1;
                    continue;
                }
                Err(AssembleError::Store(e)) => {
                    error!(chain_id = sequence_id, "Failed to assemble chain: {}", e);
                    shutdown.trigger();
                    return Err(e);
                }
            };

            if chains.blocking_push(chain).is_err() {
                debug!("Submission workers gone, assembly loop stopping");
                return Ok(summary);
            }
            summary.queued += 1;
        }
    }

    Ok(summary)
}
