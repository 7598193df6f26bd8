//! Types for the submission pipeline.

use thiserror::Error;

use super::progress::ProgressSnapshot;
use crate::config::ConfigError;
use crate::store::StoreError;

/// Errors that stop the pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The store failed while listing or assembling chains.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// A pipeline task panicked or was cancelled.
    #[error("{stage} task failed: {reason}")]
    TaskFailed { stage: &'static str, reason: String },

    /// The pipeline settings cannot be run.
    #[error("invalid pipeline config: {0}")]
    Config(#[from] ConfigError),

    /// The run was stopped from outside before the store was exhausted.
    #[error("run interrupted")]
    Interrupted,
}

impl PipelineError {
    pub(crate) fn task_failed(stage: &'static str, e: tokio::task::JoinError) -> Self {
        Self::TaskFailed {
            stage,
            reason: e.to_string(),
        }
    }
}

/// What the chain source read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SourceSummary {
    /// Non-empty pages emitted.
    pub pages: usize,
    /// Identities emitted across all pages.
    pub identities: usize,
    /// Offset the next page would have been requested at.
    pub next_offset: i64,
}

/// What the assembly loop did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AssemblySummary {
    pub batches: usize,
    pub identities: usize,
    /// Chains dropped for failing validation.
    pub skipped: usize,
    /// Chains handed to the workers.
    pub queued: usize,
}

/// Per-worker submission counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkerStats {
    pub attempted: u64,
    pub succeeded: u64,
    pub failed: u64,
}

impl std::ops::AddAssign for WorkerStats {
    fn add_assign(&mut self, other: Self) {
        self.attempted += other.attempted;
        self.succeeded += other.succeeded;
        self.failed += other.failed;
    }
}

/// Outcome of a completed run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub source: SourceSummary,
    pub assembly: AssemblySummary,
    pub submissions: WorkerStats,
    pub progress: ProgressSnapshot,
}
