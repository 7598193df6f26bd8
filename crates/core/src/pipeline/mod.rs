//! Concurrent submission pipeline.
//!
//! ```text
//! ChainSource ──batches──▶ assembly loop ──chains──▶ WorkerPool ──▶ SubmissionSink
//!                    └────────── StatsReporter (read-only) ──────────┘
//! ```
//!
//! Every hand-off is a bounded queue, so a slow log pushes back all the way
//! to the store reads. `Orchestrator::run` owns the wiring and shutdown.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use ctfeeder_core::{create_sink, Orchestrator, SqliteChainStore};
//!
//! let store = Arc::new(SqliteChainStore::new(&config.database.path)?);
//! let sink = create_sink(&config.log, &config.pipeline)?;
//! let summary = Orchestrator::new(config.pipeline.clone(), store, sink)
//!     .run()
//!     .await?;
//! println!("submitted {}", summary.submissions.succeeded);
//! ```

mod pool;
mod progress;
pub mod queue;
mod runner;
mod shutdown;
mod source;
mod stats;
mod types;

pub use pool::WorkerPool;
pub use progress::{
    is_recent, ExitHook, ProgressRecorder, ProgressSnapshot, ProgressState,
    NEW_SUBMISSION_WINDOW_MS,
};
pub use queue::{QueueClosed, QueueDepth, QueueReceiver, QueueSender};
pub use runner::Orchestrator;
pub use shutdown::Shutdown;
pub use source::ChainSource;
pub use stats::{RateTracker, StatsReporter, StatsSnapshot};
pub use types::{AssemblySummary, PipelineError, RunSummary, SourceSummary, WorkerStats};
