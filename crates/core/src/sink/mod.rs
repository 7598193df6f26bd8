//! Submission of assembled chains to a CT log.
//!
//! This module provides a `SubmissionSink` trait with two implementations:
//! - `LiveSink`: posts chains to the log's `add-chain` endpoint
//! - `DryRunSink`: simulates log latency without touching the network
//!
//! `create_sink` picks one from configuration at startup.

mod dry_run;
mod error;
mod live;
mod traits;
mod types;

pub use dry_run::DryRunSink;
pub use error::SubmissionError;
pub use live::LiveSink;
pub use traits::SubmissionSink;
pub use types::{AddChainRequest, AddChainResponse, SubmissionOutcome};

use std::sync::Arc;

use crate::config::{LogConfig, PipelineConfig};

/// Create the sink selected by the `dry_run` flag.
pub fn create_sink(
    log: &LogConfig,
    pipeline: &PipelineConfig,
) -> Result<Arc<dyn SubmissionSink>, SubmissionError> {
    if pipeline.dry_run {
        Ok(Arc::new(DryRunSink::new(pipeline.dry_run_delay())))
    } else {
        Ok(Arc::new(LiveSink::new(log)?))
    }
}
