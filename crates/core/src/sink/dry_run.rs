//! Sink that simulates a log without network access.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;

use super::{SubmissionError, SubmissionOutcome, SubmissionSink};
use crate::chain::AssembledChain;

/// Sleeps for a fixed delay then reports success, timestamped now.
///
/// Used for load testing the pipeline.
#[derive(Debug, Clone)]
pub struct DryRunSink {
    delay: Duration,
}

impl DryRunSink {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl SubmissionSink for DryRunSink {
    fn name(&self) -> &str {
        "dry-run"
    }

    async fn submit(&self, _chain: &AssembledChain) -> Result<SubmissionOutcome, SubmissionError> {
        tokio::time::sleep(self.delay).await;
        Ok(SubmissionOutcome {
            timestamp: Utc::now().timestamp_millis(),
        })
    }
}
