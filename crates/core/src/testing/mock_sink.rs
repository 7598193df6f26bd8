//! Mock submission sink for testing.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;

use crate::chain::AssembledChain;
use crate::sink::{SubmissionError, SubmissionOutcome, SubmissionSink};

type DelayFn = Arc<dyn Fn(i64) -> Duration + Send + Sync>;

/// Mock implementation of the SubmissionSink trait.
///
/// Provides controllable behavior for testing:
/// - Record every attempted and completed submission
/// - Fail chosen chains with a protocol error
/// - Per-chain delays to force out-of-order completion
/// - Fixed log timestamps to exercise the "new" classification
#[derive(Default)]
pub struct MockSink {
    attempted: Mutex<Vec<i64>>,
    completed: Mutex<Vec<i64>>,
    submitted_certs: Mutex<Vec<Vec<Vec<u8>>>>,
    failing: Mutex<HashSet<i64>>,
    delay_fn: Option<DelayFn>,
    timestamp: Option<i64>,
}

impl MockSink {
    /// Create a sink that accepts everything immediately.
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay each submission by `f(sequence_id)`.
    pub fn with_delay_fn(mut self, f: impl Fn(i64) -> Duration + Send + Sync + 'static) -> Self {
        self.delay_fn = Some(Arc::new(f));
        self
    }

    /// Report this log timestamp instead of the current time.
    pub fn with_timestamp(mut self, timestamp_ms: i64) -> Self {
        self.timestamp = Some(timestamp_ms);
        self
    }

    /// Answer submissions of this chain with HTTP 400.
    pub fn fail_chain(&self, sequence_id: i64) {
        self.failing.lock().unwrap().insert(sequence_id);
    }

    /// Sequence IDs of every submission attempt, in start order.
    pub fn attempted_ids(&self) -> Vec<i64> {
        self.attempted.lock().unwrap().clone()
    }

    /// Sequence IDs of successful submissions, in completion order.
    pub fn completion_order(&self) -> Vec<i64> {
        self.completed.lock().unwrap().clone()
    }

    /// Certificates of every successful submission, in completion order.
    pub fn submitted_certs(&self) -> Vec<Vec<Vec<u8>>> {
        self.submitted_certs.lock().unwrap().clone()
    }

    /// Number of successful submissions.
    pub fn submission_count(&self) -> usize {
        self.completed.lock().unwrap().len()
    }
}

#[async_trait]
impl SubmissionSink for MockSink {
    fn name(&self) -> &str {
        "mock"
    }

    async fn submit(&self, chain: &AssembledChain) -> Result<SubmissionOutcome, SubmissionError> {
        let id = chain.sequence_id();
        self.attempted.lock().unwrap().push(id);

        if let Some(delay_fn) = &self.delay_fn {
            tokio::time::sleep(delay_fn(id)).await;
        }

        if self.failing.lock().unwrap().contains(&id) {
            return Err(SubmissionError::protocol(400, "rejected by mock log"));
        }

        self.completed.lock().unwrap().push(id);
        self.submitted_certs.lock().unwrap().push(chain.certs.clone());
        Ok(SubmissionOutcome {
            timestamp: self
                .timestamp
                .unwrap_or_else(|| Utc::now().timestamp_millis()),
        })
    }
}
