//! Periodic progress reporting.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use tokio::task::JoinHandle;
use tracing::info;

use super::progress::{ProgressSnapshot, ProgressState};
use super::queue::QueueDepth;
use super::shutdown::Shutdown;

/// One progress report line.
#[derive(Debug, Clone, PartialEq)]
pub struct StatsSnapshot {
    pub at: DateTime<Utc>,
    /// Chains waiting in the batch channel (batches times page size).
    pub pending_chains: usize,
    /// Assembled chains waiting for a worker.
    pub pending_submissions: usize,
    pub progress: ProgressSnapshot,
    /// Successful submissions per second since the previous report.
    pub rate: f64,
}

impl fmt::Display for StatsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [pending chains: {}, pending submissions: {}, completed submissions: {} ({} new), submission rate: {:.2}/s, last submitted chain id: {}]",
            self.at.to_rfc2822(),
            self.pending_chains,
            self.pending_submissions,
            self.progress.submitted_count,
            self.progress.new_count,
            self.rate,
            self.progress.last_submitted_id,
        )
    }
}

/// Submission rate over the interval between two samples.
#[derive(Debug, Clone, Copy)]
pub struct RateTracker {
    last_count: u64,
    last_at: Instant,
}

impl RateTracker {
    pub fn new(count: u64, at: Instant) -> Self {
        Self {
            last_count: count,
            last_at: at,
        }
    }

    /// Rate since the previous call, then remember this sample.
    pub fn sample(&mut self, count: u64, at: Instant) -> f64 {
        let elapsed = at.saturating_duration_since(self.last_at).as_secs_f64();
        let delta = count.saturating_sub(self.last_count);
        self.last_count = count;
        self.last_at = at;

        if elapsed > 0.0 {
            delta as f64 / elapsed
        } else {
            0.0
        }
    }
}

/// Logs a [`StatsSnapshot`] every interval. Read-only.
pub struct StatsReporter {
    progress: Arc<ProgressState>,
    batches: QueueDepth,
    submissions: QueueDepth,
    page_size: usize,
    interval: Duration,
}

impl StatsReporter {
    pub fn new(
        progress: Arc<ProgressState>,
        batches: QueueDepth,
        submissions: QueueDepth,
        page_size: usize,
        interval: Duration,
    ) -> Self {
        Self {
            progress,
            batches,
            submissions,
            page_size,
            interval,
        }
    }

    /// Take a snapshot without touching the pipeline.
    pub fn snapshot(&self, rate: &mut RateTracker) -> StatsSnapshot {
        let progress = self.progress.snapshot();
        StatsSnapshot {
            at: Utc::now(),
            pending_chains: self.batches.len() * self.page_size,
            pending_submissions: self.submissions.len(),
            rate: rate.sample(progress.submitted_count, Instant::now()),
            progress,
        }
    }

    /// Report until `shutdown` fires.
    pub fn spawn(self, shutdown: Shutdown) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.interval);
            // The first tick completes immediately.
            ticker.tick().await;
            let mut rate = RateTracker::new(self.progress.submitted_count(), Instant::now());

            loop {
                tokio::select! {
                    _ = shutdown.triggered() => break,
                    _ = ticker.tick() => {
                        info!("{}", self.snapshot(&mut rate));
                    }
                }
            }
        })
    }
}
