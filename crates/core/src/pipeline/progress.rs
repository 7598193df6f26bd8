//! Shared submission progress.

use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::sync::Arc;

use tracing::info;

use super::shutdown::Shutdown;

/// Submissions whose log timestamp is at most this old count as new.
pub const NEW_SUBMISSION_WINDOW_MS: i64 = 60 * 60 * 1000;

/// Counters updated by the workers and read by the stats reporter.
#[derive(Debug, Default)]
pub struct ProgressState {
    last_submitted_id: AtomicI64,
    submitted_count: AtomicU64,
    new_count: AtomicU64,
}

/// Point-in-time copy of [`ProgressState`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProgressSnapshot {
    pub last_submitted_id: i64,
    pub submitted_count: u64,
    pub new_count: u64,
}

impl ProgressState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a successful submission.
    ///
    /// Workers finish out of order, so the last submitted ID only ever moves
    /// forward. Returns whether the submission counted as new.
    pub fn record_success(&self, sequence_id: i64, log_timestamp_ms: i64, now_ms: i64) -> bool {
        self.last_submitted_id.fetch_max(sequence_id, Ordering::SeqCst);
        self.submitted_count.fetch_add(1, Ordering::SeqCst);

        let is_new = is_recent(log_timestamp_ms, now_ms);
        if is_new {
            self.new_count.fetch_add(1, Ordering::SeqCst);
        }
        is_new
    }

    pub fn last_submitted_id(&self) -> i64 {
        self.last_submitted_id.load(Ordering::SeqCst)
    }

    pub fn submitted_count(&self) -> u64 {
        self.submitted_count.load(Ordering::SeqCst)
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            last_submitted_id: self.last_submitted_id(),
            submitted_count: self.submitted_count(),
            new_count: self.new_count.load(Ordering::SeqCst),
        }
    }
}

/// Whether a log timestamp falls within the last hour of `now_ms`.
pub fn is_recent(log_timestamp_ms: i64, now_ms: i64) -> bool {
    log_timestamp_ms >= now_ms.saturating_sub(NEW_SUBMISSION_WINDOW_MS)
}

/// Callback receiving the final progress when a run ends.
pub type ExitHook = Arc<dyn Fn(&ProgressSnapshot) + Send + Sync>;

/// Records the last submitted chain ID when dropped.
///
/// Held for the whole of a pipeline run so the record is written whether
/// the run returns normally, fails, is cancelled, or unwinds from a panic.
/// With a [`Shutdown`] attached, the pipeline is stopped before the record
/// is taken, so no new submission starts after it.
pub struct ProgressRecorder {
    progress: Arc<ProgressState>,
    hook: Option<ExitHook>,
    shutdown: Option<Shutdown>,
}

impl ProgressRecorder {
    pub fn new(progress: Arc<ProgressState>, hook: Option<ExitHook>) -> Self {
        Self {
            progress,
            hook,
            shutdown: None,
        }
    }

    /// Trigger `shutdown` when dropped.
    pub fn with_shutdown(mut self, shutdown: Shutdown) -> Self {
        self.shutdown = Some(shutdown);
        self
    }
}

impl Drop for ProgressRecorder {
    fn drop(&mut self) {
        if let Some(shutdown) = &self.shutdown {
            shutdown.trigger();
        }
        let snapshot = self.progress.snapshot();
        info!(
            last_submitted_id = snapshot.last_submitted_id,
            submitted = snapshot.submitted_count,
            "# [Last submitted chain ID: {}]",
            snapshot.last_submitted_id
        );
        if let Some(hook) = &self.hook {
            hook(&snapshot);
        }
    }
}
