//! Run-level statistics
//!
//! A [`RunStatistics`] value is created when a batch starts and is only ever
//! mutated by the coordinator's single aggregation loop.

use crate::state::RunStatus;
use serde::Serialize;
use std::time::Duration;

/// Batch statistics summary
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunStatistics {
    /// Number of URLs submitted
    pub total_items: usize,

    /// Number of records extracted
    pub successful_items: usize,

    /// URLs that failed to fetch or extract
    pub failed_items: usize,

    /// Wall time of the batch in seconds
    pub total_time: f64,

    /// Successful items per second of wall time
    pub items_per_second: f64,

    pub status: RunStatus,
}

impl RunStatistics {
    /// Creates empty statistics in the `Pending` state
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the batch as running with `total` items
    pub fn start(&mut self, total: usize) {
        self.total_items = total;
        self.transition(RunStatus::Running);
    }

    /// Records one extracted record
    pub fn record_success(&mut self) {
        self.successful_items += 1;
    }

    /// Records one failed item
    pub fn record_failure(&mut self) {
        self.failed_items += 1;
    }

    /// Closes the batch as `Completed`
    pub fn finish(&mut self, elapsed: Duration) {
        self.close(elapsed, RunStatus::Completed);
    }

    /// Closes the batch as `Failed`
    pub fn abort(&mut self, elapsed: Duration) {
        self.close(elapsed, RunStatus::Failed);
    }

    fn close(&mut self, elapsed: Duration, status: RunStatus) {
        // Items that never resolved count as failures
        self.failed_items = self.total_items.saturating_sub(self.successful_items);
        self.total_time = elapsed.as_secs_f64();
        self.items_per_second = if self.total_time > 0.0 {
            self.successful_items as f64 / self.total_time
        } else {
            0.0
        };
        self.transition(status);
    }

    fn transition(&mut self, next: RunStatus) {
        if !self.status.can_transition_to(next) {
            tracing::warn!("Unexpected run status transition: {} -> {}", self.status, next);
        }
        self.status = next;
    }

    /// Returns the success rate as a percentage
    pub fn success_rate(&self) -> f64 {
        if self.total_items == 0 {
            return 0.0;
        }
        (self.successful_items as f64 / self.total_items as f64) * 100.0
    }
}
