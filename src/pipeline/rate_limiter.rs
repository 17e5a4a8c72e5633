//! Global request pacing
//!
//! One [`RateLimiter`] is shared by every pipeline of a batch. Each call to
//! [`RateLimiter::acquire`] grants permission to issue exactly one request,
//! and consecutive grants are at least `1 / requests_per_second` apart.

use crate::config::validation::interval_for_rate;
use crate::ConfigError;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{sleep_until, Instant};

/// Serializes request permission to at most N grants per second
#[derive(Debug)]
pub struct RateLimiter {
    /// Minimum spacing between two grants
    min_interval: Duration,

    /// Time of the most recent grant. The lock is held across the wait so
    /// that checking and recording a grant is a single step.
    last_issue: Mutex<Option<Instant>>,
}

impl RateLimiter {
    /// Creates a limiter allowing `requests_per_second` grants per second
    ///
    /// # Returns
    ///
    /// * `Err(ConfigError::Validation)` - The rate is not positive and finite,
    ///   or so small that its spacing does not fit in a `Duration`
    pub fn new(requests_per_second: f64) -> Result<Self, ConfigError> {
        Ok(Self {
            min_interval: interval_for_rate(requests_per_second)?,
            last_issue: Mutex::new(None),
        })
    }

    /// Creates an idle limiter with the same spacing
    pub(crate) fn fresh(&self) -> Self {
        Self {
            min_interval: self.min_interval,
            last_issue: Mutex::new(None),
        }
    }

    /// Minimum spacing between two grants
    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Waits until the next request may be issued, then records the grant
    ///
    /// Only the calling task is suspended. Waiters are served in FIFO order.
    pub async fn acquire(&self) {
        let mut last_issue = self.last_issue.lock().await;

        if let Some(last) = *last_issue {
            let ready_at = last + self.min_interval;
            if Instant::now() < ready_at {
                tracing::trace!(
                    wait_ms = %(ready_at - Instant::now()).as_millis(),
                    "Rate limiting request"
                );
                sleep_until(ready_at).await;
            }
        }

        // Record the actual resume time so wake-up latency does not accumulate
        *last_issue = Some(Instant::now());
    }
}
