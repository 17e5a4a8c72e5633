//! HTTP fetcher implementation
//!
//! This module performs one logical fetch of a URL:
//! - Waiting on the shared rate limiter before every attempt
//! - Applying a fixed timeout to each attempt
//! - Retrying failed attempts with unjittered exponential backoff
//!
//! Every failure class (non-2xx status, timeout, transport error) is retried
//! the same way. Once the attempt budget is spent the caller receives a
//! [`FetchResult::Failed`] value; no error escapes the fetch.

use crate::config::validation::{
    timeout_duration, validate_max_retries, validate_timeout_seconds,
};
use crate::config::{ScraperConfig, UserAgentConfig};
use crate::pipeline::rate_limiter::RateLimiter;
use crate::ConfigError;
use reqwest::Client;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Retry and timeout settings for a single URL
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchPolicy {
    timeout: Duration,
    max_retries: u32,
    backoff_unit: Duration,
}

impl FetchPolicy {
    /// Creates a policy
    ///
    /// # Arguments
    ///
    /// * `timeout` - Limit for each attempt; must be non-zero
    /// * `max_retries` - Total number of attempts; must be at least 1
    /// * `backoff_unit` - Sleep after attempt `n` is `2^n * backoff_unit`
    pub fn new(
        timeout: Duration,
        max_retries: u32,
        backoff_unit: Duration,
    ) -> Result<Self, ConfigError> {
        validate_timeout_seconds(timeout.as_secs_f64())?;
        validate_max_retries(max_retries)?;

        Ok(Self {
            timeout,
            max_retries,
            backoff_unit,
        })
    }

    /// Builds the policy from the `[scraper]` configuration section
    pub fn from_config(config: &ScraperConfig) -> Result<Self, ConfigError> {
        Self::new(
            timeout_duration(config.timeout_seconds)?,
            config.max_retries,
            config.backoff_unit(),
        )
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Sleep inserted after the 0-based `attempt`
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
        self.backoff_unit.saturating_mul(factor)
    }

    /// Total sleep for a URL that fails every attempt
    pub fn total_backoff(&self) -> Duration {
        (0..self.max_retries.saturating_sub(1))
            .map(|attempt| self.backoff_for(attempt))
            .fold(Duration::ZERO, Duration::saturating_add)
    }
}

impl Default for FetchPolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            max_retries: 3,
            backoff_unit: Duration::from_secs(1),
        }
    }
}

/// Why a single attempt did not produce a page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptFailure {
    /// The server answered with a non-2xx status
    Status(u16),

    /// The attempt exceeded the policy timeout
    Timeout,

    /// Connection, TLS, or body read error
    Transport(String),
}

impl fmt::Display for AttemptFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Status(code) => write!(f, "HTTP status {}", code),
            Self::Timeout => write!(f, "request timeout"),
            Self::Transport(message) => write!(f, "transport error: {}", message),
        }
    }
}

/// Result of one attempt
#[derive(Debug)]
pub enum AttemptOutcome {
    /// 2xx response with its body
    Success { status_code: u16, body: String },

    /// Failed attempt that may be retried if budget remains
    Retryable(AttemptFailure),
}

/// Terminal result of a fetch operation
#[derive(Debug)]
pub enum FetchResult {
    /// A 2xx response was received
    Success {
        /// Page body content
        body: String,
        /// HTTP status code
        status_code: u16,
        /// Attempts made, including the successful one
        attempts: u32,
        /// Backoff slept before the successful attempt
        backoff: Duration,
    },

    /// Every attempt failed
    Failed {
        /// Failure of the final attempt
        last_failure: AttemptFailure,
        /// Attempts made (always the policy's `max_retries`)
        attempts: u32,
        /// Total backoff slept between attempts
        backoff: Duration,
    },
}

impl FetchResult {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn attempts(&self) -> u32 {
        match self {
            Self::Success { attempts, .. } | Self::Failed { attempts, .. } => *attempts,
        }
    }

    pub fn backoff(&self) -> Duration {
        match self {
            Self::Success { backoff, .. } | Self::Failed { backoff, .. } => *backoff,
        }
    }
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `user_agent` - The user agent configuration
/// * `accept_invalid_certs` - Skip TLS certificate verification
pub fn build_http_client(
    user_agent: &UserAgentConfig,
    accept_invalid_certs: bool,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent.header_value())
        .connect_timeout(Duration::from_secs(10))
        .danger_accept_invalid_certs(accept_invalid_certs)
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches single URLs under a shared rate limiter and retry policy
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    policy: FetchPolicy,
    limiter: Arc<RateLimiter>,
}

impl Fetcher {
    pub fn new(client: Client, policy: FetchPolicy, limiter: Arc<RateLimiter>) -> Self {
        Self {
            client,
            policy,
            limiter,
        }
    }

    /// Fetches a URL, retrying up to the policy's attempt budget
    ///
    /// # Request Flow
    ///
    /// For each attempt `0..max_retries`:
    /// 1. Wait for the rate limiter
    /// 2. Send a GET request bounded by the policy timeout
    ///    - 2xx → return the body immediately
    ///    - anything else → retryable failure
    /// 3. If attempts remain, sleep `2^attempt` backoff units
    pub async fn fetch(&self, url: &str) -> FetchResult {
        let max_retries = self.policy.max_retries;
        let mut backoff = Duration::ZERO;
        let mut last_failure = AttemptFailure::Transport("no attempt made".to_string());

        for attempt in 0..max_retries {
            self.limiter.acquire().await;

            tracing::debug!(url = %url, attempt = attempt + 1, max_retries, "Fetching");

            match self.attempt(url).await {
                AttemptOutcome::Success { status_code, body } => {
                    tracing::info!(url = %url, status_code, attempts = attempt + 1, "Fetched");
                    return FetchResult::Success {
                        body,
                        status_code,
                        attempts: attempt + 1,
                        backoff,
                    };
                }
                AttemptOutcome::Retryable(failure) => {
                    tracing::warn!(
                        url = %url,
                        attempt = attempt + 1,
                        max_retries,
                        "Attempt failed: {}",
                        failure
                    );
                    last_failure = failure;
                }
            }

            if attempt + 1 < max_retries {
                let delay = self.policy.backoff_for(attempt);
                tokio::time::sleep(delay).await;
                backoff += delay;
            }
        }

        tracing::error!(
            url = %url,
            "Failed after {} attempts: {}",
            max_retries,
            last_failure
        );

        FetchResult::Failed {
            last_failure,
            attempts: max_retries,
            backoff,
        }
    }

    /// Performs one request bounded by the policy timeout
    async fn attempt(&self, url: &str) -> AttemptOutcome {
        match tokio::time::timeout(self.policy.timeout, self.send(url)).await {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(e)) => AttemptOutcome::Retryable(classify_error(&e)),
            Err(_) => AttemptOutcome::Retryable(AttemptFailure::Timeout),
        }
    }

    async fn send(&self, url: &str) -> Result<AttemptOutcome, reqwest::Error> {
        let response = self.client.get(url).send().await?;
        let status = response.status();

        if !status.is_success() {
            return Ok(AttemptOutcome::Retryable(AttemptFailure::Status(
                status.as_u16(),
            )));
        }

        let body = response.text().await?;
        Ok(AttemptOutcome::Success {
            status_code: status.as_u16(),
            body,
        })
    }
}

/// Maps a reqwest error onto an attempt failure
fn classify_error(error: &reqwest::Error) -> AttemptFailure {
    if error.is_timeout() {
        AttemptFailure::Timeout
    } else {
        AttemptFailure::Transport(error.to_string())
    }
}
