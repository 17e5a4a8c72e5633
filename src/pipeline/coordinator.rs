//! Batch coordinator - fans out one fetch/extract pipeline per URL
//!
//! This module contains the batch orchestration logic:
//! - Creating one rate limiter per batch, shared by every pipeline
//! - Spawning a pipeline task per URL
//! - Folding each pipeline's tagged result into run statistics
//!
//! A failing URL never cancels its siblings. Dropping the future returned by
//! [`Coordinator::run`] aborts every in-flight pipeline along with its
//! pending sleeps and timeouts.

use crate::config::Config;
use crate::extract::{ExtractError, Extractor};
use crate::output::RunStatistics;
use crate::pipeline::fetcher::{build_http_client, AttemptFailure, FetchPolicy, FetchResult, Fetcher};
use crate::pipeline::rate_limiter::RateLimiter;
use crate::ConfigError;
use reqwest::Client;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tokio::time::Instant;

/// Records and statistics of one finished batch
#[derive(Debug)]
pub struct BatchOutcome<R> {
    /// Extracted records in completion order
    pub records: Vec<R>,

    /// Final statistics snapshot
    pub statistics: RunStatistics,
}

/// Why a single pipeline produced no record
#[derive(Debug)]
pub enum PipelineFailure {
    /// The URL exhausted its attempts
    Fetch {
        last_failure: AttemptFailure,
        attempts: u32,
    },

    /// The page was fetched but could not be turned into a record
    Extract(ExtractError),
}

impl fmt::Display for PipelineFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fetch {
                last_failure,
                attempts,
            } => write!(f, "fetch failed after {} attempts: {}", attempts, last_failure),
            Self::Extract(e) => write!(f, "extraction failed: {}", e),
        }
    }
}

/// Main batch coordinator structure
pub struct Coordinator<E: Extractor> {
    client: Client,
    policy: FetchPolicy,
    /// Template for the limiter each batch starts with
    limiter: RateLimiter,
    extractor: Arc<E>,
}

impl<E: Extractor> Coordinator<E> {
    /// Creates a coordinator from explicit parts
    ///
    /// # Arguments
    ///
    /// * `client` - HTTP client shared by all pipelines
    /// * `policy` - Per-URL retry and timeout policy
    /// * `requests_per_second` - Global rate for each batch
    /// * `extractor` - Turns fetched pages into records
    ///
    /// # Returns
    ///
    /// * `Err(ConfigError)` - The rate is not a usable positive number
    pub fn new(
        client: Client,
        policy: FetchPolicy,
        requests_per_second: f64,
        extractor: E,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            client,
            policy,
            limiter: RateLimiter::new(requests_per_second)?,
            extractor: Arc::new(extractor),
        })
    }

    /// Creates a coordinator from the loaded configuration
    ///
    /// All configuration errors surface here, before any network activity.
    pub fn from_config(config: &Config, extractor: E) -> crate::Result<Self> {
        let policy = FetchPolicy::from_config(&config.scraper)?;
        let client = build_http_client(&config.user_agent, config.scraper.accept_invalid_certs)?;

        if config.scraper.accept_invalid_certs {
            tracing::warn!("TLS certificate verification is disabled");
        }

        Ok(Self::new(
            client,
            policy,
            config.scraper.requests_per_second,
            extractor,
        )?)
    }

    /// Runs one batch over `urls`
    ///
    /// Every URL gets its own pipeline (fetch, then extract). All pipelines
    /// share one rate limiter created for this call. Records are returned in
    /// the order their pipelines complete.
    pub async fn run(&self, urls: &[String]) -> BatchOutcome<E::Record> {
        let mut statistics = RunStatistics::new();

        if urls.is_empty() {
            statistics.finish(Duration::ZERO);
            return BatchOutcome {
                records: Vec::new(),
                statistics,
            };
        }

        statistics.start(urls.len());
        tracing::info!(
            "Starting batch of {} URLs ({:?} between requests, {} attempts each)",
            urls.len(),
            self.limiter.min_interval(),
            self.policy.max_retries()
        );

        let start = Instant::now();
        let limiter = Arc::new(self.limiter.fresh());
        let fetcher = Fetcher::new(self.client.clone(), self.policy, limiter);

        let mut pipelines = JoinSet::new();
        for url in urls {
            let fetcher = fetcher.clone();
            let extractor = Arc::clone(&self.extractor);
            let url = url.clone();

            pipelines.spawn(async move {
                let result = run_pipeline(&fetcher, extractor.as_ref(), &url).await;
                (url, result)
            });
        }

        let mut records = Vec::with_capacity(urls.len());
        let mut orchestration_failed = false;

        while let Some(joined) = pipelines.join_next().await {
            match joined {
                Ok((_, Ok(record))) => {
                    statistics.record_success();
                    records.push(record);
                }
                Ok((url, Err(failure))) => {
                    statistics.record_failure();
                    tracing::debug!(url = %url, "Pipeline failed: {}", failure);
                }
                Err(e) => {
                    statistics.record_failure();
                    if e.is_cancelled() {
                        orchestration_failed = true;
                    }
                    tracing::error!("Pipeline task ended abnormally: {}", e);
                }
            }
        }

        let elapsed = start.elapsed();
        if orchestration_failed {
            statistics.abort(elapsed);
        } else {
            statistics.finish(elapsed);
        }

        tracing::info!(
            "Batch {}: {}/{} succeeded in {:.2}s ({:.2} items/sec)",
            statistics.status,
            statistics.successful_items,
            statistics.total_items,
            statistics.total_time,
            statistics.items_per_second
        );

        BatchOutcome {
            records,
            statistics,
        }
    }
}

/// Fetches and extracts a single URL
async fn run_pipeline<E: Extractor>(
    fetcher: &Fetcher,
    extractor: &E,
    url: &str,
) -> Result<E::Record, PipelineFailure> {
    match fetcher.fetch(url).await {
        FetchResult::Success { body, .. } => {
            extractor.extract(&body, url).map_err(|e| {
                tracing::error!(url = %url, "Extraction failed: {}", e);
                PipelineFailure::Extract(e)
            })
        }
        FetchResult::Failed {
            last_failure,
            attempts,
            ..
        } => Err(PipelineFailure::Fetch {
            last_failure,
            attempts,
        }),
    }
}
