//! Pipeline module for paced batch fetching
//!
//! This module contains the core batch logic, including:
//! - A global rate limiter shared by every request of a batch
//! - HTTP fetching with per-attempt timeouts and exponential backoff
//! - Batch coordination and statistics aggregation

mod coordinator;
mod fetcher;
mod rate_limiter;

pub use coordinator::{BatchOutcome, Coordinator, PipelineFailure};
pub use fetcher::{
    build_http_client, AttemptFailure, AttemptOutcome, FetchPolicy, FetchResult, Fetcher,
};
pub use rate_limiter::RateLimiter;

use crate::config::Config;
use crate::extract::{Article, ArticleExtractor};
use crate::SiftError;

/// Runs a complete batch with the default article extractor
///
/// This is the main entry point for harvesting. It will:
/// 1. Validate the configuration and build the HTTP client
/// 2. Fetch every URL under the configured global rate
/// 3. Extract an [`Article`] from each fetched page
/// 4. Return the articles with the batch statistics
///
/// # Returns
///
/// * `Ok(BatchOutcome)` - The batch ran; individual URLs may still have failed
/// * `Err(SiftError)` - The configuration was rejected before any request
pub async fn harvest(config: &Config, urls: &[String]) -> Result<BatchOutcome<Article>, SiftError> {
    let coordinator = Coordinator::from_config(config, ArticleExtractor)?;
    Ok(coordinator.run(urls).await)
}
