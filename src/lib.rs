//! Sumi-Sift: a paced batch page harvester
//!
//! This crate fetches a fixed batch of pages concurrently under one global
//! request rate, retries each URL with exponential backoff, extracts a small
//! structured record from every page and folds the outcome into run statistics.

pub mod config;
pub mod extract;
pub mod output;
pub mod pipeline;
pub mod state;

use thiserror::Error;

/// Main error type for Sumi-Sift operations
#[derive(Debug, Error)]
pub enum SiftError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for Sumi-Sift operations
pub type Result<T> = std::result::Result<T, SiftError>;

// Re-export commonly used types
pub use config::Config;
pub use extract::{Article, ArticleExtractor, Extractor};
pub use output::RunStatistics;
pub use pipeline::{BatchOutcome, Coordinator, FetchPolicy, Fetcher, RateLimiter};
pub use state::RunStatus;
