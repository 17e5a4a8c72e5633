//! Configuration module for Sumi-Sift
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every section is optional; missing values fall back to the batch defaults
//! (2 requests/second, 10 second attempts, 3 attempts per URL).
//!
//! # Example
//!
//! ```no_run
//! use sumi_sift::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("sift.toml")).unwrap();
//! println!("Rate limit: {} req/s", config.scraper.requests_per_second);
//! ```

mod parser;
mod types;
pub(crate) mod validation;

// Re-export types
pub use types::{Config, InputConfig, OutputConfig, ScraperConfig, UserAgentConfig};

// Re-export parser functions
pub use parser::{load_config, load_url_list, parse_config, parse_url_list};
pub use validation::{validate, validate_target_url};
