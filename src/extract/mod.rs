//! Extraction of structured records from fetched pages
//!
//! The pipeline hands every successfully fetched body to an [`Extractor`].
//! Extraction is pure: no I/O and no retries. An extraction error counts as
//! a failed item, exactly like a URL that exhausted its retries.

pub mod article;

pub use article::{Article, ArticleExtractor};

use thiserror::Error;

/// Errors produced while turning a page into a record
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Empty document from {url}")]
    EmptyDocument { url: String },

    #[error("HTML parse error for {url}: {message}")]
    Parse { url: String, message: String },
}

/// Maps raw page content to a structured record
pub trait Extractor: Send + Sync + 'static {
    /// The record produced for each page
    type Record: Send + 'static;

    /// Extracts a record from `html`, fetched from `source_url`
    fn extract(&self, html: &str, source_url: &str) -> Result<Self::Record, ExtractError>;
}
