//! Article metadata extractor
//!
//! Pulls the headline and a handful of `<meta>` fields out of an HTML page:
//! - Title (first `<h1>`, falling back to `<title>`)
//! - Author (`<meta name="author">`)
//! - Publication date (`<meta property="article:published_time">`)
//! - Summary (`<meta name="description">`)

use crate::extract::{ExtractError, Extractor};
use chrono::{DateTime, Utc};
use scraper::{Html, Selector};
use serde::Serialize;

/// Title used when a page has neither `<h1>` nor `<title>`
pub const MISSING_TITLE: &str = "N/A";

/// Structured record extracted from one page
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Article {
    pub title: String,
    pub url: String,
    pub author: Option<String>,
    pub published_date: Option<String>,
    pub summary: Option<String>,
    pub scraped_at: DateTime<Utc>,
}

impl Article {
    /// Creates an article with only the required fields, stamped now
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            author: None,
            published_date: None,
            summary: None,
            scraped_at: Utc::now(),
        }
    }
}

/// Default [`Extractor`] producing [`Article`] records
#[derive(Debug, Clone, Copy, Default)]
pub struct ArticleExtractor;

impl Extractor for ArticleExtractor {
    type Record = Article;

    fn extract(&self, html: &str, source_url: &str) -> Result<Article, ExtractError> {
        if html.trim().is_empty() {
            return Err(ExtractError::EmptyDocument {
                url: source_url.to_string(),
            });
        }

        let document = Html::parse_document(html);

        let title = first_text(&document, "h1", source_url)?
            .or(first_text(&document, "title", source_url)?)
            .unwrap_or_else(|| MISSING_TITLE.to_string());

        Ok(Article {
            title,
            url: source_url.to_string(),
            author: meta_content(&document, r#"meta[name="author"]"#, source_url)?,
            published_date: meta_content(
                &document,
                r#"meta[property="article:published_time"]"#,
                source_url,
            )?,
            summary: meta_content(&document, r#"meta[name="description"]"#, source_url)?,
            scraped_at: Utc::now(),
        })
    }
}

fn selector(css: &str, url: &str) -> Result<Selector, ExtractError> {
    Selector::parse(css).map_err(|e| ExtractError::Parse {
        url: url.to_string(),
        message: format!("invalid selector '{}': {:?}", css, e),
    })
}

/// Whitespace-normalized text of the first element matching `css`
fn first_text(document: &Html, css: &str, url: &str) -> Result<Option<String>, ExtractError> {
    let selector = selector(css, url)?;

    Ok(document
        .select(&selector)
        .next()
        .map(|element| {
            element
                .text()
                .flat_map(str::split_whitespace)
                .collect::<Vec<_>>()
                .join(" ")
        })
        .filter(|s| !s.is_empty()))
}

/// `content` attribute of the first matching `<meta>` tag
fn meta_content(document: &Html, css: &str, url: &str) -> Result<Option<String>, ExtractError> {
    let selector = selector(css, url)?;

    Ok(document
        .select(&selector)
        .next()
        .and_then(|element| element.value().attr("content"))
        .map(|content| content.trim().to_string()))
}
