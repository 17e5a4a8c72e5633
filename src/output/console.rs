//! Console summary sink

use crate::extract::Article;
use crate::output::stats::RunStatistics;
use crate::output::traits::{OutputResult, ResultSink};

/// Characters of title/summary shown per article
const PREVIEW_CHARS: usize = 70;

/// Prints articles and statistics to stdout
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleSink;

impl ResultSink<Article> for ConsoleSink {
    fn accept(&self, records: &[Article], stats: &RunStatistics) -> OutputResult<()> {
        print!("{}", format_console_report(records, stats));
        Ok(())
    }
}

/// Formats the console report
pub fn format_console_report(records: &[Article], stats: &RunStatistics) -> String {
    let rule = "=".repeat(80);
    let mut out = format!("{}\nRESULTS\n{}\n", rule, rule);

    if records.is_empty() {
        out.push_str("\nNo articles were extracted.\n");
    }

    for (i, article) in records.iter().enumerate() {
        out.push_str(&format!("\nArticle {}:\n", i + 1));
        out.push_str(&format!("   Title: {}\n", preview(&article.title)));
        out.push_str(&format!("   URL: {}\n", article.url));
        out.push_str(&format!(
            "   Author: {}\n",
            article.author.as_deref().unwrap_or("N/A")
        ));
        out.push_str(&format!(
            "   Date: {}\n",
            article.published_date.as_deref().unwrap_or("N/A")
        ));
        out.push_str(&format!(
            "   Summary: {}\n",
            preview(article.summary.as_deref().unwrap_or("N/A"))
        ));
    }

    out.push_str(&format!("\n{}\nSTATISTICS\n{}\n", rule, rule));
    out.push_str(&format!("Total URLs: {}\n", stats.total_items));
    out.push_str(&format!("Successful: {}\n", stats.successful_items));
    out.push_str(&format!("Failed: {}\n", stats.failed_items));
    out.push_str(&format!("Total time: {:.2}s\n", stats.total_time));
    out.push_str(&format!(
        "Throughput: {:.2} items/second\n",
        stats.items_per_second
    ));
    out.push_str(&format!("Success rate: {:.1}%\n", stats.success_rate()));
    out.push_str(&format!("Status: {}\n", stats.status));

    out
}

/// Truncates on a character boundary, appending an ellipsis when shortened
fn preview(text: &str) -> String {
    if text.chars().count() <= PREVIEW_CHARS {
        return text.to_string();
    }
    let truncated: String = text.chars().take(PREVIEW_CHARS).collect();
    format!("{}...", truncated)
}
