//! Output module for batch results
//!
//! This module handles:
//! - Run statistics aggregated by the coordinator
//! - Sinks that receive the final `(records, statistics)` pair
//! - JSON report files and console summaries
//!
//! The pipeline itself never formats or persists anything; callers hand its
//! outcome to one or more [`ResultSink`]s.

mod console;
mod json;
pub mod stats;
mod traits;

pub use console::{format_console_report, ConsoleSink};
pub use json::{build_report, JsonFileSink, RunReport};
pub use stats::RunStatistics;
pub use traits::{OutputError, OutputResult, ResultSink};
