//! Sink trait and output errors

use crate::output::stats::RunStatistics;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to serialize output: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Receives the final result set of a batch
///
/// Sinks are called once per batch, after the coordinator has returned.
pub trait ResultSink<R> {
    /// Accepts the extracted records and the final statistics snapshot
    fn accept(&self, records: &[R], stats: &RunStatistics) -> OutputResult<()>;
}
