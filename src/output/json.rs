//! JSON report sink

use crate::output::stats::RunStatistics;
use crate::output::traits::{OutputResult, ResultSink};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

/// Serialized shape of a batch report
#[derive(Debug, Serialize)]
pub struct RunReport<'a, R> {
    pub timestamp: DateTime<Utc>,
    pub articles: &'a [R],
    pub statistics: &'a RunStatistics,
}

/// Wraps records and statistics into a report stamped now
pub fn build_report<'a, R>(records: &'a [R], stats: &'a RunStatistics) -> RunReport<'a, R> {
    RunReport {
        timestamp: Utc::now(),
        articles: records,
        statistics: stats,
    }
}

/// Writes a pretty-printed JSON report to a file
#[derive(Debug, Clone)]
pub struct JsonFileSink {
    path: PathBuf,
}

impl JsonFileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl<R: Serialize> ResultSink<R> for JsonFileSink {
    fn accept(&self, records: &[R], stats: &RunStatistics) -> OutputResult<()> {
        let report = build_report(records, stats);

        let mut writer = BufWriter::new(File::create(&self.path)?);
        serde_json::to_writer_pretty(&mut writer, &report)?;
        writer.write_all(b"\n")?;
        writer.flush()?;

        tracing::info!("Report written to {}", self.path.display());
        Ok(())
    }
}
