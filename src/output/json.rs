//! JSON output formatter for run reports.
//!
//! Provides machine-readable JSON output for scripting and automation.
//!
//! # Output Schema
//!
//! ```json
//! {
//!   "pairs": [
//!     { "keep": "/srv/a.iso", "removed": "/srv/b.iso", "size": 1048576 }
//!   ],
//!   "errors": [
//!     { "path": "/srv/c.iso", "kind": "open_failed", "message": "cannot open ..." }
//!   ],
//!   "summary": {
//!     "entries": 3,
//!     "anchors": 1,
//!     "comparisons": 2,
//!     "identical": 1,
//!     "different": 0,
//!     "skipped_cross_device": 0,
//!     "skipped_same_file": 0,
//!     "linked": 1,
//!     "bytes_reclaimed": 1048576,
//!     "errors": 1,
//!     "scan_errors": 0,
//!     "dry_run": false,
//!     "interrupted": false,
//!     "exit_code": 3,
//!     "exit_code_name": "LD003"
//!   },
//!   "generated_at": "2024-01-01T00:00:00Z"
//! }
//! ```

use std::io::Write;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::RunReport;
use crate::dedup::{DedupStats, LinkedPair};
use crate::error::ErrorRecord;

/// A linked pair in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonPair {
    /// The retained file
    pub keep: String,
    /// The path replaced by a hard link
    pub removed: String,
    /// File size in bytes
    pub size: u64,
}

impl From<&LinkedPair> for JsonPair {
    fn from(pair: &LinkedPair) -> Self {
        Self {
            keep: pair.keep.display().to_string(),
            removed: pair.removed.display().to_string(),
            size: pair.size,
        }
    }
}

/// Summary statistics in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonSummary {
    /// Engine counters
    #[serde(flatten)]
    pub stats: DedupStats,
    /// Errors raised while collecting candidates
    pub scan_errors: usize,
    /// Whether this was a dry run
    pub dry_run: bool,
    /// Whether the run was interrupted
    pub interrupted: bool,
    /// The exit code number
    pub exit_code: i32,
    /// The machine-readable exit code name (e.g., "LD000")
    pub exit_code_name: String,
}

/// Complete JSON document for a run.
#[derive(Debug, Clone, Serialize)]
pub struct JsonOutput {
    /// Linked (or, in a dry run, would-be linked) pairs in processing order
    pub pairs: Vec<JsonPair>,
    /// Every recoverable error, collection errors first
    pub errors: Vec<ErrorRecord>,
    /// Run summary
    pub summary: JsonSummary,
    /// When the report was generated
    pub generated_at: DateTime<Utc>,
}

impl JsonOutput {
    /// Build the JSON document for a report.
    #[must_use]
    pub fn new(report: &RunReport) -> Self {
        let exit_code = report.exit_code();
        Self {
            pairs: report.dedup.linked.iter().map(JsonPair::from).collect(),
            errors: report.error_records(),
            summary: JsonSummary {
                stats: report.dedup.stats.clone(),
                scan_errors: report.scan_errors.len(),
                dry_run: report.dedup.dry_run,
                interrupted: report.dedup.interrupted,
                exit_code: exit_code.as_i32(),
                exit_code_name: exit_code.code_prefix().to_string(),
            },
            generated_at: Utc::now(),
        }
    }

    /// Serialize to compact JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Serialize to pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Write pretty-printed JSON followed by a newline.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> anyhow::Result<()> {
        serde_json::to_writer_pretty(&mut *writer, self)?;
        writeln!(writer)?;
        writer.flush()?;
        Ok(())
    }
}
