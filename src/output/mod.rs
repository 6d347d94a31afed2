//! Report renderers for a finished run.
//!
//! This module provides two output formats:
//! - Text, one `keep -> removed` line per pair plus a summary
//! - JSON for automation and scripting
//!
//! # Example
//!
//! ```no_run
//! use linkdupe::dedup::{DedupEngine, EntrySet};
//! use linkdupe::output::{RunReport, TextOutput};
//! use linkdupe::scanner::{Collector, CollectorConfig};
//!
//! let collector = Collector::new(vec![".".to_string()], CollectorConfig::default());
//! let (entries, scan_errors): (Vec<_>, Vec<_>) = collector.collect().partition(Result::is_ok);
//! let mut entries: EntrySet = entries.into_iter().filter_map(Result::ok).collect();
//! let scan_errors = scan_errors.into_iter().filter_map(Result::err).collect();
//!
//! let dedup = DedupEngine::with_defaults().run(&mut entries);
//! let report = RunReport::new(scan_errors, dedup);
//! TextOutput::new(&report).write_to(&mut std::io::stdout()).unwrap();
//! ```

pub mod json;
pub mod text;

// Re-export main types
pub use json::JsonOutput;
pub use text::TextOutput;

use crate::dedup::DedupReport;
use crate::error::{ErrorRecord, ExitCode};
use crate::scanner::ScanError;

/// Everything a run produced: collection errors and the engine's report.
#[derive(Debug, Default)]
pub struct RunReport {
    /// Errors from pattern expansion and traversal, in order
    pub scan_errors: Vec<ScanError>,
    /// The engine's report
    pub dedup: DedupReport,
}

impl RunReport {
    /// Combine collection errors with the engine's report.
    #[must_use]
    pub fn new(scan_errors: Vec<ScanError>, dedup: DedupReport) -> Self {
        Self { scan_errors, dedup }
    }

    /// Total number of recoverable errors.
    #[must_use]
    pub fn error_count(&self) -> usize {
        self.scan_errors.len() + self.dedup.errors.len()
    }

    /// All errors as records, collection errors first.
    #[must_use]
    pub fn error_records(&self) -> Vec<ErrorRecord> {
        self.scan_errors
            .iter()
            .map(ErrorRecord::from)
            .chain(self.dedup.errors.iter().map(ErrorRecord::from))
            .collect()
    }

    /// The process exit code this report maps to.
    ///
    /// Interruption wins, then an empty candidate list, then errors.
    #[must_use]
    pub fn exit_code(&self) -> ExitCode {
        if self.dedup.interrupted {
            ExitCode::Interrupted
        } else if self.dedup.stats.entries == 0 {
            ExitCode::NoFiles
        } else if self.error_count() > 0 {
            ExitCode::PartialSuccess
        } else {
            ExitCode::Success
        }
    }
}
