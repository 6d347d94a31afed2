//! Plain text report.
//!
//! ```text
//! /srv/a/keep.iso -> /srv/b/copy.iso
//! /srv/a/keep.iso -> /srv/c/copy.iso
//! ERROR: /srv/d/locked.iso: remove_failed
//! Linked 2 files, reclaimed 1.4 GiB, 1 error
//! ```
//!
//! Dry runs prefix every pair with `[dry-run] ` and word the summary in the
//! conditional. Error lines are shown together with the pairs, so they do not
//! depend on the log level.

use std::io::{self, Write};

use bytesize::ByteSize;
use yansi::{Condition, Paint};

use super::RunReport;
use crate::dedup::LinkedPair;
use crate::error::ErrorRecord;

/// Prefix for pairs that were only simulated.
pub const DRY_RUN_PREFIX: &str = "[dry-run] ";

/// Text renderer for a [`RunReport`].
#[derive(Debug)]
pub struct TextOutput<'a> {
    report: &'a RunReport,
    show_pairs: bool,
    show_summary: bool,
    color: bool,
}

impl<'a> TextOutput<'a> {
    /// Create a renderer showing pairs and summary, without color.
    #[must_use]
    pub fn new(report: &'a RunReport) -> Self {
        Self {
            report,
            show_pairs: true,
            show_summary: true,
            color: false,
        }
    }

    /// Show or hide the per-pair and per-error lines.
    #[must_use]
    pub fn with_pairs(mut self, show: bool) -> Self {
        self.show_pairs = show;
        self
    }

    /// Show or hide the summary line.
    #[must_use]
    pub fn with_summary(mut self, show: bool) -> Self {
        self.show_summary = show;
        self
    }

    /// Enable or disable ANSI colors.
    #[must_use]
    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    fn condition(&self) -> Condition {
        if self.color {
            Condition::ALWAYS
        } else {
            Condition::NEVER
        }
    }

    /// Format one pair line, without the trailing newline.
    #[must_use]
    pub fn pair_line(&self, pair: &LinkedPair) -> String {
        let when = self.condition();
        let prefix = if self.report.dedup.dry_run {
            DRY_RUN_PREFIX.yellow().whenever(when).to_string()
        } else {
            String::new()
        };
        format!(
            "{}{} {} {}",
            prefix,
            pair.keep.display(),
            "->".dim().whenever(when),
            pair.removed.display().to_string().cyan().whenever(when)
        )
    }

    /// Format one error line, without the trailing newline.
    #[must_use]
    pub fn error_line(&self, record: &ErrorRecord) -> String {
        format!(
            "{} {}: {}",
            "ERROR:".red().whenever(self.condition()),
            record.path,
            record.kind.as_str()
        )
    }

    /// Format the summary line, without the trailing newline.
    #[must_use]
    pub fn summary_line(&self) -> String {
        let when = self.condition();
        let stats = &self.report.dedup.stats;
        let noun = if stats.linked == 1 { "file" } else { "files" };
        let reclaimed = ByteSize::b(stats.bytes_reclaimed).to_string();

        let mut line = if self.report.dedup.dry_run {
            format!(
                "Would link {} {}, reclaiming {}",
                stats.linked,
                noun,
                reclaimed.bold().whenever(when)
            )
        } else {
            format!(
                "Linked {} {}, reclaimed {}",
                stats.linked,
                noun,
                reclaimed.bold().whenever(when)
            )
        };

        let errors = self.report.error_count();
        if errors > 0 {
            let label = format!("{} error{}", errors, if errors == 1 { "" } else { "s" });
            line.push_str(&format!(", {}", label.red().whenever(when)));
        }
        if self.report.dedup.interrupted {
            line.push_str(&format!(" {}", "(interrupted)".yellow().whenever(when)));
        }
        line
    }

    /// Write the report.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        if self.show_pairs {
            for pair in &self.report.dedup.linked {
                writeln!(writer, "{}", self.pair_line(pair))?;
            }
            for record in self.report.error_records() {
                writeln!(writer, "{}", self.error_line(&record))?;
            }
        }
        if self.show_summary {
            writeln!(writer, "{}", self.summary_line())?;
        }
        writer.flush()
    }
}
