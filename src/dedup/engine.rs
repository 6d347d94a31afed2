//! The size-run scan that finds and links duplicates.
//!
//! # Overview
//!
//! The engine walks a size-sorted [`EntrySet`] left to right. Each live entry
//! becomes the **anchor** for the run of equal-size entries that follow it.
//! Every live **candidate** in that run is checked against the anchor:
//!
//! 1. Both paths are re-stat-ed. Different devices, or the same inode, means
//!    there is nothing to do.
//! 2. The [`ContentComparator`] streams both files.
//! 3. On identical content the [`LinkTransaction`] replaces the candidate with
//!    a hard link to the anchor, and the candidate is disposed whatever the
//!    transaction's result.
//!
//! Failure policy:
//! - Anchor unreadable (stat, open or read): the anchor is disposed and the
//!   rest of its run is abandoned. Later entries get their own turn as anchors.
//! - Candidate unreadable: only the candidate is disposed; the scan continues.
//!
//! A bucket of `k` equal-size files costs at most `k²/2` comparisons, each of
//! which stops at the first differing block.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::Serialize;

use super::compare::{ContentComparator, Side, Verdict, DEFAULT_BLOCK_SIZE};
use super::entries::EntrySet;
use super::fs::{FileStat, Filesystem, OsFilesystem};
use super::link::LinkTransaction;
use super::DedupError;
use crate::progress::ProgressCallback;

/// Phase name reported to progress callbacks.
pub const PHASE_DEDUP: &str = "dedup";

/// Configuration for a deduplication run.
#[derive(Clone)]
pub struct DedupConfig {
    /// Comparator block size in bytes.
    pub block_size: usize,
    /// Report what would be linked without touching the filesystem.
    pub dry_run: bool,
    /// Optional shutdown flag for graceful termination.
    pub shutdown_flag: Option<Arc<AtomicBool>>,
    /// Optional progress callback.
    pub progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for DedupConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DedupConfig")
            .field("block_size", &self.block_size)
            .field("dry_run", &self.dry_run)
            .field("shutdown_flag", &self.shutdown_flag)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            block_size: DEFAULT_BLOCK_SIZE,
            dry_run: false,
            shutdown_flag: None,
            progress_callback: None,
        }
    }
}

impl DedupConfig {
    /// Set the comparator block size.
    #[must_use]
    pub fn with_block_size(mut self, block_size: usize) -> Self {
        self.block_size = block_size.max(1);
        self
    }

    /// Enable or disable dry-run mode.
    #[must_use]
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Set the shutdown flag for graceful termination.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// Set the progress callback.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Check if shutdown has been requested.
    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }
}

/// A duplicate that was (or, in a dry run, would have been) replaced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkedPair {
    /// The retained file
    pub keep: PathBuf,
    /// The path now hard-linked to `keep`
    pub removed: PathBuf,
    /// File size in bytes
    pub size: u64,
}

/// Counters for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DedupStats {
    /// Entries handed to the engine
    pub entries: usize,
    /// Entries that anchored a run of two or more
    pub anchors: usize,
    /// Content comparisons started
    pub comparisons: usize,
    /// Comparisons that found identical content
    pub identical: usize,
    /// Comparisons that found a difference
    pub different: usize,
    /// Pairs skipped because they live on different devices
    pub skipped_cross_device: usize,
    /// Pairs skipped because they already share an inode
    pub skipped_same_file: usize,
    /// Successful (or simulated) link transactions
    pub linked: usize,
    /// Bytes no longer stored twice
    pub bytes_reclaimed: u64,
    /// Errors recorded
    pub errors: usize,
}

/// Everything a run produced.
#[derive(Debug, Default)]
pub struct DedupReport {
    /// Pairs linked, in the order they were processed
    pub linked: Vec<LinkedPair>,
    /// Recoverable errors, in the order they occurred
    pub errors: Vec<DedupError>,
    /// Run counters
    pub stats: DedupStats,
    /// Whether the run was stopped by a shutdown request
    pub interrupted: bool,
    /// Whether this was a dry run
    pub dry_run: bool,
}

impl DedupReport {
    /// Check if any errors were recorded.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    fn record_error(&mut self, error: DedupError) {
        log::error!("{}", error);
        self.stats.errors += 1;
        self.errors.push(error);
    }
}

/// What happened to one (anchor, candidate) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PairOutcome {
    /// Move on to the next candidate.
    Continue,
    /// The anchor is unusable; abandon its run.
    AnchorLost,
}

/// Finds content-identical files among equal-size entries and hard-links them.
#[derive(Debug)]
pub struct DedupEngine<F: Filesystem = OsFilesystem> {
    config: DedupConfig,
    fs: F,
}

impl DedupEngine<OsFilesystem> {
    /// Create an engine over the real filesystem.
    #[must_use]
    pub fn new(config: DedupConfig) -> Self {
        Self::with_filesystem(config, OsFilesystem)
    }

    /// Create an engine with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(DedupConfig::default())
    }
}

impl<F: Filesystem> DedupEngine<F> {
    /// Create an engine over a custom filesystem.
    #[must_use]
    pub fn with_filesystem(config: DedupConfig, fs: F) -> Self {
        Self { config, fs }
    }

    /// The engine's configuration.
    #[must_use]
    pub fn config(&self) -> &DedupConfig {
        &self.config
    }

    /// The filesystem the engine operates on.
    #[must_use]
    pub fn filesystem(&self) -> &F {
        &self.fs
    }

    /// Deduplicate `entries` in place.
    ///
    /// The set is sorted by size first (a no-op if it already is). On return
    /// every processed entry is disposed; entries after an interruption point
    /// are left live.
    pub fn run(&self, entries: &mut EntrySet) -> DedupReport {
        let mut report = DedupReport {
            dry_run: self.config.dry_run,
            ..DedupReport::default()
        };
        report.stats.entries = entries.len();

        if !entries.is_sorted_by_size() {
            entries.sort_by_size();
        }

        log::debug!("starting deduplication of {} files", entries.len());
        if let Some(ref cb) = self.config.progress_callback {
            cb.on_phase_start(PHASE_DEDUP, entries.len());
        }

        let mut comparator = ContentComparator::new(self.config.block_size);
        let total = entries.len();

        'anchors: for anchor in 0..total {
            if self.config.is_shutdown_requested() {
                log::info!("Shutdown requested, stopping deduplication");
                report.interrupted = true;
                break;
            }

            let Some(anchor_path) = entries.path(anchor).map(Path::to_path_buf) else {
                continue;
            };
            if let Some(ref cb) = self.config.progress_callback {
                cb.on_progress(anchor + 1, &anchor_path.to_string_lossy());
            }

            let size = entries.size_at(anchor);
            if anchor + 1 < total && entries.size_at(anchor + 1) == size {
                report.stats.anchors += 1;
            }

            let mut candidate = anchor + 1;
            while candidate < total && entries.size_at(candidate) == size {
                if self.config.is_shutdown_requested() {
                    log::info!("Shutdown requested, stopping deduplication");
                    report.interrupted = true;
                    break 'anchors;
                }

                if let Some(candidate_path) = entries.path(candidate).map(Path::to_path_buf) {
                    let outcome = self.process_pair(
                        &mut comparator,
                        entries,
                        &anchor_path,
                        candidate,
                        &candidate_path,
                        size,
                        &mut report,
                    );
                    if outcome == PairOutcome::AnchorLost {
                        break;
                    }
                }

                candidate += 1;
            }

            // Resolved either way: the walk never comes back to this position.
            entries.dispose(anchor);
        }

        if let Some(ref cb) = self.config.progress_callback {
            cb.on_phase_end(PHASE_DEDUP);
        }

        log::debug!(
            "Deduplication complete: {} linked, {} bytes reclaimed, {} errors",
            report.stats.linked,
            report.stats.bytes_reclaimed,
            report.stats.errors
        );

        report
    }

    /// Check one candidate against the anchor and link it if identical.
    #[allow(clippy::too_many_arguments)]
    fn process_pair(
        &self,
        comparator: &mut ContentComparator,
        entries: &mut EntrySet,
        anchor_path: &Path,
        candidate: usize,
        candidate_path: &Path,
        size: u64,
        report: &mut DedupReport,
    ) -> PairOutcome {
        let anchor_stat = match self.fs.stat(anchor_path) {
            Ok(stat) => stat,
            Err(e) => {
                report.record_error(DedupError::stat_failed(anchor_path, e));
                return PairOutcome::AnchorLost;
            }
        };
        let candidate_stat = match self.fs.stat(candidate_path) {
            Ok(stat) => stat,
            Err(e) => {
                report.record_error(DedupError::stat_failed(candidate_path, e));
                entries.dispose(candidate);
                return PairOutcome::Continue;
            }
        };

        if !anchor_stat.same_device(&candidate_stat) {
            log::debug!(
                "{} and {} are on different devices, skipping",
                anchor_path.display(),
                candidate_path.display()
            );
            report.stats.skipped_cross_device += 1;
            return PairOutcome::Continue;
        }
        if self.same_file(anchor_path, &anchor_stat, candidate_path, &candidate_stat) {
            log::trace!(
                "{} and {} are already the same file",
                anchor_path.display(),
                candidate_path.display()
            );
            report.stats.skipped_same_file += 1;
            return PairOutcome::Continue;
        }

        log::debug!(
            "comparing {} and {}",
            anchor_path.display(),
            candidate_path.display()
        );
        report.stats.comparisons += 1;

        match comparator.compare(&self.fs, anchor_path, candidate_path) {
            Ok(Verdict::Different) => {
                log::debug!(
                    "{} not identical to {}",
                    anchor_path.display(),
                    candidate_path.display()
                );
                report.stats.different += 1;
                PairOutcome::Continue
            }
            Ok(Verdict::Identical) => {
                report.stats.identical += 1;
                let outcome = self.link_pair(anchor_path, candidate_path, size, report);
                if outcome == PairOutcome::Continue {
                    entries.dispose(candidate);
                }
                outcome
            }
            Err(failure) => {
                report.record_error(failure.error);
                match failure.side {
                    Side::Keep => PairOutcome::AnchorLost,
                    Side::Candidate => {
                        entries.dispose(candidate);
                        PairOutcome::Continue
                    }
                }
            }
        }
    }

    /// Whether anchor and candidate name the same file.
    ///
    /// Identical paths always do. Without inode identity, resolved paths are
    /// compared instead.
    fn same_file(
        &self,
        anchor_path: &Path,
        anchor_stat: &FileStat,
        candidate_path: &Path,
        candidate_stat: &FileStat,
    ) -> bool {
        if anchor_path == candidate_path {
            return true;
        }
        match (anchor_stat.identity, candidate_stat.identity) {
            (Some(_), Some(_)) => anchor_stat.same_file(candidate_stat),
            _ => matches!(
                (self.fs.resolve(anchor_path), self.fs.resolve(candidate_path)),
                (Ok(a), Ok(b)) if a == b
            ),
        }
    }

    /// Run the link transaction for an identical pair and record the result.
    ///
    /// An anchor that can no longer be resolved ends its run.
    fn link_pair(
        &self,
        keep: &Path,
        remove: &Path,
        size: u64,
        report: &mut DedupReport,
    ) -> PairOutcome {
        let transaction = LinkTransaction::new(&self.fs, self.config.dry_run);
        match transaction.replace(keep, remove) {
            Ok(outcome) => {
                log::debug!("{} -> {} ({:?})", keep.display(), remove.display(), outcome);
                report.stats.linked += 1;
                report.stats.bytes_reclaimed += size;
                report.linked.push(LinkedPair {
                    keep: keep.to_path_buf(),
                    removed: remove.to_path_buf(),
                    size,
                });
                PairOutcome::Continue
            }
            Err(e) => {
                let anchor_lost = matches!(e, DedupError::StatFailed { .. });
                report.record_error(e);
                if anchor_lost {
                    PairOutcome::AnchorLost
                } else {
                    PairOutcome::Continue
                }
            }
        }
    }
}
