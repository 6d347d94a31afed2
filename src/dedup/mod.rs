//! Deduplication engine.
//!
//! This module provides functionality for:
//! - The entry working set and size sorter ([`entries`])
//! - Block-wise content comparison ([`compare`])
//! - The remove-then-link transaction ([`link`])
//! - The size-run scan that ties them together ([`engine`])
//!
//! All filesystem access goes through the [`fs::Filesystem`] trait.
//!
//! # Example
//!
//! ```no_run
//! use linkdupe::dedup::{DedupConfig, DedupEngine, EntrySet};
//! use linkdupe::scanner::{Collector, CollectorConfig};
//!
//! let collector = Collector::new(vec!["/srv/media".to_string()], CollectorConfig::default());
//! let mut entries: EntrySet = collector.collect().filter_map(Result::ok).collect();
//!
//! let engine = DedupEngine::new(DedupConfig::default().with_dry_run(true));
//! let report = engine.run(&mut entries);
//! for pair in &report.linked {
//!     println!("{} -> {}", pair.keep.display(), pair.removed.display());
//! }
//! ```

pub mod compare;
pub mod engine;
pub mod entries;
pub mod fs;
pub mod link;

use std::io;
use std::path::{Path, PathBuf};

use crate::error::ErrorKind;

pub use compare::{ContentComparator, Verdict, DEFAULT_BLOCK_SIZE};
pub use engine::{DedupConfig, DedupEngine, DedupReport, DedupStats, LinkedPair};
pub use entries::EntrySet;
pub use link::{LinkOutcome, LinkTransaction};

/// Errors recorded while deduplicating.
///
/// None of these stop the run. Each one is attached to a single entry or
/// pair; the engine reports it and moves on.
#[derive(Debug, thiserror::Error)]
pub enum DedupError {
    /// A path could not be stat-ed at comparison time.
    #[error("stat() error for {path}: {source}")]
    StatFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A file could not be opened for reading.
    #[error("cannot open {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A file was opened but reading it failed part way.
    #[error("read error on {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The duplicate could not be removed; nothing was changed.
    #[error("unlink() error on {path}: {source}")]
    RemoveFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The duplicate was removed but the hard link could not be created.
    #[error("link() error on {path} (target {target}): {source} - {path} is now missing")]
    LinkFailed {
        path: PathBuf,
        target: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl DedupError {
    pub(crate) fn open_failed(path: &Path, source: io::Error) -> Self {
        Self::OpenFailed {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn read_failed(path: &Path, source: io::Error) -> Self {
        Self::ReadFailed {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn stat_failed(path: &Path, source: io::Error) -> Self {
        Self::StatFailed {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Get the offending path.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::StatFailed { path, .. }
            | Self::OpenFailed { path, .. }
            | Self::ReadFailed { path, .. }
            | Self::RemoveFailed { path, .. }
            | Self::LinkFailed { path, .. } => path,
        }
    }

    /// Get the machine-readable failure kind.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::StatFailed { .. } => ErrorKind::StatFailed,
            Self::OpenFailed { .. } => ErrorKind::OpenFailed,
            Self::ReadFailed { .. } => ErrorKind::ReadFailed,
            Self::RemoveFailed { .. } => ErrorKind::RemoveFailed,
            Self::LinkFailed { .. } => ErrorKind::LinkFailed,
        }
    }

    /// Whether this error left a path missing from the tree.
    #[must_use]
    pub fn lost_path(&self) -> bool {
        matches!(self, Self::LinkFailed { .. })
    }
}
