//! Scanner module for candidate file discovery.
//!
//! This module provides functionality for:
//! - Expanding path and glob patterns into candidate files
//! - Recursive directory walking using walkdir
//! - Minimum-size filtering at collection time
//! - Device/inode identity keys for hard-link detection
//!
//! # Architecture
//!
//! The scanner is divided into submodules:
//! - [`collector`]: Pattern expansion and directory traversal
//! - [`identity`]: Platform-specific `(device, inode)` keys
//!
//! # Example
//!
//! ```no_run
//! use linkdupe::scanner::{Collector, CollectorConfig};
//!
//! let config = CollectorConfig {
//!     min_size: 1024, // Skip files under 1KiB
//!     ..Default::default()
//! };
//!
//! let collector = Collector::new(vec!["/srv/media".to_string()], config);
//! for entry in collector.collect() {
//!     match entry {
//!         Ok(file) => println!("{}: {} bytes", file.path.display(), file.size),
//!         Err(e) => eprintln!("Warning: {}", e),
//!     }
//! }
//! ```

pub mod collector;
pub mod identity;

use std::path::PathBuf;

use crate::error::ErrorKind;

// Re-export main types
pub use collector::Collector;
pub use identity::InodeKey;

/// Default minimum file size in bytes.
///
/// Tiny files are rarely worth a hard link; the inode costs about as much as
/// the data it would save.
pub const DEFAULT_MIN_SIZE: u64 = 16;

/// A candidate file: its path and the size observed at collection time.
///
/// The size is a grouping key only. It is not re-verified until the engine
/// actually examines the entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Path to the file, as produced by the collector
    pub path: PathBuf,
    /// File size in bytes at collection time
    pub size: u64,
}

impl Entry {
    /// Create a new Entry.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, size: u64) -> Self {
        Self {
            path: path.into(),
            size,
        }
    }
}

/// Configuration for candidate collection.
#[derive(Debug, Clone)]
pub struct CollectorConfig {
    /// Minimum file size to include (in bytes).
    /// Files smaller than this are never considered.
    pub min_size: u64,

    /// Follow symbolic links during traversal.
    /// Warning: May cause loops with symlink cycles (reported as errors).
    pub follow_symlinks: bool,

    /// Skip hidden files and directories (names starting with `.`).
    pub skip_hidden: bool,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            min_size: DEFAULT_MIN_SIZE,
            follow_symlinks: false,
            skip_hidden: false,
        }
    }
}

impl CollectorConfig {
    /// Set the minimum file size.
    #[must_use]
    pub fn with_min_size(mut self, min_size: u64) -> Self {
        self.min_size = min_size;
        self
    }

    /// Enable or disable following symbolic links.
    #[must_use]
    pub fn with_follow_symlinks(mut self, follow: bool) -> Self {
        self.follow_symlinks = follow;
        self
    }

    /// Enable or disable skipping hidden files.
    #[must_use]
    pub fn with_skip_hidden(mut self, skip: bool) -> Self {
        self.skip_hidden = skip;
        self
    }
}

/// Errors that can occur while collecting candidates.
///
/// All of these are recoverable: the offending path is skipped and
/// collection continues.
#[derive(thiserror::Error, Debug)]
pub enum ScanError {
    /// A path could not be inspected.
    #[error("stat failed for {path}: {source}")]
    StatFailed {
        /// Path that could not be stat-ed
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A pattern could not be parsed as a glob.
    #[error("invalid pattern '{pattern}': {message}")]
    InvalidPattern {
        /// The pattern as given
        pattern: String,
        /// Parser message
        message: String,
    },

    /// A pattern matched nothing.
    #[error("no such file or no match: {0}")]
    NoMatch(String),
}

impl ScanError {
    /// Get the path or pattern associated with this error.
    #[must_use]
    pub fn subject(&self) -> String {
        match self {
            Self::StatFailed { path, .. } => path.display().to_string(),
            Self::InvalidPattern { pattern, .. } | Self::NoMatch(pattern) => pattern.clone(),
        }
    }

    /// Get the machine-readable failure kind.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::StatFailed { .. } => ErrorKind::StatFailed,
            Self::InvalidPattern { .. } => ErrorKind::InvalidPattern,
            Self::NoMatch(_) => ErrorKind::NoMatch,
        }
    }
}
