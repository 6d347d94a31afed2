//! Candidate collector: pattern expansion plus recursive directory walk.
//!
//! # Overview
//!
//! This module provides the [`Collector`] struct, which turns the patterns
//! given on the command line into a stream of [`Entry`] values. Patterns with
//! glob metacharacters are expanded with [`glob`]; every match (or literal
//! path) is then walked with [`walkdir`], so directories are expanded
//! recursively and plain files yield themselves.
//!
//! # Features
//!
//! - Glob expansion (`*`, `?`, `[...]`) with literal-path fallback
//! - Deterministic, file-name ordered traversal
//! - Configurable symlink following with loop detection
//! - Hidden file filtering
//! - Minimum size filtering
//!
//! Unreadable paths are yielded as [`ScanError`] values rather than stopping
//! iteration.

use std::path::{Path, PathBuf};

use walkdir::{DirEntry, WalkDir};

use super::{CollectorConfig, Entry, ScanError};

type EntryIter<'a> = Box<dyn Iterator<Item = Result<Entry, ScanError>> + 'a>;

/// Expands patterns into candidate entries.
#[derive(Debug)]
pub struct Collector {
    /// Paths or glob patterns, in the order given
    patterns: Vec<String>,
    /// Collector configuration
    config: CollectorConfig,
}

impl Collector {
    /// Create a new collector for the given patterns.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use linkdupe::scanner::{Collector, CollectorConfig};
    ///
    /// let collector = Collector::new(vec![".".to_string()], CollectorConfig::default());
    /// ```
    #[must_use]
    pub fn new(patterns: Vec<String>, config: CollectorConfig) -> Self {
        Self { patterns, config }
    }

    /// Walk every pattern, yielding entries that pass the size filter.
    ///
    /// Patterns are processed in order; within a directory, children are
    /// visited sorted by file name.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use linkdupe::scanner::{Collector, CollectorConfig};
    ///
    /// let collector = Collector::new(vec![".".to_string()], CollectorConfig::default());
    /// let files: Vec<_> = collector.collect().filter_map(Result::ok).collect();
    /// println!("Found {} candidates", files.len());
    /// ```
    pub fn collect(&self) -> impl Iterator<Item = Result<Entry, ScanError>> + '_ {
        self.patterns
            .iter()
            .flat_map(move |pattern| self.expand(pattern))
            .flat_map(move |matched| -> EntryIter<'_> {
                match matched {
                    Ok(path) => self.walk(path),
                    Err(e) => Box::new(std::iter::once(Err(e))),
                }
            })
    }

    /// Expand a single pattern into concrete paths.
    fn expand(&self, pattern: &str) -> Vec<Result<PathBuf, ScanError>> {
        if !has_glob_meta(pattern) {
            return vec![Ok(PathBuf::from(pattern))];
        }

        let paths = match glob::glob(pattern) {
            Ok(paths) => paths,
            Err(e) => {
                log::warn!("Invalid pattern '{}': {}", pattern, e);
                return vec![Err(ScanError::InvalidPattern {
                    pattern: pattern.to_string(),
                    message: e.to_string(),
                })];
            }
        };

        let matches: Vec<_> = paths
            .map(|res| {
                res.map_err(|e| {
                    let path = e.path().to_path_buf();
                    log::warn!("Cannot read {}: {}", path.display(), e);
                    ScanError::StatFailed {
                        path,
                        source: e.into_error(),
                    }
                })
            })
            .collect();

        if matches.is_empty() {
            log::warn!("No match for pattern: {}", pattern);
            return vec![Err(ScanError::NoMatch(pattern.to_string()))];
        }

        matches
    }

    /// Walk one matched path. A regular file yields itself.
    fn walk(&self, root: PathBuf) -> EntryIter<'_> {
        let skip_hidden = self.config.skip_hidden;
        let walk_dir = WalkDir::new(&root)
            .follow_links(self.config.follow_symlinks)
            .sort_by_file_name();

        Box::new(
            walk_dir
                .into_iter()
                .filter_entry(move |e| !(skip_hidden && e.depth() > 0 && is_hidden(e)))
                .filter_map(move |entry_result| match entry_result {
                    Ok(entry) => self.process_entry(&entry),
                    Err(e) => Some(Err(handle_walk_error(&root, e))),
                }),
        )
    }

    /// Turn a walked entry into an [`Entry`] if it is a regular file large enough.
    fn process_entry(&self, entry: &DirEntry) -> Option<Result<Entry, ScanError>> {
        let path = entry.path();
        let file_type = entry.file_type();

        if file_type.is_dir() {
            return None;
        }

        // With follow_links enabled walkdir reports the target's type, so
        // anything still a symlink here is one we were told not to follow.
        if file_type.is_symlink() {
            log::trace!("Skipping symlink: {}", path.display());
            return None;
        }

        let metadata = match entry.metadata() {
            Ok(m) => m,
            Err(e) => return Some(Err(handle_walk_error(path, e))),
        };

        if !metadata.is_file() {
            log::trace!("Skipping non-regular file: {}", path.display());
            return None;
        }

        let size = metadata.len();
        if size < self.config.min_size {
            log::trace!(
                "Skipping file below minimum size ({} < {}): {}",
                size,
                self.config.min_size,
                path.display()
            );
            return None;
        }

        Some(Ok(Entry::new(path.to_path_buf(), size)))
    }
}

/// Whether a pattern needs glob expansion.
fn has_glob_meta(pattern: &str) -> bool {
    pattern.contains(['*', '?', '['])
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .is_some_and(|name| name.starts_with('.'))
}

/// Convert a walkdir error into a [`ScanError`], logging it.
fn handle_walk_error(fallback: &Path, error: walkdir::Error) -> ScanError {
    let path = error
        .path()
        .map_or_else(|| fallback.to_path_buf(), Path::to_path_buf);
    let message = error.to_string();
    let source = error
        .into_io_error()
        .unwrap_or_else(|| std::io::Error::other(message));

    match source.kind() {
        std::io::ErrorKind::NotFound => {
            log::warn!("File not found (may have been deleted): {}", path.display());
        }
        _ => log::warn!("stat() error for {}: {}", path.display(), source),
    }

    ScanError::StatFailed { path, source }
}
