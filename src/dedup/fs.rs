//! Filesystem access used by the dedup engine.
//!
//! The engine never touches `std::fs` directly. Everything it needs (stat,
//! path resolution, open for reading, remove, hard link) goes through the
//! [`Filesystem`] trait, so device layout and failures can be simulated in
//! tests.

use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use crate::scanner::InodeKey;

/// What the engine needs to know about a path right before using it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileStat {
    /// Current size in bytes
    pub len: u64,
    /// Device/inode identity, if the platform provides one
    pub identity: Option<InodeKey>,
}

impl FileStat {
    /// Whether two paths may be hard-linked to each other.
    ///
    /// Without identity information every pair is assumed linkable.
    #[must_use]
    pub fn same_device(&self, other: &Self) -> bool {
        match (self.identity, other.identity) {
            (Some(a), Some(b)) => a.same_device(&b),
            _ => true,
        }
    }

    /// Whether both stats describe the same underlying file.
    #[must_use]
    pub fn same_file(&self, other: &Self) -> bool {
        matches!((self.identity, other.identity), (Some(a), Some(b)) if a == b)
    }
}

/// Filesystem operations performed during deduplication.
pub trait Filesystem {
    /// Inspect a path, following symlinks.
    fn stat(&self, path: &Path) -> io::Result<FileStat>;

    /// Absolute path with every symlink resolved.
    ///
    /// Hard links are made to this path, never to a symlink itself.
    fn resolve(&self, path: &Path) -> io::Result<PathBuf>;

    /// Open a file for reading.
    fn open(&self, path: &Path) -> io::Result<Box<dyn Read>>;

    /// Remove a directory entry.
    fn remove_file(&self, path: &Path) -> io::Result<()>;

    /// Create `link` as a new hard link to `original`.
    fn hard_link(&self, original: &Path, link: &Path) -> io::Result<()>;
}

/// The real filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsFilesystem;

impl Filesystem for OsFilesystem {
    fn stat(&self, path: &Path) -> io::Result<FileStat> {
        let metadata = fs::metadata(path)?;
        Ok(FileStat {
            len: metadata.len(),
            identity: InodeKey::from_metadata(&metadata),
        })
    }

    fn resolve(&self, path: &Path) -> io::Result<PathBuf> {
        fs::canonicalize(path)
    }

    fn open(&self, path: &Path) -> io::Result<Box<dyn Read>> {
        Ok(Box::new(File::open(path)?))
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        fs::remove_file(path)
    }

    fn hard_link(&self, original: &Path, link: &Path) -> io::Result<()> {
        fs::hard_link(original, link)
    }
}
