//! Replace a duplicate with a hard link to the retained copy.
//!
//! # Overview
//!
//! A link transaction is two filesystem calls: remove the duplicate, then
//! create a hard link at its path pointing at the retained file. The retained
//! path is resolved first, so a symlinked anchor links to the file it points
//! at rather than to the symlink. There is no way to make the pair atomic with
//! classic hard links, so each step reports its own failure:
//!
//! - Resolving the retained path fails: nothing changed.
//! - Removal fails: nothing changed, the link step is not attempted.
//! - Link fails after removal: the duplicate's path is now missing. This is
//!   reported as [`DedupError::LinkFailed`] and logged loudly.
//!
//! In dry-run mode the retained path is still resolved, but neither mutating
//! call is made and the transaction reports [`LinkOutcome::Simulated`].
//!
//! # Example
//!
//! ```no_run
//! use linkdupe::dedup::fs::OsFilesystem;
//! use linkdupe::dedup::link::{LinkOutcome, LinkTransaction};
//! use std::path::Path;
//!
//! let tx = LinkTransaction::new(&OsFilesystem, false);
//! match tx.replace(Path::new("keep.iso"), Path::new("copy.iso")) {
//!     Ok(LinkOutcome::Linked) => println!("copy.iso now shares keep.iso's inode"),
//!     Ok(LinkOutcome::Simulated) => unreachable!(),
//!     Err(e) => eprintln!("ERROR: {}", e),
//! }
//! ```

use std::path::Path;

use super::fs::Filesystem;
use super::DedupError;

/// What a successful transaction did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkOutcome {
    /// The duplicate was removed and relinked.
    Linked,
    /// Dry run: nothing was touched.
    Simulated,
}

/// Remove-then-link replacement over a [`Filesystem`].
#[derive(Debug)]
pub struct LinkTransaction<'a, F: Filesystem + ?Sized> {
    fs: &'a F,
    dry_run: bool,
}

impl<'a, F: Filesystem + ?Sized> LinkTransaction<'a, F> {
    /// Create a transaction runner.
    #[must_use]
    pub fn new(fs: &'a F, dry_run: bool) -> Self {
        Self { fs, dry_run }
    }

    /// Replace `remove` with a hard link to the file `keep` resolves to.
    ///
    /// # Errors
    ///
    /// - `StatFailed` on `keep` if it could not be resolved (nothing touched)
    /// - `RemoveFailed` if `remove` could not be unlinked (no link attempted)
    /// - `LinkFailed` if the link could not be created after removal
    pub fn replace(&self, keep: &Path, remove: &Path) -> Result<LinkOutcome, DedupError> {
        let target = self
            .fs
            .resolve(keep)
            .map_err(|source| DedupError::stat_failed(keep, source))?;
        if target.as_path() != keep {
            log::debug!("{} resolves to {}", keep.display(), target.display());
        }

        if self.dry_run {
            log::info!(
                "Dry run: would link {} -> {}",
                keep.display(),
                remove.display()
            );
            return Ok(LinkOutcome::Simulated);
        }

        self.fs
            .remove_file(remove)
            .map_err(|source| DedupError::RemoveFailed {
                path: remove.to_path_buf(),
                source,
            })?;

        self.fs.hard_link(&target, remove).map_err(|source| {
            log::error!(
                "{} was removed but could not be relinked to {}; the path is now missing",
                remove.display(),
                target.display()
            );
            DedupError::LinkFailed {
                path: remove.to_path_buf(),
                target: target.clone(),
                source,
            }
        })?;

        Ok(LinkOutcome::Linked)
    }
}
