//! Block-wise content comparison.
//!
//! # Overview
//!
//! [`ContentComparator`] reads two files in lock-step, one block at a time,
//! and stops at the first block pair that differs. It owns exactly two
//! block-sized buffers, allocated once and reused for every comparison, so
//! memory use is bounded by the block size no matter how large the files are.
//!
//! Callers are expected to have confirmed equal sizes beforehand. A file that
//! changes length underneath us still comes out as [`Verdict::Different`],
//! since the two reads stop returning the same number of bytes.

use std::io::{self, Read};
use std::path::Path;

use super::fs::Filesystem;
use super::DedupError;

/// Default comparison block size (1 MiB).
pub const DEFAULT_BLOCK_SIZE: usize = 1024 * 1024;

/// Result of comparing two files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Both files hold the same bytes.
    Identical,
    /// At least one block differs.
    Different,
}

/// Which of the two compared files an error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    /// The retained file (the anchor).
    Keep,
    /// The file that would be replaced (the candidate).
    Candidate,
}

/// A comparison that could not reach a verdict.
#[derive(Debug, thiserror::Error)]
#[error("{error}")]
pub struct CompareFailure {
    /// The file that failed
    pub side: Side,
    /// What went wrong
    #[source]
    pub error: DedupError,
}

impl CompareFailure {
    fn new(side: Side, error: DedupError) -> Self {
        Self { side, error }
    }
}

/// Streams two files and compares them block by block.
#[derive(Debug)]
pub struct ContentComparator {
    block_a: Vec<u8>,
    block_b: Vec<u8>,
}

impl Default for ContentComparator {
    fn default() -> Self {
        Self::new(DEFAULT_BLOCK_SIZE)
    }
}

impl ContentComparator {
    /// Create a comparator with the given block size.
    ///
    /// A block size of zero is bumped to one byte.
    #[must_use]
    pub fn new(block_size: usize) -> Self {
        let block_size = block_size.max(1);
        Self {
            block_a: vec![0; block_size],
            block_b: vec![0; block_size],
        }
    }

    /// The block size in bytes.
    #[must_use]
    pub fn block_size(&self) -> usize {
        self.block_a.len()
    }

    /// Open both paths and compare their contents.
    ///
    /// # Errors
    ///
    /// Returns a [`CompareFailure`] naming the side that could not be opened
    /// or read. An unreadable file never yields a verdict.
    pub fn compare<F: Filesystem + ?Sized>(
        &mut self,
        fs: &F,
        keep: &Path,
        candidate: &Path,
    ) -> Result<Verdict, CompareFailure> {
        let mut reader_a = fs.open(keep).map_err(|source| {
            CompareFailure::new(Side::Keep, DedupError::open_failed(keep, source))
        })?;
        let mut reader_b = fs.open(candidate).map_err(|source| {
            CompareFailure::new(Side::Candidate, DedupError::open_failed(candidate, source))
        })?;

        self.compare_readers(&mut reader_a, &mut reader_b)
            .map_err(|(side, source)| {
                let path = match side {
                    Side::Keep => keep,
                    Side::Candidate => candidate,
                };
                CompareFailure::new(side, DedupError::read_failed(path, source))
            })
    }

    /// Compare two already-open streams.
    ///
    /// # Errors
    ///
    /// Returns the failing side together with the I/O error.
    pub fn compare_readers(
        &mut self,
        a: &mut dyn Read,
        b: &mut dyn Read,
    ) -> Result<Verdict, (Side, io::Error)> {
        loop {
            let read_a = fill_block(a, &mut self.block_a).map_err(|e| (Side::Keep, e))?;
            let read_b = fill_block(b, &mut self.block_b).map_err(|e| (Side::Candidate, e))?;

            if read_a != read_b || self.block_a[..read_a] != self.block_b[..read_b] {
                return Ok(Verdict::Different);
            }
            if read_a == 0 {
                return Ok(Verdict::Identical);
            }
        }
    }
}

/// Read until `buf` is full or the stream ends. Returns the bytes read.
fn fill_block(reader: &mut dyn Read, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
