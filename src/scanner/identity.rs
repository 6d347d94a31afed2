//! Device/inode identity for hard-link decisions.
//!
//! # Overview
//!
//! Two paths can only be hard-linked when they live on the same device, and
//! there is nothing to do when they already name the same inode. Both
//! questions are answered by comparing `(device_id, inode)` keys.
//!
//! # Platform Support
//!
//! - **Unix**: Uses (device_id, inode) pairs from file metadata
//! - **Other**: No key is available; callers treat every pair as same-device
//!   and distinct, leaving the decision to content comparison
//!
//! # Example
//!
//! ```no_run
//! use linkdupe::scanner::identity::InodeKey;
//!
//! let a = std::fs::metadata("a.bin").unwrap();
//! let b = std::fs::metadata("b.bin").unwrap();
//!
//! if let (Some(ka), Some(kb)) = (InodeKey::from_metadata(&a), InodeKey::from_metadata(&b)) {
//!     println!("same device: {}, same file: {}", ka.same_device(&kb), ka == kb);
//! }
//! ```

use std::fs::Metadata;

/// Platform-specific identity of the file behind a path.
///
/// Equal keys mean the two paths are already the same file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InodeKey {
    /// Device the file lives on
    pub dev: u64,
    /// Inode number on that device
    pub ino: u64,
}

impl InodeKey {
    /// Create a key from raw device and inode numbers.
    #[must_use]
    pub const fn new(dev: u64, ino: u64) -> Self {
        Self { dev, ino }
    }

    /// Create an inode key from file metadata.
    ///
    /// Returns `None` if the platform doesn't expose inode information.
    #[cfg(unix)]
    #[must_use]
    pub fn from_metadata(metadata: &Metadata) -> Option<Self> {
        use std::os::unix::fs::MetadataExt;
        Some(Self {
            dev: metadata.dev(),
            ino: metadata.ino(),
        })
    }

    // Windows metadata doesn't expose the file index without opening a
    // handle, so hard-link identity is unavailable there.
    #[cfg(not(unix))]
    #[must_use]
    pub fn from_metadata(_metadata: &Metadata) -> Option<Self> {
        None
    }

    /// Whether both keys are on the same device.
    #[must_use]
    pub fn same_device(&self, other: &Self) -> bool {
        self.dev == other.dev
    }

    /// Check if inode identity is supported on this platform.
    #[must_use]
    pub const fn is_supported() -> bool {
        cfg!(unix)
    }
}
