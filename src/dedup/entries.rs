//! The working set of candidate entries.
//!
//! # Overview
//!
//! [`EntrySet`] owns every [`Entry`] for the duration of a run. Each slot is
//! either live or disposed. Disposal is one-way: it drops the path and keeps
//! only the size, so the size-run boundaries the engine walks stay intact.
//!
//! The set also implements the size sorter: [`EntrySet::sort_by_size`] puts
//! equal sizes next to each other, keeping collection order on ties.
//!
//! # Example
//!
//! ```
//! use linkdupe::dedup::EntrySet;
//! use linkdupe::scanner::Entry;
//!
//! let mut set: EntrySet = vec![
//!     Entry::new("/b", 200),
//!     Entry::new("/a", 100),
//!     Entry::new("/c", 100),
//! ]
//! .into_iter()
//! .collect();
//!
//! set.sort_by_size();
//! assert_eq!(set.sizes(), vec![100, 100, 200]);
//!
//! assert!(set.dispose(0));
//! assert!(set.is_disposed(0));
//! assert_eq!(set.live_count(), 2);
//! ```

use std::path::Path;

use crate::scanner::Entry;

/// One position in the working set.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Slot {
    Live(Entry),
    Disposed { size: u64 },
}

impl Slot {
    fn size(&self) -> u64 {
        match self {
            Self::Live(entry) => entry.size,
            Self::Disposed { size } => *size,
        }
    }
}

/// Size-ordered collection of entries with per-entry disposal.
#[derive(Debug, Clone, Default)]
pub struct EntrySet {
    slots: Vec<Slot>,
}

impl EntrySet {
    /// Create an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty set with room for `capacity` entries.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
        }
    }

    /// Append a live entry.
    pub fn push(&mut self, entry: Entry) {
        self.slots.push(Slot::Live(entry));
    }

    /// Number of slots, live or disposed.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Check if the set has no slots at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Number of entries not yet disposed.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.slots
            .iter()
            .filter(|slot| matches!(slot, Slot::Live(_)))
            .count()
    }

    /// Order slots by size ascending.
    ///
    /// The sort is stable, so entries of equal size keep their collection
    /// order. Nothing is dropped or duplicated.
    pub fn sort_by_size(&mut self) {
        self.slots.sort_by_key(Slot::size);
    }

    /// Whether sizes are non-decreasing.
    #[must_use]
    pub fn is_sorted_by_size(&self) -> bool {
        self.slots.windows(2).all(|w| w[0].size() <= w[1].size())
    }

    /// Recorded size of the slot at `index`, disposed or not.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    #[must_use]
    pub fn size_at(&self, index: usize) -> u64 {
        self.slots[index].size()
    }

    /// The live entry at `index`, or `None` once disposed.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Entry> {
        match self.slots.get(index) {
            Some(Slot::Live(entry)) => Some(entry),
            _ => None,
        }
    }

    /// Path of the live entry at `index`.
    #[must_use]
    pub fn path(&self, index: usize) -> Option<&Path> {
        self.get(index).map(|entry| entry.path.as_path())
    }

    /// Check if the slot at `index` has been disposed.
    #[must_use]
    pub fn is_disposed(&self, index: usize) -> bool {
        matches!(self.slots.get(index), Some(Slot::Disposed { .. }))
    }

    /// Permanently exclude the entry at `index` from further processing.
    ///
    /// Returns `true` if the entry was live. Disposing twice is a no-op.
    pub fn dispose(&mut self, index: usize) -> bool {
        let Some(slot) = self.slots.get_mut(index) else {
            return false;
        };
        if matches!(slot, Slot::Disposed { .. }) {
            return false;
        }
        *slot = Slot::Disposed { size: slot.size() };
        true
    }

    /// Recorded sizes in slot order.
    #[must_use]
    pub fn sizes(&self) -> Vec<u64> {
        self.slots.iter().map(Slot::size).collect()
    }

    /// Iterate over live entries in slot order.
    pub fn live(&self) -> impl Iterator<Item = &Entry> {
        self.slots.iter().filter_map(|slot| match slot {
            Slot::Live(entry) => Some(entry),
            Slot::Disposed { .. } => None,
        })
    }
}

impl FromIterator<Entry> for EntrySet {
    fn from_iter<I: IntoIterator<Item = Entry>>(iter: I) -> Self {
        Self {
            slots: iter.into_iter().map(Slot::Live).collect(),
        }
    }
}

impl From<Vec<Entry>> for EntrySet {
    fn from(entries: Vec<Entry>) -> Self {
        entries.into_iter().collect()
    }
}
