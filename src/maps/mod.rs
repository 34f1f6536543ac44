//! Index map building blocks.
//!
//! An index map associates every physical index with a value: the
//! [`SequenceMap`] maps positions to physical indexes (defining visual
//! order), a [`FlagMap`] marks indexes as skipped or hidden, and a
//! [`ValueMap`] attaches arbitrary per-index payloads. All of them grow,
//! shrink, and reorder in lockstep when the [`IndexMapper`] applies a
//! structural mutation.
//!
//! [`IndexMapper`]: crate::mapper::IndexMapper

mod flag;
mod sequence;
mod value;

pub use flag::FlagMap;
pub use sequence::SequenceMap;
pub use value::{ErasedMap, ValueMap};

use serde::{Deserialize, Serialize};

/// Which collection a registered map belongs to.
///
/// The kind is declared by the registration call that created the map, not
/// inferred from its runtime type, so a map can never be routed to the
/// wrong collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MapKind {
    /// Marks indexes as removed from the dataset-facing view entirely.
    Skip,
    /// Marks indexes as excluded from rendering while still present in the
    /// dataset.
    Hidden,
    /// Arbitrary per-index payloads (widths, header labels, ...).
    Generic,
}

/// Structural operations shared by every index map.
///
/// Maps are passive data: they do not emit notifications themselves. The
/// orchestrator drives these operations and raises one change notification
/// per call, never per entry.
pub trait IndexMap {
    /// Reset the map to `length` entries holding its default value
    /// (identity for the sequence, `false` for flag maps, the
    /// caller-supplied default for value maps). Prior per-index data is
    /// discarded.
    fn init(&mut self, length: usize);

    /// Splice in entries for freshly minted physical indexes.
    ///
    /// `inserted` lists the new physical indexes in ascending order.
    /// Physically indexed maps splice `inserted.len()` default entries at
    /// position `at`; the sequence map splices the `inserted` values
    /// themselves.
    fn insert(&mut self, at: usize, inserted: &[usize]);

    /// Remove the entries for the given physical indexes and compact the
    /// rest. The sequence map additionally renumbers its surviving values
    /// so they keep referencing valid positions.
    fn remove(&mut self, removed: &[usize]);

    /// Number of entries. Equals the mapper's physical count after any
    /// settled mutation.
    fn len(&self) -> usize;

    /// Whether the map holds no entries.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Count of removed indexes strictly below `index`; the renumbering offset
/// applied to surviving index values after a removal.
pub(crate) fn decrease_by(removed: &[usize], index: usize) -> usize {
    removed.iter().filter(|&&r| r < index).count()
}
