//! The physical-index permutation that defines visual order.

use serde::{Deserialize, Serialize};

use super::{decrease_by, IndexMap};

/// Ordered list of all physical indexes.
///
/// The sequence is always a permutation of `0..physical_count`: no
/// duplicates, no gaps. Reordering the sequence reorders the visual (and
/// rendered) view without touching per-index data, because physical
/// indexes keep their identity across moves.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceMap {
    indexes: Vec<usize>,
}

impl SequenceMap {
    /// Create an empty sequence.
    pub fn new() -> Self {
        Self::default()
    }

    /// All physical indexes in visual order.
    pub fn indexes(&self) -> &[usize] {
        &self.indexes
    }

    /// Replace the whole order. The caller is responsible for supplying a
    /// permutation of the current physical indexes.
    pub(crate) fn set_indexes(&mut self, indexes: Vec<usize>) {
        debug_assert!(is_permutation(&indexes));
        self.indexes = indexes;
    }

    /// Physical index at the given sequence position.
    pub fn at(&self, position: usize) -> Option<usize> {
        self.indexes.get(position).copied()
    }

    /// Sequence position currently occupied by `physical`.
    pub fn position_of(&self, physical: usize) -> Option<usize> {
        self.indexes.iter().position(|&index| index == physical)
    }
}

impl IndexMap for SequenceMap {
    fn init(&mut self, length: usize) {
        self.indexes = (0..length).collect();
    }

    fn insert(&mut self, at: usize, inserted: &[usize]) {
        let at = at.min(self.indexes.len());
        self.indexes.splice(at..at, inserted.iter().copied());
    }

    fn remove(&mut self, removed: &[usize]) {
        self.indexes.retain(|index| !removed.contains(index));
        for index in &mut self.indexes {
            *index -= decrease_by(removed, *index);
        }
    }

    fn len(&self) -> usize {
        self.indexes.len()
    }
}

fn is_permutation(indexes: &[usize]) -> bool {
    let mut sorted: Vec<usize> = indexes.to_vec();
    sorted.sort_unstable();
    sorted.iter().copied().eq(0..indexes.len())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn test_init_is_identity() {
        let mut sequence = SequenceMap::new();
        sequence.init(4);
        assert_eq!(sequence.indexes(), &[0, 1, 2, 3]);
        assert_eq!(sequence.len(), 4);
    }

    #[test]
    fn test_insert_splices_values() {
        let mut sequence = SequenceMap::new();
        sequence.init(5);
        sequence.insert(1, &[5, 6]);
        assert_eq!(sequence.indexes(), &[0, 5, 6, 1, 2, 3, 4]);
    }

    #[test]
    fn test_insert_past_end_appends() {
        let mut sequence = SequenceMap::new();
        sequence.init(2);
        sequence.insert(9, &[2]);
        assert_eq!(sequence.indexes(), &[0, 1, 2]);
    }

    #[test]
    fn test_remove_renumbers_survivors() {
        let mut sequence = SequenceMap::new();
        sequence.init(5);
        sequence.remove(&[1, 3]);
        assert_eq!(sequence.indexes(), &[0, 1, 2]);
    }

    #[test]
    fn test_remove_respects_order() {
        let mut sequence = SequenceMap::new();
        sequence.init(5);
        // Reordered: [4, 3, 2, 1, 0]; removing physical 2 keeps the rest
        // in relative order and compacts the numbering.
        sequence.set_indexes(vec![4, 3, 2, 1, 0]);
        sequence.remove(&[2]);
        assert_eq!(sequence.indexes(), &[3, 2, 1, 0]);
    }

    #[test]
    fn test_position_lookup() {
        let mut sequence = SequenceMap::new();
        sequence.init(3);
        sequence.set_indexes(vec![2, 0, 1]);
        assert_eq!(sequence.at(0), Some(2));
        assert_eq!(sequence.at(3), None);
        assert_eq!(sequence.position_of(1), Some(2));
        assert_eq!(sequence.position_of(9), None);
    }
}
