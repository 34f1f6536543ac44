//! Boolean per-physical-index maps, used by the skip and hidden
//! collections.

use serde::{Deserialize, Serialize};

use super::IndexMap;

/// One boolean per physical index.
///
/// A skip-collection flag removes the index from the dataset-facing view;
/// a hidden-collection flag only removes it from rendering. The map itself
/// is agnostic; the collection it is registered into decides the meaning.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlagMap {
    flags: Vec<bool>,
}

impl FlagMap {
    /// Create an empty flag map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `physical` is flagged. Out-of-range indexes read as `false`.
    pub fn get(&self, physical: usize) -> bool {
        self.flags.get(physical).copied().unwrap_or(false)
    }

    /// Flag or unflag `physical`. Out-of-range indexes are ignored.
    pub fn set(&mut self, physical: usize, flagged: bool) {
        if let Some(slot) = self.flags.get_mut(physical) {
            *slot = flagged;
        }
    }

    /// All flags, indexed by physical index.
    pub fn values(&self) -> &[bool] {
        &self.flags
    }

    /// Replace all flags at once. Length must stay in step with the
    /// mapper's physical count; `init` is the way to resize.
    pub fn set_values(&mut self, flags: Vec<bool>) {
        self.flags = flags;
    }

    /// Number of flagged indexes.
    pub fn flagged_count(&self) -> usize {
        self.flags.iter().filter(|&&flagged| flagged).count()
    }
}

impl IndexMap for FlagMap {
    fn init(&mut self, length: usize) {
        self.flags = vec![false; length];
    }

    fn insert(&mut self, at: usize, inserted: &[usize]) {
        let at = at.min(self.flags.len());
        self.flags
            .splice(at..at, std::iter::repeat(false).take(inserted.len()));
    }

    fn remove(&mut self, removed: &[usize]) {
        let mut physical = 0;
        self.flags.retain(|_| {
            let keep = !removed.contains(&physical);
            physical += 1;
            keep
        });
    }

    fn len(&self) -> usize {
        self.flags.len()
    }
}
