//! Generic per-physical-index payload maps.
//!
//! A value map lets a feature attach arbitrary data to physical indexes
//! (a header label bound to a row, a column width) and have it follow the
//! index through insertions, removals, and moves without the feature
//! tracking indexes itself.

use std::any::Any;

use serde::{Deserialize, Serialize};

use super::IndexMap;

/// Arbitrary payload per physical index.
///
/// New and reinitialized entries take the default supplied at
/// construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueMap<T> {
    values: Vec<T>,
    default: T,
}

impl<T: Clone> ValueMap<T> {
    /// Create an empty value map with the given default payload.
    pub fn new(default: T) -> Self {
        Self {
            values: Vec::new(),
            default,
        }
    }

    /// Payload at `physical`, if in range.
    pub fn get(&self, physical: usize) -> Option<&T> {
        self.values.get(physical)
    }

    /// Replace the payload at `physical`. Out-of-range indexes are
    /// ignored.
    pub fn set(&mut self, physical: usize, value: T) {
        if let Some(slot) = self.values.get_mut(physical) {
            *slot = value;
        }
    }

    /// All payloads, indexed by physical index.
    pub fn values(&self) -> &[T] {
        &self.values
    }

    /// Replace all payloads at once. Length must stay in step with the
    /// mapper's physical count; `init` is the way to resize.
    pub fn set_values(&mut self, values: Vec<T>) {
        self.values = values;
    }
}

impl<T: Clone> IndexMap for ValueMap<T> {
    fn init(&mut self, length: usize) {
        self.values = vec![self.default.clone(); length];
    }

    fn insert(&mut self, at: usize, inserted: &[usize]) {
        let at = at.min(self.values.len());
        self.values.splice(
            at..at,
            std::iter::repeat(self.default.clone()).take(inserted.len()),
        );
    }

    fn remove(&mut self, removed: &[usize]) {
        let mut physical = 0;
        self.values.retain(|_| {
            let keep = !removed.contains(&physical);
            physical += 1;
            keep
        });
    }

    fn len(&self) -> usize {
        self.values.len()
    }
}

/// Object-safe view of a [`ValueMap`], letting one collection hold maps
/// with different payload types. Typed access goes through the
/// orchestrator, which downcasts back to the concrete `ValueMap<T>`.
pub trait ErasedMap: IndexMap {
    /// Upcast for typed read access.
    fn as_any(&self) -> &dyn Any;

    /// Upcast for typed write access.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Clone + 'static> ErasedMap for ValueMap<T> {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

impl IndexMap for Box<dyn ErasedMap> {
    fn init(&mut self, length: usize) {
        (**self).init(length);
    }

    fn insert(&mut self, at: usize, inserted: &[usize]) {
        (**self).insert(at, inserted);
    }

    fn remove(&mut self, removed: &[usize]) {
        (**self).remove(removed);
    }

    fn len(&self) -> usize {
        (**self).len()
    }
}
