//! Ordered, name-keyed registries of index maps that share a capability.

use crate::maps::IndexMap;

/// A registry of index maps, iterated in registration order.
//
// Name uniqueness is enforced by the owning orchestrator across all of its
// collections, not here: a skip map and a hidden map must not share a name
// either, and only the orchestrator can see both.
#[derive(Debug, Default)]
pub struct MapCollection<M> {
    entries: Vec<(String, M)>,
}

impl<M: IndexMap> MapCollection<M> {
    /// Create an empty collection.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Add a map under `name`.
    pub fn register(&mut self, name: impl Into<String>, map: M) {
        self.entries.push((name.into(), map));
    }

    /// Remove the map registered under `name` and return it. Unknown names
    /// are a no-op.
    pub fn unregister(&mut self, name: &str) -> Option<M> {
        let position = self.entries.iter().position(|(entry, _)| entry == name)?;
        Some(self.entries.remove(position).1)
    }

    /// The map registered under `name`.
    pub fn get(&self, name: &str) -> Option<&M> {
        self.entries
            .iter()
            .find(|(entry, _)| entry == name)
            .map(|(_, map)| map)
    }

    /// Mutable access to the map registered under `name`.
    pub fn get_mut(&mut self, name: &str) -> Option<&mut M> {
        self.entries
            .iter_mut()
            .find(|(entry, _)| entry == name)
            .map(|(_, map)| map)
    }

    /// Whether a map is registered under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(entry, _)| entry == name)
    }

    /// All registered maps, in registration order.
    pub fn maps(&self) -> impl Iterator<Item = &M> {
        self.entries.iter().map(|(_, map)| map)
    }

    /// Registered names, in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    /// Number of registered maps.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no maps are registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Reinitialize every registered map to `length`. Returns the names of
    /// the maps that changed, for the aggregated-change payload.
    pub fn init_every(&mut self, length: usize) -> Vec<String> {
        self.for_every(|map| map.init(length))
    }

    /// Fan an insert out to every registered map.
    pub fn insert_to_every(&mut self, at: usize, inserted: &[usize]) -> Vec<String> {
        self.for_every(|map| map.insert(at, inserted))
    }

    /// Fan a removal out to every registered map.
    pub fn remove_from_every(&mut self, removed: &[usize]) -> Vec<String> {
        self.for_every(|map| map.remove(removed))
    }

    fn for_every(&mut self, mut operation: impl FnMut(&mut M)) -> Vec<String> {
        let mut changed = Vec::with_capacity(self.entries.len());
        for (name, map) in &mut self.entries {
            operation(map);
            changed.push(name.clone());
        }
        changed
    }
}
