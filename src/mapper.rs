//! The index mapper: single source of truth for row/column index
//! translation.
//!
//! The mapper owns one [`SequenceMap`] (the physical permutation defining
//! visual order) plus three collections of registered maps: skip maps
//! (indexes removed from the dataset-facing view), hidden maps (indexes
//! excluded from rendering only), and generic value maps (arbitrary
//! per-index payloads). Every structural mutation (init, insert, remove,
//! move) is applied to the sequence and to every registered map in
//! lockstep, and settles the derived caches that make translation O(1)-ish
//! on the render path.
//!
//! All state is exclusively owned here. Features read registered maps
//! through the typed accessors and mutate them through the `update_*`
//! methods, so the caches can never drift from the maps they summarize.

use tracing::{debug, trace};

use crate::collection::MapCollection;
use crate::error::{AxismapError, Result};
use crate::events::{Change, EventBus};
use crate::maps::{ErasedMap, FlagMap, IndexMap, MapKind, SequenceMap, ValueMap};

/// Index translation and caching engine for one grid axis (rows or
/// columns).
pub struct IndexMapper {
    /// The physical permutation defining visual order.
    sequence: SequenceMap,
    /// Maps whose flagged indexes are removed from the dataset view.
    skip_maps: MapCollection<FlagMap>,
    /// Maps whose flagged indexes are excluded from rendering.
    hidden_maps: MapCollection<FlagMap>,
    /// Maps carrying arbitrary per-index payloads.
    value_maps: MapCollection<Box<dyn ErasedMap>>,
    /// Per-physical-index OR across all skip maps.
    flattened_skip: Vec<bool>,
    /// Per-physical-index OR across all skip and hidden maps.
    flattened_hidden: Vec<bool>,
    /// Sequence filtered by the skip flags; visual position -> physical.
    not_skipped: Vec<usize>,
    /// Sequence filtered by the hidden flags; rendered position ->
    /// physical.
    not_hidden: Vec<usize>,
    /// Cache recomputation is suppressed while a batch is running.
    batched: bool,
    /// Set when a mutation has outdated the caches.
    dirty: bool,
    events: EventBus,
}

impl IndexMapper {
    /// Create an empty mapper. Call [`init_to_length`](Self::init_to_length)
    /// once the backing dataset's size is known.
    pub fn new() -> Self {
        Self {
            sequence: SequenceMap::new(),
            skip_maps: MapCollection::new(),
            hidden_maps: MapCollection::new(),
            value_maps: MapCollection::new(),
            flattened_skip: Vec::new(),
            flattened_hidden: Vec::new(),
            not_skipped: Vec::new(),
            not_hidden: Vec::new(),
            batched: false,
            dirty: false,
            events: EventBus::default(),
        }
    }

    // ------------------------------------------------------------------
    // Subscriptions
    // ------------------------------------------------------------------

    /// Subscribe to structural changes (any mutation of the sequence or of
    /// a registered map).
    ///
    /// Dispatch is synchronous and inline with the mutation. Listeners are
    /// owned by the mapper, so they cannot hold a reference back to it;
    /// reentrant mutation from a listener does not compile.
    pub fn on_change(&mut self, listener: impl FnMut(&Change) + 'static) {
        self.events.on_change(listener);
    }

    /// Subscribe to full resets ([`init_to_length`](Self::init_to_length)).
    pub fn on_init(&mut self, listener: impl FnMut() + 'static) {
        self.events.on_init(listener);
    }

    /// Subscribe to cache settlement. Fires once per settled mutation, or
    /// once per batch.
    pub fn on_cache_updated(&mut self, listener: impl FnMut() + 'static) {
        self.events.on_cache_updated(listener);
    }

    // ------------------------------------------------------------------
    // Registration
    // ------------------------------------------------------------------

    /// Register a skip map under a unique name.
    ///
    /// The map is initialized to the current physical count, unless no
    /// data has been loaded yet; an empty init would record no real
    /// change, so it is deferred to the next
    /// [`init_to_length`](Self::init_to_length).
    ///
    /// # Errors
    /// [`AxismapError::DuplicateMap`] if the name is registered in any
    /// collection; existing state is left untouched.
    pub fn register_skip_map(&mut self, name: impl Into<String>) -> Result<()> {
        let name = self.claim_name(name)?;
        let mut map = FlagMap::new();
        let initialized = self.init_new_map(&mut map);
        self.skip_maps.register(name.clone(), map);
        if initialized {
            self.collection_changed(MapKind::Skip, vec![name]);
        }
        Ok(())
    }

    /// Register a hidden map under a unique name. Same contract as
    /// [`register_skip_map`](Self::register_skip_map).
    ///
    /// # Errors
    /// [`AxismapError::DuplicateMap`] if the name is registered in any
    /// collection.
    pub fn register_hidden_map(&mut self, name: impl Into<String>) -> Result<()> {
        let name = self.claim_name(name)?;
        let mut map = FlagMap::new();
        let initialized = self.init_new_map(&mut map);
        self.hidden_maps.register(name.clone(), map);
        if initialized {
            self.collection_changed(MapKind::Hidden, vec![name]);
        }
        Ok(())
    }

    /// Register a generic value map under a unique name. Entries default
    /// to `default` and follow their physical index through structural
    /// changes.
    ///
    /// # Errors
    /// [`AxismapError::DuplicateMap`] if the name is registered in any
    /// collection.
    pub fn register_value_map<T: Clone + 'static>(
        &mut self,
        name: impl Into<String>,
        default: T,
    ) -> Result<()> {
        let name = self.claim_name(name)?;
        let mut map: Box<dyn ErasedMap> = Box::new(ValueMap::new(default));
        let initialized = self.init_new_map(&mut map);
        self.value_maps.register(name.clone(), map);
        if initialized {
            self.collection_changed(MapKind::Generic, vec![name]);
        }
        Ok(())
    }

    /// Unregister the map with the given name, from whichever collection
    /// holds it. Unknown names are a no-op; unregister is idempotent.
    pub fn unregister_map(&mut self, name: &str) {
        if self.skip_maps.unregister(name).is_some() {
            self.collection_changed(MapKind::Skip, vec![name.to_string()]);
        } else if self.hidden_maps.unregister(name).is_some() {
            self.collection_changed(MapKind::Hidden, vec![name.to_string()]);
        } else if self.value_maps.unregister(name).is_some() {
            self.collection_changed(MapKind::Generic, vec![name.to_string()]);
        }
    }

    /// Which collection the named map belongs to, if registered.
    pub fn map_kind(&self, name: &str) -> Option<MapKind> {
        if self.skip_maps.contains(name) {
            Some(MapKind::Skip)
        } else if self.hidden_maps.contains(name) {
            Some(MapKind::Hidden)
        } else if self.value_maps.contains(name) {
            Some(MapKind::Generic)
        } else {
            None
        }
    }

    // ------------------------------------------------------------------
    // Map access
    // ------------------------------------------------------------------

    /// The registered skip map with the given name.
    pub fn skip_map(&self, name: &str) -> Option<&FlagMap> {
        self.skip_maps.get(name)
    }

    /// The registered hidden map with the given name.
    pub fn hidden_map(&self, name: &str) -> Option<&FlagMap> {
        self.hidden_maps.get(name)
    }

    /// The registered value map with the given name, if its payload type
    /// is `T`.
    pub fn value_map<T: Clone + 'static>(&self, name: &str) -> Option<&ValueMap<T>> {
        self.value_maps
            .get(name)
            .and_then(|map| map.as_any().downcast_ref())
    }

    /// Mutate a registered skip map. The caches settle and a change
    /// notification fires once the closure returns.
    ///
    /// # Errors
    /// [`AxismapError::UnknownMap`] if no skip map has that name.
    pub fn update_skip_map(
        &mut self,
        name: &str,
        update: impl FnOnce(&mut FlagMap),
    ) -> Result<()> {
        let map = self
            .skip_maps
            .get_mut(name)
            .ok_or_else(|| AxismapError::UnknownMap(name.to_string()))?;
        update(map);
        self.collection_changed(MapKind::Skip, vec![name.to_string()]);
        Ok(())
    }

    /// Mutate a registered hidden map. Same contract as
    /// [`update_skip_map`](Self::update_skip_map).
    ///
    /// # Errors
    /// [`AxismapError::UnknownMap`] if no hidden map has that name.
    pub fn update_hidden_map(
        &mut self,
        name: &str,
        update: impl FnOnce(&mut FlagMap),
    ) -> Result<()> {
        let map = self
            .hidden_maps
            .get_mut(name)
            .ok_or_else(|| AxismapError::UnknownMap(name.to_string()))?;
        update(map);
        self.collection_changed(MapKind::Hidden, vec![name.to_string()]);
        Ok(())
    }

    /// Mutate a registered value map with payload type `T`.
    ///
    /// # Errors
    /// [`AxismapError::UnknownMap`] if no value map has that name,
    /// [`AxismapError::PayloadType`] if it holds a different payload type.
    pub fn update_value_map<T: Clone + 'static>(
        &mut self,
        name: &str,
        update: impl FnOnce(&mut ValueMap<T>),
    ) -> Result<()> {
        let erased = self
            .value_maps
            .get_mut(name)
            .ok_or_else(|| AxismapError::UnknownMap(name.to_string()))?;
        let map = erased
            .as_any_mut()
            .downcast_mut::<ValueMap<T>>()
            .ok_or_else(|| AxismapError::PayloadType(name.to_string()))?;
        update(map);
        self.collection_changed(MapKind::Generic, vec![name.to_string()]);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Translation
    // ------------------------------------------------------------------

    /// Physical index at the given visual position, or `None` past the
    /// visible end.
    pub fn physical_index(&self, visual: usize) -> Option<usize> {
        self.not_skipped.get(visual).copied()
    }

    /// Visual position of the given physical index, or `None` if it is
    /// currently skipped or out of range.
    pub fn visual_index(&self, physical: usize) -> Option<usize> {
        self.not_skipped.iter().position(|&index| index == physical)
    }

    /// Physical index at the given rendered position, or `None` past the
    /// rendered end.
    pub fn renderable_index(&self, rendered: usize) -> Option<usize> {
        self.not_hidden.get(rendered).copied()
    }

    /// Whether the physical index is removed from the dataset view by any
    /// skip map.
    pub fn is_skipped(&self, physical: usize) -> bool {
        self.flattened_skip.get(physical).copied().unwrap_or(false)
    }

    /// Whether the physical index is excluded from rendering. Skipped
    /// indexes are always hidden as well.
    pub fn is_hidden(&self, physical: usize) -> bool {
        self.flattened_hidden.get(physical).copied().unwrap_or(false)
    }

    /// All physical indexes in visual order.
    pub fn indexes_sequence(&self) -> &[usize] {
        self.sequence.indexes()
    }

    /// Replace the whole visual order. `indexes` must be a permutation of
    /// the current physical indexes; sorting features use this to apply a
    /// computed order in one step.
    pub fn set_indexes_sequence(&mut self, indexes: Vec<usize>) {
        self.sequence.set_indexes(indexes);
        self.sequence_changed();
    }

    /// Physical indexes not skipped, in visual order.
    pub fn not_skipped_indexes(&self) -> &[usize] {
        &self.not_skipped
    }

    /// Physical indexes not hidden, in rendered order.
    pub fn not_hidden_indexes(&self) -> &[usize] {
        &self.not_hidden
    }

    /// Number of visible (not skipped) indexes.
    pub fn not_skipped_count(&self) -> usize {
        self.not_skipped.len()
    }

    /// Number of renderable (not hidden) indexes.
    pub fn not_hidden_count(&self) -> usize {
        self.not_hidden.len()
    }

    /// Total number of physical indexes.
    pub fn index_count(&self) -> usize {
        self.sequence.len()
    }

    // ------------------------------------------------------------------
    // Structural mutation
    // ------------------------------------------------------------------

    /// Reset the sequence and every registered map to `length` entries
    /// with default values, discarding prior per-index data. Called
    /// whenever the backing dataset's size is established or fully
    /// reloaded.
    pub fn init_to_length(&mut self, length: usize) {
        debug!(length, "resetting index mapper");
        self.batch(|mapper| {
            mapper.sequence.init(length);
            mapper.sequence_changed();
            let changed = mapper.skip_maps.init_every(length);
            mapper.collection_changed(MapKind::Skip, changed);
            let changed = mapper.hidden_maps.init_every(length);
            mapper.collection_changed(MapKind::Hidden, changed);
            let changed = mapper.value_maps.init_every(length);
            mapper.collection_changed(MapKind::Generic, changed);
        });
        self.events.emit_init();
    }

    /// Insert `amount` brand-new physical indexes at the given visual
    /// position.
    ///
    /// New physical index values are minted past the current maximum,
    /// never reusing existing ones, and spliced into the sequence at the
    /// physical slot corresponding to `first_visual` (or appended when the
    /// insertion point is at or past the visible end). Every registered
    /// map grows matching default entries. Runs as one batch, so the
    /// caches settle once.
    pub fn insert_indexes(&mut self, first_visual: usize, amount: usize) {
        if amount == 0 {
            return;
        }
        let count = self.index_count();
        let nth_visible = self.not_skipped.get(first_visual).copied();
        let sequence_position = nth_visible
            .and_then(|physical| self.sequence.position_of(physical))
            .unwrap_or(count);
        let minted: Vec<usize> = (count..count + amount).collect();
        debug!(first_visual, amount, "inserting indexes");

        self.batch(|mapper| {
            mapper.sequence.insert(sequence_position, &minted);
            mapper.sequence_changed();
            // Minted indexes sit past the old maximum, so their physical
            // position in every per-index map is the old count.
            let changed = mapper.skip_maps.insert_to_every(count, &minted);
            mapper.collection_changed(MapKind::Skip, changed);
            let changed = mapper.hidden_maps.insert_to_every(count, &minted);
            mapper.collection_changed(MapKind::Hidden, changed);
            let changed = mapper.value_maps.insert_to_every(count, &minted);
            mapper.collection_changed(MapKind::Generic, changed);
        });
    }

    /// Remove the given physical indexes from the sequence and from every
    /// registered map, compacting the numbering. The caller resolves
    /// visual indexes to physical ones beforehand. Runs as one batch.
    pub fn remove_indexes(&mut self, physical: &[usize]) {
        if physical.is_empty() {
            return;
        }
        debug!(?physical, "removing indexes");
        self.batch(|mapper| {
            mapper.sequence.remove(physical);
            mapper.sequence_changed();
            let changed = mapper.skip_maps.remove_from_every(physical);
            mapper.collection_changed(MapKind::Skip, changed);
            let changed = mapper.hidden_maps.remove_from_every(physical);
            mapper.collection_changed(MapKind::Hidden, changed);
            let changed = mapper.value_maps.remove_from_every(physical);
            mapper.collection_changed(MapKind::Generic, changed);
        });
    }

    /// Reorder the sequence so the moved visual indexes occupy the
    /// destination, preserving the relative order of the moved set and of
    /// all untouched indexes.
    ///
    /// Moved indexes that do not resolve to a physical index are dropped
    /// from the move. If the destination plus the moved count would run
    /// past the visible end, the indexes land at the end.
    pub fn move_indexes(&mut self, moved_visual: &[usize], final_index: usize) {
        let physical: Vec<usize> = moved_visual
            .iter()
            .filter_map(|&visual| self.physical_index(visual))
            .collect();
        if physical.is_empty() {
            return;
        }
        let visible_count = self.not_skipped_count();
        let moved_count = physical.len();
        debug!(?physical, final_index, "moving indexes");

        // Take the moved values out without renumbering; a move never
        // changes which physical indexes exist.
        let mut remaining: Vec<usize> = self
            .sequence
            .indexes()
            .iter()
            .copied()
            .filter(|index| !physical.contains(index))
            .collect();

        // Past the last visible slot, the moved block lands at the end.
        let mut destination = visible_count.saturating_sub(moved_count);
        if final_index + moved_count < visible_count {
            // Physical index occupying the destination among the
            // not-skipped remainder.
            let target = remaining
                .iter()
                .copied()
                .filter(|&index| !self.is_skipped(index))
                .nth(final_index);
            if let Some(target) = target {
                destination = remaining
                    .iter()
                    .position(|&index| index == target)
                    .unwrap_or(remaining.len());
            }
        }

        let destination = destination.min(remaining.len());
        remaining.splice(destination..destination, physical);
        self.sequence.set_indexes(remaining);
        self.sequence_changed();
    }

    /// Run several mutations with cache recomputation suppressed, then
    /// settle the caches exactly once.
    ///
    /// Nested batches are safe: an inner batch restores the outer batch
    /// flag instead of clearing it, so the caches settle when the
    /// outermost batch ends.
    pub fn batch<R>(&mut self, operations: impl FnOnce(&mut Self) -> R) -> R {
        let was_batched = self.batched;
        self.batched = true;
        let result = operations(self);
        self.batched = was_batched;
        self.update_cache();
        result
    }

    // ------------------------------------------------------------------
    // Caches
    // ------------------------------------------------------------------

    fn sequence_changed(&mut self) {
        self.dirty = true;
        self.update_cache();
        self.events.emit_change(&Change::Sequence);
    }

    fn collection_changed(&mut self, kind: MapKind, names: Vec<String>) {
        if names.is_empty() {
            return;
        }
        // Generic maps carry payloads only; they cannot affect which
        // indexes are skipped or hidden.
        if kind != MapKind::Generic {
            self.dirty = true;
            self.update_cache();
        }
        self.events.emit_change(&Change::Maps { kind, names });
    }

    /// Recompute the flattened skip/hidden flags and the filtered index
    /// lists. A no-op while batched or while the caches are current.
    fn update_cache(&mut self) {
        if self.batched || !self.dirty {
            return;
        }
        let count = self.sequence.len();
        self.flattened_skip = flatten(count, self.skip_maps.maps());
        self.flattened_hidden = flatten(
            count,
            // Skipped implies hidden: an index absent from the dataset
            // view cannot be rendered either.
            self.skip_maps.maps().chain(self.hidden_maps.maps()),
        );
        self.not_skipped = filter_sequence(self.sequence.indexes(), &self.flattened_skip);
        self.not_hidden = filter_sequence(self.sequence.indexes(), &self.flattened_hidden);
        self.dirty = false;
        trace!(
            count,
            visible = self.not_skipped.len(),
            renderable = self.not_hidden.len(),
            "index caches rebuilt"
        );
        self.events.emit_cache_updated();
    }

    fn claim_name(&self, name: impl Into<String>) -> Result<String> {
        let name = name.into();
        if self.map_kind(&name).is_some() {
            return Err(AxismapError::DuplicateMap(name));
        }
        Ok(name)
    }

    /// Initialize a freshly registered map to the current physical count.
    /// Skipped while no data is loaded; the next
    /// [`init_to_length`](Self::init_to_length) covers it.
    fn init_new_map(&self, map: &mut impl IndexMap) -> bool {
        let count = self.index_count();
        if count == 0 {
            return false;
        }
        map.init(count);
        true
    }
}

impl Default for IndexMapper {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for IndexMapper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexMapper")
            .field("index_count", &self.index_count())
            .field("not_skipped", &self.not_skipped.len())
            .field("not_hidden", &self.not_hidden.len())
            .field("skip_maps", &self.skip_maps.len())
            .field("hidden_maps", &self.hidden_maps.len())
            .field("value_maps", &self.value_maps.len())
            .field("batched", &self.batched)
            .field("dirty", &self.dirty)
            .finish_non_exhaustive()
    }
}

/// OR the flags of every map together, per physical index.
fn flatten<'a>(count: usize, maps: impl Iterator<Item = &'a FlagMap>) -> Vec<bool> {
    let mut flattened = vec![false; count];
    for map in maps {
        for (physical, &flagged) in map.values().iter().enumerate().take(count) {
            if flagged {
                if let Some(slot) = flattened.get_mut(physical) {
                    *slot = true;
                }
            }
        }
    }
    flattened
}

/// Sequence filtered down to the indexes whose flag is not set, keeping
/// sequence order.
fn filter_sequence(sequence: &[usize], excluded: &[bool]) -> Vec<usize> {
    sequence
        .iter()
        .copied()
        .filter(|&physical| !excluded.get(physical).copied().unwrap_or(false))
        .collect()
}
