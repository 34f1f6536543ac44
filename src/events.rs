//! Change notification channel for the index mapper.
//!
//! The mapper owns its listeners and dispatches synchronously, inline with
//! the mutation that caused the event. Because listeners are owned by the
//! mapper and receive only the event payload, a listener cannot call back
//! into the mapper it is subscribed to; the borrow checker rules
//! reentrant mutation out at compile time.

use crate::maps::MapKind;

/// What a structural mutation touched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change {
    /// The visual order itself changed (init, insert, remove, or move on
    /// the sequence).
    Sequence,
    /// Maps in one collection changed, aggregated per operation.
    Maps {
        /// The collection the changed maps belong to.
        kind: MapKind,
        /// Names of the maps that changed, in registration order.
        names: Vec<String>,
    },
}

type ChangeListener = Box<dyn FnMut(&Change)>;
type Listener = Box<dyn FnMut()>;

/// Subscriber registry for the mapper's three events.
#[derive(Default)]
pub(crate) struct EventBus {
    change: Vec<ChangeListener>,
    init: Vec<Listener>,
    cache_updated: Vec<Listener>,
}

impl EventBus {
    pub(crate) fn on_change(&mut self, listener: impl FnMut(&Change) + 'static) {
        self.change.push(Box::new(listener));
    }

    pub(crate) fn on_init(&mut self, listener: impl FnMut() + 'static) {
        self.init.push(Box::new(listener));
    }

    pub(crate) fn on_cache_updated(&mut self, listener: impl FnMut() + 'static) {
        self.cache_updated.push(Box::new(listener));
    }

    pub(crate) fn emit_change(&mut self, change: &Change) {
        for listener in &mut self.change {
            listener(change);
        }
    }

    pub(crate) fn emit_init(&mut self) {
        for listener in &mut self.init {
            listener();
        }
    }

    pub(crate) fn emit_cache_updated(&mut self) {
        for listener in &mut self.cache_updated {
            listener();
        }
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("change", &self.change.len())
            .field("init", &self.init.len())
            .field("cache_updated", &self.cache_updated.len())
            .finish()
    }
}
