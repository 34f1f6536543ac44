//! axismap - index translation and caching engine for grid axes
//!
//! A grid shows its rows and columns in an order that rarely matches the
//! backing dataset: sorting reorders them, filtering skips some, hiding
//! suppresses others from rendering. This crate maintains the mapping
//! between *physical* indexes (stable slots in the dataset), *visual*
//! indexes (positions among not-skipped indexes), and *rendered* indexes
//! (positions among not-hidden indexes), and lets independent features
//! attach per-index state that survives insertions, removals, and moves.
//!
//! Translation happens on every render pass, so the mapper keeps derived
//! caches (flattened skip/hidden flags, filtered index lists) that settle
//! after each mutation, or once per [`IndexMapper::batch`] when several
//! mutations run as one transaction.
//!
//! # Usage
//!
//! ```
//! use axismap::{AxismapError, IndexMapper};
//!
//! fn main() -> Result<(), AxismapError> {
//!     let mut rows = IndexMapper::new();
//!     rows.init_to_length(5);
//!
//!     // Bind a label to each row; it sticks to the row, not the position.
//!     rows.register_value_map("row-headers", String::new())?;
//!     rows.update_value_map::<String>("row-headers", |labels| {
//!         labels.set(0, "first".into());
//!     })?;
//!
//!     rows.move_indexes(&[0], 2);
//!     assert_eq!(rows.physical_index(2), Some(0));
//!     let labels = rows.value_map::<String>("row-headers").unwrap();
//!     assert_eq!(labels.get(0).map(String::as_str), Some("first"));
//!
//!     // Filtering removes rows from the dataset view entirely.
//!     rows.register_skip_map("trimmed")?;
//!     rows.update_skip_map("trimmed", |map| map.set(1, true))?;
//!     assert_eq!(rows.visual_index(1), None);
//!     assert_eq!(rows.not_skipped_count(), 4);
//!     Ok(())
//! }
//! ```

pub mod collection;
pub mod error;
pub mod events;
pub mod maps;
pub mod mapper;

pub use collection::MapCollection;
pub use error::{AxismapError, Result};
pub use events::Change;
pub use mapper::IndexMapper;
pub use maps::{ErasedMap, FlagMap, IndexMap, MapKind, SequenceMap, ValueMap};
