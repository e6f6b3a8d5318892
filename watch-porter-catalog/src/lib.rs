//! Persistent per-model catalog of resolved watch attributes.
//!
//! The catalog is a single JSON object keyed by normalized model key. It is
//! read once at startup, mutated in memory, and rewritten in full after every
//! change.

pub mod generate;
pub mod store;
pub mod types;

pub use generate::{collections_for_entry, generate_entry};
pub use store::{CatalogStore, default_catalog_path};
pub use types::*;
