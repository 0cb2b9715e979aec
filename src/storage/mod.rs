//! Storage backends for the taxonomy graph
//!
//! Backends implement the `TaxonStore` trait. The primary implementation
//! is `SqliteStore`, which enforces node and edge uniqueness in its schema.

mod sqlite;
mod traits;

pub use sqlite::{is_valid_graph_name, SqliteStore};
pub use traits::{
    ChainWriter, GraphStats, OpenStore, StorageError, StorageErrorKind, StorageResult, TaxonStore,
};
