//! Shared fixtures for integration tests
#![allow(dead_code)]

pub mod pages;
pub mod stores;

pub use pages::{
    classification_page, eunice_lineage, eunice_species_page, oak_page, plain_page, title_of,
    wiki_url, Row,
};
pub use stores::{PanickingFetcher, PanickingStore, StubFetcher, UnavailableStore};

use std::sync::Arc;
use taxograph::{OpenStore, SqliteStore, TaxonStore};

/// Fresh in-memory store bound to the default graph
pub fn memory_store() -> Arc<dyn TaxonStore> {
    Arc::new(SqliteStore::open_in_memory("animal_kingdom").unwrap())
}
