//! Taxograph: taxonomic classification graph builder
//!
//! Crawls encyclopedia species pages, reads the rank chain out of each
//! page's classification table, and merges it into a graph with one node
//! per `(rank, name)` and one edge per child → parent membership.
//!
//! # Pipeline
//!
//! - **extract**: classification table → raw `TaxonChain`
//! - **ingest**: validation to a complete Kingdom → Species chain, then an
//!   idempotent upsert into the store
//! - **crawl**: bounded worker pool walking classification-table links
//! - **query** / **server**: point reads and child listings over HTTP
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use taxograph::{IngestCoordinator, OpenStore, SqliteStore};
//!
//! let store = SqliteStore::open_in_memory("animal_kingdom").unwrap();
//! let coordinator = IngestCoordinator::new(Arc::new(store), "Animalia");
//! // Coordinator is ready to process fetched pages
//! ```

pub mod config;
pub mod crawl;
pub mod extract;
mod graph;
pub mod ingest;
pub mod query;
pub mod server;
pub mod storage;

pub use config::{ConfigError, TaxographConfig};
pub use crawl::{CrawlError, CrawlReport, Crawler, HttpFetcher, PageFetcher, UrlFilter};
pub use extract::{biota_links, ChainExtractor, ExtractSignal, Page};
pub use graph::{
    MembershipEdge, NodeUpsert, Rank, RankedEntry, TaxonChain, TaxonEntry, TaxonId, TaxonNode,
    UnknownRank, ValidatedChain,
};
pub use ingest::{
    validate_chain, GraphUpserter, IngestCoordinator, IngestError, IngestSettings, PageOutcome,
    PageReport, SkipReason, UpsertReport, ValidationError,
};
pub use query::{QueryError, TaxonQuery};
pub use storage::{
    ChainWriter, GraphStats, OpenStore, SqliteStore, StorageError, StorageErrorKind,
    StorageResult, TaxonStore,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
