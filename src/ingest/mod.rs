//! Ingestion: validate extracted chains and write them into the graph
//!
//! A page flows through three stages:
//! - `ChainExtractor` (in `extract`) reads the raw rank chain
//! - `validate_chain` admits only complete, ordered chains
//! - `GraphUpserter` writes nodes and edges idempotently
//!
//! `IngestCoordinator` wires the stages together and owns store retries.

mod coordinator;
mod upsert;
mod validate;

pub use coordinator::{IngestCoordinator, IngestSettings, PageOutcome, PageReport, SkipReason};
pub use upsert::{GraphUpserter, UpsertReport};
pub use validate::{validate_chain, ValidationError};

use crate::storage::StorageError;
use thiserror::Error;

/// Errors raised while ingesting a page
#[derive(Debug, Error)]
pub enum IngestError {
    /// The store stayed busy or could not be reached; the crawl must stop
    #[error("store unavailable after {attempts} attempt(s): {source}")]
    StoreUnavailable {
        attempts: u32,
        #[source]
        source: StorageError,
    },

    /// A store failure scoped to this page
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

impl IngestError {
    /// True if the crawl cannot continue after this error
    pub fn is_fatal(&self) -> bool {
        matches!(self, IngestError::StoreUnavailable { .. })
    }
}
