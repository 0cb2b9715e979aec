//! Point reads and child listings

use crate::graph::{Rank, TaxonId, TaxonNode, UnknownRank};
use crate::storage::{StorageError, TaxonStore};
use std::sync::Arc;
use thiserror::Error;

/// Errors returned by taxon queries
#[derive(Debug, Error)]
pub enum QueryError {
    #[error(transparent)]
    UnknownRank(#[from] UnknownRank),

    #[error("invalid taxon id: {0}")]
    InvalidId(String),

    #[error("taxon not found: {rank}/{id}")]
    NotFound { rank: Rank, id: TaxonId },

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Parse a `(rank, id)` address as it appears in a request path.
///
/// The rank is matched case-insensitively; the id must be an integer.
pub fn parse_address(rank: &str, id: &str) -> Result<(Rank, TaxonId), QueryError> {
    let rank: Rank = rank.parse()?;
    let id: TaxonId = id
        .parse()
        .map_err(|_| QueryError::InvalidId(id.to_string()))?;
    Ok((rank, id))
}

/// Read-side access to a taxon store
#[derive(Clone)]
pub struct TaxonQuery {
    store: Arc<dyn TaxonStore>,
}

impl TaxonQuery {
    pub fn new(store: Arc<dyn TaxonStore>) -> Self {
        Self { store }
    }

    /// Fetch one node
    pub fn get(&self, rank: Rank, id: TaxonId) -> Result<TaxonNode, QueryError> {
        self.store
            .load_node(rank, id)?
            .ok_or(QueryError::NotFound { rank, id })
    }

    /// Direct children of a node: one hop inbound over the named graph.
    ///
    /// Order is unspecified. Species nodes have none.
    pub fn children(&self, rank: Rank, id: TaxonId) -> Result<Vec<TaxonNode>, QueryError> {
        self.get(rank, id)?;
        if rank == Rank::Species {
            return Ok(Vec::new());
        }
        Ok(self.store.inbound_neighbors(rank, id)?)
    }
}
