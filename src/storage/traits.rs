//! Storage trait definitions

use crate::graph::{MembershipEdge, NodeUpsert, Rank, TaxonId, TaxonNode};
use rusqlite::ErrorCode;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Date parsing error: {0}")]
    DateParse(String),

    #[error("Schema error: {0}")]
    Schema(String),

    #[error("Invalid graph name: {0}")]
    InvalidGraphName(String),

    #[error("Store connection lock poisoned")]
    LockPoisoned,
}

/// How a storage failure should be handled by callers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageErrorKind {
    /// Contention; the same operation may succeed if retried
    Transient,
    /// The store cannot be reached or written at all
    Unavailable,
    /// Anything else; scoped to the operation that failed
    Other,
}

impl StorageError {
    /// Classify this error for retry and abort decisions
    pub fn kind(&self) -> StorageErrorKind {
        match self {
            StorageError::Database(rusqlite::Error::SqliteFailure(e, _)) => match e.code {
                ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked => StorageErrorKind::Transient,
                ErrorCode::CannotOpen
                | ErrorCode::NotADatabase
                | ErrorCode::ReadOnly
                | ErrorCode::SystemIoFailure
                | ErrorCode::DiskFull
                | ErrorCode::DatabaseCorrupt
                | ErrorCode::PermissionDenied => StorageErrorKind::Unavailable,
                _ => StorageErrorKind::Other,
            },
            StorageError::Io(_) | StorageError::LockPoisoned => StorageErrorKind::Unavailable,
            _ => StorageErrorKind::Other,
        }
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Node and edge totals for a graph
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GraphStats {
    /// Node count per rank, in hierarchy order
    pub nodes_by_rank: Vec<(Rank, u64)>,
    /// Edge count over the whole named graph
    pub edges: u64,
}

impl GraphStats {
    pub fn total_nodes(&self) -> u64 {
        self.nodes_by_rank.iter().map(|(_, n)| n).sum()
    }
}

/// Writes available inside a store transaction
pub trait ChainWriter {
    /// Atomically fetch or create the node for `(rank, name)`
    fn get_or_create_node(&self, rank: Rank, name: &str, url: &str) -> StorageResult<NodeUpsert>;

    /// Atomically ensure the edge exists. Returns true if this call created it.
    fn get_or_create_edge(&self, edge: &MembershipEdge) -> StorageResult<bool>;
}

/// Trait for taxonomy graph storage backends
///
/// Implementations must be thread-safe (Send + Sync): every page worker
/// of a crawl writes through the same store.
pub trait TaxonStore: Send + Sync {
    /// Name of the graph binding all node collections and edge sets
    fn graph_name(&self) -> &str;

    // === Node Operations ===

    /// Atomically fetch the node for `(rank, name)`, creating it if absent.
    ///
    /// Never produces two nodes for the same pair, however many callers
    /// race on it. `url` is only written when the node is created.
    fn get_or_create_node(&self, rank: Rank, name: &str, url: &str) -> StorageResult<NodeUpsert>;

    /// Load a node by rank and id
    fn load_node(&self, rank: Rank, id: TaxonId) -> StorageResult<Option<TaxonNode>>;

    /// Find a node by rank and exact (case-sensitive) name
    fn find_node(&self, rank: Rank, name: &str) -> StorageResult<Option<TaxonNode>>;

    // === Edge Operations ===

    /// Atomically ensure the edge exists. Returns true if this call created it.
    fn get_or_create_edge(&self, edge: &MembershipEdge) -> StorageResult<bool>;

    /// Check whether an edge exists
    fn has_edge(&self, edge: &MembershipEdge) -> StorageResult<bool>;

    /// Run `write` in a single transaction.
    ///
    /// Commits if `write` returns `Ok`; otherwise every write it made is
    /// rolled back and its error returned.
    fn write_chain(
        &self,
        write: &mut dyn FnMut(&dyn ChainWriter) -> StorageResult<()>,
    ) -> StorageResult<()>;

    // === Graph Operations ===

    /// Nodes with a direct edge into `(rank, id)`, one hop over the named graph
    fn inbound_neighbors(&self, rank: Rank, id: TaxonId) -> StorageResult<Vec<TaxonNode>>;

    /// Node and edge totals
    fn stats(&self) -> StorageResult<GraphStats>;
}

/// Extension trait for opening stores from paths
pub trait OpenStore: TaxonStore + Sized {
    /// Open or create a store at the given path, binding the named graph
    fn open(path: impl AsRef<Path>, graph_name: &str) -> StorageResult<Self>;

    /// Create an in-memory store (useful for testing)
    fn open_in_memory(graph_name: &str) -> StorageResult<Self>;
}
