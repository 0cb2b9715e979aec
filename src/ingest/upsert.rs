//! Graph upsert: write a validated chain into the store idempotently

use crate::graph::{MembershipEdge, Rank, TaxonId, ValidatedChain};
use crate::storage::{ChainWriter, StorageError, StorageResult, TaxonStore};
use std::sync::Arc;
use tracing::debug;

/// What one chain upsert changed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpsertReport {
    /// Nodes inserted by this call
    pub nodes_created: usize,
    /// Nodes that already existed and were reused
    pub nodes_reused: usize,
    /// Edges inserted by this call
    pub edges_created: usize,
    /// Edges that already existed
    pub edges_reused: usize,
    /// Id of the chain's Species node
    pub species_id: Option<TaxonId>,
}

impl UpsertReport {
    /// True if the chain was already fully present in the store
    pub fn is_noop(&self) -> bool {
        self.nodes_created == 0 && self.edges_created == 0
    }
}

/// Writes validated chains into a `TaxonStore`
///
/// Holds no state besides the store handle; every call is independent and
/// may run concurrently with others. Idempotence comes from the store's
/// atomic get-or-create operations, so re-submitting a chain, or racing
/// with a chain that shares ancestors, never duplicates anything.
#[derive(Clone)]
pub struct GraphUpserter {
    store: Arc<dyn TaxonStore>,
}

impl GraphUpserter {
    pub fn new(store: Arc<dyn TaxonStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn TaxonStore> {
        &self.store
    }

    /// Upsert every node of the chain and every edge between adjacent ranks.
    ///
    /// Runs top-down. Each edge goes from the current (child) node to the
    /// previous (parent) node, in the parent rank's edge set. The whole chain
    /// is one store transaction: if any write fails, none of them stick.
    pub fn upsert(&self, chain: &ValidatedChain) -> StorageResult<UpsertReport> {
        let mut report = UpsertReport::default();

        self.store.write_chain(&mut |writer| {
            report = Self::write_entries(writer, chain)?;
            Ok(())
        })?;

        Ok(report)
    }

    fn write_entries(writer: &dyn ChainWriter, chain: &ValidatedChain) -> StorageResult<UpsertReport> {
        let mut report = UpsertReport::default();
        let mut previous: Option<(TaxonId, Rank)> = None;

        for entry in chain.entries() {
            let node = writer.get_or_create_node(entry.rank, &entry.name, &entry.url)?;
            if node.created {
                report.nodes_created += 1;
                debug!(rank = %entry.rank, name = %entry.name, id = %node.id, "created node");
            } else {
                report.nodes_reused += 1;
            }

            if let Some((parent_id, parent_rank)) = previous {
                let edge = MembershipEdge::new(parent_rank, node.id, parent_id).ok_or_else(|| {
                    StorageError::Schema(format!("{} has no member rank", parent_rank))
                })?;
                if writer.get_or_create_edge(&edge)? {
                    report.edges_created += 1;
                } else {
                    report.edges_reused += 1;
                }
            }

            previous = Some((node.id, entry.rank));
        }

        report.species_id = previous
            .filter(|(_, rank)| *rank == Rank::Species)
            .map(|(id, _)| id);
        Ok(report)
    }
}
