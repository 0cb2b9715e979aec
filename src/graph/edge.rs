//! Membership edges between adjacent ranks

use super::node::TaxonId;
use super::rank::Rank;
use serde::{Deserialize, Serialize};

/// A membership edge: `from` (child node) belongs to `to` (parent node)
///
/// Edges always run from the more specific rank to the next less specific
/// one and live in the edge set named after the parent rank
/// (`{parent}Members`). Since ranks only ever link to their immediate
/// parent, the graph cannot contain a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MembershipEdge {
    /// Rank of the `to` node; selects the edge set
    pub parent_rank: Rank,
    /// Child node, one rank more specific than `parent_rank`
    pub from: TaxonId,
    /// Parent node
    pub to: TaxonId,
}

impl MembershipEdge {
    /// Build an edge from `child` to `parent`, where `parent` is of `parent_rank`.
    ///
    /// Returns `None` for Species, which has no member rank below it.
    pub fn new(parent_rank: Rank, child: TaxonId, parent: TaxonId) -> Option<Self> {
        parent_rank.child()?;
        Some(Self {
            parent_rank,
            from: child,
            to: parent,
        })
    }
}
