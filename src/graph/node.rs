//! Taxon node representation in the classification graph

use super::rank::Rank;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::num::ParseIntError;
use std::str::FromStr;

/// Store-assigned identifier of a taxon node
///
/// Unique within the node collection of one rank; `(rank, id)` addresses a
/// node across the whole graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaxonId(i64);

impl TaxonId {
    /// Wrap a raw store key
    pub fn new(raw: i64) -> Self {
        Self(raw)
    }

    /// The raw store key
    pub fn get(self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for TaxonId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TaxonId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

impl From<i64> for TaxonId {
    fn from(raw: i64) -> Self {
        Self(raw)
    }
}

/// A taxon stored in the graph
///
/// There is at most one node per `(rank, name)` pair; later chains that
/// re-derive the same pair reuse this node unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxonNode {
    /// Store-assigned identifier
    pub id: TaxonId,
    /// Rank collection the node lives in
    pub rank: Rank,
    /// Scientific name as it appeared on the first page that introduced it
    pub name: String,
    /// Absolute URL of the taxon's page (may be empty)
    pub url: String,
    /// When the node was first created
    pub created_at: DateTime<Utc>,
}

/// Result of a get-or-create on a node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeUpsert {
    /// Id of the node, new or existing
    pub id: TaxonId,
    /// True if this call inserted the node
    pub created: bool,
}
