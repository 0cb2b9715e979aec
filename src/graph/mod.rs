//! Core classification graph data structures

mod chain;
mod edge;
mod node;
mod rank;


pub use chain::{RankedEntry, TaxonChain, TaxonEntry, ValidatedChain};
pub use edge::MembershipEdge;
pub use node::{NodeUpsert, TaxonId, TaxonNode};
pub use rank::{Rank, UnknownRank};
