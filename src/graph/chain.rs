//! Taxon chains: the ordered lineage extracted from one page

use super::rank::Rank;
use serde::{Deserialize, Serialize};

/// One row of a classification table
///
/// `rank` is the raw label from the page. It is not necessarily canonical:
/// tables also carry rows such as "Clade" or "Subfamily".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxonEntry {
    pub rank: String,
    pub name: String,
    pub url: String,
}

impl TaxonEntry {
    pub fn new(rank: impl Into<String>, name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            rank: rank.into(),
            name: name.into(),
            url: url.into(),
        }
    }

    /// The canonical rank this row names, if any
    pub fn canonical_rank(&self) -> Option<Rank> {
        Rank::from_label(&self.rank)
    }
}

/// Entries extracted from one page, in table order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxonChain {
    pub entries: Vec<TaxonEntry>,
}

impl TaxonChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: TaxonEntry) {
        self.entries.push(entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True once the chain has reached its terminal Species row
    pub fn reaches_species(&self) -> bool {
        self.entries
            .last()
            .is_some_and(|e| e.canonical_rank() == Some(Rank::Species))
    }
}

impl FromIterator<TaxonEntry> for TaxonChain {
    fn from_iter<I: IntoIterator<Item = TaxonEntry>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// A canonical entry of a validated chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedEntry {
    pub rank: Rank,
    pub name: String,
    pub url: String,
}

/// A chain that covers every canonical rank exactly once, in order
///
/// Only the sequence validator constructs these, so holding one is proof
/// that the chain is admissible to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedChain {
    entries: Vec<RankedEntry>,
}

impl ValidatedChain {
    pub(crate) fn from_entries(entries: Vec<RankedEntry>) -> Self {
        debug_assert_eq!(entries.len(), Rank::ALL.len());
        Self { entries }
    }

    /// Entries in Kingdom → Species order
    pub fn entries(&self) -> &[RankedEntry] {
        &self.entries
    }

    /// The terminal Species entry
    pub fn species(&self) -> &RankedEntry {
        &self.entries[self.entries.len() - 1]
    }
}
