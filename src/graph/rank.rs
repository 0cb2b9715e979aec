//! Canonical taxonomic ranks

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One level of the fixed classification hierarchy.
///
/// Variants are declared ancestor → descendant, so the derived `Ord`
/// follows the hierarchy: `Kingdom < Phylum < ... < Species`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Rank {
    Kingdom,
    Phylum,
    Class,
    Order,
    Family,
    Genus,
    Species,
}

impl Rank {
    /// Every canonical rank, in ancestor → descendant order.
    pub const ALL: [Rank; 7] = [
        Rank::Kingdom,
        Rank::Phylum,
        Rank::Class,
        Rank::Order,
        Rank::Family,
        Rank::Genus,
        Rank::Species,
    ];

    /// The label used in classification tables ("Kingdom", "Species", ...)
    pub fn label(self) -> &'static str {
        match self {
            Rank::Kingdom => "Kingdom",
            Rank::Phylum => "Phylum",
            Rank::Class => "Class",
            Rank::Order => "Order",
            Rank::Family => "Family",
            Rank::Genus => "Genus",
            Rank::Species => "Species",
        }
    }

    /// Name of the node collection holding taxa of this rank
    pub fn collection(self) -> &'static str {
        match self {
            Rank::Kingdom => "kingdom",
            Rank::Phylum => "phylum",
            Rank::Class => "class",
            Rank::Order => "order",
            Rank::Family => "family",
            Rank::Genus => "genus",
            Rank::Species => "species",
        }
    }

    /// Name of the edge set linking members of this rank to it.
    ///
    /// `None` for Species, which has no members.
    pub fn members_collection(self) -> Option<String> {
        self.child().map(|_| format!("{}Members", self.collection()))
    }

    /// Exact match against a classification-table label.
    ///
    /// Case-sensitive: "Kingdom" matches, "kingdom" and "Subkingdom" do not.
    pub fn from_label(label: &str) -> Option<Rank> {
        Rank::ALL.into_iter().find(|rank| rank.label() == label)
    }

    /// Position in the hierarchy (Kingdom = 0)
    pub fn depth(self) -> usize {
        self as usize
    }

    /// The next less specific rank
    pub fn parent(self) -> Option<Rank> {
        self.depth().checked_sub(1).map(|d| Rank::ALL[d])
    }

    /// The next more specific rank
    pub fn child(self) -> Option<Rank> {
        Rank::ALL.get(self.depth() + 1).copied()
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Error returned when parsing an unknown rank name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown rank: {0}")]
pub struct UnknownRank(pub String);

impl FromStr for Rank {
    type Err = UnknownRank;

    /// Case-insensitive: accepts both collection names and labels.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Rank::ALL
            .into_iter()
            .find(|rank| rank.collection().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| UnknownRank(s.to_string()))
    }
}
