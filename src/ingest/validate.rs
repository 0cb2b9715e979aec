//! Sequence validation: admit only complete, ordered chains

use crate::graph::{Rank, RankedEntry, TaxonChain, ValidatedChain};
use thiserror::Error;

/// Why an extracted chain was rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("missing rank: {0}")]
    MissingRank(Rank),

    #[error("rank appears more than once: {0}")]
    DuplicateRank(Rank),

    #[error("rank out of order: expected {expected}, found {found}")]
    OutOfOrder { expected: Rank, found: Rank },
}

/// Check that `chain` names every canonical rank exactly once, in order.
///
/// Non-canonical rows (Clade, Subfamily, ...) are dropped from the result.
/// Missing ranks are reported first, in hierarchy order, so a chain missing
/// both Class and Species reports `MissingRank(Class)`.
pub fn validate_chain(chain: &TaxonChain) -> Result<ValidatedChain, ValidationError> {
    let canonical: Vec<(Rank, &crate::graph::TaxonEntry)> = chain
        .entries
        .iter()
        .filter_map(|entry| entry.canonical_rank().map(|rank| (rank, entry)))
        .collect();

    for rank in Rank::ALL {
        match canonical.iter().filter(|(r, _)| *r == rank).count() {
            0 => return Err(ValidationError::MissingRank(rank)),
            1 => {}
            _ => return Err(ValidationError::DuplicateRank(rank)),
        }
    }

    for (expected, (found, _)) in Rank::ALL.into_iter().zip(&canonical) {
        if expected != *found {
            return Err(ValidationError::OutOfOrder {
                expected,
                found: *found,
            });
        }
    }

    Ok(ValidatedChain::from_entries(
        canonical
            .into_iter()
            .map(|(rank, entry)| RankedEntry {
                rank,
                name: entry.name.clone(),
                url: entry.url.clone(),
            })
            .collect(),
    ))
}
