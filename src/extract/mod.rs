//! Classification-table extraction
//!
//! Pure functions from a parsed page to a taxon chain (or a signal saying
//! why the page yields none) and to the links worth following. Nothing here
//! touches the network or the store, so every rule can be exercised against
//! fixture documents.

mod chain;
mod links;
mod page;

pub use chain::{ChainExtractor, ExtractSignal};
pub use links::biota_links;
pub use page::Page;
