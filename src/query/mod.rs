//! Read queries over the classification graph
//!
//! Two operations back the read API: a point read of one taxon and a
//! one-hop inbound traversal listing its direct children.

mod taxon;

pub use taxon::{parse_address, QueryError, TaxonQuery};
