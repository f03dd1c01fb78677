//! Prefix matching and ranking over a decoded shard.

mod matcher;
mod rank;

pub use matcher::{prefix_search, SearchMatch, SearchParams};
pub use rank::{rank_matches, RankedMatch};
