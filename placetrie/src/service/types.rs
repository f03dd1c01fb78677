//! Lookup result types.

use crate::shard::{Location, PlaceKind};

/// One ranked lookup candidate, ready for display.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    /// Display name spelled by the trie path, original casing preserved.
    pub display: String,
    /// The underlying location record.
    pub location: Location,
    /// "Locality, City" label, falling back to whichever is present.
    pub place_label: String,
    pub kind: PlaceKind,
    pub population_bucket: u8,
    /// True when the folded display equals the folded query.
    pub exact: bool,
}

/// Outcome of a single lookup call.
#[derive(Debug, Clone, PartialEq)]
pub enum LookupOutcome {
    /// The street part of the query folds to nothing.
    Empty { min_length: usize },
    /// The folded query is shorter than the shard prefix.
    Short { min_length: usize },
    /// A newer lookup started before this one finished; its result wins.
    Stale { shard_key: String },
    /// No shard data is available for this prefix.
    Missing { shard_key: String },
    /// Ranked candidates from the shard.
    Ready {
        shard_key: String,
        /// False when the shard came straight from the cache.
        loaded: bool,
        /// Total location records in the shard, for display.
        locations: usize,
        results: Vec<Candidate>,
    },
}

impl LookupOutcome {
    /// Status discriminator, stable across versions.
    pub fn status(&self) -> &'static str {
        match self {
            LookupOutcome::Empty { .. } => "empty",
            LookupOutcome::Short { .. } => "short",
            LookupOutcome::Stale { .. } => "stale",
            LookupOutcome::Missing { .. } => "missing",
            LookupOutcome::Ready { .. } => "ready",
        }
    }
}
