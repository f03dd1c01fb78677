//! Ranking of collected matches.
//!
//! Large cities should dominate when their name matches the query exactly;
//! otherwise streets come before other points of interest. The comparison is
//! a stable lexicographic key, so equal inputs always produce the same order.

use crate::shard::{Location, PlaceKind};
use crate::text::fold_key;

use super::matcher::SearchMatch;

/// A match annotated with its exactness flag, in final display order.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedMatch {
    pub display: String,
    pub location: Location,
    pub exact: bool,
}

/// Sort matches for display.
///
/// Key order: exact matches first, then kind group (city, street, other
/// POIs), then higher population bucket, then lower kind code, then shorter
/// display, then byte-wise display comparison.
pub fn rank_matches(matches: Vec<SearchMatch>, folded_prefix: &str) -> Vec<RankedMatch> {
    let mut ranked: Vec<RankedMatch> = matches
        .into_iter()
        .map(|m| {
            let exact = fold_key(&m.display) == folded_prefix;
            RankedMatch {
                display: m.display,
                location: m.location,
                exact,
            }
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.exact
            .cmp(&a.exact)
            .then_with(|| kind_group(a.location.kind).cmp(&kind_group(b.location.kind)))
            .then_with(|| {
                b.location
                    .population_bucket
                    .cmp(&a.location.population_bucket)
            })
            .then_with(|| a.location.kind.code().cmp(&b.location.kind.code()))
            .then_with(|| a.display.len().cmp(&b.display.len()))
            .then_with(|| a.display.cmp(&b.display))
    });
    ranked
}

fn kind_group(kind: PlaceKind) -> u8 {
    match kind {
        PlaceKind::City => 0,
        PlaceKind::Street => 1,
        _ => 2,
    }
}
