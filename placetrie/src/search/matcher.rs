//! Prefix-consuming depth-first traversal.
//!
//! The query prefix and every edge label are compared in folded form (see
//! [`crate::text::fold_key`]). An edge can consume part of the remaining
//! prefix (the label runs past the query) or all of its own label; edges that
//! fold to nothing, such as pure punctuation, descend without consuming. The
//! deepest partially matched node is remembered so that a query which
//! disagrees with the index past some depth still surfaces its
//! longest-common-prefix neighbourhood.

use std::collections::HashSet;

use crate::shard::{Location, PlaceKind, Shard};
use crate::text::fold_key;

/// Inputs for one traversal. `prefix` and `city_filter` must already be
/// folded; an empty city filter should be passed as `None`.
#[derive(Debug, Clone)]
pub struct SearchParams<'a> {
    pub prefix: &'a str,
    pub city_filter: Option<&'a str>,
    pub allowed_kinds: Option<&'a HashSet<PlaceKind>>,
    pub max_results: usize,
}

/// A single collected value: the display string spelled by the trie path and
/// the resolved location record.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchMatch {
    pub display: String,
    pub location: Location,
}

/// Deepest partial match seen during the walk.
struct Best {
    node: u32,
    built: String,
    consumed: usize,
}

/// One pending traversal step. `rem` is always a suffix of the query prefix;
/// `consumed` counts folded bytes already matched.
struct Frame<'p> {
    node: u32,
    built: String,
    rem: &'p str,
    consumed: usize,
}

/// Walk the trie from the root, collecting up to `max_results` values whose
/// paths extend the query prefix.
///
/// Results keep trie pre-order, which is file order; ranking happens
/// afterwards. An explicit stack bounds the walk by the trie size rather
/// than the call stack.
pub fn prefix_search(shard: &Shard, params: &SearchParams<'_>) -> Vec<SearchMatch> {
    let mut results = Vec::new();
    let mut best = Best {
        node: 0,
        built: String::new(),
        consumed: 0,
    };

    let mut stack = vec![Frame {
        node: 0,
        built: String::new(),
        rem: params.prefix,
        consumed: 0,
    }];

    while let Some(frame) = stack.pop() {
        if results.len() >= params.max_results {
            break;
        }
        if frame.consumed > best.consumed {
            best = Best {
                node: frame.node,
                built: frame.built.clone(),
                consumed: frame.consumed,
            };
        }
        if frame.rem.is_empty() {
            collect(shard, frame.node, &frame.built, params, &mut results);
            continue;
        }

        let node = shard.node(frame.node);
        // Reversed push so edges pop in file order.
        for edge in node.edges.iter().rev() {
            let folded = fold_key(&edge.label);
            let mut built = String::with_capacity(frame.built.len() + edge.label.len());
            built.push_str(&frame.built);
            built.push_str(&edge.label);
            if folded.is_empty() {
                stack.push(Frame {
                    node: edge.child,
                    built,
                    rem: frame.rem,
                    consumed: frame.consumed,
                });
            } else if frame.rem.starts_with(folded.as_str()) {
                stack.push(Frame {
                    node: edge.child,
                    built,
                    rem: &frame.rem[folded.len()..],
                    consumed: frame.consumed + folded.len(),
                });
            } else if folded.starts_with(frame.rem) {
                stack.push(Frame {
                    node: edge.child,
                    built,
                    rem: "",
                    consumed: frame.consumed + frame.rem.len(),
                });
            }
        }
    }

    if results.is_empty() && best.consumed > 0 {
        collect(shard, best.node, &best.built, params, &mut results);
    }
    results
}

/// Pre-order enumeration of the subtree below `node_idx`: a node's own values
/// first, then each child in file order. Stops at the result cap.
fn collect(
    shard: &Shard,
    node_idx: u32,
    built: &str,
    params: &SearchParams<'_>,
    results: &mut Vec<SearchMatch>,
) {
    if results.len() >= params.max_results {
        return;
    }
    let node = shard.node(node_idx);
    for value in &node.values {
        if results.len() >= params.max_results {
            return;
        }
        let location = *shard.resolve(value);
        if let Some(kinds) = params.allowed_kinds {
            if !kinds.contains(&location.kind) {
                continue;
            }
        }
        if let Some(filter) = params.city_filter {
            let node_name = fold_key(shard.place_node(&location));
            let city_name = fold_key(shard.place_city(&location));
            if !node_name.contains(filter) && !city_name.contains(filter) {
                continue;
            }
        }
        results.push(SearchMatch {
            display: built.to_string(),
            location,
        });
    }
    for edge in &node.edges {
        if results.len() >= params.max_results {
            return;
        }
        let mut child_built = String::with_capacity(built.len() + edge.label.len());
        child_built.push_str(built);
        child_built.push_str(&edge.label);
        collect(shard, edge.child, &child_built, params, results);
    }
}
