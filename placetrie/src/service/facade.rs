//! The lookup service facade.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use crate::gzip::Gunzip;
use crate::manager::{shard_key, ShardManager};
use crate::search::{prefix_search, rank_matches, SearchParams};
use crate::shard::{Location, PlaceKind, Shard};
use crate::text::fold_key;
use crate::transport::ShardTransport;

use super::config::LookupConfig;
use super::types::{Candidate, LookupOutcome};

/// Offline geocoding lookup over prefix-keyed shards.
///
/// One service instance owns the shard cache and the staleness counter, so
/// all lookups for one input field should go through the same instance.
/// Methods take `&self`; the service can be shared behind an `Arc` and is
/// safe to call from concurrent tasks, though the intended shape is one
/// lookup per keystroke with newer lookups superseding older ones.
///
/// # Example
///
/// ```ignore
/// use placetrie::service::{LookupConfig, LookupService};
/// use placetrie::transport::HttpTransport;
/// use placetrie::gzip::FlateGunzip;
///
/// let config = LookupConfig::default().with_shard_root("https://tiles.example/geocode");
/// let service = LookupService::new(config, HttpTransport::new()?, FlateGunzip);
/// let outcome = service.lookup("Main St, Springfield").await;
/// ```
pub struct LookupService<T, Z> {
    config: LookupConfig,
    allowed_kinds: Mutex<Option<HashSet<PlaceKind>>>,
    manager: ShardManager<T, Z>,
    lookup_seq: AtomicU64,
    current: Mutex<Option<(String, Arc<Shard>)>>,
}

impl<T, Z> LookupService<T, Z>
where
    T: ShardTransport + 'static,
    Z: Gunzip + 'static,
{
    /// Create a service from configuration and its two collaborators.
    pub fn new(config: LookupConfig, transport: T, gunzip: Z) -> Self {
        let manager = ShardManager::new(
            transport,
            gunzip,
            config.shard_root(),
            config.shard_base(),
            config.shard_suffix(),
        );
        let allowed_kinds = Mutex::new(config.allowed_kinds().cloned());
        LookupService {
            config,
            allowed_kinds,
            manager,
            lookup_seq: AtomicU64::new(0),
            current: Mutex::new(None),
        }
    }

    /// The configuration this service was built with.
    pub fn config(&self) -> &LookupConfig {
        &self.config
    }

    /// Replace the kind filter. `None` allows every kind again.
    pub fn set_allowed_kinds<I>(&self, kinds: Option<I>)
    where
        I: IntoIterator<Item = PlaceKind>,
    {
        *self.allowed_kinds.lock().unwrap() = kinds.map(|k| k.into_iter().collect());
    }

    /// Key and shard used by the most recent successful lookup.
    pub fn current_shard(&self) -> Option<(String, Arc<Shard>)> {
        self.current.lock().unwrap().clone()
    }

    /// Run one lookup.
    ///
    /// The query may contain a single comma: the part before it is the
    /// street query, the part after it filters on locality and city names.
    /// Never fails; transport and decode problems come back as
    /// [`LookupOutcome::Missing`] (with the cause logged), and a lookup
    /// superseded by a newer one comes back as [`LookupOutcome::Stale`].
    pub async fn lookup(&self, query: &str) -> LookupOutcome {
        let id = self.lookup_seq.fetch_add(1, Ordering::SeqCst) + 1;
        let min_length = self.config.shard_prefix_len();

        let (street, city) = split_query(query);
        let folded = fold_key(street);
        if folded.is_empty() {
            return LookupOutcome::Empty { min_length };
        }
        if folded.chars().count() < min_length {
            return LookupOutcome::Short { min_length };
        }
        let Some(shard_key) = shard_key(street, min_length) else {
            return LookupOutcome::Empty { min_length };
        };

        let acquired = self.manager.acquire(&shard_key).await;
        if self.lookup_seq.load(Ordering::SeqCst) != id {
            return LookupOutcome::Stale { shard_key };
        }
        let (shard, loaded) = match acquired {
            Ok(pair) => pair,
            Err(e) => {
                tracing::warn!(key = %shard_key, error = %e, "shard unavailable");
                return LookupOutcome::Missing { shard_key };
            }
        };

        *self.current.lock().unwrap() = Some((shard_key.clone(), Arc::clone(&shard)));

        let folded_city = city.map(fold_key).filter(|c| !c.is_empty());
        let allowed = self.allowed_kinds.lock().unwrap().clone();
        let matches = prefix_search(
            &shard,
            &SearchParams {
                prefix: &folded,
                city_filter: folded_city.as_deref(),
                allowed_kinds: allowed.as_ref(),
                max_results: self.config.max_results(),
            },
        );
        let results = rank_matches(matches, &folded)
            .into_iter()
            .map(|m| Candidate {
                place_label: place_label(&shard, &m.location),
                kind: m.location.kind,
                population_bucket: m.location.population_bucket,
                display: m.display,
                location: m.location,
                exact: m.exact,
            })
            .collect();

        LookupOutcome::Ready {
            shard_key,
            loaded,
            locations: shard.location_count(),
            results,
        }
    }
}

/// Split a query at its first comma into street query and city filter.
fn split_query(query: &str) -> (&str, Option<&str>) {
    match query.split_once(',') {
        Some((street, city)) => (street.trim(), Some(city.trim())),
        None => (query.trim(), None),
    }
}

/// "Locality, City" when both are present, the non-empty one otherwise.
fn place_label(shard: &Shard, location: &Location) -> String {
    let node = shard.place_node(location);
    let city = shard.place_city(location);
    match (node.is_empty(), city.is_empty()) {
        (false, false) => format!("{}, {}", node, city),
        (false, true) => node.to_string(),
        (true, false) => city.to_string(),
        (true, true) => "Unknown city".to_string(),
    }
}
