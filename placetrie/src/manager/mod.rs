//! Shard acquisition: URL building, the decoded-shard cache, and in-flight
//! fetch deduplication.
//!
//! Shards are immutable once decoded, so the cache holds `Arc<Shard>` for the
//! life of the process; the key space is bounded by the shard-key alphabet.
//! Concurrent lookups that land on the same key share one fetch through a
//! [`futures::future::Shared`] handle. Failures are never cached: a transient
//! transport error on one keystroke must not poison later lookups of the
//! same key.

mod key;

pub use key::shard_key;

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use futures::future::{BoxFuture, Shared};
use futures::FutureExt;

use crate::gzip::{is_gzip, Gunzip, GzipError};
use crate::shard::{decode_shard, Shard, ShardError};
use crate::transport::{ShardTransport, TransportError};

/// Errors from acquiring a shard: fetch, decompress, or decode.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AcquireError {
    /// No shard file exists for this key.
    #[error("shard not found")]
    NotFound,

    /// The transport failed before producing bytes.
    #[error("shard transport failure: {0}")]
    Transport(String),

    #[error(transparent)]
    Gzip(#[from] GzipError),

    #[error(transparent)]
    Decode(#[from] ShardError),
}

type PendingFetch = Shared<BoxFuture<'static, Result<Arc<Shard>, AcquireError>>>;

/// Keyed shard store with on-demand fetch.
pub struct ShardManager<T, Z> {
    transport: Arc<T>,
    gunzip: Arc<Z>,
    shard_root: String,
    shard_base: String,
    shard_suffix: String,
    cache: Mutex<HashMap<String, Arc<Shard>>>,
    pending: Mutex<HashMap<String, PendingFetch>>,
}

impl<T, Z> ShardManager<T, Z>
where
    T: ShardTransport + 'static,
    Z: Gunzip + 'static,
{
    pub fn new(
        transport: T,
        gunzip: Z,
        shard_root: impl Into<String>,
        shard_base: impl Into<String>,
        shard_suffix: impl Into<String>,
    ) -> Self {
        ShardManager {
            transport: Arc::new(transport),
            gunzip: Arc::new(gunzip),
            shard_root: shard_root.into(),
            shard_base: shard_base.into(),
            shard_suffix: shard_suffix.into(),
            cache: Mutex::new(HashMap::new()),
            pending: Mutex::new(HashMap::new()),
        }
    }

    /// URL (or path, for file transports) of the shard file for a key.
    pub fn shard_url(&self, key: &str) -> String {
        let root = self.shard_root.trim_end_matches('/');
        if root.is_empty() {
            format!("{}.shard_{}{}", self.shard_base, key, self.shard_suffix)
        } else {
            format!(
                "{}/{}.shard_{}{}",
                root, self.shard_base, key, self.shard_suffix
            )
        }
    }

    /// Number of decoded shards currently cached.
    pub fn cached_count(&self) -> usize {
        self.cache.lock().unwrap().len()
    }

    /// Get the shard for a key, fetching and decoding it if necessary.
    ///
    /// The second element is false for a cache hit and true when this call
    /// went through a fetch, its own or one already in flight. Errors are
    /// not cached; the next call for the same key retries.
    pub async fn acquire(&self, key: &str) -> Result<(Arc<Shard>, bool), AcquireError> {
        if let Some(shard) = self.cache.lock().unwrap().get(key) {
            return Ok((Arc::clone(shard), false));
        }

        let (fetch, started) = {
            let mut pending = self.pending.lock().unwrap();
            match pending.get(key) {
                Some(fetch) => (fetch.clone(), false),
                None => {
                    let fetch = Self::fetch_and_decode(
                        Arc::clone(&self.transport),
                        Arc::clone(&self.gunzip),
                        self.shard_url(key),
                        key.to_string(),
                    )
                    .boxed()
                    .shared();
                    pending.insert(key.to_string(), fetch.clone());
                    (fetch, true)
                }
            }
        };

        let result = fetch.await;
        if started {
            self.pending.lock().unwrap().remove(key);
            if let Ok(shard) = &result {
                // A concurrent acquire may have populated the key already;
                // overwriting with the identical shard is a no-op.
                self.cache
                    .lock()
                    .unwrap()
                    .insert(key.to_string(), Arc::clone(shard));
            }
        }
        result.map(|shard| (shard, true))
    }

    async fn fetch_and_decode(
        transport: Arc<T>,
        gunzip: Arc<Z>,
        url: String,
        key: String,
    ) -> Result<Arc<Shard>, AcquireError> {
        tracing::debug!(key = %key, url = %url, "fetching shard");
        let bytes = transport.fetch(&url).await.map_err(|e| match e {
            TransportError::NotFound => AcquireError::NotFound,
            other => AcquireError::Transport(other.to_string()),
        })?;
        let bytes = if is_gzip(&bytes) {
            gunzip.gunzip(&bytes)?
        } else {
            bytes
        };
        let shard = decode_shard(&bytes)?;
        tracing::info!(
            key = %key,
            version = shard.version(),
            locations = shard.location_count(),
            "decoded shard"
        );
        Ok(Arc::new(shard))
    }
}
