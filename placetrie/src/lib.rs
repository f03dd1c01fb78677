//! PlaceTrie - Offline street and POI geocoding
//!
//! This library answers type-ahead queries against a prefix-partitioned
//! geocoding index: the user types a few characters, and the lookup returns
//! ranked candidate places with coordinates, ready to plot on a map. The
//! index is split into shard files keyed by the first folded characters of
//! the name; shards are fetched on demand, decoded once, and cached for the
//! life of the process. No server-side query service is involved.
//!
//! # High-Level API
//!
//! For most use cases, the [`service`] module provides a simplified facade:
//!
//! ```ignore
//! use placetrie::service::{LookupConfig, LookupService};
//! use placetrie::transport::HttpTransport;
//! use placetrie::gzip::FlateGunzip;
//!
//! let config = LookupConfig::default().with_shard_root("https://tiles.example/geocode");
//! let service = LookupService::new(config, HttpTransport::new()?, FlateGunzip);
//!
//! let outcome = service.lookup("Main St, Springfield").await;
//! ```

pub mod config;
pub mod gzip;
pub mod logging;
pub mod manager;
pub mod search;
pub mod service;
pub mod shard;
pub mod text;
pub mod transport;

/// Version of the PlaceTrie library and CLI.
///
/// This is synchronized across all components in the workspace.
/// The version is defined in `Cargo.toml` and injected at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
