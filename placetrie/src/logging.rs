//! Logging setup.
//!
//! Lookup sessions report shard fetches, cache activity, and decode failures
//! through `tracing`. Diagnostics go to stderr so the ranked results a
//! lookup prints on stdout stay clean enough to pipe; RUST_LOG overrides the
//! default `info` filter.

use std::io;

use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber for a lookup session.
///
/// Safe to call more than once; later calls leave the first subscriber in
/// place. A process that wants its own subscriber (tests, embedders) can
/// simply install it first and skip this.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}
