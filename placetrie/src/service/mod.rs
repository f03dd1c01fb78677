//! High-level lookup facade.
//!
//! [`LookupService`] is the single entry point applications use: it owns the
//! shard manager, derives the shard key from each query, and turns every
//! lookup into a tagged [`LookupOutcome`] that is safe to render directly.

mod config;
mod facade;
mod types;

pub use config::LookupConfig;
pub use facade::LookupService;
pub use types::{Candidate, LookupOutcome};
