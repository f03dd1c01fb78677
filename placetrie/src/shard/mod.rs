//! Packed shard format: decoding and the in-memory trie.
//!
//! A shard is one prefix-partition of the geocoding index, packed into a
//! compact binary layout (magic `"STRI"`). Nine format versions are in
//! circulation; the decoder in this module accepts versions 3 through 12
//! (except 8, which was never shipped) and produces the same in-memory
//! [`Shard`] for all of them. See [`decoder`] for the wire layout.

mod cursor;
mod decoder;
#[cfg(test)]
pub(crate) mod testutil;
mod types;

pub use decoder::{decode_shard, SHARD_MAGIC, SUPPORTED_VERSIONS};
pub use types::{Location, PlaceKind, Shard, ShardStats, TrieEdge, TrieNode, TrieValue};

/// Errors produced while decoding a shard buffer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ShardError {
    /// The buffer does not start with the shard magic.
    #[error("not a shard file (bad magic)")]
    BadMagic,

    /// The version byte names a format this decoder does not speak.
    #[error("unsupported shard version {0}")]
    UnsupportedVersion(u8),

    /// Structurally invalid data at a known byte offset.
    #[error("malformed shard at byte {offset}: {message}")]
    BadFormat { offset: usize, message: String },
}
