//! Transport trait and error type.

use std::fmt;
use std::future::Future;

/// Errors that can occur while fetching shard bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// No shard exists at this URL. Not cached; the facade reports the
    /// prefix as missing.
    NotFound,
    /// The HTTP request failed or returned a non-success status.
    Http(String),
    /// Local I/O failed.
    Io(String),
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::NotFound => write!(f, "shard not found"),
            TransportError::Http(msg) => write!(f, "HTTP error: {}", msg),
            TransportError::Io(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl std::error::Error for TransportError {}

/// Source of shard bytes.
///
/// Implementors fetch the raw (possibly gzip-compressed) shard file at a
/// URL built by the shard manager. A missing shard must surface as
/// [`TransportError::NotFound`] rather than an empty buffer.
pub trait ShardTransport: Send + Sync {
    /// Fetch the shard file at `url`.
    fn fetch(&self, url: &str) -> impl Future<Output = Result<Vec<u8>, TransportError>> + Send;
}
