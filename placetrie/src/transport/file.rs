//! Filesystem shard transport.
//!
//! Serves shard files straight from disk, for indexes built locally (the
//! offline builder writes them under a directory such as `build/shards`).
//! The shard manager hands this transport a plain path instead of an HTTP
//! URL; the shard-root configuration decides which.

use std::io::ErrorKind;

use super::types::{ShardTransport, TransportError};

/// Transport that reads shard files from the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileTransport;

impl FileTransport {
    pub fn new() -> Self {
        FileTransport
    }
}

impl ShardTransport for FileTransport {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, TransportError> {
        match tokio::fs::read(url).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(TransportError::NotFound),
            Err(e) => Err(TransportError::Io(e.to_string())),
        }
    }
}
