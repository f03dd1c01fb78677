//! HTTP shard transport backed by reqwest.

use super::types::{ShardTransport, TransportError};

/// User agent sent with shard requests.
const USER_AGENT: &str = concat!("placetrie/", env!("CARGO_PKG_VERSION"));

/// Async HTTP transport.
///
/// Keeps a pooled reqwest client; shards for neighbouring prefixes are
/// typically requested in quick succession from the same host, so warm
/// connections matter more than anything else here.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Create a transport with default configuration.
    pub fn new() -> Result<Self, TransportError> {
        Self::with_timeout(30)
    }

    /// Create a transport with a custom request timeout.
    pub fn with_timeout(timeout_secs: u64) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .user_agent(USER_AGENT)
            .pool_idle_timeout(std::time::Duration::from_secs(90))
            .build()
            .map_err(|e| TransportError::Http(format!("failed to create HTTP client: {}", e)))?;
        Ok(Self { client })
    }
}

impl ShardTransport for HttpTransport {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, TransportError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| TransportError::Http(format!("request failed: {}", e)))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(TransportError::NotFound);
        }
        if !response.status().is_success() {
            return Err(TransportError::Http(format!(
                "HTTP {} from {}",
                response.status(),
                url
            )));
        }

        response
            .bytes()
            .await
            .map(|b| b.to_vec())
            .map_err(|e| TransportError::Http(format!("failed to read response: {}", e)))
    }
}
