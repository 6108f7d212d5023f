//! Remote payload fetching.

use crate::{Error, Result};
use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

/// Source of remote payloads for the cache.
///
/// The cache only ever asks for the full body of a URL; retries, auth and
/// transport are the implementation's business.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Download the full body at `url`.
    async fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}

/// [`Fetcher`] backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Create a new HTTP fetcher.
    ///
    /// # Errors
    ///
    /// Returns an error if the TLS backend fails to initialize.
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("d2/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::configuration(format!("Failed to create HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        debug!(%url, "Downloading");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::fetch(url, format!("request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(Error::fetch(url, format!("HTTP {}", response.status())));
        }

        response
            .bytes()
            .await
            .map(|b| b.to_vec())
            .map_err(|e| Error::fetch(url, format!("failed to read body: {e}")))
    }
}
