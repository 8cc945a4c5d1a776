//! Key-set sources
//!
//! A [`KeySource`] produces the provider's full key set. The resolver calls it
//! on cache misses only; sources do no caching of their own.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;

use crate::{JwkSet, KeyError};

/// Somewhere a key set can be fetched from
#[async_trait]
pub trait KeySource: Send + Sync {
    /// Fetch the complete key set
    async fn fetch_key_set(&self) -> Result<JwkSet, KeyError>;

    /// Human-readable location, for logs
    fn describe(&self) -> String;
}

/// Fetches the key set from the provider's HTTP endpoint
#[derive(Debug, Clone)]
pub struct HttpKeySource {
    url: String,
    http_client: reqwest::Client,
}

impl HttpKeySource {
    /// Create a source with an HTTP client tuned for key-set fetching
    ///
    /// The client fails fast and keeps a small idle pool, as every fetch
    /// goes to the same host.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        let http_client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(5).min(timeout))
            .timeout(timeout)
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(2)
            .tcp_nodelay(true)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self::with_client(url, http_client)
    }

    /// Create a source with a custom HTTP client
    ///
    /// Use this when you need custom proxy settings or TLS config.
    pub fn with_client(url: impl Into<String>, http_client: reqwest::Client) -> Self {
        Self {
            url: url.into(),
            http_client,
        }
    }
}

#[async_trait]
impl KeySource for HttpKeySource {
    async fn fetch_key_set(&self) -> Result<JwkSet, KeyError> {
        tracing::debug!(url = %self.url, "Fetching JWKS");

        let response = self
            .http_client
            .get(&self.url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| {
                tracing::error!(url = %self.url, error = %e, "Failed to fetch JWKS");
                KeyError::ProviderUnavailable(format!("request failed: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            tracing::error!(url = %self.url, %status, "JWKS fetch returned error status");
            return Err(KeyError::ProviderUnavailable(format!(
                "provider returned {}",
                status
            )));
        }

        let body = response.bytes().await.map_err(|e| {
            tracing::error!(url = %self.url, error = %e, "Failed to read JWKS body");
            KeyError::ProviderUnavailable(format!("failed to read body: {}", e))
        })?;

        JwkSet::from_slice(&body)
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}

/// Reads the key set from mounted storage
#[derive(Debug, Clone)]
pub struct FileKeySource {
    path: PathBuf,
}

impl FileKeySource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

#[async_trait]
impl KeySource for FileKeySource {
    async fn fetch_key_set(&self) -> Result<JwkSet, KeyError> {
        let bytes = tokio::fs::read(&self.path).await.map_err(|e| {
            tracing::error!(path = %self.path.display(), error = %e, "Failed to read JWKS file");
            KeyError::ProviderUnavailable(format!("failed to read key set: {}", e))
        })?;

        JwkSet::from_slice(&bytes)
    }

    fn describe(&self) -> String {
        format!("file://{}", self.path.display())
    }
}
