//! HTTP transport
//!
//! The client only needs two operations from the network: fetch a document
//! as text and fetch an image as bytes. Retries, backoff and connection
//! reuse belong to the [`Transport`] implementation.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Client, Response};
use tracing::{debug, instrument};

use crate::config::HttpConfig;
use crate::{BmkgError, Result};

#[async_trait]
pub trait Transport: Send + Sync {
    /// Fetch `url` and decode the body as text
    async fn get_text(&self, url: &str) -> Result<String>;

    /// Fetch `url` and return the raw body
    async fn get_bytes(&self, url: &str) -> Result<Bytes>;
}

/// reqwest-backed transport
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Create a new transport from HTTP settings
    pub fn new(config: &HttpConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds.into()))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| BmkgError::transport(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { client })
    }

    /// Wrap an existing reqwest client
    #[must_use]
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    async fn get(&self, url: &str) -> Result<Response> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| BmkgError::transport(format!("Failed to fetch {url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(BmkgError::transport(format!("{url} answered {status}")));
        }
        debug!("Fetched {} ({})", url, status);
        Ok(response)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    #[instrument(skip(self))]
    async fn get_text(&self, url: &str) -> Result<String> {
        self.get(url)
            .await?
            .text()
            .await
            .map_err(|e| BmkgError::transport(format!("Failed to read text from {url}: {e}")))
    }

    #[instrument(skip(self))]
    async fn get_bytes(&self, url: &str) -> Result<Bytes> {
        self.get(url)
            .await?
            .bytes()
            .await
            .map_err(|e| BmkgError::transport(format!("Failed to read bytes from {url}: {e}")))
    }
}
