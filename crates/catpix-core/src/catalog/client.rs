//! HTTP client for the source catalog API.
//!
//! Fetches record batches and downloads raw image bytes. This layer knows
//! nothing about the internal model; it returns wire types and bytes.

use crate::catalog::types::CatalogImage;
use crate::config::CatalogConfig;
use crate::error::{CatpixError, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::{debug, warn};

/// Source of catalog records and image bytes, as consumed by the
/// ingestion pipeline. Abstracted so the pipeline can be exercised
/// without a network.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Fetch one batch of records. An empty list means the catalog had
    /// nothing to offer (including "not found" responses); transport
    /// failures and non-success statuses are errors.
    async fn fetch_batch(&self) -> Result<Vec<CatalogImage>>;

    /// Download raw image bytes. `Ok(None)` on any per-image failure
    /// (network error or non-success status) so one bad asset never
    /// aborts a batch.
    async fn download_image(&self, url: &str) -> Result<Option<Vec<u8>>>;
}

/// Catalog API client over reqwest.
#[derive(Debug, Clone)]
pub struct CatalogClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl CatalogClient {
    /// Create a client against the default catalog endpoint.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_base_url(CatalogConfig::API_BASE, api_key)
    }

    /// Create a client against a custom endpoint (used by tests and
    /// self-hosted mirrors).
    pub fn with_base_url(base_url: impl Into<String>, api_key: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(CatalogConfig::DOWNLOAD_TIMEOUT)
            .user_agent(CatalogConfig::USER_AGENT)
            .build()
            .map_err(|e| CatpixError::Network {
                message: format!("Failed to create HTTP client: {}", e),
                cause: None,
            })?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    fn search_url(&self) -> String {
        format!(
            "{}/images/search?limit={}&has_breeds=1&api_key={}",
            self.base_url,
            CatalogConfig::BATCH_SIZE,
            urlencoding::encode(&self.api_key)
        )
    }
}

#[async_trait]
impl CatalogSource for CatalogClient {
    async fn fetch_batch(&self) -> Result<Vec<CatalogImage>> {
        let url = self.search_url();
        debug!("Fetching catalog batch (limit {})", CatalogConfig::BATCH_SIZE);

        let response = self
            .client
            .get(&url)
            .timeout(CatalogConfig::REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    CatpixError::Timeout(CatalogConfig::REQUEST_TIMEOUT)
                } else {
                    CatpixError::Network {
                        message: format!("Catalog request failed: {}", e),
                        cause: Some(e.to_string()),
                    }
                }
            })?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            // The catalog treats an exhausted search as "not found".
            return Ok(Vec::new());
        }
        if !status.is_success() {
            return Err(CatpixError::Network {
                message: format!("Catalog API returned {}", status),
                cause: None,
            });
        }

        let images: Vec<CatalogImage> =
            response.json().await.map_err(|e| CatpixError::Json {
                message: format!("Failed to parse catalog response: {}", e),
                source: None,
            })?;

        debug!("Catalog returned {} records", images.len());
        Ok(images)
    }

    async fn download_image(&self, url: &str) -> Result<Option<Vec<u8>>> {
        let response = match self.client.get(url).send().await {
            Ok(r) => r,
            Err(e) => {
                warn!("Image download failed for {}: {}", url, e);
                return Ok(None);
            }
        };

        if !response.status().is_success() {
            warn!("Image download for {} returned {}", url, response.status());
            return Ok(None);
        }

        match response.bytes().await {
            Ok(bytes) => Ok(Some(bytes.to_vec())),
            Err(e) => {
                warn!("Failed to read image body for {}: {}", url, e);
                Ok(None)
            }
        }
    }
}
