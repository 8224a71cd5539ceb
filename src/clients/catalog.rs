use std::time::Duration;

use anyhow::{Error, Result, anyhow};
use reqwest::{Client, StatusCode};
use tracing::{debug, info};

use crate::{
    config::Config,
    error::SyncError,
    models::catalog::{ProductPage, ProductTemplate},
};

pub struct CatalogClient {
    http_client: Client,
    base_url: String,
    api_key: String,
}

impl CatalogClient {
    pub fn new(config: &Config) -> Result<Self, Error> {
        let client = Self::from_parts(&config.catalog_api_url, &config.catalog_api_key)?;

        info!(base_url = %config.catalog_api_url, "Catalog client initialized");

        Ok(client)
    }

    pub fn from_parts(base_url: &str, api_key: &str) -> Result<Self, Error> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|_| anyhow!("Failed to create HTTP client"))?;

        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    /// Fetches the single product template at `offset` in the catalog's
    /// ordered product list. `Ok(None)` means the offset is past the end
    /// of the catalog, which terminates the sync chain.
    pub async fn fetch_by_offset(
        &self,
        offset: u64,
    ) -> Result<Option<ProductTemplate>, SyncError> {
        let url = format!("{}/api/v1/products?limit=1&offset={}", self.base_url, offset);

        debug!(offset, "Fetching product template from catalog");

        let response = self
            .http_client
            .get(&url)
            .header("X-Api-Key", &self.api_key)
            .send()
            .await
            .map_err(|e| SyncError::UpstreamUnavailable(format!("catalog request failed: {}", e)))?;

        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SyncError::UpstreamUnavailable(format!(
                "catalog returned status {}: {}",
                status, body
            )));
        }

        let page: ProductPage = response.json().await.map_err(|e| {
            SyncError::UpstreamUnavailable(format!("invalid catalog response: {}", e))
        })?;

        Ok(page.results.into_iter().next())
    }

    /// Fetches one product template by its catalog record id. Used by the
    /// ad-hoc HTTP trigger; this path never publishes a successor offset.
    pub async fn fetch_by_id(&self, record_id: &str) -> Result<ProductTemplate, SyncError> {
        let url = format!("{}/api/v1/products/{}", self.base_url, record_id);

        debug!(record_id, "Fetching product template by id");

        let response = self
            .http_client
            .get(&url)
            .header("X-Api-Key", &self.api_key)
            .send()
            .await
            .map_err(|e| SyncError::UpstreamUnavailable(format!("catalog request failed: {}", e)))?;

        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Err(SyncError::NotFound(record_id.to_string()));
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SyncError::UpstreamUnavailable(format!(
                "catalog returned status {}: {}",
                status, body
            )));
        }

        response.json().await.map_err(|e| {
            SyncError::UpstreamUnavailable(format!("invalid catalog response: {}", e))
        })
    }
}
