//! HTTP client for the external product API.
//!
//! # Responsibilities
//! - Issue one network call per invocation, non-blocking
//! - Enforce the per-call deadline and cancel the in-flight request on expiry
//! - Map wire failures into the `UpstreamError` taxonomy
//!
//! # Design Decisions
//! - No retries at this layer; the orchestrator makes exactly one call per
//!   permitted invocation
//! - 404 maps to an absent value, not an error

use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::{Duration, Instant};
use tokio::time::timeout;
use url::Url;

use crate::config::UpstreamConfig;
use crate::observability::metrics;
use crate::upstream::error::UpstreamError;

/// Wire shape of a product served by the upstream API.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProductResponse {
    pub id: String,
    pub name: String,
    pub price: f64,
    pub availability: bool,
}

impl Default for ProductResponse {
    fn default() -> Self {
        Self {
            id: String::new(),
            name: String::new(),
            price: 0.0,
            availability: false,
        }
    }
}

/// Client for the upstream product API.
#[derive(Debug, Clone)]
pub struct ProductApiClient {
    http: reqwest::Client,
    base_url: Url,
    request_timeout: Duration,
}

impl ProductApiClient {
    /// Build a client from validated configuration.
    pub fn new(config: &UpstreamConfig) -> Result<Self, UpstreamError> {
        let mut base_url = Url::parse(&config.base_url)
            .map_err(|e| UpstreamError::Transport(format!("invalid base URL: {}", e)))?;
        // Url::join drops the last path segment without this.
        if !base_url.path().ends_with('/') {
            base_url.set_path(&format!("{}/", base_url.path()));
        }

        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_millis(config.connect_timeout_ms))
            .build()
            .map_err(|e| UpstreamError::Transport(e.to_string()))?;

        Ok(Self {
            http,
            base_url,
            request_timeout: Duration::from_millis(config.request_timeout_ms),
        })
    }

    /// GET `/product/{id}/similarids`.
    ///
    /// An unknown product has no similar products, so a 404 yields an empty
    /// list.
    pub async fn similar_ids(&self, product_id: &str) -> Result<Vec<String>, UpstreamError> {
        let path = format!("product/{}/similarids", product_id);
        let ids: Option<Vec<String>> = self.get_json("similar_ids", &path).await?;
        Ok(ids.unwrap_or_default())
    }

    /// GET `/product/{id}`. A 404 yields `None`.
    pub async fn product_detail(
        &self,
        product_id: &str,
    ) -> Result<Option<ProductResponse>, UpstreamError> {
        let path = format!("product/{}", product_id);
        self.get_json("product_detail", &path).await
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &'static str,
        path: &str,
    ) -> Result<Option<T>, UpstreamError> {
        let url = self
            .base_url
            .join(path)
            .map_err(|e| UpstreamError::Transport(format!("invalid request path: {}", e)))?;

        let started = Instant::now();
        let call = async {
            let response = self.http.get(url.clone()).send().await?;
            let status = response.status();
            if status == reqwest::StatusCode::NOT_FOUND {
                return Ok(None);
            }
            if !status.is_success() {
                return Err(UpstreamError::Status(status.as_u16()));
            }
            let body = response
                .json::<T>()
                .await
                .map_err(|e| UpstreamError::Decode(e.to_string()))?;
            Ok(Some(body))
        };

        // Dropping the future on expiry cancels the in-flight request.
        let result = match timeout(self.request_timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(UpstreamError::ReadTimeout(self.request_timeout)),
        };

        match &result {
            Ok(_) => {
                metrics::record_upstream_call(endpoint, "success", started);
                tracing::debug!(endpoint, url = %url, "Upstream call succeeded");
            }
            Err(e) => {
                metrics::record_upstream_call(endpoint, "failure", started);
                tracing::error!(endpoint, url = %url, error = %e, "Upstream call failed");
            }
        }
        result
    }
}
