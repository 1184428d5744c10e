//! Gateway orchestrator.
//!
//! # Data Flow
//! ```text
//! similar_products(id)
//!     → similar cache (hit: return, no upstream call, no breaker touch)
//!     → breaker.try_acquire() (rejected: fallback, no upstream call)
//!     → client.similar_ids() (outcome recorded exactly once)
//!     → per-id product_detail() fan-out, bounded concurrency, input order
//!     → similar cache write (successes only)
//! ```
//!
//! # Design Decisions
//! - `similar_products` is total: every failure path becomes the fallback
//! - Concurrent misses for the same key each call upstream; last writer wins
//! - Both upstream endpoints share the "product-api" breaker, matching one
//!   remote service behind one failure domain

pub mod types;

use futures_util::stream::{self, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::cache::{CacheSweeper, Sweep, SweeperHandle, TtlCache};
use crate::config::{validate_config, ConfigError, GatewayConfig};
use crate::resilience::{BreakerRegistry, CircuitBreaker, CircuitState};
use crate::upstream::{ProductApiClient, UpstreamError};

pub use types::ProductDetail;

/// Breaker name shared by both product API endpoints.
const PRODUCT_API_BREAKER: &str = "product-api";

/// Errors constructing a gateway.
#[derive(Debug, Error)]
pub enum BuildError {
    /// The configuration failed semantic validation.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The upstream HTTP client could not be built.
    #[error("failed to build upstream client: {0}")]
    Client(#[from] UpstreamError),
}

/// Resilient, cached entry point for similar-product lookups.
pub struct ProductGateway {
    client: ProductApiClient,
    breaker: Arc<CircuitBreaker>,
    similar_cache: Arc<TtlCache<Vec<ProductDetail>>>,
    detail_cache: Arc<TtlCache<ProductDetail>>,
    detail_concurrency: usize,
    sweep_interval: Duration,
    fallback: Vec<ProductDetail>,
}

impl ProductGateway {
    /// Build a gateway from configuration.
    ///
    /// Rejects invalid configuration before any fetch is accepted.
    pub fn new(config: GatewayConfig) -> Result<Self, BuildError> {
        validate_config(&config).map_err(ConfigError::Validation)?;

        let client = ProductApiClient::new(&config.upstream)?;

        let registry = BreakerRegistry::new(config.breaker.clone());
        let breaker = registry.breaker(PRODUCT_API_BREAKER);

        let similar_cache = Arc::new(TtlCache::new(
            "similar",
            config.cache.similar.max_entries,
            Duration::from_secs(config.cache.similar.ttl_secs),
        ));
        let detail_cache = Arc::new(TtlCache::new(
            "detail",
            config.cache.detail.max_entries,
            Duration::from_secs(config.cache.detail.ttl_secs),
        ));

        Ok(Self {
            client,
            breaker,
            similar_cache,
            detail_cache,
            detail_concurrency: config.upstream.detail_concurrency,
            sweep_interval: Duration::from_secs(config.cache.sweep_interval_secs),
            fallback: Vec::new(),
        })
    }

    /// Replace the default (empty) fallback returned when the upstream path
    /// is unavailable.
    pub fn with_fallback(mut self, fallback: Vec<ProductDetail>) -> Self {
        self.fallback = fallback;
        self
    }

    /// Spawn the background expiry sweep over both cache tiers.
    pub fn spawn_sweeper(&self) -> SweeperHandle {
        CacheSweeper::new(
            vec![
                self.similar_cache.clone() as Arc<dyn Sweep>,
                self.detail_cache.clone() as Arc<dyn Sweep>,
            ],
            self.sweep_interval,
        )
        .spawn()
    }

    /// Breaker protecting the product API, for operational overrides and
    /// observability.
    pub fn breaker(&self) -> Arc<CircuitBreaker> {
        self.breaker.clone()
    }

    /// Current breaker state.
    pub fn breaker_state(&self) -> CircuitState {
        self.breaker.state()
    }

    /// Resolve the similar products for `product_id`.
    ///
    /// Total: upstream failures and breaker rejections yield the configured
    /// fallback, never an error.
    pub async fn similar_products(&self, product_id: &str) -> Vec<ProductDetail> {
        if let Some(products) = self.similar_cache.get(product_id) {
            tracing::debug!(product_id, "Similar-products cache hit");
            return products;
        }

        if !self.breaker.try_acquire() {
            tracing::warn!(product_id, "Breaker rejected similar-ids call, serving fallback");
            return self.fallback.clone();
        }

        let ids = match self.client.similar_ids(product_id).await {
            Ok(ids) => {
                self.breaker.record_success();
                ids
            }
            Err(error) => {
                self.breaker.record_failure();
                tracing::warn!(product_id, error = %error, "Similar-ids call failed, serving fallback");
                return self.fallback.clone();
            }
        };

        let products: Vec<ProductDetail> = stream::iter(ids)
            .map(|id| async move { self.product_detail(&id).await })
            .buffered(self.detail_concurrency)
            .filter_map(|detail| async move { detail })
            .collect()
            .await;

        tracing::info!(
            product_id,
            count = products.len(),
            "Resolved similar products"
        );
        self.similar_cache
            .put(product_id.to_string(), products.clone());
        products
    }

    /// Resolve one product's detail through cache and breaker.
    ///
    /// Absent means unknown product, breaker rejection, or upstream failure;
    /// the logs distinguish which.
    pub async fn product_detail(&self, product_id: &str) -> Option<ProductDetail> {
        if let Some(detail) = self.detail_cache.get(product_id) {
            return Some(detail);
        }

        if !self.breaker.try_acquire() {
            tracing::debug!(product_id, "Breaker rejected detail call");
            return None;
        }

        match self.client.product_detail(product_id).await {
            Ok(Some(response)) => {
                self.breaker.record_success();
                // A record without an id is not addressable; dropped uncached.
                if response.id.is_empty() {
                    tracing::warn!(product_id, "Dropping detail without id");
                    return None;
                }
                let detail = ProductDetail::from(response);
                self.detail_cache
                    .put(product_id.to_string(), detail.clone());
                Some(detail)
            }
            Ok(None) => {
                self.breaker.record_success();
                tracing::debug!(product_id, "Product not found upstream");
                None
            }
            Err(error) => {
                self.breaker.record_failure();
                tracing::warn!(product_id, error = %error, "Detail call failed");
                None
            }
        }
    }
}
