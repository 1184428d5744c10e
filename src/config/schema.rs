//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the product gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Upstream product API settings.
    pub upstream: UpstreamConfig,

    /// Cache tier settings.
    pub cache: CacheConfig,

    /// Circuit breaker settings.
    pub breaker: BreakerConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Upstream product API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Base URL of the product API (e.g., "http://localhost:3001").
    pub base_url: String,

    /// Total per-call deadline (send + body) in milliseconds.
    pub request_timeout_ms: u64,

    /// Connection establishment timeout in milliseconds.
    pub connect_timeout_ms: u64,

    /// Maximum concurrent detail fetches per similar-products request.
    pub detail_concurrency: usize,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3001".to_string(),
            request_timeout_ms: 3_000,
            connect_timeout_ms: 1_000,
            detail_concurrency: 10,
        }
    }
}

/// Settings for one cache tier.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheTierConfig {
    /// Maximum number of entries before LRU eviction.
    pub max_entries: usize,

    /// Time-to-live for entries in seconds.
    pub ttl_secs: u64,
}

impl Default for CacheTierConfig {
    fn default() -> Self {
        Self {
            max_entries: 1_000,
            ttl_secs: 600,
        }
    }
}

/// Cache configuration for both tiers plus the background sweep.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Per-product detail cache.
    pub detail: CacheTierConfig,

    /// Assembled similar-products list cache.
    pub similar: CacheTierConfig,

    /// Interval between background expiry sweeps in seconds.
    pub sweep_interval_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            detail: CacheTierConfig {
                max_entries: 1_000,
                ttl_secs: 600,
            },
            similar: CacheTierConfig {
                max_entries: 500,
                ttl_secs: 300,
            },
            sweep_interval_secs: 60,
        }
    }
}

/// Circuit breaker configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BreakerConfig {
    /// Number of outcomes kept in the sliding window.
    pub window_size: usize,

    /// Failure ratio (0, 1] at which the breaker opens.
    pub failure_rate_threshold: f64,

    /// Minimum recorded outcomes before the failure ratio is evaluated.
    pub minimum_calls: usize,

    /// How long the breaker stays open before probing, in milliseconds.
    pub open_duration_ms: u64,

    /// Consecutive trial successes required to close from half-open.
    pub half_open_trials: u32,
}

impl Default for BreakerConfig {
    fn default() -> Self {
        Self {
            window_size: 10,
            failure_rate_threshold: 0.5,
            minimum_calls: 10,
            open_duration_ms: 30_000,
            half_open_trials: 3,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}
