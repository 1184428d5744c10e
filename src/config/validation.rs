//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, threshold in range)
//! - Check the upstream base URL parses with a supported scheme
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use thiserror::Error;
use url::Url;

use crate::config::schema::GatewayConfig;

/// A single semantic violation found in a configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// The upstream base URL did not parse or uses an unsupported scheme.
    #[error("invalid upstream base_url '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    /// A duration field was zero.
    #[error("{field} must be greater than zero")]
    ZeroDuration { field: &'static str },

    /// A capacity or count field was zero.
    #[error("{field} must be at least 1")]
    ZeroCount { field: &'static str },

    /// The breaker failure-rate threshold was outside (0, 1].
    #[error("breaker.failure_rate_threshold must be in (0, 1], got {value}")]
    ThresholdOutOfRange { value: f64 },

    /// minimum_calls cannot exceed the sliding window capacity.
    #[error("breaker.minimum_calls ({minimum}) exceeds breaker.window_size ({window})")]
    MinimumCallsExceedsWindow { minimum: usize, window: usize },
}

/// Validate a configuration, collecting every violation.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    match Url::parse(&config.upstream.base_url) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {}
        Ok(url) => errors.push(ValidationError::InvalidBaseUrl {
            url: config.upstream.base_url.clone(),
            reason: format!("unsupported scheme '{}'", url.scheme()),
        }),
        Err(e) => errors.push(ValidationError::InvalidBaseUrl {
            url: config.upstream.base_url.clone(),
            reason: e.to_string(),
        }),
    }

    if config.upstream.request_timeout_ms == 0 {
        errors.push(ValidationError::ZeroDuration {
            field: "upstream.request_timeout_ms",
        });
    }
    if config.upstream.connect_timeout_ms == 0 {
        errors.push(ValidationError::ZeroDuration {
            field: "upstream.connect_timeout_ms",
        });
    }
    if config.upstream.detail_concurrency == 0 {
        errors.push(ValidationError::ZeroCount {
            field: "upstream.detail_concurrency",
        });
    }

    for (tier, field_entries, field_ttl) in [
        (
            &config.cache.detail,
            "cache.detail.max_entries",
            "cache.detail.ttl_secs",
        ),
        (
            &config.cache.similar,
            "cache.similar.max_entries",
            "cache.similar.ttl_secs",
        ),
    ] {
        if tier.max_entries == 0 {
            errors.push(ValidationError::ZeroCount {
                field: field_entries,
            });
        }
        if tier.ttl_secs == 0 {
            errors.push(ValidationError::ZeroDuration { field: field_ttl });
        }
    }
    if config.cache.sweep_interval_secs == 0 {
        errors.push(ValidationError::ZeroDuration {
            field: "cache.sweep_interval_secs",
        });
    }

    let breaker = &config.breaker;
    if breaker.window_size == 0 {
        errors.push(ValidationError::ZeroCount {
            field: "breaker.window_size",
        });
    }
    if !(breaker.failure_rate_threshold > 0.0 && breaker.failure_rate_threshold <= 1.0) {
        errors.push(ValidationError::ThresholdOutOfRange {
            value: breaker.failure_rate_threshold,
        });
    }
    if breaker.minimum_calls == 0 {
        errors.push(ValidationError::ZeroCount {
            field: "breaker.minimum_calls",
        });
    } else if breaker.window_size > 0 && breaker.minimum_calls > breaker.window_size {
        errors.push(ValidationError::MinimumCallsExceedsWindow {
            minimum: breaker.minimum_calls,
            window: breaker.window_size,
        });
    }
    if breaker.open_duration_ms == 0 {
        errors.push(ValidationError::ZeroDuration {
            field: "breaker.open_duration_ms",
        });
    }
    if breaker.half_open_trials == 0 {
        errors.push(ValidationError::ZeroCount {
            field: "breaker.half_open_trials",
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
