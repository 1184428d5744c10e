//! Metrics collection.
//!
//! # Responsibilities
//! - Define gateway metrics (cache hit rate, breaker state, call latency)
//! - Track per-cache-tier and per-breaker metrics
//!
//! # Metrics
//! - `gateway_cache_hits_total` / `gateway_cache_misses_total` (counter): by cache tier
//! - `gateway_cache_entries` (gauge): current entry count per tier
//! - `gateway_cache_evictions_total` (counter): size/TTL evictions per tier
//! - `gateway_upstream_calls_total` (counter): by endpoint, outcome
//! - `gateway_upstream_call_duration_seconds` (histogram): latency distribution
//! - `gateway_breaker_state` (gauge): 0=closed, 1=open, 2=half-open
//! - `gateway_breaker_rejections_total` (counter): permits denied
//!
//! Recording goes through the `metrics` facade; installing an exporter is the
//! embedding application's job.

use metrics::{counter, gauge, histogram};
use std::time::Instant;

use crate::resilience::circuit_breaker::CircuitState;

/// Record a cache read that found a live entry.
pub fn record_cache_hit(cache: &'static str) {
    counter!("gateway_cache_hits_total", "cache" => cache).increment(1);
}

/// Record a cache read that found nothing (or an expired entry).
pub fn record_cache_miss(cache: &'static str) {
    counter!("gateway_cache_misses_total", "cache" => cache).increment(1);
}

/// Record the current entry count of a cache tier.
pub fn record_cache_size(cache: &'static str, entries: usize) {
    gauge!("gateway_cache_entries", "cache" => cache).set(entries as f64);
}

/// Record entries removed by size eviction or TTL expiry.
pub fn record_cache_evictions(cache: &'static str, evicted: u64) {
    if evicted > 0 {
        counter!("gateway_cache_evictions_total", "cache" => cache).increment(evicted);
    }
}

/// Record the outcome and latency of one upstream call.
pub fn record_upstream_call(endpoint: &'static str, outcome: &'static str, started: Instant) {
    counter!("gateway_upstream_calls_total", "endpoint" => endpoint, "outcome" => outcome)
        .increment(1);
    histogram!("gateway_upstream_call_duration_seconds", "endpoint" => endpoint)
        .record(started.elapsed().as_secs_f64());
}

/// Record a circuit breaker state transition.
pub fn record_breaker_state(name: &str, state: CircuitState) {
    gauge!("gateway_breaker_state", "breaker" => name.to_string()).set(state as u8 as f64);
}

/// Record a call rejected by an open (or saturated half-open) breaker.
pub fn record_breaker_rejection(name: &str) {
    counter!("gateway_breaker_rejections_total", "breaker" => name.to_string()).increment(1);
}
