//! Resilient, cached gateway for a similar-products API.
//!
//! # Architecture Overview
//!
//! ```text
//!                    ┌───────────────────────────────────────────────┐
//!                    │               PRODUCT GATEWAY                  │
//!                    │                                                │
//!   similar_products │  ┌─────────┐   hit                            │
//!   ─────────────────┼─▶│  cache  │──────────────────────────────┐   │
//!                    │  └────┬────┘                              │   │
//!                    │       │ miss                              │   │
//!                    │       ▼                                   │   │
//!                    │  ┌──────────┐  rejected   ┌──────────┐    │   │
//!                    │  │ breaker  │────────────▶│ fallback │    │   │
//!                    │  └────┬─────┘             └────┬─────┘    │   │
//!                    │       │ permitted              │          │   │
//!                    │       ▼                        │          │   │
//!   value or         │  ┌──────────┐  outcome + cache │          │   │
//!   fallback         │  │ upstream │  write on success│          │   │
//!   ◀────────────────┼──│  client  │◀─────────────────┴──────────┘   │
//!                    │  └──────────┘                                 │
//!                    │                                                │
//!                    │  Cross-cutting: config, observability,         │
//!                    │  background cache sweep                        │
//!                    └───────────────────────────────────────────────┘
//! ```
//!
//! The gateway resolves similar products in two upstream hops — the
//! similar-id list, then each product's detail with bounded concurrency —
//! caching successes and converting every failure into the configured
//! fallback. `similar_products` never errors.

// Core subsystems
pub mod cache;
pub mod config;
pub mod gateway;
pub mod upstream;

// Cross-cutting concerns
pub mod observability;
pub mod resilience;

pub use config::{load_config, GatewayConfig};
pub use gateway::{ProductDetail, ProductGateway};
pub use resilience::{CircuitBreaker, CircuitState};
