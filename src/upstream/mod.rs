//! Upstream product API subsystem.
//!
//! # Data Flow
//! ```text
//! gateway (cache miss, breaker permit)
//!     → client.rs (reqwest GET with connect + total deadline)
//!     → error.rs (wire failure → UpstreamError taxonomy)
//!     → gateway (records the outcome, caches successes)
//! ```

pub mod client;
pub mod error;

pub use client::{ProductApiClient, ProductResponse};
pub use error::UpstreamError;
