//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Call to upstream:
//!     → circuit_breaker.rs try_acquire() (reject fast while Open)
//!     → upstream client call with deadline
//!     → circuit_breaker.rs record_success()/record_failure()
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every external call has a deadline
//! - The breaker prevents hammering a failing upstream; the gateway turns
//!   rejections into the configured fallback
//! - No retries: one permitted invocation makes exactly one upstream call

pub mod circuit_breaker;

pub use circuit_breaker::{BreakerRegistry, CircuitBreaker, CircuitState};
