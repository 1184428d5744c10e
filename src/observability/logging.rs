//! Structured logging setup.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber for embedding applications and tests
//! - Respect `RUST_LOG` when set, fall back to the configured level

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over `level`. Safe to call more than once;
/// later calls are no-ops.
pub fn init_logging(level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("product_gateway={}", level).into());

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}
