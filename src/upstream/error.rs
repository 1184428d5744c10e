//! Upstream call error definitions.

use std::time::Duration;
use thiserror::Error;

/// Reasons an upstream call can fail.
///
/// A 404 is not represented here; the client maps it to an absent value.
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// Connection could not be established within the connect timeout.
    #[error("connect timeout contacting upstream")]
    ConnectTimeout,

    /// The call did not complete within its total deadline.
    #[error("upstream call exceeded {0:?} deadline")]
    ReadTimeout(Duration),

    /// The upstream answered with a non-2xx status.
    #[error("upstream returned status {0}")]
    Status(u16),

    /// Network-level failure (refused, reset, DNS, TLS).
    #[error("transport error: {0}")]
    Transport(String),

    /// The response body was not the expected JSON shape.
    #[error("failed to decode upstream response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for UpstreamError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() && e.is_connect() {
            UpstreamError::ConnectTimeout
        } else if e.is_decode() {
            UpstreamError::Decode(e.to_string())
        } else {
            UpstreamError::Transport(e.to_string())
        }
    }
}
