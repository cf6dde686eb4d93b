//! Forwarding error type.

use thiserror::Error;

/// Everything that can go wrong on the single inbound→upstream hop.
///
/// All variants are reported to the caller the same way (HTTP 500 with the
/// error message in the JSON envelope); the variants exist for logging.
#[derive(Debug, Error)]
pub enum ForwardError {
    #[error("invalid target URL: {0}")]
    InvalidTarget(#[from] url::ParseError),

    #[error("upstream returned HTTP {0}")]
    UpstreamStatus(u16),

    #[error("upstream request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("upstream response was not valid JSON: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("failed to read request body: {0}")]
    InboundBody(String),
}
