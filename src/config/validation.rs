//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, body limit > 0)
//! - Check the target URL parses and uses a supported scheme
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ForwarderConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use url::Url;

use crate::config::schema::ForwarderConfig;

/// A single semantic validation failure.
#[derive(Debug, PartialEq, Eq)]
pub enum ValidationError {
    InvalidBindAddress(String),
    InvalidTargetUrl(String),
    UnsupportedTargetScheme(String),
    ZeroRequestTimeout,
    ZeroBodyLimit,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::InvalidBindAddress(addr) => {
                write!(f, "invalid bind address '{}'", addr)
            }
            ValidationError::InvalidTargetUrl(url) => {
                write!(f, "invalid target URL '{}'", url)
            }
            ValidationError::UnsupportedTargetScheme(scheme) => {
                write!(f, "target URL scheme '{}' is not http or https", scheme)
            }
            ValidationError::ZeroRequestTimeout => {
                write!(f, "request timeout must be greater than zero")
            }
            ValidationError::ZeroBodyLimit => {
                write!(f, "max body size must be greater than zero")
            }
        }
    }
}

/// Validate a configuration, collecting every error found.
pub fn validate_config(config: &ForwarderConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    match Url::parse(&config.target.url) {
        Ok(url) => {
            if url.scheme() != "http" && url.scheme() != "https" {
                errors.push(ValidationError::UnsupportedTargetScheme(
                    url.scheme().to_string(),
                ));
            }
        }
        Err(_) => {
            errors.push(ValidationError::InvalidTargetUrl(config.target.url.clone()));
        }
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroRequestTimeout);
    }

    if config.limits.max_body_bytes == 0 {
        errors.push(ValidationError::ZeroBodyLimit);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
