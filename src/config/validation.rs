//! Configuration validation.
//!
//! Serde handles syntax; this module checks value ranges and formats.
//! All problems are collected so an operator sees them in one pass.

use std::net::SocketAddr;
use thiserror::Error;

use crate::config::schema::ProxyConfig;

/// A single semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("listener.bind_address `{0}` is not a socket address")]
    InvalidBindAddress(String),

    #[error("listener.max_body_bytes must be greater than zero")]
    ZeroBodyLimit,

    #[error("forwarder.timeout_ms must be greater than zero")]
    ZeroTimeout,

    #[error("envelope.content_type `{0}` is not a valid header value")]
    InvalidContentType(String),

    #[error("envelope.{field} `{value}` is not a valid HTTP status")]
    InvalidStatus { field: &'static str, value: u16 },

    #[error("observability.log_level `{0}` is not one of trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("observability.metrics_address `{0}` is not a socket address")]
    InvalidMetricsAddress(String),
}

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Validate a configuration, returning every problem found.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(
            config.listener.bind_address.clone(),
        ));
    }
    if config.listener.max_body_bytes == 0 {
        errors.push(ValidationError::ZeroBodyLimit);
    }

    if config.forwarder.timeout_ms == 0 {
        errors.push(ValidationError::ZeroTimeout);
    }

    if axum::http::HeaderValue::from_str(&config.envelope.content_type).is_err() {
        errors.push(ValidationError::InvalidContentType(
            config.envelope.content_type.clone(),
        ));
    }
    for (field, value) in [
        ("failure_status", config.envelope.failure_status),
        ("timeout_status", config.envelope.timeout_status),
    ] {
        if !(100..=599).contains(&value) {
            errors.push(ValidationError::InvalidStatus { field, value });
        }
    }

    let level = config.observability.log_level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ValidationError::InvalidLogLevel(
            config.observability.log_level.clone(),
        ));
    }
    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
