//! Forwarding error definitions.

use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while forwarding a request to its target.
#[derive(Debug, Error)]
pub enum ForwardError {
    /// Method string is not a valid HTTP token.
    #[error("invalid HTTP method `{0}`")]
    InvalidMethod(String),

    /// `base_url + path` does not form an absolute http(s) URL.
    #[error("invalid target URL `{url}`: {reason}")]
    InvalidUrl { url: String, reason: String },

    /// Payload could not be encoded as JSON.
    #[error("failed to serialize payload: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Target did not produce a final response before the deadline.
    #[error("target did not respond within {} ms", .0.as_millis())]
    Timeout(Duration),

    /// Redirect chain longer than the configured maximum.
    #[error("exceeded maximum of {0} redirects")]
    RedirectLimit(usize),

    /// Target redirected to a location that cannot be resolved.
    #[error("invalid redirect location `{0}`")]
    InvalidRedirect(String),

    /// DNS resolution or TCP connect failed.
    #[error("failed to connect to target: {0}")]
    Connect(String),

    /// Any other transport-level failure.
    #[error("transport error: {0}")]
    Transport(String),
}

impl ForwardError {
    /// Stable identifier for logs, metrics and envelopes.
    pub fn kind(&self) -> &'static str {
        match self {
            ForwardError::InvalidMethod(_) => "invalid_method",
            ForwardError::InvalidUrl { .. } => "invalid_url",
            ForwardError::Serialization(_) => "serialization",
            ForwardError::Timeout(_) => "timeout",
            ForwardError::RedirectLimit(_) => "redirect_limit",
            ForwardError::InvalidRedirect(_) => "invalid_redirect",
            ForwardError::Connect(_) => "connect",
            ForwardError::Transport(_) => "transport",
        }
    }

    /// True when the caller supplied something unusable and no target was contacted.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ForwardError::InvalidMethod(_)
                | ForwardError::InvalidUrl { .. }
                | ForwardError::Serialization(_)
        )
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, ForwardError::Timeout(_))
    }
}

/// Result of a single forward.
pub type ForwardResult<T = super::types::ForwardResponse> = Result<T, ForwardError>;
