//! Response envelope returned to callers.
//!
//! ```text
//! {"request_url": "...", "headers": "{\"content-type\":\"...\"}", "code": 200, "body": "..."}
//! ```
//! `headers` is itself a JSON string. On failure `body` is empty and an
//! `error` object describes what went wrong.

use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::config::EnvelopeConfig;
use crate::forward::{ForwardError, ForwardResponse};

/// Resolved envelope settings shared by all handlers.
#[derive(Debug, Clone)]
pub struct EnvelopeSettings {
    pub content_type: HeaderValue,
    pub failure_status: StatusCode,
    pub timeout_status: StatusCode,
}

impl EnvelopeSettings {
    /// Invalid values fall back to `text/json`, 502 and 504.
    pub fn from_config(config: &EnvelopeConfig) -> Self {
        let content_type = HeaderValue::from_str(&config.content_type).unwrap_or_else(|_| {
            tracing::warn!(content_type = %config.content_type, "Invalid envelope content type, using text/json");
            HeaderValue::from_static("text/json")
        });

        Self {
            content_type,
            failure_status: StatusCode::from_u16(config.failure_status)
                .unwrap_or(StatusCode::BAD_GATEWAY),
            timeout_status: StatusCode::from_u16(config.timeout_status)
                .unwrap_or(StatusCode::GATEWAY_TIMEOUT),
        }
    }

    /// Status written when the forward produced no target status.
    pub fn status_for(&self, error: &ForwardError) -> StatusCode {
        if error.is_client_error() {
            StatusCode::BAD_REQUEST
        } else if error.is_timeout() {
            self.timeout_status
        } else {
            self.failure_status
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    pub request_url: String,
    pub headers: String,
    pub code: u16,
    pub body: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<EnvelopeError>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvelopeError {
    pub kind: String,
    pub message: String,
}

impl ResponseEnvelope {
    pub fn success(request_url: String, response: &ForwardResponse) -> Self {
        Self {
            request_url,
            headers: stringify_headers(&response.headers),
            code: response.status.as_u16(),
            body: response.body_text(),
            error: None,
        }
    }

    pub fn failure(
        request_url: String,
        status: StatusCode,
        kind: &str,
        message: impl Into<String>,
    ) -> Self {
        Self {
            request_url,
            headers: "{}".to_string(),
            code: status.as_u16(),
            body: String::new(),
            error: Some(EnvelopeError {
                kind: kind.to_string(),
                message: message.into(),
            }),
        }
    }

    pub fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.code).unwrap_or(StatusCode::BAD_GATEWAY)
    }

    /// Write the envelope with `code` as the HTTP status.
    pub fn into_response(self, content_type: HeaderValue) -> Response {
        let status = self.status();
        let body = match serde_json::to_string(&self) {
            Ok(body) => body,
            Err(e) => {
                tracing::error!(error = %e, "Failed to encode response envelope");
                r#"{"error":{"kind":"envelope","message":"failed to encode envelope"}}"#.to_string()
            }
        };
        (status, [(header::CONTENT_TYPE, content_type)], body).into_response()
    }
}

/// JSON object of header name to value. Repeated headers are joined with `", "`.
pub fn stringify_headers(headers: &HeaderMap) -> String {
    let mut map: BTreeMap<&str, String> = BTreeMap::new();
    for (name, value) in headers {
        let value = String::from_utf8_lossy(value.as_bytes());
        match map.get_mut(name.as_str()) {
            Some(existing) => {
                existing.push_str(", ");
                existing.push_str(&value);
            }
            None => {
                map.insert(name.as_str(), value.into_owned());
            }
        }
    }
    serde_json::to_string(&map).unwrap_or_else(|_| "{}".to_string())
}
