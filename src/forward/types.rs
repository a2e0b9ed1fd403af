//! Request and response types of the forwarding core.

use axum::body::Bytes;
use axum::http::{HeaderMap, Method, StatusCode};
use serde::Serialize;
use serde_json::Value;

use crate::forward::error::ForwardError;

/// Description of one outbound call.
///
/// The target URL is `base_url` followed directly by `path`. Nothing is
/// inserted or collapsed between them, so `"http://a.test/"` + `"/b"` targets
/// `http://a.test//b`.
#[derive(Debug, Clone, PartialEq)]
pub struct ForwardRequest {
    base_url: String,
    path: String,
    method: Method,
    payload: Option<Value>,
}

impl ForwardRequest {
    /// Build a request from a method name. The name keeps its case.
    pub fn new(
        base_url: impl Into<String>,
        path: impl Into<String>,
        method: &str,
        payload: Option<Value>,
    ) -> Result<Self, ForwardError> {
        let method = Method::from_bytes(method.as_bytes())
            .map_err(|_| ForwardError::InvalidMethod(method.to_string()))?;
        Ok(Self::with_method(base_url, path, method, payload))
    }

    pub fn with_method(
        base_url: impl Into<String>,
        path: impl Into<String>,
        method: Method,
        payload: Option<Value>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            path: path.into(),
            method,
            payload,
        }
    }

    pub fn get(base_url: impl Into<String>, path: impl Into<String>) -> Self {
        Self::with_method(base_url, path, Method::GET, None)
    }

    pub fn post(base_url: impl Into<String>, path: impl Into<String>, payload: Value) -> Self {
        Self::with_method(base_url, path, Method::POST, Some(payload))
    }

    pub fn delete(base_url: impl Into<String>, path: impl Into<String>) -> Self {
        Self::with_method(base_url, path, Method::DELETE, None)
    }

    /// Attach any serializable value as the payload.
    pub fn payload<T: Serialize>(mut self, payload: &T) -> Result<Self, ForwardError> {
        self.payload = Some(serde_json::to_value(payload)?);
        Ok(self)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn payload_value(&self) -> Option<&Value> {
        self.payload.as_ref()
    }

    /// `base_url + path`, verbatim.
    pub fn target_url(&self) -> String {
        format!("{}{}", self.base_url, self.path)
    }

    /// JSON body for the outbound call. `None` when no payload was supplied.
    pub fn encode_body(&self) -> Result<Option<Bytes>, ForwardError> {
        self.payload
            .as_ref()
            .map(|payload| serde_json::to_vec(payload).map(Bytes::from))
            .transpose()
            .map_err(ForwardError::from)
    }
}

/// Final response from the target, after any redirects.
#[derive(Debug, Clone, PartialEq)]
pub struct ForwardResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl ForwardResponse {
    /// Body decoded as UTF-8, with invalid sequences replaced.
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}
