//! Outbound transport.
//!
//! A [`Transport`] performs exactly one HTTP exchange and never follows
//! redirects on its own; redirect and deadline policy live in the forwarder.

use async_trait::async_trait;
use axum::body::Bytes;
use axum::http::{HeaderMap, Method};
use reqwest::redirect::Policy;
use std::time::Duration;
use url::Url;

use crate::config::ForwarderConfig;
use crate::forward::error::ForwardError;
use crate::forward::types::ForwardResponse;

/// One outbound HTTP exchange.
#[derive(Debug, Clone)]
pub struct OutboundRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<Bytes>,
}

/// Capability to send a single request and read its full response.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: OutboundRequest) -> Result<ForwardResponse, ForwardError>;
}

/// Production transport backed by a `reqwest` client.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    timeout: Duration,
}

impl ReqwestTransport {
    pub fn new(config: &ForwarderConfig) -> Result<Self, ForwardError> {
        let mut builder = reqwest::Client::builder()
            .redirect(Policy::none())
            .timeout(config.timeout());
        if !config.use_system_proxy {
            builder = builder.no_proxy();
        }

        let client = builder
            .build()
            .map_err(|e| ForwardError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            timeout: config.timeout(),
        })
    }

    fn map_error(&self, error: reqwest::Error) -> ForwardError {
        if error.is_timeout() {
            ForwardError::Timeout(self.timeout)
        } else if error.is_connect() {
            ForwardError::Connect(error_chain(&error))
        } else {
            ForwardError::Transport(error_chain(&error))
        }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: OutboundRequest) -> Result<ForwardResponse, ForwardError> {
        let mut builder = self
            .client
            .request(request.method, request.url)
            .headers(request.headers);
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(|e| self.map_error(e))?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await.map_err(|e| self.map_error(e))?;

        Ok(ForwardResponse {
            status,
            headers,
            body,
        })
    }
}

/// Flatten an error and its sources into one line.
fn error_chain(error: &dyn std::error::Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
