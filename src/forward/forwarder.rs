//! The forwarding core: one inbound description in, one final target response out.

use axum::body::Bytes;
use axum::http::{header, HeaderMap, HeaderValue, Method, StatusCode};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use url::Url;

use crate::config::ForwarderConfig;
use crate::forward::error::{ForwardError, ForwardResult};
use crate::forward::transport::{OutboundRequest, ReqwestTransport, Transport};
use crate::forward::types::{ForwardRequest, ForwardResponse};

/// Executes forwards over an injected [`Transport`].
///
/// Each call makes a single attempt. Redirects are followed here, up to
/// `max_redirects` hops, and the whole chain shares one deadline.
pub struct Forwarder {
    transport: Arc<dyn Transport>,
    timeout: Duration,
    max_redirects: usize,
    limiter: Option<Arc<Semaphore>>,
}

impl Forwarder {
    pub fn new(transport: Arc<dyn Transport>, config: &ForwarderConfig) -> Self {
        let limiter = (config.max_in_flight > 0)
            .then(|| Arc::new(Semaphore::new(config.max_in_flight)));

        Self {
            transport,
            timeout: config.timeout(),
            max_redirects: config.max_redirects,
            limiter,
        }
    }

    /// Forwarder over the production `reqwest` transport.
    pub fn from_config(config: &ForwarderConfig) -> Result<Self, ForwardError> {
        let transport = ReqwestTransport::new(config)?;
        Ok(Self::new(Arc::new(transport), config))
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Forward `request` to `base_url + path` and return the final response.
    pub async fn forward(&self, request: &ForwardRequest) -> ForwardResult {
        let url = parse_target(&request.target_url())?;
        let body = request.encode_body()?;

        tracing::debug!(
            method = %request.method(),
            url = %url,
            body_bytes = body.as_ref().map_or(0, Bytes::len),
            "Forwarding request"
        );

        let exchange = self.execute(request.method().clone(), url, body);
        match tokio::time::timeout(self.timeout, exchange).await {
            Ok(result) => result,
            Err(_) => Err(ForwardError::Timeout(self.timeout)),
        }
    }

    async fn execute(
        &self,
        mut method: Method,
        mut url: Url,
        mut body: Option<Bytes>,
    ) -> ForwardResult {
        let _permit = match &self.limiter {
            Some(limiter) => Some(
                limiter
                    .clone()
                    .acquire_owned()
                    .await
                    .map_err(|_| ForwardError::Transport("forward limiter closed".into()))?,
            ),
            None => None,
        };

        let mut redirects = 0;
        loop {
            let response = self
                .transport
                .send(OutboundRequest {
                    method: method.clone(),
                    url: url.clone(),
                    headers: json_headers(),
                    body: body.clone(),
                })
                .await?;

            let Some(location) = redirect_location(&response)? else {
                return Ok(response);
            };
            if redirects == self.max_redirects {
                return Err(ForwardError::RedirectLimit(self.max_redirects));
            }

            let next = url
                .join(&location)
                .map_err(|_| ForwardError::InvalidRedirect(location.clone()))?;
            redirects += 1;

            tracing::debug!(
                status = response.status.as_u16(),
                from = %url,
                to = %next,
                hop = redirects,
                "Following redirect"
            );

            if switches_to_get(response.status, &method) {
                method = Method::GET;
                body = None;
            }
            url = next;
        }
    }
}

fn json_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    headers
}

fn parse_target(target: &str) -> Result<Url, ForwardError> {
    let url = Url::parse(target).map_err(|e| ForwardError::InvalidUrl {
        url: target.to_string(),
        reason: e.to_string(),
    })?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(ForwardError::InvalidUrl {
            url: target.to_string(),
            reason: format!("unsupported scheme `{}`", scheme),
        }),
    }
}

/// `Location` of a followable redirect, or `None` for a final response.
fn redirect_location(response: &ForwardResponse) -> Result<Option<String>, ForwardError> {
    let followable = matches!(
        response.status,
        StatusCode::MOVED_PERMANENTLY
            | StatusCode::FOUND
            | StatusCode::SEE_OTHER
            | StatusCode::TEMPORARY_REDIRECT
            | StatusCode::PERMANENT_REDIRECT
    );
    if !followable {
        return Ok(None);
    }

    match response.headers.get(header::LOCATION) {
        Some(value) => value
            .to_str()
            .map(|location| Some(location.to_string()))
            .map_err(|_| {
                ForwardError::InvalidRedirect(String::from_utf8_lossy(value.as_bytes()).into())
            }),
        None => Ok(None),
    }
}

/// 301/302/303 replay as GET without a body; HEAD stays HEAD. 307/308 keep both.
fn switches_to_get(status: StatusCode, method: &Method) -> bool {
    matches!(
        status,
        StatusCode::MOVED_PERMANENTLY | StatusCode::FOUND | StatusCode::SEE_OTHER
    ) && *method != Method::HEAD
}
