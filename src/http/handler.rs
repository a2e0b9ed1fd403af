//! Inbound adapter: HTTP request in, response envelope out.

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, RawQuery, State},
    http::{header, HeaderMap, Method, StatusCode},
    response::Response,
};
use std::sync::Arc;
use std::time::Instant;

use crate::http::envelope::{EnvelopeSettings, ResponseEnvelope};
use crate::http::params::{InboundError, InboundParams};
use crate::http::request::request_id;
use crate::http::server::AppState;
use crate::observability::metrics;

/// Translate the inbound request into a forward and wrap the outcome.
///
/// Always produces a response: target status on success, a sentinel status
/// with an `error` object otherwise.
pub async fn forward_handler(
    State(state): State<AppState>,
    method: Method,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let start = Instant::now();
    let request_id = request_id(&headers).to_string();

    let body = match body {
        Ok(body) => body,
        Err(rejection) => {
            return reject(&state, &request_id, &method, String::new(), rejection.into(), start)
        }
    };

    let params = match InboundParams::parse(query.as_deref(), &headers, &body) {
        Ok(params) => params,
        Err(e) => return reject(&state, &request_id, &method, String::new(), e, start),
    };
    let request_url = params.request_url();

    let forward = params
        .method(&method, &headers)
        .and_then(|effective| params.forward_request(effective));
    let forward = match forward {
        Ok(forward) => forward,
        Err(e) => return reject(&state, &request_id, &method, request_url, e, start),
    };
    let method_label = forward.method().to_string();

    tracing::debug!(
        request_id = %request_id,
        method = %method_label,
        request_url = %request_url,
        has_payload = forward.payload_value().is_some(),
        "Forward requested"
    );

    match state.forwarder.forward(&forward).await {
        Ok(response) => {
            tracing::info!(
                request_id = %request_id,
                method = %method_label,
                request_url = %request_url,
                status = response.status.as_u16(),
                body_bytes = response.body.len(),
                elapsed_ms = start.elapsed().as_millis() as u64,
                "Forward completed"
            );
            metrics::record_forward(&method_label, response.status.as_u16(), "ok", start);

            ResponseEnvelope::success(request_url, &response)
                .into_response(state.envelope.content_type.clone())
        }
        Err(error) => {
            let status = state.envelope.status_for(&error);
            tracing::warn!(
                request_id = %request_id,
                method = %method_label,
                request_url = %request_url,
                status = status.as_u16(),
                error = %error,
                elapsed_ms = start.elapsed().as_millis() as u64,
                "Forward failed"
            );
            metrics::record_forward(&method_label, status.as_u16(), error.kind(), start);

            ResponseEnvelope::failure(request_url, status, error.kind(), error.to_string())
                .into_response(state.envelope.content_type.clone())
        }
    }
}

fn reject(
    state: &AppState,
    request_id: &str,
    method: &Method,
    request_url: String,
    error: InboundError,
    start: Instant,
) -> Response {
    tracing::warn!(
        request_id = %request_id,
        method = %method,
        error = %error,
        "Rejected inbound request"
    );
    let status = error.status();
    metrics::record_forward(method.as_str(), status.as_u16(), error.kind(), start);

    ResponseEnvelope::failure(request_url, status, error.kind(), error.to_string())
        .into_response(state.envelope.content_type.clone())
}

/// Wrap the inbound timeout layer's bare 408 in a timeout envelope.
///
/// Handler responses always carry a content type, so a mirrored 408 from the
/// target passes through untouched.
pub async fn envelope_inbound_timeout(
    State(envelope): State<Arc<EnvelopeSettings>>,
    response: Response,
) -> Response {
    if response.status() != StatusCode::REQUEST_TIMEOUT
        || response.headers().contains_key(header::CONTENT_TYPE)
    {
        return response;
    }

    tracing::warn!("Inbound request timed out before the forward completed");
    ResponseEnvelope::failure(
        String::new(),
        envelope.timeout_status,
        "timeout",
        "request did not complete in time",
    )
    .into_response(envelope.content_type.clone())
}
