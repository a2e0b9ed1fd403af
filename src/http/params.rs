//! Inbound parameter extraction.
//!
//! Callers describe a forward with `baseUrl`, `path` and `payload`, sent as
//! query parameters or inside a JSON / form-encoded body. Body fields take
//! precedence over the query string; `payload` is only read from the body.
//! Form and query keys use bracket nesting, so `payload[drink]=latte`
//! becomes `{"payload": {"drink": "latte"}}`.

use axum::extract::rejection::BytesRejection;
use axum::http::{header, HeaderMap, HeaderName, Method, StatusCode};
use serde_json::{Map, Value};
use std::borrow::Cow;
use thiserror::Error;

use crate::forward::ForwardRequest;

pub const BASE_URL_PARAM: &str = "baseUrl";
pub const PATH_PARAM: &str = "path";
pub const PAYLOAD_FIELD: &str = "payload";
pub const METHOD_OVERRIDE_FIELD: &str = "_method";
pub const X_HTTP_METHOD_OVERRIDE: HeaderName = HeaderName::from_static("x-http-method-override");

/// Deepest bracket nesting honoured in form and query keys.
pub const MAX_KEY_DEPTH: usize = 32;

/// Problems with the inbound request itself. No outbound call is made.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InboundError {
    #[error("missing required parameter `{0}`")]
    MissingParameter(&'static str),

    #[error("parameter `{0}` must be a string")]
    InvalidParameter(&'static str),

    #[error("malformed request body: {0}")]
    MalformedBody(String),

    #[error("invalid method override `{0}`")]
    InvalidMethodOverride(String),

    #[error("request body exceeds the configured limit")]
    BodyTooLarge,

    #[error("request body could not be read: {0}")]
    UnreadableBody(String),
}

impl From<BytesRejection> for InboundError {
    fn from(rejection: BytesRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            InboundError::BodyTooLarge
        } else {
            InboundError::UnreadableBody(rejection.body_text())
        }
    }
}

impl InboundError {
    pub fn kind(&self) -> &'static str {
        match self {
            InboundError::MissingParameter(_) => "missing_parameter",
            InboundError::InvalidParameter(_) => "invalid_parameter",
            InboundError::MalformedBody(_) => "malformed_body",
            InboundError::InvalidMethodOverride(_) => "invalid_method_override",
            InboundError::BodyTooLarge => "body_too_large",
            InboundError::UnreadableBody(_) => "unreadable_body",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            InboundError::BodyTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

/// Parameters gathered from one inbound request.
#[derive(Debug, Default)]
pub struct InboundParams {
    body: Map<String, Value>,
    query: Map<String, Value>,
}

impl InboundParams {
    pub fn parse(
        query: Option<&str>,
        headers: &HeaderMap,
        body: &[u8],
    ) -> Result<Self, InboundError> {
        let query = query
            .map(|q| parse_form(q.as_bytes()))
            .unwrap_or_default();

        let body = match body_kind(headers) {
            BodyKind::Json => parse_json_object(body)?,
            BodyKind::Form => parse_form(body),
            BodyKind::Other => Map::new(),
        };

        Ok(Self { body, query })
    }

    /// Look a parameter up in the body, then the query string.
    pub fn param(&self, name: &str) -> Option<&Value> {
        self.body.get(name).or_else(|| self.query.get(name))
    }

    fn required_str(&self, name: &'static str) -> Result<&str, InboundError> {
        match self.param(name) {
            Some(Value::String(value)) => Ok(value),
            Some(_) => Err(InboundError::InvalidParameter(name)),
            None => Err(InboundError::MissingParameter(name)),
        }
    }

    pub fn payload(&self) -> Option<&Value> {
        self.body.get(PAYLOAD_FIELD)
    }

    /// `baseUrl + path` with missing pieces treated as empty, for reporting.
    pub fn request_url(&self) -> String {
        let piece = |name: &str| match self.param(name) {
            Some(Value::String(value)) => value.clone(),
            _ => String::new(),
        };
        format!("{}{}", piece(BASE_URL_PARAM), piece(PATH_PARAM))
    }

    /// Effective method: `_method` body field, then the override header, then `inbound`.
    pub fn method(&self, inbound: &Method, headers: &HeaderMap) -> Result<Method, InboundError> {
        let requested = match self.body.get(METHOD_OVERRIDE_FIELD) {
            Some(Value::String(value)) => Some(value.clone()),
            Some(other) => return Err(InboundError::InvalidMethodOverride(other.to_string())),
            None => headers
                .get(X_HTTP_METHOD_OVERRIDE)
                .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned()),
        };

        match requested {
            Some(name) => Method::from_bytes(name.trim().to_ascii_uppercase().as_bytes())
                .map_err(|_| InboundError::InvalidMethodOverride(name)),
            None => Ok(inbound.clone()),
        }
    }

    pub fn forward_request(&self, method: Method) -> Result<ForwardRequest, InboundError> {
        let base_url = self.required_str(BASE_URL_PARAM)?;
        let path = self.required_str(PATH_PARAM)?;
        Ok(ForwardRequest::with_method(
            base_url,
            path,
            method,
            self.payload().cloned(),
        ))
    }
}

enum BodyKind {
    Json,
    Form,
    Other,
}

fn body_kind(headers: &HeaderMap) -> BodyKind {
    let Some(content_type) = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
    else {
        return BodyKind::Other;
    };

    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    if mime == "application/json" || mime.ends_with("+json") {
        BodyKind::Json
    } else if mime == "application/x-www-form-urlencoded" {
        BodyKind::Form
    } else {
        BodyKind::Other
    }
}

fn parse_json_object(body: &[u8]) -> Result<Map<String, Value>, InboundError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Map::new());
    }

    match serde_json::from_slice(body) {
        Ok(Value::Object(fields)) => Ok(fields),
        Ok(_) => Err(InboundError::MalformedBody(
            "JSON body must be an object".to_string(),
        )),
        Err(e) => Err(InboundError::MalformedBody(e.to_string())),
    }
}

fn parse_form(input: &[u8]) -> Map<String, Value> {
    let mut fields = Map::new();
    for (key, value) in url::form_urlencoded::parse(input) {
        let segments = key_segments(&key);
        insert_nested(&mut fields, &segments, Value::String(value.into_owned()));
    }
    fields
}

/// `a[b][c]` → `["a", "b", "c"]`; `a[]` → `["a", ""]`; anything else is one segment.
///
/// Keys nest at most [`MAX_KEY_DEPTH`] levels below the root; the remaining
/// brackets stay together as one literal segment, so `a[b][c]` with a depth of
/// one yields `["a", "b", "[c]"]`.
fn key_segments(key: &str) -> Vec<Cow<'_, str>> {
    match key.find('[') {
        Some(open) if open > 0 && key.ends_with(']') => {
            let mut segments = vec![Cow::Borrowed(&key[..open])];
            let mut nested = key[open + 1..key.len() - 1].split("][");
            segments.extend(nested.by_ref().take(MAX_KEY_DEPTH).map(Cow::Borrowed));

            let tail: Vec<&str> = nested.collect();
            if !tail.is_empty() {
                segments.push(Cow::Owned(format!("[{}]", tail.join("]["))));
            }
            segments
        }
        _ => vec![Cow::Borrowed(key)],
    }
}

fn insert_nested(fields: &mut Map<String, Value>, segments: &[Cow<'_, str>], value: Value) {
    let Some((first, rest)) = segments.split_first() else {
        return;
    };

    match rest {
        [] => {
            fields.insert(first.to_string(), value);
        }
        [last] if last.is_empty() => {
            let slot = fields
                .entry(first.to_string())
                .or_insert_with(|| Value::Array(Vec::new()));
            match slot {
                Value::Array(items) => items.push(value),
                other => *other = Value::Array(vec![value]),
            }
        }
        _ => {
            let slot = fields
                .entry(first.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if !slot.is_object() {
                *slot = Value::Object(Map::new());
            }
            if let Value::Object(inner) = slot {
                insert_nested(inner, rest, value);
            }
        }
    }
}
