//! Scripted transport for unit tests.

use async_trait::async_trait;
use axum::body::Bytes;
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use std::sync::Mutex;
use std::time::Duration;

use crate::forward::error::ForwardError;
use crate::forward::transport::{OutboundRequest, Transport};
use crate::forward::types::ForwardResponse;

pub enum Reply {
    Respond(ForwardResponse),
    Delayed(Duration, ForwardResponse),
    Fail(ForwardError),
    Hang,
}

type Script = Box<dyn Fn(&OutboundRequest, usize) -> Reply + Send + Sync>;

/// Records every request and answers from a script keyed on call index.
pub struct FakeTransport {
    calls: Mutex<Vec<OutboundRequest>>,
    script: Script,
}

impl FakeTransport {
    pub fn new<F>(script: F) -> Self
    where
        F: Fn(&OutboundRequest, usize) -> Reply + Send + Sync + 'static,
    {
        Self {
            calls: Mutex::new(Vec::new()),
            script: Box::new(script),
        }
    }

    pub fn always(status: u16, body: &'static str) -> Self {
        Self::new(move |_, _| Reply::Respond(response(status, body)))
    }

    pub fn calls(&self) -> Vec<OutboundRequest> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn send(&self, request: OutboundRequest) -> Result<ForwardResponse, ForwardError> {
        let index = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(request.clone());
            calls.len() - 1
        };
        match (self.script)(&request, index) {
            Reply::Respond(response) => Ok(response),
            Reply::Delayed(delay, response) => {
                tokio::time::sleep(delay).await;
                Ok(response)
            }
            Reply::Fail(error) => Err(error),
            Reply::Hang => {
                tokio::time::sleep(Duration::from_secs(24 * 3600)).await;
                Err(ForwardError::Transport("hung transport woke up".into()))
            }
        }
    }
}

pub fn response(status: u16, body: &'static str) -> ForwardResponse {
    let mut headers = HeaderMap::new();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
    ForwardResponse {
        status: StatusCode::from_u16(status).unwrap(),
        headers,
        body: Bytes::from_static(body.as_bytes()),
    }
}

pub fn redirect(status: u16, location: &str) -> ForwardResponse {
    let mut headers = HeaderMap::new();
    headers.insert(header::LOCATION, HeaderValue::from_str(location).unwrap());
    ForwardResponse {
        status: StatusCode::from_u16(status).unwrap(),
        headers,
        body: Bytes::new(),
    }
}
