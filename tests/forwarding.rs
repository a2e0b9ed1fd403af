//! Forwarder against real target servers over the reqwest transport.

use api_proxy::config::ForwarderConfig;
use api_proxy::{ForwardError, ForwardRequest, Forwarder};
use axum::http::{header, StatusCode};
use serde_json::{json, Value};
use std::time::{Duration, Instant};

mod common;

fn forwarder() -> Forwarder {
    Forwarder::from_config(&ForwarderConfig::default()).unwrap()
}

fn base(addr: std::net::SocketAddr) -> String {
    format!("http://{}", addr)
}

#[tokio::test]
async fn test_forward_returns_target_response() {
    let target = common::start_target().await;

    let response = forwarder()
        .forward(&ForwardRequest::get(base(target), "/ok"))
        .await
        .unwrap();

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body_text(), r#"{"ok":true}"#);
    assert_eq!(response.headers[header::CONTENT_TYPE], "application/json");
}

#[tokio::test]
async fn test_target_sees_method_and_json_body() {
    let target = common::start_target().await;

    let request = ForwardRequest::new(base(target), "/echo", "PUT", Some(json!({"a": 1}))).unwrap();
    let response = forwarder().forward(&request).await.unwrap();
    let echoed: Value = serde_json::from_slice(&response.body).unwrap();

    assert_eq!(echoed["method"], "PUT");
    assert_eq!(echoed["content_type"], "application/json");
    assert_eq!(echoed["body"], json!({"a": 1}));
}

#[tokio::test]
async fn test_absent_payload_sends_empty_body() {
    let target = common::start_target().await;

    let response = forwarder()
        .forward(&ForwardRequest::delete(base(target), "/echo"))
        .await
        .unwrap();
    let echoed: Value = serde_json::from_slice(&response.body).unwrap();

    assert_eq!(echoed["method"], "DELETE");
    assert_eq!(echoed["body_len"], 0);
    assert_eq!(echoed["content_type"], "application/json");
}

#[tokio::test]
async fn test_follows_permanent_redirect() {
    let target = common::start_target().await;

    let response = forwarder()
        .forward(&ForwardRequest::get(base(target), "/moved"))
        .await
        .unwrap();

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body_text(), r#"{"x":1}"#);
}

#[tokio::test]
async fn test_redirect_limit() {
    let target = common::start_target().await;
    let forwarder = forwarder();

    let response = forwarder
        .forward(&ForwardRequest::get(base(target), "/hop/10"))
        .await
        .unwrap();
    assert_eq!(response.status, StatusCode::OK);

    let err = forwarder
        .forward(&ForwardRequest::get(base(target), "/hop/11"))
        .await
        .unwrap_err();
    assert!(matches!(err, ForwardError::RedirectLimit(10)), "got {err:?}");
}

#[tokio::test]
async fn test_error_statuses_are_responses_not_errors() {
    let target = common::start_target().await;

    let response = forwarder()
        .forward(&ForwardRequest::post(base(target), "/status/503", json!({})))
        .await
        .unwrap();
    assert_eq!(response.status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_silent_target_times_out() {
    let target = common::start_silent_target().await;
    let config = ForwarderConfig {
        timeout_ms: 300,
        ..ForwarderConfig::default()
    };
    let forwarder = Forwarder::from_config(&config).unwrap();

    let start = Instant::now();
    let err = forwarder
        .forward(&ForwardRequest::get(base(target), "/never"))
        .await
        .unwrap_err();
    let elapsed = start.elapsed();

    assert!(err.is_timeout(), "got {err:?}");
    assert!(elapsed >= Duration::from_millis(290), "returned after {elapsed:?}");
    assert!(elapsed < Duration::from_millis(1300), "returned after {elapsed:?}");
}

#[tokio::test]
async fn test_connection_refused() {
    let target = common::closed_address().await;

    let err = forwarder()
        .forward(&ForwardRequest::get(base(target), "/"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "connect", "got {err:?}");
}

#[tokio::test]
async fn test_identical_forwards_are_structurally_identical() {
    let target = common::start_target().await;
    let forwarder = forwarder();
    let request = ForwardRequest::post(base(target), "/echo", json!({"a": 1}));

    let first = forwarder.forward(&request).await.unwrap();
    let second = forwarder.forward(&request).await.unwrap();

    assert_eq!(first.status, second.status);
    assert_eq!(first.body, second.body);
    let names = |r: &api_proxy::ForwardResponse| {
        let mut names: Vec<String> = r.headers.keys().map(|k| k.to_string()).collect();
        names.sort();
        names
    };
    assert_eq!(names(&first), names(&second));
}
