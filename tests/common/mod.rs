//! Shared target servers and proxy harness for integration tests.

#![allow(dead_code)]

use api_proxy::config::ProxyConfig;
use api_proxy::{HttpServer, Shutdown};
use axum::{
    body::Bytes,
    extract::Path,
    http::{header, HeaderMap, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{any, get},
    Json, Router,
};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;

/// Start a target server on an ephemeral port.
///
/// - `/ok` → 200 `{"ok":true}`
/// - `/echo` → 200 with the method, content type and parsed JSON body
/// - `/moved` → 301 to `/final`, which answers `{"x":1}`
/// - `/hop/{n}` → 302 to `/hop/{n-1}`; `/hop/0` answers `{"x":1}`
/// - `/status/{code}` → that status with a small JSON body
pub async fn start_target() -> SocketAddr {
    let app = Router::new()
        .route("/ok", get(|| async { Json(json!({"ok": true})) }))
        .route("/echo", any(echo))
        .route("/moved", any(|| async { redirect(StatusCode::MOVED_PERMANENTLY, "/final") }))
        .route("/final", get(|| async { Json(json!({"x": 1})) }))
        .route("/hop/{n}", any(hop))
        .route("/status/{code}", any(status));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    addr
}

async fn echo(method: Method, headers: HeaderMap, body: Bytes) -> Json<Value> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let parsed: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);

    Json(json!({
        "method": method.as_str(),
        "content_type": content_type,
        "body_len": body.len(),
        "body": parsed,
    }))
}

async fn hop(Path(n): Path<u32>) -> Response {
    if n == 0 {
        Json(json!({"x": 1})).into_response()
    } else {
        redirect(StatusCode::FOUND, &format!("/hop/{}", n - 1))
    }
}

async fn status(Path(code): Path<u16>) -> Response {
    let status = StatusCode::from_u16(code).unwrap();
    (status, Json(json!({"status": code}))).into_response()
}

fn redirect(status: StatusCode, location: &str) -> Response {
    (status, [(header::LOCATION, location.to_string())]).into_response()
}

/// Accepts connections and never answers.
pub async fn start_silent_target() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((socket, _)) => {
                    tokio::spawn(async move {
                        let _socket = socket;
                        tokio::time::sleep(Duration::from_secs(120)).await;
                    });
                }
                Err(_) => break,
            }
        }
    });
    addr
}

/// An address nothing is listening on.
pub async fn closed_address() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

/// Run the proxy on an ephemeral port.
pub async fn start_proxy(config: ProxyConfig) -> (SocketAddr, Shutdown) {
    let server = HttpServer::new(config).unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let receiver = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, receiver).await;
    });
    (addr, shutdown)
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
