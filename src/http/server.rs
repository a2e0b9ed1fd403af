//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum Router with the forward handler on `/`
//! - Wire up middleware (request id, tracing, inbound timeout, body limit)
//! - Own the Forwarder shared by all requests
//! - Serve until the shutdown signal fires

use axum::{extract::DefaultBodyLimit, middleware, routing::any, Router};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::ProxyConfig;
use crate::forward::{ForwardError, Forwarder, Transport};
use crate::http::envelope::EnvelopeSettings;
use crate::http::handler::{envelope_inbound_timeout, forward_handler};
use crate::http::request::{UuidRequestId, X_REQUEST_ID};

/// Slack on top of the forward deadline before the inbound request is cut off.
const INBOUND_TIMEOUT_MARGIN: Duration = Duration::from_secs(1);

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub forwarder: Arc<Forwarder>,
    pub envelope: Arc<EnvelopeSettings>,
}

/// HTTP server for the forwarding proxy.
pub struct HttpServer {
    router: Router,
    config: ProxyConfig,
}

impl HttpServer {
    /// Create a server that forwards over the production transport.
    pub fn new(config: ProxyConfig) -> Result<Self, ForwardError> {
        let forwarder = Forwarder::from_config(&config.forwarder)?;
        Ok(Self::with_forwarder(config, forwarder))
    }

    /// Create a server over a caller-supplied transport.
    pub fn with_transport(config: ProxyConfig, transport: Arc<dyn Transport>) -> Self {
        let forwarder = Forwarder::new(transport, &config.forwarder);
        Self::with_forwarder(config, forwarder)
    }

    fn with_forwarder(config: ProxyConfig, forwarder: Forwarder) -> Self {
        let state = AppState {
            forwarder: Arc::new(forwarder),
            envelope: Arc::new(EnvelopeSettings::from_config(&config.envelope)),
        };
        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ProxyConfig, state: AppState) -> Router {
        let inbound_timeout = config.forwarder.timeout() + INBOUND_TIMEOUT_MARGIN;
        let envelope = state.envelope.clone();

        Router::new()
            .route("/", any(forward_handler))
            .with_state(state)
            .layer(DefaultBodyLimit::max(config.listener.max_body_bytes))
            .layer(TimeoutLayer::new(inbound_timeout))
            .layer(middleware::map_response_with_state(
                envelope,
                envelope_inbound_timeout,
            ))
            .layer(PropagateRequestIdLayer::new(X_REQUEST_ID))
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::new(X_REQUEST_ID, UuidRequestId))
    }

    /// The fully layered router, for serving or in-process testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            timeout_ms = self.config.forwarder.timeout_ms,
            max_redirects = self.config.forwarder.max_redirects,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }
}
