//! Metrics collection and exposition.
//!
//! # Metrics
//! - `forward_requests_total` (counter): forwards by method, status, outcome
//! - `forward_request_duration_seconds` (histogram): end-to-end forward latency

use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Instant;

/// Start the Prometheus scrape endpoint on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record one completed forward. `outcome` is `"ok"` or an error kind.
pub fn record_forward(method: &str, status: u16, outcome: &'static str, start: Instant) {
    metrics::counter!(
        "forward_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string(),
        "outcome" => outcome
    )
    .increment(1);

    metrics::histogram!(
        "forward_request_duration_seconds",
        "method" => method.to_string(),
        "outcome" => outcome
    )
    .record(start.elapsed().as_secs_f64());
}
