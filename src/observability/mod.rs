//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Forwarding and HTTP layers produce:
//!     → logging.rs (structured tracing events, request-id fields)
//!     → metrics.rs (forward counters and latency histograms)
//!
//! Consumers:
//!     → stdout (fmt layer, filtered by RUST_LOG or config)
//!     → Prometheus scrape endpoint (optional)
//! ```

pub mod logging;
pub mod metrics;
