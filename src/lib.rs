//! Single-hop HTTP forwarding proxy.
//!
//! Callers describe a target (`baseUrl`, `path`, method, JSON `payload`); the
//! proxy makes that call and answers with a JSON envelope holding the target's
//! status, headers and body.

pub mod config;
pub mod forward;
pub mod http;
pub mod lifecycle;
pub mod observability;

pub use config::schema::ProxyConfig;
pub use forward::{ForwardError, ForwardRequest, ForwardResponse, ForwardResult, Forwarder};
pub use http::{HttpServer, ResponseEnvelope};
pub use lifecycle::Shutdown;
