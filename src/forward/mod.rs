//! Forwarding core.
//!
//! # Data Flow
//! ```text
//! ForwardRequest {base_url, path, method, payload}
//!     → forwarder.rs (URL build, JSON body, deadline, redirect loop)
//!     → transport.rs (one HTTP exchange per hop)
//!     → ForwardResult = Result<ForwardResponse, ForwardError>
//! ```
//!
//! # Design Decisions
//! - Transport is injected, never global, so tests can script it
//! - Single attempt; callers wanting retries wrap `forward`
//! - Redirects are followed by the forwarder, not the HTTP client

pub mod error;
pub mod forwarder;
pub mod transport;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{ForwardError, ForwardResult};
pub use forwarder::Forwarder;
pub use transport::{OutboundRequest, ReqwestTransport, Transport};
pub use types::{ForwardRequest, ForwardResponse};
