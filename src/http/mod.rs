//! HTTP protocol handling subsystem (the inbound adapter).
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → request.rs (request id)
//!     → handler.rs (extract params, call the forwarder)
//!         → params.rs (baseUrl / path / payload / method override)
//!     → envelope.rs (wrap the result, pick status)
//!     → Send to client
//! ```

pub mod envelope;
pub mod handler;
pub mod params;
pub mod request;
pub mod server;

pub use envelope::{EnvelopeError, EnvelopeSettings, ResponseEnvelope};
pub use params::InboundError;
pub use request::X_REQUEST_ID;
pub use server::{AppState, HttpServer};
