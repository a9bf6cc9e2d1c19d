//! Infrastructure implementations.
//!
//! Contains port trait implementations for external dependencies, plus the
//! queued API client that sits on top of the transport port.

pub mod api_client;
pub mod json;
pub mod ports;
pub mod random;
pub mod rate_limiter;
pub mod settings;
pub mod transport;
