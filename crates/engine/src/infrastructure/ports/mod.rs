//! Port traits for infrastructure boundaries.
//!
//! Ports exist for:
//! - HTTP transport (could swap reqwest -> anything that can POST a body)
//! - Random draws (seedable for tests)

mod external;
mod testing;

pub use external::{Headers, HttpMethod, Transport, TransportResult};
pub use testing::RandomPort;

#[cfg(test)]
pub use external::MockTransport;
