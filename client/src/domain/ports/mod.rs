//! Domain ports defining the edges of the hexagon.
//!
//! The client core talks to two driven adapters: the HTTP transport that
//! carries every request, and the durable storage holding the bearer
//! credential between process runs. Each port exposes a typed error so
//! adapters map their failures into predictable variants.

mod http_transport;
mod macros;
mod token_persistence;

pub(crate) use macros::define_port_error;

#[cfg(test)]
pub use http_transport::MockHttpTransport;
pub use http_transport::{HttpTransport, TransportError, TransportRequest, TransportResponse};
#[cfg(test)]
pub use token_persistence::MockTokenPersistence;
pub use token_persistence::{TokenPersistence, TokenPersistenceError};
