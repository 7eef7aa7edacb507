//! Port for the network transport.
//!
//! The dispatcher hands a fully built [`TransportRequest`] to the transport and
//! receives the raw status and body back. Interpreting the status is the
//! dispatcher's job; adapters only report failures that prevented an HTTP
//! exchange from completing.

use async_trait::async_trait;
use bytes::Bytes;
use http::{Method, StatusCode};

use crate::domain::{HeaderSet, RequestBody};

use super::define_port_error;

define_port_error! {
    /// Errors raised by transport adapters before a response was obtained.
    pub enum TransportError {
        /// The remote host could not be reached or the connection dropped.
        Connection { message: String } => "connection failed: {message}",
        /// The exchange did not complete in time.
        Timeout { message: String } => "request timed out: {message}",
        /// The adapter could not turn the request into a wire message.
        Request { message: String } => "request could not be built: {message}",
        /// The response arrived but its body could not be read.
        Body { message: String } => "response body could not be read: {message}",
        /// No handler exists for the call (test doubles, wrong base URL).
        Unhandled { method: String, url: String } => "unexpected remote call: {method} {url}",
    }
}

/// Fully resolved outbound request.
///
/// Headers are final: defaults, bearer credential and cache directives have
/// already been merged by the dispatcher.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportRequest {
    /// HTTP method.
    pub method: Method,
    /// Absolute URL including any query string.
    pub url: String,
    /// Final header set.
    pub headers: HeaderSet,
    /// Body in exactly one encoding.
    pub body: RequestBody,
}

/// Raw response returned by a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    /// Status code as received.
    pub status: StatusCode,
    /// Complete response body.
    pub body: Bytes,
}

impl TransportResponse {
    /// Build a response from a status and body.
    pub fn new(status: StatusCode, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// Port for issuing HTTP exchanges.
///
/// Implementations must not retry, and must return non-success statuses as
/// ordinary [`TransportResponse`] values rather than errors.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Perform one HTTP exchange.
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, TransportError>;
}
