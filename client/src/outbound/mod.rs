//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **http**: reqwest-backed [`HttpTransport`](crate::domain::ports::HttpTransport)
//! - **token_storage**: file-backed and in-memory credential storage
//!
//! Adapters are thin translators between domain values and infrastructure
//! representations. They contain no business logic.

pub mod http;
pub mod token_storage;
