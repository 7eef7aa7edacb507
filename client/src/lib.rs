//! Data access and session layer for the CRDC PreCheck compliance dashboard.
//!
//! The [`domain`] module holds the client core: the token store, the header
//! builder, the request dispatcher and one typed operation per backend
//! resource. [`outbound`] supplies the reqwest transport and credential
//! storage adapters, and [`config`] loads connection settings.

pub mod config;
pub mod domain;
pub mod outbound;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use config::ClientSettings;
