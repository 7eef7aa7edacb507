//! Port for durable credential storage.
//!
//! Storage holds a single value, the last-known bearer token, so it survives
//! process restarts. Reads and writes are synchronous: the backing store is
//! local and small.

use super::define_port_error;

define_port_error! {
    /// Errors raised by credential storage adapters.
    pub enum TokenPersistenceError {
        /// The backing store could not be read or written.
        Io { message: String } => "credential storage I/O failed: {message}",
        /// The stored document exists but cannot be parsed.
        Corrupt { message: String } => "credential storage is unreadable: {message}",
    }
}

/// Durable cell holding the last-known bearer token.
#[cfg_attr(test, mockall::automock)]
pub trait TokenPersistence: Send + Sync {
    /// Return the stored token, or `None` when nothing was persisted.
    fn load(&self) -> Result<Option<String>, TokenPersistenceError>;

    /// Replace the stored token.
    fn save(&self, token: &str) -> Result<(), TokenPersistenceError>;

    /// Remove the stored token; succeeds when nothing was stored.
    fn clear(&self) -> Result<(), TokenPersistenceError>;
}
