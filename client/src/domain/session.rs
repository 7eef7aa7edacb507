//! Session state: the bearer credential shared by every request.
//!
//! [`TokenStore`] is the only mutable state in the client core. It is created
//! once, handed to the dispatcher, and loads its value from durable storage on
//! construction so a restarted process observes the last login. Writes go to
//! memory and storage together under one lock, so the last writer wins in both
//! places.

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use tracing::{info, warn};
use zeroize::Zeroizing;

use super::ports::{TokenPersistence, TokenPersistenceError};

/// Fixed storage key holding the bearer token.
pub const TOKEN_STORAGE_KEY: &str = "crdc-precheck.api-token";

/// Change to apply to the session after an operation.
///
/// Login returns one of these instead of mutating the store itself; the caller
/// or a [`SessionController`](super::SessionController) applies it.
#[derive(Clone, PartialEq, Eq)]
pub enum SessionUpdate {
    /// Adopt `token` as the current credential.
    Authenticated {
        /// Credential returned by the server.
        token: String,
    },
    /// Drop the current credential.
    SignedOut,
}

impl fmt::Debug for SessionUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Authenticated { .. } => f
                .debug_struct("Authenticated")
                .field("token", &"<redacted>")
                .finish(),
            Self::SignedOut => f.write_str("SignedOut"),
        }
    }
}

/// Authoritative holder of the current bearer credential.
///
/// An empty credential means "unauthenticated". Only the held copy is zeroized
/// on replacement; the strings returned by [`TokenStore::get`] are ordinary
/// clones that end up in request headers.
///
/// [`TokenStore::set`] and [`TokenStore::clear`] call the persistence port
/// synchronously while holding the write lock, so readers wait for the
/// storage write to finish.
pub struct TokenStore {
    current: RwLock<Zeroizing<String>>,
    persistence: Arc<dyn TokenPersistence>,
}

impl TokenStore {
    /// Load the persisted credential, falling back to `boot_token`.
    ///
    /// A storage read failure is logged and treated as "nothing persisted".
    /// An empty persisted value counts as absent.
    pub fn initialize(persistence: Arc<dyn TokenPersistence>, boot_token: &str) -> Self {
        let restored = match persistence.load() {
            Ok(Some(token)) if !token.is_empty() => Some(token),
            Ok(_) => None,
            Err(error) => {
                warn!(%error, kind = error.kind(), "persisted credential unavailable");
                None
            }
        };
        let initial = restored.unwrap_or_else(|| boot_token.to_owned());
        Self {
            current: RwLock::new(Zeroizing::new(initial)),
            persistence,
        }
    }

    /// Current credential; empty when unauthenticated.
    pub fn get(&self) -> String {
        let guard = self.current.read().unwrap_or_else(PoisonError::into_inner);
        guard.as_str().to_owned()
    }

    /// Whether a non-empty credential is held.
    pub fn is_authenticated(&self) -> bool {
        let guard = self.current.read().unwrap_or_else(PoisonError::into_inner);
        !guard.is_empty()
    }

    /// Make `token` current and persist it.
    ///
    /// The in-memory value changes even when persistence fails, so the running
    /// process stays authenticated; the error reports that a restart will not.
    ///
    /// # Errors
    ///
    /// Returns the storage error when the token could not be persisted.
    pub fn set(&self, token: impl Into<String>) -> Result<(), TokenPersistenceError> {
        let token = Zeroizing::new(token.into());
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        let result = self.persistence.save(token.as_str());
        *guard = token;
        drop(guard);
        if let Err(error) = &result {
            warn!(%error, kind = error.kind(), "credential not persisted");
        } else {
            info!("credential updated");
        }
        result
    }

    /// Forget the credential in memory and in storage.
    ///
    /// # Errors
    ///
    /// Returns the storage error when the persisted value could not be removed.
    pub fn clear(&self) -> Result<(), TokenPersistenceError> {
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        let result = self.persistence.clear();
        *guard = Zeroizing::new(String::new());
        drop(guard);
        if let Err(error) = &result {
            warn!(%error, kind = error.kind(), "persisted credential not removed");
        } else {
            info!("credential cleared");
        }
        result
    }

    /// Apply a session update produced by an operation.
    ///
    /// # Errors
    ///
    /// Propagates storage errors from [`TokenStore::set`] or
    /// [`TokenStore::clear`].
    pub fn apply(&self, update: &SessionUpdate) -> Result<(), TokenPersistenceError> {
        match update {
            SessionUpdate::Authenticated { token } => self.set(token.as_str()),
            SessionUpdate::SignedOut => self.clear(),
        }
    }
}

impl fmt::Debug for TokenStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenStore")
            .field("authenticated", &self.is_authenticated())
            .finish_non_exhaustive()
    }
}
