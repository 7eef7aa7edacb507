//! Process-local credential storage.

use std::sync::{Arc, Mutex, PoisonError};

use crate::domain::ports::{TokenPersistence, TokenPersistenceError};

/// Shared in-memory cell.
///
/// Clones share the same cell, so a "restart" can be simulated by building a
/// second token store over a clone.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTokenPersistence {
    cell: Arc<Mutex<Option<String>>>,
}

impl InMemoryTokenPersistence {
    /// Create an empty cell.
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenPersistence for InMemoryTokenPersistence {
    fn load(&self) -> Result<Option<String>, TokenPersistenceError> {
        Ok(self
            .cell
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    fn save(&self, token: &str) -> Result<(), TokenPersistenceError> {
        *self.cell.lock().unwrap_or_else(PoisonError::into_inner) = Some(token.to_owned());
        Ok(())
    }

    fn clear(&self) -> Result<(), TokenPersistenceError> {
        *self.cell.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;

    #[test]
    fn clones_share_one_cell() {
        let storage = InMemoryTokenPersistence::new();
        let clone = storage.clone();

        storage.save("abc").expect("save");

        assert_eq!(clone.load().expect("load"), Some("abc".to_owned()));
        clone.clear().expect("clear");
        assert_eq!(storage.load().expect("load"), None);
    }
}
