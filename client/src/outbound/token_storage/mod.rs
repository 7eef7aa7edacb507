//! Credential storage adapters implementing
//! [`TokenPersistence`](crate::domain::ports::TokenPersistence).

mod file;
mod memory;

pub use file::{FileTokenPersistence, SESSION_FILE_NAME};
pub use memory::InMemoryTokenPersistence;
