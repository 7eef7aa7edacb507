//! File-backed credential storage.
//!
//! The state directory holds one JSON object, `session.json`, mapping storage
//! keys to string values. The bearer token lives under
//! [`TOKEN_STORAGE_KEY`]; other keys are preserved untouched. Writes go to a
//! staging file first and are renamed into place.

use std::io;
use std::path::{Path, PathBuf};

use cap_std::{ambient_authority, fs::Dir};
use serde_json::{Map, Value};

use crate::domain::TOKEN_STORAGE_KEY;
use crate::domain::ports::{TokenPersistence, TokenPersistenceError};

/// Name of the session document inside the state directory.
pub const SESSION_FILE_NAME: &str = "session.json";
const STAGING_FILE_NAME: &str = ".session.json.tmp";

/// Credential storage rooted at a state directory.
#[derive(Debug, Clone)]
pub struct FileTokenPersistence {
    state_dir: PathBuf,
}

impl FileTokenPersistence {
    /// Store the session document under `state_dir`. The directory is created
    /// on first write.
    pub fn new(state_dir: impl Into<PathBuf>) -> Self {
        Self {
            state_dir: state_dir.into(),
        }
    }

    /// Directory holding the session document.
    pub fn state_dir(&self) -> &Path {
        &self.state_dir
    }

    /// Full path of the session document.
    pub fn session_file(&self) -> PathBuf {
        self.state_dir.join(SESSION_FILE_NAME)
    }

    fn open_existing_dir(&self) -> Result<Option<Dir>, TokenPersistenceError> {
        match Dir::open_ambient_dir(&self.state_dir, ambient_authority()) {
            Ok(dir) => Ok(Some(dir)),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(error) => Err(self.io_error(&error)),
        }
    }

    fn open_or_create_dir(&self) -> Result<Dir, TokenPersistenceError> {
        Dir::create_ambient_dir_all(&self.state_dir, ambient_authority())
            .map_err(|error| self.io_error(&error))?;
        Dir::open_ambient_dir(&self.state_dir, ambient_authority())
            .map_err(|error| self.io_error(&error))
    }

    fn read_document(&self, dir: &Dir) -> Result<Map<String, Value>, TokenPersistenceError> {
        let raw = match dir.read_to_string(SESSION_FILE_NAME) {
            Ok(raw) => raw,
            Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(error) => return Err(self.io_error(&error)),
        };
        match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Object(document)) => Ok(document),
            Ok(_) => Err(TokenPersistenceError::corrupt(format!(
                "{} is not a JSON object",
                self.session_file().display()
            ))),
            Err(error) => Err(TokenPersistenceError::corrupt(format!(
                "{}: {error}",
                self.session_file().display()
            ))),
        }
    }

    /// Read the document about to be rewritten. A corrupt document is
    /// replaced; any other read failure aborts the write.
    fn read_document_for_update(
        &self,
        dir: &Dir,
    ) -> Result<Map<String, Value>, TokenPersistenceError> {
        match self.read_document(dir) {
            Err(TokenPersistenceError::Corrupt { .. }) => Ok(Map::new()),
            other => other,
        }
    }

    fn write_document(
        &self,
        dir: &Dir,
        document: &Map<String, Value>,
    ) -> Result<(), TokenPersistenceError> {
        let encoded = serde_json::to_vec_pretty(document)
            .map_err(|error| TokenPersistenceError::corrupt(error.to_string()))?;
        dir.write(STAGING_FILE_NAME, encoded)
            .map_err(|error| self.io_error(&error))?;
        dir.rename(STAGING_FILE_NAME, dir, SESSION_FILE_NAME)
            .map_err(|error| self.io_error(&error))
    }

    fn io_error(&self, error: &io::Error) -> TokenPersistenceError {
        TokenPersistenceError::io(format!("{}: {error}", self.state_dir.display()))
    }
}

impl TokenPersistence for FileTokenPersistence {
    fn load(&self) -> Result<Option<String>, TokenPersistenceError> {
        let Some(dir) = self.open_existing_dir()? else {
            return Ok(None);
        };
        let document = self.read_document(&dir)?;
        match document.get(TOKEN_STORAGE_KEY) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(token)) => Ok(Some(token.clone())),
            Some(_) => Err(TokenPersistenceError::corrupt(format!(
                "{TOKEN_STORAGE_KEY} is not a string"
            ))),
        }
    }

    fn save(&self, token: &str) -> Result<(), TokenPersistenceError> {
        let dir = self.open_or_create_dir()?;
        let mut document = self.read_document_for_update(&dir)?;
        document.insert(TOKEN_STORAGE_KEY.to_owned(), Value::String(token.to_owned()));
        self.write_document(&dir, &document)
    }

    fn clear(&self) -> Result<(), TokenPersistenceError> {
        let Some(dir) = self.open_existing_dir()? else {
            return Ok(());
        };
        let mut document = self.read_document_for_update(&dir)?;
        if document.remove(TOKEN_STORAGE_KEY).is_none() && !dir.exists(SESSION_FILE_NAME) {
            return Ok(());
        }
        if document.is_empty() {
            return match dir.remove_file(SESSION_FILE_NAME) {
                Ok(()) => Ok(()),
                Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(()),
                Err(error) => Err(self.io_error(&error)),
            };
        }
        self.write_document(&dir, &document)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::{fixture, rstest};
    use tempfile::TempDir;

    #[fixture]
    fn state_dir() -> TempDir {
        tempfile::tempdir().expect("temp dir")
    }

    fn write_raw(dir: &TempDir, contents: &str) {
        let handle = Dir::open_ambient_dir(dir.path(), ambient_authority()).expect("open temp dir");
        handle
            .write(SESSION_FILE_NAME, contents)
            .expect("write session file");
    }

    #[rstest]
    fn load_without_directory_is_absent(state_dir: TempDir) {
        let storage = FileTokenPersistence::new(state_dir.path().join("missing"));

        assert_eq!(storage.load().expect("load"), None);
    }

    #[rstest]
    fn save_then_load_round_trips_through_nested_directory(state_dir: TempDir) {
        let storage = FileTokenPersistence::new(state_dir.path().join("nested/state"));

        storage.save("tkn1").expect("save");
        storage.save("tkn2").expect("overwrite");

        let reopened = FileTokenPersistence::new(state_dir.path().join("nested/state"));
        assert_eq!(reopened.load().expect("load"), Some("tkn2".to_owned()));
    }

    #[rstest]
    fn save_preserves_unrelated_keys(state_dir: TempDir) {
        write_raw(&state_dir, r#"{"crdc-precheck.theme":"dark"}"#);
        let storage = FileTokenPersistence::new(state_dir.path());

        storage.save("tkn1").expect("save");
        storage.clear().expect("clear");

        let handle = Dir::open_ambient_dir(state_dir.path(), ambient_authority()).expect("open");
        let raw = handle.read_to_string(SESSION_FILE_NAME).expect("document kept");
        let document: Value = serde_json::from_str(&raw).expect("JSON document");
        assert_eq!(document, serde_json::json!({"crdc-precheck.theme": "dark"}));
    }

    #[rstest]
    fn clear_removes_document_holding_only_the_token(state_dir: TempDir) {
        let storage = FileTokenPersistence::new(state_dir.path());
        storage.save("tkn1").expect("save");

        storage.clear().expect("clear");
        storage.clear().expect("second clear is a no-op");

        assert!(!storage.session_file().exists());
        assert_eq!(storage.load().expect("load"), None);
    }

    #[rstest]
    #[case::not_json("{not json")]
    #[case::not_an_object("[1, 2]")]
    #[case::token_not_string(r#"{"crdc-precheck.api-token": 42}"#)]
    fn unreadable_documents_are_corrupt(state_dir: TempDir, #[case] contents: &str) {
        write_raw(&state_dir, contents);
        let storage = FileTokenPersistence::new(state_dir.path());

        let error = storage.load().expect_err("corrupt document");

        assert_eq!(error.kind(), "Corrupt");
    }

    #[rstest]
    fn save_replaces_a_corrupt_document(state_dir: TempDir) {
        write_raw(&state_dir, "{not json");
        let storage = FileTokenPersistence::new(state_dir.path());

        storage.save("tkn1").expect("save overwrites");

        assert_eq!(storage.load().expect("load"), Some("tkn1".to_owned()));
    }

    #[rstest]
    fn unreadable_document_is_left_untouched(state_dir: TempDir) {
        let handle = Dir::open_ambient_dir(state_dir.path(), ambient_authority()).expect("open");
        let original: &[u8] = b"{\"crdc-precheck.theme\": \"\xff\"}";
        handle
            .write(SESSION_FILE_NAME, original)
            .expect("write session file");
        let storage = FileTokenPersistence::new(state_dir.path());

        let saved = storage.save("tkn1").expect_err("read failure aborts save");
        let cleared = storage.clear().expect_err("read failure aborts clear");

        assert_eq!(saved.kind(), "Io");
        assert_eq!(cleared.kind(), "Io");
        assert_eq!(handle.read(SESSION_FILE_NAME).expect("document kept"), original);
    }
}
