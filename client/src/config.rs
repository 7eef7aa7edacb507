//! Client configuration loaded via OrthoConfig.

use std::path::PathBuf;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use url::Url;

const DEFAULT_API_URL: &str = "http://localhost:8000";
const STATE_DIR_NAME: &str = "crdc-precheck";

fn default_state_dir() -> PathBuf {
    dirs::data_local_dir().map_or_else(
        || PathBuf::from(format!(".{STATE_DIR_NAME}")),
        |base| base.join(STATE_DIR_NAME),
    )
}

/// Connection and storage settings for the compliance API client.
///
/// Read from `PRECHECK_*` environment variables and configuration files.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "PRECHECK")]
pub struct ClientSettings {
    /// Base URL of the compliance API.
    pub api_url: Option<String>,
    /// Credential used when nothing was persisted by an earlier login.
    pub api_token: Option<String>,
    /// Directory holding the persisted session document.
    pub state_dir: Option<PathBuf>,
}

impl ClientSettings {
    /// Return the configured API base URL, falling back to the local default.
    ///
    /// # Errors
    ///
    /// Returns a parse error when the configured value is not an absolute URL.
    pub fn api_url(&self) -> Result<Url, url::ParseError> {
        Url::parse(self.api_url.as_deref().unwrap_or(DEFAULT_API_URL))
    }

    /// Return the boot-time credential; empty means unauthenticated.
    pub fn api_token(&self) -> &str {
        self.api_token.as_deref().unwrap_or_default()
    }

    /// Return the state directory, falling back to the platform data dir.
    pub fn state_dir(&self) -> PathBuf {
        self.state_dir.clone().unwrap_or_else(default_state_dir)
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for client configuration parsing.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    fn load_from_empty_args() -> ClientSettings {
        ClientSettings::load_from_iter([OsString::from("precheck")]).expect("config should load")
    }

    #[rstest]
    fn default_values_are_used_when_missing() {
        let _guard = lock_env([
            ("PRECHECK_API_URL", None::<String>),
            ("PRECHECK_API_TOKEN", None::<String>),
            ("PRECHECK_STATE_DIR", None::<String>),
        ]);

        let settings = load_from_empty_args();
        assert_eq!(
            settings.api_url().expect("default URL parses").as_str(),
            "http://localhost:8000/"
        );
        assert_eq!(settings.api_token(), "");
        assert_eq!(settings.state_dir(), default_state_dir());
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env([
            ("PRECHECK_API_URL", Some("https://precheck.example.org/api".to_owned())),
            ("PRECHECK_API_TOKEN", Some("boot-token".to_owned())),
            ("PRECHECK_STATE_DIR", Some("/tmp/precheck-state".to_owned())),
        ]);

        let settings = load_from_empty_args();
        assert_eq!(
            settings.api_url().expect("override parses").as_str(),
            "https://precheck.example.org/api"
        );
        assert_eq!(settings.api_token(), "boot-token");
        assert_eq!(settings.state_dir(), PathBuf::from("/tmp/precheck-state"));
    }

    #[rstest]
    fn relative_api_url_is_rejected() {
        let _guard = lock_env([("PRECHECK_API_URL", Some("/api".to_owned()))]);

        let settings = load_from_empty_args();
        assert!(settings.api_url().is_err());
    }
}
