//! Federated login payloads.

use serde::{Deserialize, Serialize};

use crate::domain::session::SessionUpdate;

/// Body of `POST /auth/sso`: a simulated identity-provider assertion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SsoLoginRequest {
    /// Identity provider name, e.g. `google`.
    pub provider: String,
    /// Provider-scoped subject identifier.
    pub subject: String,
    /// Operator email.
    pub email: String,
    /// Operator display name.
    pub display_name: String,
}

/// Operator account as returned by the auth endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserAccount {
    /// Account identifier.
    pub id: String,
    /// District the account belongs to.
    pub district_id: String,
    /// Email address.
    pub email: String,
    /// Display name.
    pub display_name: String,
    /// `admin`, `data_engineer`, `reviewer` or `readonly`.
    pub role: String,
    /// Whether the account may sign in.
    pub is_active: bool,
    /// Provider the account was created through.
    pub sso_provider: Option<String>,
    /// Provider subject.
    pub sso_subject: Option<String>,
    /// Last successful login.
    pub last_login_at: Option<String>,
}

/// Response of `POST /auth/sso` and `GET /auth/me`.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthResponse {
    /// Bearer credential for subsequent calls.
    pub token: String,
    /// Authenticated account.
    pub user: UserAccount,
}

impl std::fmt::Debug for AuthResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthResponse")
            .field("token", &"<redacted>")
            .field("user", &self.user)
            .finish()
    }
}

/// Result of a login: the server response plus the session change it implies.
///
/// The login operation never touches the token store itself; whoever receives
/// the outcome applies [`LoginOutcome::update`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginOutcome {
    /// Server response.
    pub auth: AuthResponse,
    /// Session change to apply.
    pub update: SessionUpdate,
}

impl From<AuthResponse> for LoginOutcome {
    fn from(auth: AuthResponse) -> Self {
        let update = SessionUpdate::Authenticated {
            token: auth.token.clone(),
        };
        Self { auth, update }
    }
}
