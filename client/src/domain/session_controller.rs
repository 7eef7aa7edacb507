//! Applies session updates produced by login and logout.

use tracing::info;

use super::compliance_api::ComplianceApi;
use super::error::ApiResult;
use super::models::{AuthResponse, LoginOutcome, SsoLoginRequest};
use super::ports::HttpTransport;
use super::session::SessionUpdate;
use super::tenant::DistrictId;

/// Owns the coupling between login and the token store.
///
/// [`ComplianceApi::login_sso`] only reports the session change; this
/// controller performs the login and applies the change, so every later call
/// through the same dispatcher carries the new credential.
pub struct SessionController<T> {
    api: ComplianceApi<T>,
}

impl<T> SessionController<T>
where
    T: HttpTransport,
{
    /// Wrap the operations whose dispatcher shares the token store to update.
    pub fn new(api: ComplianceApi<T>) -> Self {
        Self { api }
    }

    /// Log in and adopt the returned credential.
    ///
    /// When the credential cannot be persisted the process is still
    /// authenticated, but the call fails with [`ApiError::Session`] so the
    /// caller knows a restart will not be.
    ///
    /// [`ApiError::Session`]: super::ApiError::Session
    ///
    /// # Errors
    ///
    /// Returns the login failure, or [`ApiError::Session`] when persisting the
    /// credential fails.
    pub async fn login(
        &self,
        district: &DistrictId,
        login: &SsoLoginRequest,
    ) -> ApiResult<AuthResponse> {
        let LoginOutcome { auth, update } = self.api.login_sso(district, login).await?;
        self.api.dispatcher().session().apply(&update)?;
        info!(district = %district, user = %auth.user.id, "logged in");
        Ok(auth)
    }

    /// Forget the credential in memory and in storage.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Session`](super::ApiError::Session) when the stored
    /// credential could not be removed.
    pub fn logout(&self) -> ApiResult<()> {
        self.api
            .dispatcher()
            .session()
            .apply(&SessionUpdate::SignedOut)?;
        Ok(())
    }

    /// Account behind the restored credential, if any.
    ///
    /// Returns `Ok(None)` without a network call when no credential is held.
    ///
    /// # Errors
    ///
    /// Returns the dispatcher's error, e.g. a rejected stale credential.
    pub async fn restore(&self, district: &DistrictId) -> ApiResult<Option<AuthResponse>> {
        if !self.api.dispatcher().session().is_authenticated() {
            return Ok(None);
        }
        self.api.current_session(district).await.map(Some)
    }
}
