//! The single path every network call takes.
//!
//! [`Dispatcher`] builds final headers, resolves the request path against the
//! API base URL, hands the exchange to the [`HttpTransport`] port, and
//! normalizes the outcome. JSON, multipart and raw-binary calls all go through
//! [`Dispatcher::execute`], so they share one success/failure rule.

use std::sync::Arc;

use bytes::Bytes;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;

use super::error::{ApiError, ApiResult};
use super::headers::{CACHE_CONTROL, NO_STORE, build_headers};
use super::ports::{HttpTransport, TransportRequest, TransportResponse};
use super::request::ApiRequest;
use super::session::TokenStore;

/// Executes [`ApiRequest`]s against a fixed base URL.
///
/// No retries, no backoff and no timeouts are applied here: a failed call
/// fails exactly once.
pub struct Dispatcher<T> {
    transport: Arc<T>,
    base_url: Url,
    session: Arc<TokenStore>,
}

impl<T> Clone for Dispatcher<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            base_url: self.base_url.clone(),
            session: Arc::clone(&self.session),
        }
    }
}

impl<T> Dispatcher<T>
where
    T: HttpTransport,
{
    /// Create a dispatcher over `transport`, reading the credential from
    /// `session` on every call.
    pub fn new(transport: Arc<T>, base_url: Url, session: Arc<TokenStore>) -> Self {
        Self {
            transport,
            base_url,
            session,
        }
    }

    /// Session state consulted for the bearer credential.
    pub fn session(&self) -> &Arc<TokenStore> {
        &self.session
    }

    /// Base URL every request path is appended to.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Execute `request` and decode the success body as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Rejected`] for non-success statuses,
    /// [`ApiError::Transport`] or [`ApiError::UnhandledCall`] when the
    /// exchange did not complete, and [`ApiError::Decode`] when the body does
    /// not match `R`.
    pub async fn request<R>(&self, request: ApiRequest) -> ApiResult<R>
    where
        R: DeserializeOwned,
    {
        let body = self.execute(request).await?;
        decode_json(&body)
    }

    /// Execute `request` and return the success body untouched.
    ///
    /// # Errors
    ///
    /// Same failure rule as [`Dispatcher::request`], without decoding.
    pub async fn request_raw(&self, request: ApiRequest) -> ApiResult<Bytes> {
        self.execute(request).await
    }

    async fn execute(&self, request: ApiRequest) -> ApiResult<Bytes> {
        let (method, path, caller, body) = request.into_parts();
        let token = self.session.get();
        let mut headers = build_headers(Some(&caller), &token, body.encoding());
        headers.insert_if_absent(CACHE_CONTROL, NO_STORE);
        let url = self.endpoint(&path);

        debug!(%method, %url, "dispatching request");
        let response = self
            .transport
            .send(TransportRequest {
                method: method.clone(),
                url: url.clone(),
                headers,
                body,
            })
            .await
            .map_err(|error| {
                warn!(%method, %url, %error, kind = error.kind(), "request did not complete");
                ApiError::from(error)
            })?;

        let status = response.status;
        interpret(response).inspect_err(|error| {
            warn!(%method, %url, status = status.as_u16(), %error, "request rejected");
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url.as_str().trim_end_matches('/'))
    }
}

/// Apply the success/failure rule to a raw response.
///
/// # Errors
///
/// Returns [`ApiError::Rejected`] for any status outside `2xx`.
pub fn interpret(response: TransportResponse) -> ApiResult<Bytes> {
    if response.status.is_success() {
        Ok(response.body)
    } else {
        Err(ApiError::from_status(response.status, &response.body))
    }
}

fn decode_json<R>(body: &[u8]) -> ApiResult<R>
where
    R: DeserializeOwned,
{
    serde_json::from_slice(body).map_err(|error| ApiError::decode(error.to_string()))
}
