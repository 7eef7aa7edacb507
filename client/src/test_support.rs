//! Test utilities for the client crate.
//!
//! This module provides shared helpers for both unit tests (in `src/`) and
//! integration tests (in `tests/`). It is only compiled for tests or with the
//! `test-support` feature.

use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use bytes::Bytes;
use http::{Method, StatusCode};
use serde_json::Value;
use url::Url;

use crate::domain::ports::{HttpTransport, TransportError, TransportRequest, TransportResponse};
use crate::domain::{ComplianceApi, Dispatcher, SessionController, TokenStore};
use crate::outbound::token_storage::InMemoryTokenPersistence;

/// Base URL used by [`ScriptedClient`].
pub const SCRIPTED_BASE_URL: &str = "http://precheck.test";

/// Canned response returned by [`ScriptedTransport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptedResponse {
    status: StatusCode,
    body: Bytes,
}

impl ScriptedResponse {
    /// `200 OK` with `value` serialized as the body.
    pub fn json(value: Value) -> Self {
        Self::json_with_status(StatusCode::OK, value)
    }

    /// `status` with `value` serialized as the body.
    pub fn json_with_status(status: StatusCode, value: Value) -> Self {
        Self {
            status,
            body: Bytes::from(value.to_string()),
        }
    }

    /// `status` with a plain text body.
    pub fn text(status: StatusCode, body: &str) -> Self {
        Self {
            status,
            body: Bytes::copy_from_slice(body.as_bytes()),
        }
    }

    /// `status` with an empty body.
    pub fn empty(status: StatusCode) -> Self {
        Self::text(status, "")
    }
}

#[derive(Debug, Clone)]
struct Route {
    method: Method,
    target: String,
    response: ScriptedResponse,
}

/// In-memory [`HttpTransport`] answering from a fixed route table.
///
/// Routes match on method plus the exact path and query of the request URL.
/// Unmatched calls fail with [`TransportError::Unhandled`]. Every request is
/// recorded, matched or not.
///
/// # Examples
/// ```
/// use http::Method;
/// use precheck_client::test_support::{ScriptedResponse, ScriptedTransport};
/// use serde_json::json;
///
/// let transport = ScriptedTransport::new()
///     .on(Method::GET, "/districts", ScriptedResponse::json(json!([])));
/// assert!(transport.requests().is_empty());
/// ```
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    routes: Vec<Route>,
    requests: Mutex<Vec<TransportRequest>>,
}

impl ScriptedTransport {
    /// Create a transport with no routes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `method target` with `response`. The first matching route wins.
    #[must_use]
    pub fn on(mut self, method: Method, target: &str, response: ScriptedResponse) -> Self {
        self.routes.push(Route {
            method,
            target: target.to_owned(),
            response,
        });
        self
    }

    /// Requests received so far, in arrival order.
    pub fn requests(&self) -> Vec<TransportRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn target_of(url: &str) -> Option<String> {
        let parsed = Url::parse(url).ok()?;
        let mut target = parsed.path().to_owned();
        if let Some(query) = parsed.query() {
            target.push('?');
            target.push_str(query);
        }
        Some(target)
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, TransportError> {
        let target = Self::target_of(&request.url);
        let matched = self
            .routes
            .iter()
            .find(|route| {
                route.method == request.method
                    && target.as_deref() == Some(route.target.as_str())
            })
            .map(|route| route.response.clone());
        let (method, url) = (request.method.to_string(), request.url.clone());
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request);
        match matched {
            Some(response) => Ok(TransportResponse::new(response.status, response.body)),
            None => Err(TransportError::unhandled(method, url)),
        }
    }
}

/// Fully wired client over a [`ScriptedTransport`] and in-memory storage.
pub struct ScriptedClient {
    /// Transport double; inspect with [`ScriptedTransport::requests`].
    pub transport: Arc<ScriptedTransport>,
    /// Storage behind the session, shared so reloads can be simulated.
    pub storage: Arc<InMemoryTokenPersistence>,
    /// Session state.
    pub session: Arc<TokenStore>,
    /// Resource operations.
    pub api: ComplianceApi<ScriptedTransport>,
    /// Session controller over `api`.
    pub controller: SessionController<ScriptedTransport>,
}

impl ScriptedClient {
    /// Wire a client with empty storage and `boot_token` as the fallback
    /// credential.
    pub fn new(transport: ScriptedTransport, boot_token: &str) -> Self {
        Self::with_storage(transport, Arc::new(InMemoryTokenPersistence::new()), boot_token)
    }

    /// Wire a client over existing storage, as a restarted process would.
    #[expect(clippy::expect_used, reason = "the base URL is a valid constant")]
    pub fn with_storage(
        transport: ScriptedTransport,
        storage: Arc<InMemoryTokenPersistence>,
        boot_token: &str,
    ) -> Self {
        let transport = Arc::new(transport);
        let session = Arc::new(TokenStore::initialize(storage.clone(), boot_token));
        let base_url = Url::parse(SCRIPTED_BASE_URL).expect("constant URL parses");
        let api = ComplianceApi::new(Dispatcher::new(
            transport.clone(),
            base_url,
            session.clone(),
        ));
        let controller = SessionController::new(api.clone());
        Self {
            transport,
            storage,
            session,
            api,
            controller,
        }
    }
}
