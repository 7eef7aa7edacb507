//! Client core: session state, header policy, dispatch and resource operations.
//!
//! Purpose: Turn typed resource operations into authenticated, tenant-scoped
//! HTTP exchanges and turn the responses back into typed records or one
//! [`ApiError`]. The core owns no I/O; it reaches the network and durable
//! storage only through the [`ports`].
//!
//! Public surface:
//! - TokenStore: holder of the bearer credential, loaded on construction.
//! - build_headers: merges caller headers with client defaults.
//! - Dispatcher: executes one request and normalizes the outcome.
//! - ComplianceApi: one method per backend resource operation.
//! - SessionController: applies login and logout to the token store.

pub mod compliance_api;
pub mod dispatcher;
pub mod error;
pub mod headers;
pub mod models;
pub mod ports;
pub mod request;
pub mod session;
pub mod session_controller;
pub mod tenant;

pub use self::compliance_api::ComplianceApi;
pub use self::dispatcher::Dispatcher;
pub use self::error::{ApiError, ApiResult};
pub use self::headers::{
    AUTHORIZATION, CACHE_CONTROL, CONTENT_TYPE, DISTRICT_ID, HeaderSet, JSON_CONTENT_TYPE,
    NO_STORE, build_headers,
};
pub use self::models::*;
pub use self::request::{ApiRequest, BodyEncoding, FormPart, MultipartForm, RequestBody};
pub use self::session::{SessionUpdate, TOKEN_STORAGE_KEY, TokenStore};
pub use self::session_controller::SessionController;
pub use self::tenant::{DistrictId, DistrictIdValidationError};
