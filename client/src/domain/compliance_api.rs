//! Typed resource operations against the compliance API.
//!
//! Each method is a thin request shape: method, path, tenant header and body.
//! All of them delegate to the [`Dispatcher`], so failures follow one rule.
//! Trigger operations are not idempotent; repeated calls start new work on
//! the server.

use bytes::Bytes;
use serde_json::json;
use url::form_urlencoded;

use super::dispatcher::Dispatcher;
use super::error::{ApiError, ApiResult};
use super::models::{
    AdminHealth, AuthResponse, CsvFile, CsvImportResult, District, EvidencePacket,
    EvidencePacketCreate, ExceptionCreate, ExceptionMemo, ExceptionMemoCreate, ExceptionRecord,
    ExceptionUpdate, Liveness, LoginOutcome, ReadinessResponse, RuleResult, RuleRun, RuleVersion,
    School, SsoLoginRequest, StudentCsvMapping, SyncTrigger,
};
use super::ports::HttpTransport;
use super::request::{ApiRequest, MultipartForm};
use super::tenant::DistrictId;

const CSV_CONTENT_TYPE: &str = "text/csv";

/// Resource operations exposed to the dashboard.
///
/// # Examples
/// ```no_run
/// use std::sync::Arc;
///
/// use precheck_client::domain::{ComplianceApi, Dispatcher, DistrictId, TokenStore};
/// use precheck_client::outbound::http::ReqwestTransport;
/// use precheck_client::outbound::token_storage::InMemoryTokenPersistence;
///
/// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
/// let session = Arc::new(TokenStore::initialize(Arc::new(InMemoryTokenPersistence::new()), ""));
/// let transport = Arc::new(ReqwestTransport::new()?);
/// let api = ComplianceApi::new(Dispatcher::new(
///     transport,
///     "http://localhost:8000".parse()?,
///     session,
/// ));
/// let district = DistrictId::new("d1")?;
/// let runs = api.list_rule_runs(&district).await?;
/// println!("{} runs", runs.len());
/// # Ok(())
/// # }
/// ```
pub struct ComplianceApi<T> {
    dispatcher: Dispatcher<T>,
}

impl<T> Clone for ComplianceApi<T> {
    fn clone(&self) -> Self {
        Self {
            dispatcher: self.dispatcher.clone(),
        }
    }
}

impl<T> ComplianceApi<T>
where
    T: HttpTransport,
{
    /// Wrap a dispatcher.
    pub fn new(dispatcher: Dispatcher<T>) -> Self {
        Self { dispatcher }
    }

    /// Dispatcher used by every operation.
    pub fn dispatcher(&self) -> &Dispatcher<T> {
        &self.dispatcher
    }

    /// `GET /districts`. Not tenant-scoped.
    ///
    /// # Errors
    ///
    /// Returns the dispatcher's [`ApiError`].
    pub async fn list_districts(&self) -> ApiResult<Vec<District>> {
        self.dispatcher.request(ApiRequest::get("/districts")).await
    }

    /// `GET /schools`.
    ///
    /// # Errors
    ///
    /// Returns the dispatcher's [`ApiError`].
    pub async fn list_schools(&self, district: &DistrictId) -> ApiResult<Vec<School>> {
        self.dispatcher
            .request(ApiRequest::get("/schools").scoped(district))
            .await
    }

    /// `GET /rules/versions`.
    ///
    /// # Errors
    ///
    /// Returns the dispatcher's [`ApiError`].
    pub async fn list_rule_versions(&self, district: &DistrictId) -> ApiResult<Vec<RuleVersion>> {
        self.dispatcher
            .request(ApiRequest::get("/rules/versions").scoped(district))
            .await
    }

    /// `GET /rules/runs`.
    ///
    /// # Errors
    ///
    /// Returns the dispatcher's [`ApiError`].
    pub async fn list_rule_runs(&self, district: &DistrictId) -> ApiResult<Vec<RuleRun>> {
        self.dispatcher
            .request(ApiRequest::get("/rules/runs").scoped(district))
            .await
    }

    /// `POST /rules/runs` with an empty JSON object. Starts a new run on every
    /// call.
    ///
    /// # Errors
    ///
    /// Returns the dispatcher's [`ApiError`].
    pub async fn trigger_rule_run(&self, district: &DistrictId) -> ApiResult<RuleRun> {
        let request = ApiRequest::post("/rules/runs")
            .scoped(district)
            .json(&json!({}))?;
        self.dispatcher.request(request).await
    }

    /// `GET /rules/results`, optionally filtered to one run.
    ///
    /// An empty `rule_run_id` is treated as no filter.
    ///
    /// # Errors
    ///
    /// Returns the dispatcher's [`ApiError`].
    pub async fn list_rule_results(
        &self,
        district: &DistrictId,
        rule_run_id: Option<&str>,
    ) -> ApiResult<Vec<RuleResult>> {
        let path = match rule_run_id.filter(|id| !id.is_empty()) {
            Some(id) => {
                let query = form_urlencoded::Serializer::new(String::new())
                    .append_pair("rule_run_id", id)
                    .finish();
                format!("/rules/results?{query}")
            }
            None => "/rules/results".to_owned(),
        };
        self.dispatcher
            .request(ApiRequest::get(path).scoped(district))
            .await
    }

    /// `POST /connectors/powerschool/sync`. Queues a new sync on every call.
    ///
    /// # Errors
    ///
    /// Returns the dispatcher's [`ApiError`].
    pub async fn trigger_powerschool_sync(&self, district: &DistrictId) -> ApiResult<SyncTrigger> {
        self.dispatcher
            .request(ApiRequest::post("/connectors/powerschool/sync").scoped(district))
            .await
    }

    /// `POST /import/students/csv` as `multipart/form-data`.
    ///
    /// The form carries the file under `file` and the JSON-serialized column
    /// mapping under `mapping`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Encode`] when the mapping cannot be serialized, or
    /// the dispatcher's [`ApiError`].
    pub async fn upload_student_csv(
        &self,
        district: &DistrictId,
        file: CsvFile,
        mapping: &StudentCsvMapping,
    ) -> ApiResult<CsvImportResult> {
        let mapping =
            serde_json::to_string(mapping).map_err(|error| ApiError::encode(error.to_string()))?;
        let form = MultipartForm::new()
            .file(
                "file",
                file.file_name,
                Some(CSV_CONTENT_TYPE.to_owned()),
                file.content,
            )
            .text("mapping", mapping);
        self.dispatcher
            .request(
                ApiRequest::post("/import/students/csv")
                    .scoped(district)
                    .multipart(form),
            )
            .await
    }

    /// `GET /exceptions`.
    ///
    /// # Errors
    ///
    /// Returns the dispatcher's [`ApiError`].
    pub async fn list_exceptions(&self, district: &DistrictId) -> ApiResult<Vec<ExceptionRecord>> {
        self.dispatcher
            .request(ApiRequest::get("/exceptions").scoped(district))
            .await
    }

    /// `POST /exceptions`.
    ///
    /// # Errors
    ///
    /// Returns the dispatcher's [`ApiError`].
    pub async fn create_exception(
        &self,
        district: &DistrictId,
        body: &ExceptionCreate,
    ) -> ApiResult<ExceptionRecord> {
        let request = ApiRequest::post("/exceptions").scoped(district).json(body)?;
        self.dispatcher.request(request).await
    }

    /// `PATCH /exceptions/{id}` with only the fields set in `update`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidRequest`] for an unusable id, or the
    /// dispatcher's [`ApiError`].
    pub async fn update_exception(
        &self,
        district: &DistrictId,
        exception_id: &str,
        update: &ExceptionUpdate,
    ) -> ApiResult<ExceptionRecord> {
        let path = exception_path(exception_id, "")?;
        let request = ApiRequest::patch(path).scoped(district).json(update)?;
        self.dispatcher.request(request).await
    }

    /// `GET /exceptions/{id}/memo`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidRequest`] for an unusable id, or the
    /// dispatcher's [`ApiError`].
    pub async fn list_exception_memos(
        &self,
        district: &DistrictId,
        exception_id: &str,
    ) -> ApiResult<Vec<ExceptionMemo>> {
        let path = exception_path(exception_id, "/memo")?;
        self.dispatcher
            .request(ApiRequest::get(path).scoped(district))
            .await
    }

    /// `POST /exceptions/{id}/memo`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidRequest`] for an unusable id, or the
    /// dispatcher's [`ApiError`].
    pub async fn create_exception_memo(
        &self,
        district: &DistrictId,
        exception_id: &str,
        memo: &ExceptionMemoCreate,
    ) -> ApiResult<ExceptionMemo> {
        let path = exception_path(exception_id, "/memo")?;
        let request = ApiRequest::post(path).scoped(district).json(memo)?;
        self.dispatcher.request(request).await
    }

    /// `POST /evidence/packets`.
    ///
    /// # Errors
    ///
    /// Returns the dispatcher's [`ApiError`].
    pub async fn create_evidence_packet(
        &self,
        district: &DistrictId,
        packet: &EvidencePacketCreate,
    ) -> ApiResult<EvidencePacket> {
        let request = ApiRequest::post("/evidence/packets")
            .scoped(district)
            .json(packet)?;
        self.dispatcher.request(request).await
    }

    /// `GET /readiness`.
    ///
    /// # Errors
    ///
    /// Returns the dispatcher's [`ApiError`].
    pub async fn read_readiness(&self, district: &DistrictId) -> ApiResult<ReadinessResponse> {
        self.dispatcher
            .request(ApiRequest::get("/readiness").scoped(district))
            .await
    }

    /// `POST /auth/sso`.
    ///
    /// The token store is left untouched: the returned
    /// [`LoginOutcome::update`] must be applied by the caller, usually through
    /// a [`SessionController`](super::SessionController).
    ///
    /// # Errors
    ///
    /// Returns the dispatcher's [`ApiError`].
    pub async fn login_sso(
        &self,
        district: &DistrictId,
        login: &SsoLoginRequest,
    ) -> ApiResult<LoginOutcome> {
        let request = ApiRequest::post("/auth/sso").scoped(district).json(login)?;
        let auth: AuthResponse = self.dispatcher.request(request).await?;
        Ok(LoginOutcome::from(auth))
    }

    /// `GET /auth/me`: the account behind the current credential.
    ///
    /// # Errors
    ///
    /// Returns the dispatcher's [`ApiError`]; unauthenticated sessions are
    /// rejected by the server.
    pub async fn current_session(&self, district: &DistrictId) -> ApiResult<AuthResponse> {
        self.dispatcher
            .request(ApiRequest::get("/auth/me").scoped(district))
            .await
    }

    /// `GET /admin/health`.
    ///
    /// # Errors
    ///
    /// Returns the dispatcher's [`ApiError`].
    pub async fn read_admin_health(&self, district: &DistrictId) -> ApiResult<AdminHealth> {
        self.dispatcher
            .request(ApiRequest::get("/admin/health").scoped(district))
            .await
    }

    /// `GET /exports/exceptions.csv`, returned as raw bytes.
    ///
    /// # Errors
    ///
    /// Returns the dispatcher's [`ApiError`].
    pub async fn download_exceptions_export(&self, district: &DistrictId) -> ApiResult<Bytes> {
        self.dispatcher
            .request_raw(ApiRequest::get("/exports/exceptions.csv").scoped(district))
            .await
    }

    /// `GET /health/live`. Not tenant-scoped.
    ///
    /// # Errors
    ///
    /// Returns the dispatcher's [`ApiError`].
    pub async fn liveness(&self) -> ApiResult<Liveness> {
        self.dispatcher.request(ApiRequest::get("/health/live")).await
    }
}

fn exception_path(exception_id: &str, suffix: &str) -> ApiResult<String> {
    if exception_id.trim().is_empty() {
        return Err(ApiError::invalid_request("exception id must not be empty"));
    }
    // URL parsing reads `\` as a separator and collapses dot segments, plain or
    // percent-encoded.
    if matches!(exception_id, "." | "..") || exception_id.contains(['/', '\\', '?', '#', '%']) {
        return Err(ApiError::invalid_request("exception id must be a single path segment"));
    }
    Ok(format!("/exceptions/{exception_id}{suffix}"))
}
