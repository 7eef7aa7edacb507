//! Integration coverage for the reqwest transport.
//!
//! These tests drive the full client stack over real sockets against an Actix
//! stub server, so header encoding, multipart framing and status handling are
//! observed on the wire rather than through a double.

use std::net::TcpListener;
use std::sync::{Arc, Mutex, PoisonError};

use actix_web::dev::ServerHandle;
use actix_web::http::{Method, StatusCode};
use actix_web::{App, HttpRequest, HttpResponse, HttpServer, web};
use bytes::Bytes;
use precheck_client::domain::{
    ApiError, ComplianceApi, CsvFile, Dispatcher, DistrictId, ExceptionUpdate,
    StudentCsvMapping, TokenStore,
};
use precheck_client::outbound::http::ReqwestTransport;
use precheck_client::outbound::token_storage::InMemoryTokenPersistence;
use rstest::{fixture, rstest};
use serde_json::json;
use url::Url;

#[derive(Debug, Clone)]
struct RecordedRequest {
    method: Method,
    path: String,
    query: String,
    authorization: Option<String>,
    content_type: Option<String>,
    district: Option<String>,
    cache_control: Option<String>,
    body: Bytes,
}

#[derive(Clone, Default)]
struct Recorder {
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl Recorder {
    fn snapshot(&self) -> Vec<RecordedRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

fn header(request: &HttpRequest, name: &str) -> Option<String> {
    request
        .headers()
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned)
}

async fn stub(
    request: HttpRequest,
    body: web::Bytes,
    recorder: web::Data<Recorder>,
) -> HttpResponse {
    recorder
        .requests
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .push(RecordedRequest {
            method: request.method().clone(),
            path: request.path().to_owned(),
            query: request.query_string().to_owned(),
            authorization: header(&request, "authorization"),
            content_type: header(&request, "content-type"),
            district: header(&request, "x-district-id"),
            cache_control: header(&request, "cache-control"),
            body: body.clone(),
        });

    match (request.method().as_str(), request.path()) {
        ("GET", "/districts") => HttpResponse::Ok().json(json!([
            {"id": "11111111-1111-1111-1111-111111111111", "name": "Demo", "timezone": "America/Chicago"}
        ])),
        ("GET", "/rules/results") => HttpResponse::Ok().json(json!([])),
        ("POST", "/import/students/csv") => HttpResponse::Accepted().json(json!({
            "rows_processed": 1,
            "students_created": 1,
            "students_updated": 0,
            "errors": [],
            "ingest_batch_id": "b1"
        })),
        ("GET", "/exports/exceptions.csv") => HttpResponse::Ok()
            .content_type("text/csv")
            .body("id,status\ne1,open\n"),
        ("GET", "/readiness") => HttpResponse::BadRequest().body("bad input"),
        ("PATCH", "/exceptions/e1") => HttpResponse::NotFound().finish(),
        _ => HttpResponse::new(StatusCode::IM_A_TEAPOT),
    }
}

async fn spawn_stub_server(recorder: Recorder) -> Result<(Url, ServerHandle), String> {
    let listener = TcpListener::bind("127.0.0.1:0").map_err(|err| err.to_string())?;
    let addr = listener.local_addr().map_err(|err| err.to_string())?;
    let data = web::Data::new(recorder);

    let server = HttpServer::new(move || {
        App::new()
            .app_data(data.clone())
            .default_service(web::to(stub))
    })
    .disable_signals()
    .workers(1)
    .listen(listener)
    .map_err(|err| err.to_string())?
    .run();

    let handle = server.handle();
    actix_web::rt::spawn(server);

    let base = Url::parse(&format!("http://{addr}")).map_err(|err| err.to_string())?;
    Ok((base, handle))
}

fn client_for(base: Url, token: &str) -> ComplianceApi<ReqwestTransport> {
    let session = Arc::new(TokenStore::initialize(
        Arc::new(InMemoryTokenPersistence::new()),
        token,
    ));
    let transport = Arc::new(ReqwestTransport::new().expect("reqwest client builds"));
    ComplianceApi::new(Dispatcher::new(transport, base, session))
}

#[fixture]
fn district() -> DistrictId {
    DistrictId::new("d1").expect("valid district")
}

#[actix_web::test]
async fn json_calls_carry_defaults_on_the_wire() {
    let recorder = Recorder::default();
    let (base, handle) = spawn_stub_server(recorder.clone()).await.expect("stub server");
    let api = client_for(base, "tok");

    let districts = api.list_districts().await.expect("districts");

    assert_eq!(districts.len(), 1);
    assert_eq!(districts[0].name, "Demo");
    assert_eq!(districts[0].timezone, "America/Chicago");
    let sent = recorder.snapshot();
    assert_eq!(sent[0].authorization.as_deref(), Some("Bearer tok"));
    assert_eq!(sent[0].content_type.as_deref(), Some("application/json"));
    assert_eq!(sent[0].cache_control.as_deref(), Some("no-store"));
    assert_eq!(sent[0].district, None);
    handle.stop(true).await;
}

#[rstest]
#[actix_web::test]
async fn query_filter_reaches_the_server(district: DistrictId) {
    let recorder = Recorder::default();
    let (base, handle) = spawn_stub_server(recorder.clone()).await.expect("stub server");
    let api = client_for(base, "");

    api.list_rule_results(&district, Some("r-1"))
        .await
        .expect("results");

    let sent = recorder.snapshot();
    assert_eq!(sent[0].path, "/rules/results");
    assert_eq!(sent[0].query, "rule_run_id=r-1");
    assert_eq!(sent[0].district.as_deref(), Some("d1"));
    assert_eq!(sent[0].authorization, None);
    handle.stop(true).await;
}

#[rstest]
#[actix_web::test]
async fn csv_upload_is_framed_as_multipart(district: DistrictId) {
    let recorder = Recorder::default();
    let (base, handle) = spawn_stub_server(recorder.clone()).await.expect("stub server");
    let api = client_for(base, "tok");
    let mapping = StudentCsvMapping {
        sis_id: "ID".to_owned(),
        first_name: "First".to_owned(),
        last_name: "Last".to_owned(),
        grade_level: "Grade".to_owned(),
        school_name: "School".to_owned(),
        ..StudentCsvMapping::default()
    };

    let result = api
        .upload_student_csv(
            &district,
            CsvFile::new("students.csv", Bytes::from_static(b"ID,First\n1,Ada\n")),
            &mapping,
        )
        .await
        .expect("import");

    assert_eq!(result.ingest_batch_id, "b1");
    let sent = recorder.snapshot();
    assert_eq!(sent[0].method, Method::POST);
    let content_type = sent[0].content_type.clone().expect("content type set");
    assert!(content_type.starts_with("multipart/form-data; boundary="));
    assert_eq!(sent[0].authorization.as_deref(), Some("Bearer tok"));
    let body = String::from_utf8_lossy(&sent[0].body);
    assert!(body.contains(r#"name="file"; filename="students.csv""#));
    assert!(body.contains("1,Ada"));
    assert!(body.contains(r#"name="mapping""#));
    assert!(body.contains(r#""sis_id":"ID""#));
    handle.stop(true).await;
}

#[rstest]
#[actix_web::test]
async fn export_returns_raw_bytes(district: DistrictId) {
    let recorder = Recorder::default();
    let (base, handle) = spawn_stub_server(recorder).await.expect("stub server");
    let api = client_for(base, "tok");

    let csv = api
        .download_exceptions_export(&district)
        .await
        .expect("export");

    assert_eq!(csv, Bytes::from_static(b"id,status\ne1,open\n"));
    handle.stop(true).await;
}

#[rstest]
#[actix_web::test]
async fn rejections_use_body_text_or_reason_phrase(district: DistrictId) {
    let recorder = Recorder::default();
    let (base, handle) = spawn_stub_server(recorder).await.expect("stub server");
    let api = client_for(base, "tok");

    let readiness = api
        .read_readiness(&district)
        .await
        .expect_err("400 with body");
    let update = api
        .update_exception(&district, "e1", &ExceptionUpdate::default().status("resolved"))
        .await
        .expect_err("404 without body");

    assert_eq!(readiness.message(), "bad input");
    assert_eq!(update.message(), "Not Found");
    assert_eq!(update.status(), Some(http::StatusCode::NOT_FOUND));
    handle.stop(true).await;
}

#[actix_web::test]
async fn refused_connections_are_transport_failures() {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind probe port");
    let addr = listener.local_addr().expect("probe address");
    drop(listener);
    let base = Url::parse(&format!("http://{addr}")).expect("valid url");
    let api = client_for(base, "");

    let error = api.liveness().await.expect_err("nothing listens");

    assert!(matches!(error, ApiError::Transport { .. }));
    assert!(error.message().starts_with("connection failed"));
}
