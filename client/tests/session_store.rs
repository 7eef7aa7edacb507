//! Session store behaviour under concurrency and across process restarts.

use std::sync::Arc;
use std::thread;

use http::Method;
use precheck_client::domain::ports::TokenPersistence;
use precheck_client::domain::{AUTHORIZATION, DistrictId, TokenStore};
use precheck_client::outbound::token_storage::FileTokenPersistence;
use precheck_client::test_support::{ScriptedClient, ScriptedResponse, ScriptedTransport};
use rstest::{fixture, rstest};
use serde_json::json;

#[fixture]
fn district() -> DistrictId {
    DistrictId::new("d1").expect("valid district")
}

#[rstest]
#[tokio::test]
async fn concurrent_reads_share_one_credential(district: DistrictId) {
    let client = ScriptedClient::new(
        ScriptedTransport::new()
            .on(Method::GET, "/rules/runs", ScriptedResponse::json(json!([])))
            .on(Method::GET, "/rules/results", ScriptedResponse::json(json!([])))
            .on(Method::GET, "/readiness", ScriptedResponse::json(json!({"items": []}))),
        "tok",
    );

    let (runs, results, readiness) = tokio::join!(
        client.api.list_rule_runs(&district),
        client.api.list_rule_results(&district, None),
        client.api.read_readiness(&district),
    );

    assert!(runs.expect("runs").is_empty());
    assert!(results.expect("results").is_empty());
    assert!(readiness.expect("readiness").items.is_empty());
    assert!(
        client
            .transport
            .requests()
            .iter()
            .all(|request| request.headers.get(AUTHORIZATION) == Some("Bearer tok"))
    );
}

#[test]
fn file_storage_restores_the_last_login_across_processes() {
    let state_dir = tempfile::tempdir().expect("temp dir");

    let first = TokenStore::initialize(
        Arc::new(FileTokenPersistence::new(state_dir.path())),
        "boot",
    );
    assert_eq!(first.get(), "boot");
    first.set("tkn1").expect("persist login");

    let restarted = TokenStore::initialize(
        Arc::new(FileTokenPersistence::new(state_dir.path())),
        "boot",
    );
    assert_eq!(restarted.get(), "tkn1");

    restarted.clear().expect("logout");
    let storage = FileTokenPersistence::new(state_dir.path());
    assert_eq!(storage.load().expect("load"), None);
}

#[test]
fn concurrent_writers_leave_memory_and_file_in_agreement() {
    let state_dir = tempfile::tempdir().expect("temp dir");
    let store = Arc::new(TokenStore::initialize(
        Arc::new(FileTokenPersistence::new(state_dir.path())),
        "",
    ));
    let written: Vec<String> = (0..8).map(|writer| format!("tkn{writer}")).collect();

    thread::scope(|scope| {
        for token in &written {
            let store = Arc::clone(&store);
            scope.spawn(move || {
                for _ in 0..10 {
                    store.set(token.as_str()).expect("persist token");
                    assert!(store.get().starts_with("tkn"));
                }
            });
        }
    });

    let in_memory = store.get();
    let restarted =
        TokenStore::initialize(Arc::new(FileTokenPersistence::new(state_dir.path())), "");
    assert!(written.contains(&in_memory));
    assert_eq!(restarted.get(), in_memory);
}
