//! Tests for engine module

use super::*;
use crate::config::{default_configuration, ConfigModel, RawConfiguration};
use crate::extract::ExtractPolicy;
use crate::http::RetryPolicy;
use crate::request::GraphqlRequest;
use crate::state::MemoryStateStore;
use crate::types::BackoffType;
use async_trait::async_trait;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

const USERS_QUERY: &str = "query ($after: String) { sampleData { users(after: $after) { nodes { id } pageInfo { endCursor hasNextPage } } } }";

// ============================================================================
// Test Doubles
// ============================================================================

/// Replays a fixed script of responses and records every request
#[derive(Default)]
struct ScriptedTransport {
    script: Mutex<VecDeque<Result<Value>>>,
    requests: Mutex<Vec<GraphqlRequest>>,
}

impl ScriptedTransport {
    fn new(script: Vec<Result<Value>>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            requests: Mutex::new(Vec::new()),
        })
    }

    fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// `after` variable of each request, in order
    fn cursors(&self) -> Vec<Option<String>> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|r| {
                r.body.as_ref().and_then(|b| b["variables"]["after"].as_str().map(String::from))
            })
            .collect()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: &GraphqlRequest, _timeout: Duration) -> Result<Value> {
        self.requests.lock().unwrap().push(request.clone());
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(Error::Other("script exhausted".to_string())))
    }
}

/// Never answers
struct HangingTransport;

#[async_trait]
impl Transport for HangingTransport {
    async fn send(&self, _request: &GraphqlRequest, _timeout: Duration) -> Result<Value> {
        std::future::pending().await
    }
}

fn users_page(ids: &[&str], end_cursor: Option<&str>, has_next: bool) -> Result<Value> {
    let nodes: Vec<Value> = ids.iter().map(|id| json!({"id": id, "name": "user"})).collect();
    Ok(json!({
        "data": {
            "sampleData": {
                "users": {
                    "nodes": nodes,
                    "pageInfo": {"endCursor": end_cursor, "hasNextPage": has_next}
                }
            }
        }
    }))
}

fn raw_config() -> RawConfiguration {
    default_configuration()
        .with_value("http_endpoint", "https://api.example.com/graphql")
        .with_value("graphql_query", USERS_QUERY)
        .with_value("graphql_object_to_id_map", r#"{"sampleData.users.nodes": "id"}"#)
        .with_value("pagination_model", "cursor_pagination")
        .with_value("pagination_key", "sampleData.users")
}

fn cursor_config() -> ConfigModel {
    ConfigModel::validate(&raw_config()).unwrap()
}

fn fast_retry(attempts: u32) -> SyncConfig {
    SyncConfig::new().with_retry(RetryPolicy::default().with_max_attempts(attempts).with_backoff(
        BackoffType::Constant,
        Duration::from_millis(1),
        Duration::from_millis(1),
    ))
}

fn engine(transport: Arc<ScriptedTransport>, store: &MemoryStateStore) -> SyncEngine {
    SyncEngine::new(cursor_config(), transport, Arc::new(store.clone())).with_config(fast_retry(3))
}

fn aborted_parts(err: Error) -> (Option<String>, Error) {
    match err {
        Error::SyncAborted {
            last_cursor,
            source,
        } => (last_cursor, *source),
        other => panic!("expected SyncAborted, got {other}"),
    }
}

// ============================================================================
// Pagination Scenarios
// ============================================================================

#[tokio::test]
async fn test_two_page_sync() {
    let transport = ScriptedTransport::new(vec![
        users_page(&["1"], Some("X"), true),
        users_page(&["2"], Some("Y"), false),
    ]);
    let store = MemoryStateStore::new();
    let mut sink = VecSink::new();

    let mut engine = engine(transport.clone(), &store);
    let report = engine.run(&mut sink).await.unwrap();

    assert_eq!(sink.ids(), vec!["1", "2"]);
    assert_eq!(sink.records[0].source_path, "sampleData.users.nodes");
    assert_eq!(report.status, SyncStatus::Completed);
    assert_eq!(report.last_cursor.as_deref(), Some("Y"));
    assert_eq!(report.stats.pages_fetched, 2);
    assert_eq!(report.stats.records_emitted, 2);
    assert_eq!(engine.phase(), SyncPhase::Done);

    assert_eq!(transport.cursors(), vec![None, Some("X".to_string())]);
    let stored = store.snapshot().await.unwrap();
    assert_eq!(stored.last_cursor.as_deref(), Some("Y"));
}

#[tokio::test]
async fn test_terminates_after_last_page() {
    let transport = ScriptedTransport::new(vec![
        users_page(&["1"], Some("a"), true),
        users_page(&["2"], Some("b"), true),
        users_page(&["3"], Some("c"), true),
        users_page(&["4"], Some("d"), false),
        users_page(&["never"], Some("e"), false),
    ]);
    let store = MemoryStateStore::new();
    let mut sink = VecSink::new();

    let report = engine(transport.clone(), &store).run(&mut sink).await.unwrap();

    assert_eq!(transport.calls(), 4);
    assert_eq!(report.stats.pages_fetched, 4);
    assert_eq!(sink.pages, 4);
    assert_eq!(report.last_cursor.as_deref(), Some("d"));
}

#[tokio::test]
async fn test_resume_from_stored_cursor_is_idempotent() {
    let store = MemoryStateStore::with_cursor("X");

    let mut first = VecSink::new();
    let transport = ScriptedTransport::new(vec![users_page(&["2"], Some("Y"), false)]);
    engine(transport.clone(), &store).run(&mut first).await.unwrap();
    assert_eq!(transport.cursors(), vec![Some("X".to_string())]);

    store.save(Some("X".to_string())).await.unwrap();

    let mut second = VecSink::new();
    let transport = ScriptedTransport::new(vec![users_page(&["2"], Some("Y"), false)]);
    engine(transport, &store).run(&mut second).await.unwrap();

    assert_eq!(first.records, second.records);
    assert_eq!(first.ids(), vec!["2"]);
}

#[tokio::test]
async fn test_empty_final_page_keeps_cursor() {
    let transport = ScriptedTransport::new(vec![
        users_page(&["1"], Some("X"), true),
        users_page(&[], None, false),
    ]);
    let store = MemoryStateStore::new();
    let mut sink = VecSink::new();

    let report = engine(transport, &store).run(&mut sink).await.unwrap();
    assert_eq!(report.last_cursor.as_deref(), Some("X"));
    assert_eq!(sink.ids(), vec!["1"]);
}

#[tokio::test]
async fn test_max_pages_stops_early() {
    let transport = ScriptedTransport::new(vec![
        users_page(&["1"], Some("a"), true),
        users_page(&["2"], Some("b"), true),
        users_page(&["3"], Some("c"), false),
    ]);
    let store = MemoryStateStore::new();
    let mut sink = VecSink::new();

    let mut engine = SyncEngine::new(cursor_config(), transport.clone(), Arc::new(store.clone()))
        .with_config(fast_retry(1).with_max_pages(2));
    let report = engine.run(&mut sink).await.unwrap();

    assert!(report.is_completed());
    assert_eq!(transport.calls(), 2);
    assert_eq!(report.last_cursor.as_deref(), Some("b"));
    assert_eq!(
        store.snapshot().await.unwrap().last_cursor.as_deref(),
        Some("b")
    );
}

#[tokio::test]
async fn test_no_pagination_single_request() {
    let config = ConfigModel::validate(
        &default_configuration()
            .with_value("http_endpoint", "https://api.example.com/graphql")
            .with_value("graphql_query", "{ items { id } }")
            .with_value("graphql_object_to_id_map", r#"{"items": "id"}"#),
    )
    .unwrap();
    let transport = ScriptedTransport::new(vec![Ok(json!({"data": {"items": [{"id": 1}, {"id": 2}]}}))]);
    let mut sink = VecSink::new();

    let mut engine = SyncEngine::new(config, transport.clone(), Arc::new(MemoryStateStore::new()));
    let report = engine.run(&mut sink).await.unwrap();

    assert_eq!(transport.calls(), 1);
    assert_eq!(transport.cursors(), vec![None]);
    assert_eq!(sink.ids(), vec!["1", "2"]);
    assert_eq!(report.last_cursor, None);
}

// ============================================================================
// Failure Scenarios
// ============================================================================

#[tokio::test]
async fn test_pagination_key_not_found_is_fatal() {
    let transport = ScriptedTransport::new(vec![Ok(json!({"data": {"other": {}}}))]);
    let store = MemoryStateStore::new();
    let mut sink = VecSink::new();

    let mut engine = engine(transport, &store);
    let err = engine.run(&mut sink).await.unwrap_err();

    let (cursor, source) = aborted_parts(err);
    assert_eq!(cursor, None);
    assert!(matches!(source, Error::PaginationKeyNotFound { ref path } if path == "sampleData.users"));
    assert_eq!(engine.phase(), SyncPhase::Failed);
    assert_eq!(store.snapshot().await, None);
}

#[tokio::test]
async fn test_failure_carries_last_committed_cursor() {
    let transport = ScriptedTransport::new(vec![
        users_page(&["1"], Some("X"), true),
        Err(Error::http_status(400, "bad query")),
    ]);
    let store = MemoryStateStore::new();
    let mut sink = VecSink::new();

    let err = engine(transport.clone(), &store).run(&mut sink).await.unwrap_err();

    let (cursor, source) = aborted_parts(err);
    assert_eq!(cursor.as_deref(), Some("X"));
    assert!(matches!(source, Error::HttpStatus { status: 400, .. }));
    assert_eq!(transport.calls(), 2);
    assert_eq!(
        store.snapshot().await.unwrap().last_cursor.as_deref(),
        Some("X")
    );
}

#[tokio::test]
async fn test_extraction_failure_does_not_commit_page() {
    let transport = ScriptedTransport::new(vec![
        users_page(&["1"], Some("X"), true),
        Ok(json!({"data": {"sampleData": {"users": {
            "nodes": [{"name": "no id"}],
            "pageInfo": {"endCursor": "Y", "hasNextPage": false}
        }}}})),
    ]);
    let store = MemoryStateStore::new();
    let mut sink = VecSink::new();

    let err = engine(transport, &store).run(&mut sink).await.unwrap_err();

    let (cursor, source) = aborted_parts(err);
    assert_eq!(cursor.as_deref(), Some("X"));
    assert!(matches!(source, Error::MissingIdField { index: 0, .. }));
    assert_eq!(sink.ids(), vec!["1"]);
}

#[tokio::test]
async fn test_extraction_failure_delivers_other_paths() {
    let transport = ScriptedTransport::new(vec![Ok(json!({"data": {"sampleData": {
        "teams": [{"id": "t1"}],
        "users": {
            "nodes": [{"name": "no id"}],
            "pageInfo": {"endCursor": "Y", "hasNextPage": false}
        }
    }}}))]);
    let raw = raw_config().with_value(
        "graphql_object_to_id_map",
        r#"{"sampleData.users.nodes": "id", "sampleData.teams": "id"}"#,
    );
    let store = MemoryStateStore::new();
    let mut sink = VecSink::new();

    let mut engine = SyncEngine::new(
        ConfigModel::validate(&raw).unwrap(),
        transport,
        Arc::new(store.clone()),
    )
    .with_config(fast_retry(1));
    let err = engine.run(&mut sink).await.unwrap_err();

    let (cursor, source) = aborted_parts(err);
    assert_eq!(cursor, None);
    assert!(matches!(source, Error::MissingIdField { ref path, .. } if path == "sampleData.users.nodes"));
    assert_eq!(sink.ids(), vec!["t1"]);
    assert!(store.snapshot().await.is_none());
}

#[tokio::test]
async fn test_skip_malformed_policy_continues() {
    let transport = ScriptedTransport::new(vec![Ok(json!({"data": {"sampleData": {"users": {
        "nodes": [{"id": "1"}, {"name": "no id"}, {"id": "3"}],
        "pageInfo": {"endCursor": "Y", "hasNextPage": false}
    }}}}))]);
    let mut sink = VecSink::new();

    let mut engine = SyncEngine::new(cursor_config(), transport, Arc::new(MemoryStateStore::new()))
        .with_config(fast_retry(1).with_policy(ExtractPolicy::SkipMalformed));
    engine.run(&mut sink).await.unwrap();

    assert_eq!(sink.ids(), vec!["1", "3"]);
}

#[tokio::test]
async fn test_graphql_errors_are_fatal() {
    let transport = ScriptedTransport::new(vec![Ok(json!({
        "data": null,
        "errors": [{"message": "Field 'usrs' doesn't exist"}]
    }))]);
    let mut sink = VecSink::new();

    let err = engine(transport.clone(), &MemoryStateStore::new())
        .run(&mut sink)
        .await
        .unwrap_err();

    let (_, source) = aborted_parts(err);
    assert!(matches!(source, Error::GraphqlErrors { .. }));
    assert_eq!(transport.calls(), 1);
    assert!(sink.records.is_empty());
}

#[tokio::test]
async fn test_state_load_failure_is_fatal() {
    struct BrokenStore;

    #[async_trait]
    impl StateStore for BrokenStore {
        async fn load(&self) -> Result<Option<crate::state::SyncState>> {
            Err(Error::state("disk on fire"))
        }
        async fn save(&self, _cursor: Option<String>) -> Result<crate::state::SyncState> {
            Err(Error::state("disk on fire"))
        }
        async fn reset(&self) -> Result<()> {
            Ok(())
        }
    }

    let transport = ScriptedTransport::new(vec![]);
    let mut engine = SyncEngine::new(cursor_config(), transport.clone(), Arc::new(BrokenStore));
    let err = engine.run(&mut VecSink::new()).await.unwrap_err();

    let (_, source) = aborted_parts(err);
    assert!(matches!(source, Error::State { .. }));
    assert_eq!(transport.calls(), 0);
}

// ============================================================================
// Retry Tests
// ============================================================================

#[tokio::test]
async fn test_retries_transient_failures() {
    let transport = ScriptedTransport::new(vec![
        Err(Error::http_status(503, "")),
        Err(Error::Timeout { timeout_ms: 10 }),
        users_page(&["1"], Some("X"), false),
    ]);
    let mut sink = VecSink::new();

    let report = engine(transport.clone(), &MemoryStateStore::new())
        .run(&mut sink)
        .await
        .unwrap();

    assert_eq!(transport.calls(), 3);
    assert_eq!(report.stats.request_attempts, 3);
    assert_eq!(report.stats.retries, 2);
    assert_eq!(report.stats.pages_fetched, 1);
    assert_eq!(sink.ids(), vec!["1"]);
}

#[tokio::test]
async fn test_retries_exhausted_returns_last_error() {
    let transport = ScriptedTransport::new(vec![
        Err(Error::http_status(500, "")),
        Err(Error::http_status(502, "")),
        Err(Error::http_status(504, "gateway")),
        users_page(&["never"], None, false),
    ]);

    let err = engine(transport.clone(), &MemoryStateStore::new())
        .run(&mut VecSink::new())
        .await
        .unwrap_err();

    let (_, source) = aborted_parts(err);
    assert!(matches!(source, Error::HttpStatus { status: 504, .. }));
    assert_eq!(transport.calls(), 3);
}

#[tokio::test]
async fn test_client_errors_are_not_retried() {
    let transport = ScriptedTransport::new(vec![
        Err(Error::http_status(401, "unauthorized")),
        users_page(&["never"], None, false),
    ]);

    let err = engine(transport.clone(), &MemoryStateStore::new())
        .run(&mut VecSink::new())
        .await
        .unwrap_err();

    assert_eq!(err.category(), crate::error::ErrorCategory::Transport);
    assert_eq!(transport.calls(), 1);
}

// ============================================================================
// Cancellation Tests
// ============================================================================

#[tokio::test]
async fn test_cancelled_before_start() {
    let transport = ScriptedTransport::new(vec![users_page(&["1"], Some("X"), false)]);
    let store = MemoryStateStore::with_cursor("W");
    let mut engine = engine(transport.clone(), &store);
    engine.cancellation_token().cancel();

    let report = engine.run(&mut VecSink::new()).await.unwrap();
    assert_eq!(report.status, SyncStatus::Cancelled);
    assert_eq!(report.last_cursor.as_deref(), Some("W"));
    assert_eq!(transport.calls(), 0);
}

#[tokio::test]
async fn test_cancel_while_waiting_on_request() {
    let token = CancellationToken::new();
    let mut engine = SyncEngine::new(
        cursor_config(),
        Arc::new(HangingTransport),
        Arc::new(MemoryStateStore::new()),
    )
    .with_cancellation(token.clone());

    let canceller = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        token.cancel();
    });

    let report = engine.run(&mut VecSink::new()).await.unwrap();
    canceller.await.unwrap();

    assert_eq!(report.status, SyncStatus::Cancelled);
    assert_eq!(report.stats.pages_fetched, 0);
}

#[tokio::test]
async fn test_cancel_during_retry_delay() {
    let transport = ScriptedTransport::new(vec![Err(Error::http_status(503, ""))]);
    let token = CancellationToken::new();
    let slow_retry = SyncConfig::new().with_retry(RetryPolicy::default().with_backoff(
        BackoffType::Constant,
        Duration::from_secs(60),
        Duration::from_secs(60),
    ));
    let mut engine = SyncEngine::new(cursor_config(), transport.clone(), Arc::new(MemoryStateStore::new()))
        .with_config(slow_retry)
        .with_cancellation(token.clone());

    let canceller = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        token.cancel();
    });

    let report = engine.run(&mut VecSink::new()).await.unwrap();
    canceller.await.unwrap();

    assert_eq!(report.status, SyncStatus::Cancelled);
    assert_eq!(report.stats.retries, 1);
    assert_eq!(transport.calls(), 1);
}

// ============================================================================
// Check & Sink Tests
// ============================================================================

#[tokio::test]
async fn test_check_does_not_touch_state() {
    let transport = ScriptedTransport::new(vec![users_page(&["1"], Some("X"), true)]);
    let store = MemoryStateStore::with_cursor("W");
    let engine = engine(transport.clone(), &store);

    engine.check().await.unwrap();

    assert_eq!(transport.cursors(), vec![None]);
    assert_eq!(
        store.snapshot().await.unwrap().last_cursor.as_deref(),
        Some("W")
    );
}

#[tokio::test]
async fn test_check_reports_misconfigured_key() {
    let transport = ScriptedTransport::new(vec![Ok(json!({"data": {}}))]);
    let err = engine(transport, &MemoryStateStore::new())
        .check()
        .await
        .unwrap_err();
    assert!(matches!(err, Error::PaginationKeyNotFound { .. }));
}

#[tokio::test]
async fn test_json_lines_sink() {
    let mut sink = JsonLinesSink::new(Vec::new());
    sink.accept(vec![
        crate::extract::ExtractedRecord {
            source_path: "items".to_string(),
            id: "1".to_string(),
            payload: json!({"id": 1}),
        },
        crate::extract::ExtractedRecord {
            source_path: "items".to_string(),
            id: "2".to_string(),
            payload: json!({"id": 2}),
        },
    ])
    .await
    .unwrap();

    let output = String::from_utf8(sink.into_inner()).unwrap();
    let lines: Vec<&str> = output.lines().collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(
        serde_json::from_str::<Value>(lines[1]).unwrap(),
        json!({"source_path": "items", "id": "2", "payload": {"id": 2}})
    );
}

#[test]
fn test_phase_display() {
    assert_eq!(SyncPhase::Advancing.to_string(), "advancing");
    assert!(SyncPhase::Failed.is_terminal());
    assert!(!SyncPhase::Fetching.is_terminal());
}

#[test]
fn test_report_serialization() {
    let report = SyncReport {
        status: SyncStatus::Cancelled,
        last_cursor: Some("X".to_string()),
        stats: SyncStats::new(),
    };
    let value = serde_json::to_value(&report).unwrap();
    assert_eq!(value["status"], "cancelled");
    assert_eq!(value["last_cursor"], "X");
    assert_eq!(value["stats"]["pages_fetched"], 0);
}
