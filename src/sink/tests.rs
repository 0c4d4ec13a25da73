use super::clickhouse::escape;
use super::*;
use crate::batch::Batch;
use crate::record::{LogLevel, LogRecord, TraceContext};
use axum::Router;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use chrono::{TimeZone, Utc};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

#[derive(Debug, Clone)]
struct CapturedRequest {
    query: HashMap<String, String>,
    headers: HeaderMap,
    body: String,
}

#[derive(Clone)]
struct MockServer {
    requests: Arc<Mutex<Vec<CapturedRequest>>>,
    status: StatusCode,
    reply: &'static str,
    delay: Duration,
}

async fn capture(
    State(server): State<MockServer>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
    body: String,
) -> (StatusCode, &'static str) {
    tokio::time::sleep(server.delay).await;
    server.requests.lock().await.push(CapturedRequest {
        query,
        headers,
        body,
    });
    (server.status, server.reply)
}

// Starts a server on an ephemeral port answering every POST with `status`
async fn spawn_server(
    status: StatusCode,
    reply: &'static str,
    delay: Duration,
) -> (SocketAddr, Arc<Mutex<Vec<CapturedRequest>>>) {
    let requests = Arc::new(Mutex::new(Vec::new()));
    let state = MockServer {
        requests: Arc::clone(&requests),
        status,
        reply,
        delay,
    };
    let app = Router::new()
        .route("/", post(capture))
        .route("/api/logs/batch", post(capture))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (addr, requests)
}

fn record(message: &str, metadata: Option<&str>, trace: Option<TraceContext>) -> LogRecord {
    LogRecord {
        id: "5f0c6b1e-8a53-4d2e-9a0e-2b9f3f6f1c11".to_string(),
        timestamp: Utc.with_ymd_and_hms(2024, 5, 4, 3, 2, 1).unwrap(),
        level: LogLevel::Warning,
        app_name: "order-service".to_string(),
        message: message.to_string(),
        metadata: metadata.map(str::to_string),
        trace,
        host: "server-07.prod.internal".to_string(),
        environment: "staging".to_string(),
    }
}

fn clickhouse_sink(addr: SocketAddr, timeout: Duration) -> ClickHouseSink {
    let config = ClickHouseConfigBuilder::default()
        .host(addr.ip().to_string())
        .port(addr.port())
        .user("writer")
        .password("s3cret")
        .database("testdb")
        .timeout(timeout)
        .build()
        .unwrap();
    ClickHouseSink::new(config).unwrap()
}

fn api_sink(addr: SocketAddr) -> ApiSink {
    let config = ApiConfigBuilder::default()
        .api_url(format!("http://{}/", addr))
        .api_key("key-123")
        .timeout(Duration::from_secs(5))
        .build()
        .unwrap();
    ApiSink::new(config).unwrap()
}

#[test]
fn test_escape_quotes_and_control_characters() {
    assert_eq!(escape("it's"), "it\\'s");
    assert_eq!(escape("a\\b"), "a\\\\b");
    assert_eq!(escape("line\nnext\ttab\r"), "line\\nnext\\ttab\\r");
    assert_eq!(escape("nul\0byte"), "nulbyte");
}

#[test]
fn test_config_defaults() {
    let clickhouse = ClickHouseConfig::default();
    assert_eq!(clickhouse.port(), 8123);
    assert_eq!(clickhouse.database(), "logfordev");
    assert_eq!(clickhouse.timeout(), Duration::from_secs(120));

    let api = ApiConfig::default();
    assert_eq!(api.api_url(), "http://localhost:5000");
    assert_eq!(api.timeout(), Duration::from_secs(60));

    let built = ClickHouseConfigBuilder::default().build().unwrap();
    assert_eq!(built.host(), "localhost");
}

#[test]
fn test_insert_statement_shape() {
    let sink = ClickHouseSink::new(ClickHouseConfig::default()).unwrap();
    let trace = TraceContext::new("abc", Some("def".to_string())).unwrap();
    let records = vec![
        record("it's down", Some(r#"{"user_id":42}"#), Some(trace)),
        record("plain", None, None),
    ];

    let sql = sink.insert_statement(&records);
    assert!(sql.starts_with(
        "INSERT INTO logfordev.logs (id, timestamp, level, app_name, message, metadata, trace_id, span_id, host, environment) VALUES ("
    ));
    assert!(sql.contains(
        "('5f0c6b1e-8a53-4d2e-9a0e-2b9f3f6f1c11', '2024-05-04 03:02:01.000', 'Warning', 'order-service', 'it\\'s down', '{\"user_id\":42}', 'abc', 'def', 'server-07.prod.internal', 'staging')"
    ));
    // missing optionals become empty strings
    assert!(sql.ends_with("'plain', '', '', '', 'server-07.prod.internal', 'staging')"));
    assert_eq!(sql.matches("), (").count(), 1);
}

#[tokio::test]
async fn test_clickhouse_posts_statement_with_credentials() {
    let (addr, requests) = spawn_server(StatusCode::OK, "", Duration::ZERO).await;
    let sink = clickhouse_sink(addr, Duration::from_secs(5));
    let batch = Batch::new(0, vec![record("a", None, None), record("b", None, None)]);

    let inserted = sink.deliver(&batch).await.unwrap();
    assert_eq!(inserted, 2);

    let requests = requests.lock().await;
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].query.get("user").map(String::as_str), Some("writer"));
    assert_eq!(requests[0].query.get("password").map(String::as_str), Some("s3cret"));
    assert!(requests[0].body.starts_with("INSERT INTO testdb.logs"));
}

#[tokio::test]
async fn test_clickhouse_non_200_is_rejected_with_body() {
    let (addr, _) = spawn_server(
        StatusCode::INTERNAL_SERVER_ERROR,
        "Code: 60. Table testdb.logs doesn't exist",
        Duration::ZERO,
    )
    .await;
    let sink = clickhouse_sink(addr, Duration::from_secs(5));
    let batch = Batch::new(1, vec![record("a", None, None)]);

    match sink.deliver(&batch).await {
        Err(SinkError::Rejected { status, body, .. }) => {
            assert_eq!(status, 500);
            assert!(body.contains("doesn't exist"));
        }
        other => panic!("expected rejection, got {:?}", other),
    }
}

#[tokio::test]
async fn test_clickhouse_other_2xx_is_still_a_failure() {
    let (addr, _) = spawn_server(StatusCode::ACCEPTED, "", Duration::ZERO).await;
    let sink = clickhouse_sink(addr, Duration::from_secs(5));
    let batch = Batch::new(0, vec![record("a", None, None)]);

    assert!(matches!(
        sink.deliver(&batch).await,
        Err(SinkError::Rejected { status: 202, .. })
    ));
}

#[tokio::test]
async fn test_clickhouse_timeout() {
    let (addr, _) = spawn_server(StatusCode::OK, "", Duration::from_secs(2)).await;
    let sink = clickhouse_sink(addr, Duration::from_millis(100));
    let batch = Batch::new(0, vec![record("slow", None, None)]);

    let err = sink.deliver(&batch).await.unwrap_err();
    assert!(matches!(err, SinkError::Timeout(_)), "got {:?}", err);
}

#[tokio::test]
async fn test_clickhouse_connection_refused_is_transport_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let sink = clickhouse_sink(addr, Duration::from_secs(2));
    let batch = Batch::new(0, vec![record("a", None, None)]);
    assert!(matches!(
        sink.deliver(&batch).await,
        Err(SinkError::Transport(_))
    ));
}

#[tokio::test]
async fn test_clickhouse_empty_batch_skips_request() {
    let (addr, requests) = spawn_server(StatusCode::OK, "", Duration::ZERO).await;
    let sink = clickhouse_sink(addr, Duration::from_secs(5));

    assert_eq!(sink.deliver(&Batch::new(0, Vec::new())).await.unwrap(), 0);
    assert!(requests.lock().await.is_empty());
}

#[test]
fn test_api_payload_shape() {
    let sink = ApiSink::new(ApiConfig::default()).unwrap();
    let trace = TraceContext::new("t1", Some("s1".to_string())).unwrap();
    let records = vec![
        record("with meta", Some(r#"{"duration_ms":12.5}"#), Some(trace)),
        record("bare", None, None),
    ];

    let body: serde_json::Value = serde_json::from_slice(&sink.encode(&records).unwrap()).unwrap();
    let logs = body["logs"].as_array().unwrap();
    assert_eq!(logs.len(), 2);

    assert_eq!(logs[0]["level"], "warning");
    assert_eq!(logs[0]["appName"], "order-service");
    assert_eq!(logs[0]["metadata"]["duration_ms"], 12.5);
    assert_eq!(logs[0]["traceId"], "t1");
    assert_eq!(logs[0]["spanId"], "s1");
    assert_eq!(logs[0]["environment"], "staging");

    assert!(logs[1]["metadata"].is_null());
    assert!(logs[1]["traceId"].is_null());
    assert!(logs[1]["spanId"].is_null());
}

#[test]
fn test_api_invalid_metadata_is_encode_error() {
    let sink = ApiSink::new(ApiConfig::default()).unwrap();
    let records = vec![record("bad", Some("{not json"), None)];
    assert!(matches!(sink.encode(&records), Err(SinkError::Encode(_))));
}

#[tokio::test]
async fn test_api_posts_batch_with_key_header() {
    let (addr, requests) = spawn_server(StatusCode::OK, r#"{"success":true,"count":3}"#, Duration::ZERO).await;
    let sink = api_sink(addr);
    assert_eq!(sink.endpoint(), format!("http://{}/api/logs/batch", addr));

    let batch = Batch::new(
        2,
        vec![
            record("a", None, None),
            record("b", None, None),
            record("c", None, None),
        ],
    );
    assert_eq!(sink.deliver(&batch).await.unwrap(), 3);

    let requests = requests.lock().await;
    assert_eq!(requests.len(), 1);
    assert_eq!(
        requests[0].headers.get("x-api-key").and_then(|v| v.to_str().ok()),
        Some("key-123")
    );
    let body: serde_json::Value = serde_json::from_str(&requests[0].body).unwrap();
    assert_eq!(body["logs"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_api_unauthorized_is_rejected() {
    let (addr, _) = spawn_server(StatusCode::UNAUTHORIZED, "invalid api key", Duration::ZERO).await;
    let sink = api_sink(addr);
    let batch = Batch::new(0, vec![record("a", None, None)]);

    match sink.deliver(&batch).await {
        Err(SinkError::Rejected { sink, status, body }) => {
            assert_eq!(sink, "api");
            assert_eq!(status, 401);
            assert_eq!(body, "invalid api key");
        }
        other => panic!("expected rejection, got {:?}", other),
    }
}

#[tokio::test]
async fn test_closure_is_a_sink() {
    let sink = |batch: &Batch| {
        let n = batch.len();
        async move { Ok::<usize, SinkError>(n) }
    };
    let batch = Batch::new(0, vec![record("a", None, None)]);
    assert_eq!(sink.deliver(&batch).await.unwrap(), 1);
}
