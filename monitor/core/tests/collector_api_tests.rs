// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use chrono::{Duration, Utc};
use fsmon_core::application::CollectorService;
use fsmon_core::domain::instance::Instance;
use fsmon_core::domain::transfer::FileTransfer;
use fsmon_core::infrastructure::InMemoryRegistry;
use fsmon_core::presentation::{api::app_with_body_limit, app};
use std::io::Write;
use std::sync::{Arc, Mutex};
use tower::ServiceExt;
use tracing::Level;
use tracing_subscriber::fmt::MakeWriter;

fn test_router() -> Router {
    let registry = Arc::new(InMemoryRegistry::new());
    let collector = Arc::new(CollectorService::with_local_hostname(registry, "collector-host"));
    app(collector)
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<serde_json::Value>) -> axum::response::Response {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(serde_json::to_vec(&json).unwrap())
        }
        None => Body::empty(),
    };
    app.clone().oneshot(builder.body(body).unwrap()).await.unwrap()
}

async fn body_text(resp: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn body_json<T: serde::de::DeserializeOwned>(resp: axum::response::Response) -> T {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn register(app: &Router, body: serde_json::Value) -> String {
    let resp = send(app, "POST", "/instances", Some(body)).await;
    assert_eq!(resp.status(), StatusCode::ACCEPTED);
    let location = resp.headers()[header::LOCATION].to_str().unwrap().to_string();
    location.trim_start_matches("/instances/").to_string()
}

fn transfer_body(instance_id: &str) -> serde_json::Value {
    serde_json::json!({
        "instance_id": instance_id,
        "file_path": "/exampleZone/home/alice/results.csv",
        "file_size": 8192,
        "file_open_mode": "r",
        "transfer_blocks": [
            {"offset": 0, "length": 4096, "access_time": "2026-10-19T08:00:00Z"},
            {"offset": 4096, "length": 4096, "access_time": "2026-10-19T08:00:01Z"}
        ],
        "transfer_size": 8192,
        "largest_block_size": 4096,
        "smallest_block_size": 4096,
        "transfer_block_count": 2,
        "sequential_access": true,
        "file_open_time": "2026-10-19T08:00:00Z",
        "file_close_time": "2026-10-19T08:00:02Z"
    })
}

#[tokio::test]
async fn register_transfer_and_inspect_scenario() {
    let app = test_router();
    let created = Utc::now() - Duration::seconds(30);

    let id = register(
        &app,
        serde_json::json!({
            "host": "data.example.org",
            "port": 1247,
            "zone": "exampleZone",
            "client_user": "alice",
            "auth_scheme": "native",
            "creation_time": created,
        }),
    )
    .await;
    assert!(!id.is_empty());

    let resp = send(&app, "GET", &format!("/instances/{id}"), None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let instance: Instance = body_json(resp).await;
    assert!(!instance.terminated);
    assert_eq!(instance.config.host, "data.example.org");
    assert_eq!(instance.config.client_user, "alice");
    assert_eq!(instance.client_hostname, "collector-host");

    let resp = send(&app, "POST", "/transfers", Some(transfer_body(&id))).await;
    assert_eq!(resp.status(), StatusCode::ACCEPTED);

    let resp = send(&app, "GET", &format!("/transfers/{id}"), None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let transfers: Vec<FileTransfer> = body_json(resp).await;
    assert_eq!(transfers.len(), 1);
    let expected: FileTransfer = serde_json::from_value(transfer_body(&id)).unwrap();
    assert_eq!(transfers[0], expected);

    let resp = send(&app, "GET", &format!("/instances/{id}"), None).await;
    let instance: Instance = body_json(resp).await;
    assert!(instance.last_activity_time.unwrap() > instance.creation_time);
}

#[tokio::test]
async fn client_host_ip_is_server_authoritative() {
    let app = test_router();
    let request = Request::builder()
        .method("POST")
        .uri("/instances")
        .header(header::CONTENT_TYPE, "application/json")
        .header("x-forwarded-for", "198.51.100.7:41000, 10.0.0.1")
        .body(Body::from(r#"{"instance_id":"spoof","client_host_ip":"1.2.3.4"}"#))
        .unwrap();
    let resp = app.clone().oneshot(request).await.unwrap();
    assert_eq!(resp.status(), StatusCode::ACCEPTED);

    let resp = send(&app, "GET", "/instances/spoof", None).await;
    let instance: Instance = body_json(resp).await;
    assert_eq!(instance.client_host_ip, "198.51.100.7");
}

#[tokio::test]
async fn list_instances_is_sorted_by_creation_time() {
    let app = test_router();
    let now = Utc::now();
    for (id, hours_ago) in [("mid", 2), ("newest", 0), ("oldest", 5)] {
        register(
            &app,
            serde_json::json!({
                "instance_id": id,
                "creation_time": now - Duration::hours(hours_ago),
            }),
        )
        .await;
    }

    let resp = send(&app, "GET", "/instances", None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()[header::CONTENT_TYPE], "application/json");
    let instances: Vec<Instance> = body_json(resp).await;
    let ids: Vec<&str> = instances.iter().map(|i| i.instance_id.as_str()).collect();
    assert_eq!(ids, vec!["oldest", "mid", "newest"]);
}

#[tokio::test]
async fn unknown_instance_returns_404() {
    let app = test_router();
    let resp = send(&app, "GET", "/instances/nope", None).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn terminate_unknown_instance_returns_500() {
    let app = test_router();
    let resp = send(&app, "DELETE", "/instances/nope", None).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body_text(resp).await.contains("nope"));
}

#[tokio::test]
async fn terminate_marks_instance() {
    let app = test_router();
    let id = register(&app, serde_json::json!({})).await;

    let resp = send(&app, "DELETE", &format!("/instances/{id}"), None).await;
    assert_eq!(resp.status(), StatusCode::ACCEPTED);

    let instance: Instance = body_json(send(&app, "GET", &format!("/instances/{id}"), None).await).await;
    assert!(instance.terminated);
    assert!(instance.termination_time.is_some());
}

#[tokio::test]
async fn transfer_for_unknown_instance_is_bad_request() {
    let app = test_router();
    let resp = send(&app, "POST", "/transfers", Some(transfer_body("ghost"))).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(body_text(resp).await.contains("ghost"));

    let transfers: Vec<FileTransfer> = body_json(send(&app, "GET", "/transfers", None).await).await;
    assert!(transfers.is_empty());
}

#[tokio::test]
async fn malformed_bodies_are_bad_request() {
    let app = test_router();
    for uri in ["/instances", "/transfers"] {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let resp = app.clone().oneshot(request).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{uri}");
        assert!(!body_text(resp).await.is_empty());
    }
}

#[tokio::test]
async fn oversized_body_is_bad_request() {
    let registry = Arc::new(InMemoryRegistry::new());
    let app = app_with_body_limit(Arc::new(CollectorService::new(registry)), 16);
    let resp = send(&app, "POST", "/instances", Some(serde_json::json!({"zone": "a-much-longer-zone-name"}))).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn transfer_with_overflowing_blocks_is_stored() {
    let app = test_router();
    let id = register(&app, serde_json::json!({})).await;

    let mut body = transfer_body(&id);
    body["transfer_blocks"] = serde_json::json!([
        {"offset": i64::MAX, "length": 10, "access_time": "2026-10-19T08:00:00Z"},
        {"offset": 0, "length": 10, "access_time": "2026-10-19T08:00:01Z"}
    ]);
    body["transfer_block_count"] = serde_json::json!(0);

    let resp = send(&app, "POST", "/transfers", Some(body)).await;
    assert_eq!(resp.status(), StatusCode::ACCEPTED);

    let stored: Vec<FileTransfer> = body_json(send(&app, "GET", &format!("/transfers/{id}"), None).await).await;
    assert_eq!(stored[0].transfer_size, 20);
    assert_eq!(stored[0].transfer_block_count, 2);
    assert!(!stored[0].sequential_access);
}

#[tokio::test]
async fn transfer_with_null_blocks_is_accepted() {
    let app = test_router();
    let id = register(&app, serde_json::json!({"instance_id": "x"})).await;

    let mut body = transfer_body(&id);
    body["transfer_blocks"] = serde_json::Value::Null;

    let resp = send(&app, "POST", "/transfers", Some(body)).await;
    assert_eq!(resp.status(), StatusCode::ACCEPTED);

    let stored: Vec<FileTransfer> = body_json(send(&app, "GET", "/transfers/x", None).await).await;
    assert_eq!(stored.len(), 1);
    assert!(stored[0].transfer_blocks.is_empty());
}

#[tokio::test]
async fn transfers_for_unknown_instance_is_empty_array() {
    let app = test_router();
    let resp = send(&app, "GET", "/transfers/nobody", None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_text(resp).await, "[]");
}

#[tokio::test]
async fn cleanup_days_removes_only_old_instances() {
    let app = test_router();
    let now = Utc::now();
    let old = register(&app, serde_json::json!({"creation_time": now - Duration::days(10)})).await;
    let fresh = register(&app, serde_json::json!({"creation_time": now})).await;

    // Registering `fresh` already ran the implicit 7-day sweep; the explicit call
    // must leave the same result.
    let resp = send(&app, "DELETE", "/cleanup/7", None).await;
    assert_eq!(resp.status(), StatusCode::ACCEPTED);

    assert_eq!(send(&app, "GET", &format!("/instances/{old}"), None).await.status(), StatusCode::NOT_FOUND);
    assert_eq!(send(&app, "GET", &format!("/instances/{fresh}"), None).await.status(), StatusCode::OK);
}

#[tokio::test]
async fn cleanup_with_larger_window_keeps_recent_instances() {
    let app = test_router();
    let now = Utc::now();
    let three_days = register(&app, serde_json::json!({"creation_time": now - Duration::days(3)})).await;
    let one_day = register(&app, serde_json::json!({"creation_time": now - Duration::days(1)})).await;

    let resp = send(&app, "DELETE", "/cleanup/2", None).await;
    assert_eq!(resp.status(), StatusCode::ACCEPTED);

    assert_eq!(send(&app, "GET", &format!("/instances/{three_days}"), None).await.status(), StatusCode::NOT_FOUND);
    assert_eq!(send(&app, "GET", &format!("/instances/{one_day}"), None).await.status(), StatusCode::OK);
}

#[tokio::test]
async fn cleanup_days_must_be_integer() {
    let app = test_router();
    let resp = send(&app, "DELETE", "/cleanup/seven", None).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_text(resp).await, "days is not number");
}

#[tokio::test]
async fn cleanup_days_out_of_range_is_accepted() {
    let app = test_router();
    let id = register(&app, serde_json::json!({"creation_time": Utc::now() - Duration::days(1)})).await;

    let max = i64::MAX.to_string();
    for days in ["100000000", max.as_str()] {
        let resp = send(&app, "DELETE", &format!("/cleanup/{days}"), None).await;
        assert_eq!(resp.status(), StatusCode::ACCEPTED);
    }
    assert_eq!(send(&app, "GET", &format!("/instances/{id}"), None).await.status(), StatusCode::OK);

    let resp = send(&app, "DELETE", "/cleanup/-100000000", None).await;
    assert_eq!(resp.status(), StatusCode::ACCEPTED);
    assert_eq!(send(&app, "GET", &format!("/instances/{id}"), None).await.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn cleanup_resets_everything() {
    let app = test_router();
    let id = register(&app, serde_json::json!({})).await;
    send(&app, "POST", "/transfers", Some(transfer_body(&id))).await;

    let resp = send(&app, "DELETE", "/cleanup", None).await;
    assert_eq!(resp.status(), StatusCode::ACCEPTED);

    let instances: Vec<Instance> = body_json(send(&app, "GET", "/instances", None).await).await;
    let transfers: Vec<FileTransfer> = body_json(send(&app, "GET", "/transfers", None).await).await;
    assert!(instances.is_empty());
    assert!(transfers.is_empty());
}

#[tokio::test]
async fn health_reports_counts() {
    let app = test_router();
    let id = register(&app, serde_json::json!({})).await;
    send(&app, "POST", "/transfers", Some(transfer_body(&id))).await;

    let resp = send(&app, "GET", "/health", None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let health: serde_json::Value = body_json(resp).await;
    assert_eq!(health["status"], "healthy");
    assert_eq!(health["instances"], 1);
    assert_eq!(health["transfers"], 1);
}

#[derive(Clone, Default)]
struct LogBuffer {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl<'a> MakeWriter<'a> for LogBuffer {
    type Writer = LogBuffer;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

impl Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.buffer.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[tokio::test]
async fn requests_are_logged_at_info_with_peer() {
    let logs = LogBuffer::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(logs.clone())
        .with_max_level(Level::INFO)
        .with_ansi(false)
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    let request = Request::builder()
        .method("GET")
        .uri("/instances")
        .header("x-real-ip", "203.0.113.9")
        .body(Body::empty())
        .unwrap();
    let resp = test_router().oneshot(request).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let output = String::from_utf8(logs.buffer.lock().unwrap().clone()).unwrap();
    assert!(output.contains("INFO"), "{output}");
    assert!(output.contains("method=GET"), "{output}");
    assert!(output.contains("path=/instances"), "{output}");
    assert!(output.contains("peer=203.0.113.9"), "{output}");
}
