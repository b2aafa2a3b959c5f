//! Ping upload against a mock ingestion server

use std::sync::Arc;

use crashping_core::domain::crash_ping_name;
use crashping_core::ports::{IPingUploader, ITelemetryClient, PingRequest, UploadResult};
use crashping_telemetry::{HttpUploader, UploadManager, UploadSummary};
use wiremock::matchers::{header, header_exists, method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::common;

fn request() -> PingRequest {
    PingRequest {
        document_id: "doc-1".to_string(),
        path: "/submit/crashping-demo/crash/1/doc-1".to_string(),
        body: serde_json::json!({"ping_info": {"seq": 0}}),
    }
}

async fn upload_with_status(status: u16) -> UploadResult {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/submit/crashping-demo/crash/1/doc-1"))
        .respond_with(ResponseTemplate::new(status))
        .expect(1)
        .mount(&server)
        .await;

    HttpUploader::new(server.uri()).upload(&request()).await
}

#[tokio::test]
async fn test_upload_sends_json_with_headers() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/submit/crashping-demo/crash/1/doc-1"))
        .and(header("Content-Type", "application/json; charset=utf-8"))
        .and(header_exists("Date"))
        .and(header_exists("X-Telemetry-Agent"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let result = HttpUploader::new(server.uri()).upload(&request()).await;
    assert_eq!(result, UploadResult::Success { status: 200 });

    let received = server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&received[0].body).unwrap();
    assert_eq!(body["ping_info"]["seq"], 0);
}

#[tokio::test]
async fn test_upload_status_classification() {
    assert_eq!(
        upload_with_status(202).await,
        UploadResult::Success { status: 202 }
    );
    assert_eq!(
        upload_with_status(400).await,
        UploadResult::UnrecoverableFailure { status: 400 }
    );
    assert!(matches!(
        upload_with_status(500).await,
        UploadResult::RecoverableFailure { .. }
    ));
}

#[tokio::test]
async fn test_connection_failure_is_recoverable() {
    // Nothing listens on the discard port
    let result = HttpUploader::new("http://127.0.0.1:9")
        .upload(&request())
        .await;
    assert!(matches!(result, UploadResult::RecoverableFailure { .. }));
}

#[tokio::test]
async fn test_submitted_crash_ping_is_uploaded_and_removed() {
    let dir = tempfile::tempdir().unwrap();
    let client = common::ready_client(dir.path());
    common::record_crash(&client, "", "");
    assert!(client.submit_ping(&crash_ping_name(), Some("crash")).unwrap());

    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path_regex(r"^/submit/crashping-demo/crash/1/[0-9a-f-]{36}$"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let store = client.pending_store().unwrap();
    let manager = UploadManager::new(store.clone(), Arc::new(HttpUploader::new(server.uri())), 3)
        .with_metrics(client.metrics());

    let summary = manager.upload_pending().await.unwrap();
    assert_eq!(
        summary,
        UploadSummary {
            uploaded: 1,
            rejected: 0,
            failed: 0,
            remaining: 0,
        }
    );
    assert!(store.list().unwrap().is_empty());

    let received = server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&received[0].body).unwrap();
    assert_eq!(body["ping_info"]["reason"], "crash");
    assert_eq!(body["events"][0]["category"], "crash");
    assert_eq!(body["events"][0]["name"], "exception");
    assert_eq!(
        client.metrics().uploads_total.with_label_values(&["success"]).get(),
        1
    );
}

#[tokio::test]
async fn test_server_errors_keep_pings_for_retry() {
    let dir = tempfile::tempdir().unwrap();
    let client = common::ready_client(dir.path());
    for _ in 0..2 {
        common::record_crash(&client, "", "");
        client.submit_ping(&crash_ping_name(), Some("crash")).unwrap();
    }

    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let store = client.pending_store().unwrap();
    let manager = UploadManager::new(store.clone(), Arc::new(HttpUploader::new(server.uri())), 1);

    let summary = manager.upload_pending().await.unwrap();
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.remaining, 2);
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}
