//! Ping upload
//!
//! [`HttpUploader`] posts one ping to the ingestion server. [`UploadManager`]
//! drains the pending ping store through any [`IPingUploader`], deleting
//! pings once the server has given a final answer.

use std::sync::Arc;

use chrono::Utc;
use crashping_core::ports::{IPingUploader, PingRequest, UploadResult};
use reqwest::Client;
use tracing::{debug, info, warn};

use crate::metrics::MetricsRegistry;
use crate::pending::PendingPingStore;

/// `Date` header format (RFC 7231 IMF-fixdate)
const HTTP_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// Uploads pings over HTTP
pub struct HttpUploader {
    client: Client,
    endpoint: String,
}

impl HttpUploader {
    /// Creates an uploader posting to `endpoint`, e.g.
    /// `https://incoming.telemetry.mozilla.org`.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait::async_trait]
impl IPingUploader for HttpUploader {
    async fn upload(&self, request: &PingRequest) -> UploadResult {
        let url = format!("{}{}", self.endpoint, request.path);
        let body = match serde_json::to_vec(&request.body) {
            Ok(body) => body,
            Err(e) => {
                // A body that cannot be serialized will never succeed
                warn!(document_id = %request.document_id, error = %e, "Unserializable ping");
                return UploadResult::UnrecoverableFailure { status: 0 };
            }
        };

        debug!(url = %url, bytes = body.len(), "Uploading ping");

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json; charset=utf-8")
            .header("Date", Utc::now().format(HTTP_DATE_FORMAT).to_string())
            .header(
                "X-Telemetry-Agent",
                concat!("crashping/", env!("CARGO_PKG_VERSION")),
            )
            .body(body)
            .send()
            .await;

        match response {
            Ok(response) => UploadResult::from_status(response.status().as_u16()),
            Err(e) => UploadResult::RecoverableFailure {
                reason: e.to_string(),
            },
        }
    }
}

/// Result of one pass over the pending ping store
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadSummary {
    /// Accepted by the server
    pub uploaded: u32,
    /// Rejected by the server or unreadable, and deleted
    pub rejected: u32,
    /// Recoverable failures, kept for the next pass
    pub failed: u32,
    /// Pings still pending after the pass
    pub remaining: u32,
}

/// Drains the pending ping store
pub struct UploadManager {
    store: PendingPingStore,
    uploader: Arc<dyn IPingUploader>,
    max_recoverable_failures: u32,
    metrics: Option<Arc<MetricsRegistry>>,
}

impl UploadManager {
    pub fn new(
        store: PendingPingStore,
        uploader: Arc<dyn IPingUploader>,
        max_recoverable_failures: u32,
    ) -> Self {
        Self {
            store,
            uploader,
            max_recoverable_failures,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<MetricsRegistry>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Uploads pending pings oldest first.
    ///
    /// The pass stops early after `max_recoverable_failures` recoverable
    /// failures; those pings stay in the store.
    pub async fn upload_pending(&self) -> anyhow::Result<UploadSummary> {
        let mut entries = self.store.list()?;
        entries.reverse();

        let mut summary = UploadSummary::default();

        for entry in entries {
            if summary.failed >= self.max_recoverable_failures {
                warn!(
                    failures = summary.failed,
                    "Too many recoverable upload failures, stopping"
                );
                break;
            }

            let request = match self.store.read(&entry.document_id) {
                Ok(Some(request)) => request,
                Ok(None) => continue,
                Err(e) => {
                    warn!(document_id = %entry.document_id, error = %e, "Deleting unreadable ping");
                    self.store.delete(&entry.document_id)?;
                    summary.rejected += 1;
                    self.record("corrupt");
                    continue;
                }
            };

            let result = self.uploader.upload(&request).await;
            match &result {
                UploadResult::Success { status } => {
                    debug!(document_id = %request.document_id, status, "Ping uploaded");
                    summary.uploaded += 1;
                    self.record("success");
                }
                UploadResult::UnrecoverableFailure { status } => {
                    warn!(document_id = %request.document_id, status, "Ping rejected by server");
                    summary.rejected += 1;
                    self.record("unrecoverable");
                }
                UploadResult::RecoverableFailure { reason } => {
                    warn!(document_id = %request.document_id, reason = %reason, "Ping upload failed");
                    summary.failed += 1;
                    self.record("recoverable");
                }
            }

            if result.is_final() {
                self.store.delete(&request.document_id)?;
            }
        }

        summary.remaining = u32::try_from(self.store.list()?.len()).unwrap_or(u32::MAX);
        info!(
            uploaded = summary.uploaded,
            rejected = summary.rejected,
            failed = summary.failed,
            remaining = summary.remaining,
            "Upload pass complete"
        );
        Ok(summary)
    }

    fn record(&self, result: &str) {
        if let Some(metrics) = &self.metrics {
            metrics.record_upload(result);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use super::*;

    /// Returns scripted results in order, then success.
    struct ScriptedUploader {
        results: Mutex<VecDeque<UploadResult>>,
        seen: Mutex<Vec<String>>,
    }

    impl ScriptedUploader {
        fn new(results: Vec<UploadResult>) -> Self {
            Self {
                results: Mutex::new(results.into()),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait::async_trait]
    impl IPingUploader for ScriptedUploader {
        async fn upload(&self, request: &PingRequest) -> UploadResult {
            self.seen.lock().unwrap().push(request.document_id.clone());
            self.results
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(UploadResult::Success { status: 200 })
        }
    }

    fn save(store: &PendingPingStore, id: &str) {
        store
            .save(&PingRequest {
                document_id: id.to_string(),
                path: format!("/submit/crashping-demo/crash/1/{id}"),
                body: serde_json::json!({}),
            })
            .unwrap();
    }

    #[tokio::test]
    async fn test_final_results_are_deleted() {
        let dir = tempfile::tempdir().unwrap();
        let store = PendingPingStore::new(dir.path().to_path_buf());
        save(&store, "a");
        save(&store, "b");
        save(&store, "c");

        let uploader = Arc::new(ScriptedUploader::new(vec![
            UploadResult::Success { status: 200 },
            UploadResult::UnrecoverableFailure { status: 400 },
            UploadResult::RecoverableFailure {
                reason: "HTTP 503".into(),
            },
        ]));
        let manager = UploadManager::new(store.clone(), uploader.clone(), 3);

        let summary = manager.upload_pending().await.unwrap();
        assert_eq!(
            summary,
            UploadSummary {
                uploaded: 1,
                rejected: 1,
                failed: 1,
                remaining: 1,
            }
        );
        assert_eq!(uploader.seen.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_stops_after_recoverable_failure_limit() {
        let dir = tempfile::tempdir().unwrap();
        let store = PendingPingStore::new(dir.path().to_path_buf());
        for id in ["a", "b", "c", "d"] {
            save(&store, id);
        }

        let failure = || UploadResult::RecoverableFailure {
            reason: "timeout".into(),
        };
        let uploader = Arc::new(ScriptedUploader::new(vec![failure(), failure(), failure()]));
        let manager = UploadManager::new(store, uploader.clone(), 2);

        let summary = manager.upload_pending().await.unwrap();
        assert_eq!(summary.failed, 2);
        assert_eq!(summary.remaining, 4);
        assert_eq!(uploader.seen.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_corrupt_ping_is_deleted() {
        let dir = tempfile::tempdir().unwrap();
        let store = PendingPingStore::new(dir.path().to_path_buf());
        std::fs::write(dir.path().join("broken.json"), "not json").unwrap();

        let metrics = Arc::new(MetricsRegistry::new().unwrap());
        let manager = UploadManager::new(store, Arc::new(ScriptedUploader::new(vec![])), 3)
            .with_metrics(Arc::clone(&metrics));

        let summary = manager.upload_pending().await.unwrap();
        assert_eq!(summary.rejected, 1);
        assert_eq!(summary.remaining, 0);
        assert_eq!(
            metrics.uploads_total.with_label_values(&["corrupt"]).get(),
            1
        );
    }

    #[test]
    fn test_endpoint_trailing_slash_trimmed() {
        let uploader = HttpUploader::new("https://example.com/");
        assert_eq!(uploader.endpoint(), "https://example.com");
    }
}
