//! crashping Telemetry - Telemetry client, crash handler and ping upload
//!
//! Provides:
//! - `TelemetryClient`: file-backed implementation of `ITelemetryClient`
//! - `CrashHandler`: panic hook that captures the first uncaught fault
//! - `PendingPingStore`: submitted pings waiting for upload
//! - `HttpUploader` / `UploadManager`: ping upload to the ingestion server
//! - `MetricsRegistry`: Prometheus counters for the client
//! - `Anonymizer`: PII stripping for crash fields

pub mod anonymizer;
pub mod client;
pub mod crash_handler;
pub mod error;
pub mod metrics;
pub mod os_info;
pub mod pending;
pub mod ping_maker;
pub mod storage;
pub mod uploader;

pub use anonymizer::Anonymizer;
pub use client::{ClientState, TelemetryClient};
pub use crash_handler::{trigger_fault, CrashHandler};
pub use error::TelemetryError;
pub use metrics::MetricsRegistry;
pub use os_info::OsInfo;
pub use pending::{PendingPingEntry, PendingPingStore};
pub use uploader::{HttpUploader, UploadManager, UploadSummary};
