//! Port definitions (hexagonal architecture interfaces)
//!
//! ## Ports Overview
//!
//! - [`ITelemetryClient`] - Metric recording and ping submission
//! - [`IPingUploader`] - Transport for stored pings

pub mod ping_uploader;
pub mod telemetry_client;

pub use ping_uploader::{IPingUploader, PingRequest, UploadResult};
pub use telemetry_client::{ApplicationContext, ITelemetryClient};
