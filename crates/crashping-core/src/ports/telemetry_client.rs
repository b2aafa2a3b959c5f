//! Telemetry client port (driven/secondary port)
//!
//! This module defines the interface the application uses to record
//! metrics and submit pings. The concrete client lives in the
//! `crashping-telemetry` crate.
//!
//! ## Design Notes
//!
//! - Uses `anyhow::Result` because errors at port boundaries are adapter-specific.
//! - The trait is synchronous: the fault capture handler calls it from
//!   inside a panic hook, where no async runtime can be relied upon.
//! - Implementations must be `Send + Sync`; the panic hook runs on
//!   whichever thread panicked.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::config::TelemetryConfig;
use crate::domain::{EventMetric, ExtraMap, PingName, PingSet};

/// Process context handed to the telemetry client at initialization
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationContext {
    /// Application identifier used in submission paths
    pub application_id: String,
    /// Human-readable application version
    pub app_display_version: String,
    /// Directory for stored events, pending pings and client state
    pub data_dir: PathBuf,
}

impl ApplicationContext {
    pub fn new(
        application_id: impl Into<String>,
        app_display_version: impl Into<String>,
        data_dir: PathBuf,
    ) -> Self {
        Self {
            application_id: application_id.into(),
            app_display_version: app_display_version.into(),
            data_dir,
        }
    }

    /// Builds the context from the telemetry config section
    pub fn from_config(config: &TelemetryConfig, app_display_version: impl Into<String>) -> Self {
        Self::new(
            config.application_id.clone(),
            app_display_version,
            config.data_dir.clone(),
        )
    }
}

/// Port trait for the telemetry client
///
/// Lifecycle: `uninitialized -> ready -> shut down`. Pings may be
/// registered and upload toggled before initialization; recording and
/// submission require a ready client.
pub trait ITelemetryClient: Send + Sync {
    /// Enables or disables upload. Disabling clears stored data.
    fn set_upload_enabled(&self, enabled: bool);

    /// Initializes the client. Calling it on a ready client is a no-op.
    fn initialize(&self, context: &ApplicationContext) -> anyhow::Result<()>;

    /// Registers custom pings. Re-registering an identical definition
    /// is a no-op; a conflicting definition under the same name is an error.
    fn register_pings(&self, pings: &PingSet) -> anyhow::Result<()>;

    /// Records one event for `metric` with the given extras
    fn record_event(&self, metric: &EventMetric, extras: ExtraMap) -> anyhow::Result<()>;

    /// Assembles and stores the named ping for upload.
    ///
    /// Returns `false` when nothing was submitted (empty ping or upload
    /// disabled).
    fn submit_ping(&self, ping: &PingName, reason: Option<&str>) -> anyhow::Result<bool>;

    /// Moves the client to its terminal state
    fn shutdown(&self) -> anyhow::Result<()>;
}
