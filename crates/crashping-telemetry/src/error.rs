//! Error types for the telemetry client

use thiserror::Error;

/// Errors raised by the telemetry client and its storage
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// Recording or submission attempted before `initialize`
    #[error("telemetry client not initialized")]
    NotInitialized,

    /// The client was shut down
    #[error("telemetry client has been shut down")]
    ShutDown,

    /// Submission of a ping that was never registered
    #[error("unknown ping: {0}")]
    UnknownPing(String),

    /// A different definition is already registered under this name
    #[error("conflicting definition for ping: {0}")]
    PingConflict(String),

    /// The ping does not declare this reason code
    #[error("ping {ping} does not accept reason {reason}")]
    InvalidReason { ping: String, reason: String },

    /// Storage error
    #[error("storage error: {0}")]
    Io(#[from] std::io::Error),

    /// Payload serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Metrics registry error
    #[error("metrics error: {0}")]
    Metrics(#[from] prometheus::Error),
}
