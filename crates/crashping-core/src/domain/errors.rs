//! Domain error types
//!
//! Validation failures for telemetry identifiers and invalid capture
//! state transitions.

use thiserror::Error;

/// Errors that can occur in domain operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Ping name does not follow the naming rules
    #[error("Invalid ping name: {0}")]
    InvalidPingName(String),

    /// Metric category or name does not follow the naming rules
    #[error("Invalid metric identifier: {0}")]
    InvalidMetricId(String),

    /// Event extra key does not follow the naming rules
    #[error("Invalid extra key: {0}")]
    InvalidExtraKey(String),

    /// Invalid state transition attempt
    #[error("Invalid state transition from {from} to {to}")]
    InvalidState {
        /// The current state
        from: String,
        /// The attempted target state
        to: String,
    },
}
