//! Domain entities
//!
//! This module contains the core domain types for crashping:
//! - Newtypes for validated telemetry identifiers
//! - Faults and the crash events derived from them
//! - Event metric and ping definitions
//! - Domain-specific error types

pub mod crash_event;
pub mod errors;
pub mod fault;
pub mod metric;
pub mod newtypes;
pub mod ping;

// Re-export commonly used types
pub use crash_event::{crash_ping, crash_ping_name, CaptureState, CrashEvent};
pub use errors::DomainError;
pub use fault::Fault;
pub use metric::{EventMetric, ExtraMap};
pub use newtypes::{MetricId, PingName};
pub use ping::{PingDefinition, PingSet, REASON_CRASH, REASON_STARTUP};
