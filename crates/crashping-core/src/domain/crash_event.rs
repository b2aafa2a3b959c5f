//! Crash events and the fault capture state machine
//!
//! A [`CrashEvent`] is the structured record produced when an uncaught
//! fault is captured. It is serialized into the `crash.exception` event
//! metric right away and never retained afterwards.

use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

use super::errors::DomainError;
use super::fault::Fault;
use super::metric::{EventMetric, ExtraMap};
use super::newtypes::{MetricId, PingName};
use super::ping::{PingDefinition, REASON_CRASH, REASON_STARTUP};

/// Extra key holding the stringified cause.
pub const CAUSE_KEY: &str = "cause";

/// Extra key holding the fault message.
pub const MESSAGE_KEY: &str = "message";

/// Name of the custom crash ping.
pub const CRASH_PING: &str = "crash";

/// Structured record of a captured fault
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrashEvent {
    /// The fault's originating cause, stringified. Empty when absent.
    pub cause: String,
    /// The fault's descriptive message. Empty when absent.
    pub message: String,
}

impl CrashEvent {
    /// Builds a best-effort event from a fault.
    ///
    /// Missing cause or message is recorded as an empty string.
    pub fn from_fault(fault: &Fault) -> Self {
        Self {
            cause: fault.cause().map(ToString::to_string).unwrap_or_default(),
            message: fault.message().unwrap_or_default().to_string(),
        }
    }

    /// The event extras for the `crash.exception` metric
    pub fn to_extras(&self) -> ExtraMap {
        let mut extras = ExtraMap::new();
        extras.insert(CAUSE_KEY.to_string(), self.cause.clone());
        extras.insert(MESSAGE_KEY.to_string(), self.message.clone());
        extras
    }

    /// Rebuilds an event from recorded extras, if both keys are present
    pub fn from_extras(extras: &ExtraMap) -> Option<Self> {
        Some(Self {
            cause: extras.get(CAUSE_KEY)?.clone(),
            message: extras.get(MESSAGE_KEY)?.clone(),
        })
    }

    /// The `crash.exception` event metric, sent in the `crash` ping
    pub fn metric() -> EventMetric {
        // Static identifiers; validation cannot fail.
        EventMetric::new(
            MetricId::new("crash", "exception").expect("static metric id"),
            vec![crash_ping_name()],
            vec![CAUSE_KEY.to_string(), MESSAGE_KEY.to_string()],
        )
        .expect("static extra keys")
    }
}

/// Name of the `crash` ping
pub fn crash_ping_name() -> PingName {
    PingName::new(CRASH_PING).expect("static ping name")
}

/// Definition of the custom `crash` ping.
///
/// Events left unsent by a crash are flushed on the next startup.
pub fn crash_ping() -> PingDefinition {
    PingDefinition::new(crash_ping_name())
        .with_flush_on_startup(true)
        .with_reason_codes([REASON_CRASH, REASON_STARTUP])
}

/// Lifecycle of a fault capture handler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaptureState {
    /// No fault has been captured
    Idle,
    /// A fault was captured; terminal
    Captured,
}

impl CaptureState {
    /// Transition `Idle -> Captured`
    pub fn capture(self) -> Result<Self, DomainError> {
        match self {
            CaptureState::Idle => Ok(CaptureState::Captured),
            CaptureState::Captured => Err(DomainError::InvalidState {
                from: self.to_string(),
                to: CaptureState::Captured.to_string(),
            }),
        }
    }
}

impl Display for CaptureState {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let s = match self {
            CaptureState::Idle => "idle",
            CaptureState::Captured => "captured",
        };
        write!(f, "{}", s)
    }
}
