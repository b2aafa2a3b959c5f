//! Fault capture use case
//!
//! Converts an uncaught fault into a `crash.exception` event and, when
//! configured, submits the `crash` ping right away. This is the last code
//! to run before the process dies, so nothing here may fail: client errors
//! are logged and the capture carries on.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::domain::{
    crash_ping_name, CaptureState, CrashEvent, EventMetric, Fault, PingName, REASON_CRASH,
};
use crate::ports::ITelemetryClient;

/// What the capture handler records and whether it submits immediately
#[derive(Debug, Clone)]
pub struct CaptureOptions {
    /// Submit the ping right after recording
    pub submit_on_capture: bool,
    /// Event metric receiving the crash fields
    pub metric: EventMetric,
    /// Ping submitted when `submit_on_capture` is set
    pub ping: PingName,
}

impl CaptureOptions {
    /// Options targeting `crash.exception` and the `crash` ping
    pub fn new(submit_on_capture: bool) -> Self {
        Self {
            submit_on_capture,
            metric: CrashEvent::metric(),
            ping: crash_ping_name(),
        }
    }
}

/// Result of a successful `Idle -> Captured` transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureOutcome {
    pub event: CrashEvent,
    /// The client stored the event
    pub recorded: bool,
    /// The ping was assembled and queued for upload
    pub submitted: bool,
}

/// Captures at most one fault per instance
pub struct CaptureFaultUseCase {
    client: Arc<dyn ITelemetryClient>,
    options: CaptureOptions,
    captured: AtomicBool,
}

impl CaptureFaultUseCase {
    pub fn new(client: Arc<dyn ITelemetryClient>, options: CaptureOptions) -> Self {
        Self {
            client,
            options,
            captured: AtomicBool::new(false),
        }
    }

    pub fn options(&self) -> &CaptureOptions {
        &self.options
    }

    pub fn state(&self) -> CaptureState {
        if self.captured.load(Ordering::SeqCst) {
            CaptureState::Captured
        } else {
            CaptureState::Idle
        }
    }

    /// Records `fault` and optionally submits the ping.
    ///
    /// Returns `None` if a fault was already captured by this instance.
    pub fn capture(&self, fault: &Fault) -> Option<CaptureOutcome> {
        if self
            .captured
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            if let Err(e) = CaptureState::Captured.capture() {
                warn!(fault = %fault, error = %e, "Ignoring fault after capture");
            }
            return None;
        }

        info!(fault = %fault, "Capturing uncaught fault");
        let event = CrashEvent::from_fault(fault);

        let recorded = match self
            .client
            .record_event(&self.options.metric, event.to_extras())
        {
            Ok(()) => true,
            Err(e) => {
                error!(metric = %self.options.metric.id(), error = %e, "Failed to record crash event");
                false
            }
        };

        let submitted = if self.options.submit_on_capture {
            match self.client.submit_ping(&self.options.ping, Some(REASON_CRASH)) {
                Ok(submitted) => submitted,
                Err(e) => {
                    error!(ping = %self.options.ping, error = %e, "Failed to submit crash ping");
                    false
                }
            }
        } else {
            debug!(ping = %self.options.ping, "Leaving crash event for the next scheduled ping");
            false
        };

        Some(CaptureOutcome {
            event,
            recorded,
            submitted,
        })
    }
}
