//! Use cases (interactors) for crashping
//!
//! Thin coordinators that drive the telemetry client port.
//!
//! ## Use Cases
//!
//! - [`InitializeTelemetryUseCase`] - Process-start telemetry bootstrap
//! - [`CaptureFaultUseCase`] - Uncaught fault to crash event (and ping)

pub mod capture_fault;
pub mod initialize_telemetry;

pub use capture_fault::{CaptureFaultUseCase, CaptureOptions, CaptureOutcome};
pub use initialize_telemetry::InitializeTelemetryUseCase;

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Mutex;

    use crate::domain::{EventMetric, ExtraMap, PingName, PingSet};
    use crate::ports::{ApplicationContext, ITelemetryClient};

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum Call {
        SetUploadEnabled(bool),
        Initialize(String),
        RegisterPings(Vec<String>),
        RecordEvent(String, ExtraMap),
        SubmitPing(String, Option<String>),
        Shutdown,
    }

    /// Client double that records every call
    #[derive(Default)]
    pub struct RecordingClient {
        calls: Mutex<Vec<Call>>,
        fail_initialize: bool,
        fail_record: bool,
    }

    impl RecordingClient {
        pub fn failing_initialize() -> Self {
            Self {
                fail_initialize: true,
                ..Self::default()
            }
        }

        pub fn failing_record() -> Self {
            Self {
                fail_record: true,
                ..Self::default()
            }
        }

        pub fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }

        pub fn recorded_events(&self) -> Vec<(String, ExtraMap)> {
            self.calls()
                .into_iter()
                .filter_map(|c| match c {
                    Call::RecordEvent(metric, extras) => Some((metric, extras)),
                    _ => None,
                })
                .collect()
        }

        fn push(&self, call: Call) {
            self.calls.lock().unwrap().push(call);
        }
    }

    impl ITelemetryClient for RecordingClient {
        fn set_upload_enabled(&self, enabled: bool) {
            self.push(Call::SetUploadEnabled(enabled));
        }

        fn initialize(&self, context: &ApplicationContext) -> anyhow::Result<()> {
            self.push(Call::Initialize(context.application_id.clone()));
            if self.fail_initialize {
                anyhow::bail!("data dir not writable");
            }
            Ok(())
        }

        fn register_pings(&self, pings: &PingSet) -> anyhow::Result<()> {
            self.push(Call::RegisterPings(
                pings.iter().map(|p| p.name.to_string()).collect(),
            ));
            Ok(())
        }

        fn record_event(&self, metric: &EventMetric, extras: ExtraMap) -> anyhow::Result<()> {
            if self.fail_record {
                anyhow::bail!("telemetry client not initialized");
            }
            self.push(Call::RecordEvent(metric.id().to_string(), extras));
            Ok(())
        }

        fn submit_ping(&self, ping: &PingName, reason: Option<&str>) -> anyhow::Result<bool> {
            self.push(Call::SubmitPing(
                ping.to_string(),
                reason.map(ToString::to_string),
            ));
            Ok(true)
        }

        fn shutdown(&self) -> anyhow::Result<()> {
            self.push(Call::Shutdown);
            Ok(())
        }
    }
}
