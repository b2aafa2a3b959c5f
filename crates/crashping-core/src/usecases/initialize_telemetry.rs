//! Telemetry bootstrap use case
//!
//! Runs once at process start: registers the application's custom pings,
//! applies the upload preference and initializes the client. Must complete
//! before anything is recorded; the client refuses recordings until then.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use crate::domain::PingSet;
use crate::ports::{ApplicationContext, ITelemetryClient};

/// Bootstraps the telemetry client
pub struct InitializeTelemetryUseCase {
    client: Arc<dyn ITelemetryClient>,
}

impl InitializeTelemetryUseCase {
    pub fn new(client: Arc<dyn ITelemetryClient>) -> Self {
        Self { client }
    }

    /// Registers `pings`, sets upload and initializes with `context`.
    ///
    /// Safe to call more than once; the client treats repeated
    /// registration and initialization as no-ops.
    pub fn execute(
        &self,
        context: &ApplicationContext,
        pings: &PingSet,
        upload_enabled: bool,
    ) -> Result<()> {
        info!(
            application_id = %context.application_id,
            pings = pings.len(),
            upload_enabled,
            "Initializing telemetry"
        );

        self.client
            .register_pings(pings)
            .context("Failed to register custom pings")?;
        self.client.set_upload_enabled(upload_enabled);
        self.client
            .initialize(context)
            .context("Failed to initialize telemetry client")?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::domain::crash_ping;
    use crate::usecases::test_support::{Call, RecordingClient};

    fn context() -> ApplicationContext {
        ApplicationContext::new("crashping-demo", "0.1.0", PathBuf::from("/tmp/unused"))
    }

    #[test]
    fn test_bootstrap_order() {
        let client = Arc::new(RecordingClient::default());
        let usecase = InitializeTelemetryUseCase::new(client.clone());
        let pings = PingSet::new().with(crash_ping());

        usecase.execute(&context(), &pings, true).unwrap();

        assert_eq!(
            client.calls(),
            vec![
                Call::RegisterPings(vec!["crash".into()]),
                Call::SetUploadEnabled(true),
                Call::Initialize("crashping-demo".into()),
            ]
        );
    }

    #[test]
    fn test_bootstrap_propagates_initialize_error() {
        let client = Arc::new(RecordingClient::failing_initialize());
        let usecase = InitializeTelemetryUseCase::new(client);

        let err = usecase
            .execute(&context(), &PingSet::new(), true)
            .unwrap_err();
        assert!(err.to_string().contains("initialize"));
    }
}
