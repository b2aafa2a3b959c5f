//! Demo application bootstrap
//!
//! Owns the telemetry client for the lifetime of the process. Starting the
//! app registers the `crash` ping and initializes the client; screens get
//! the client from here instead of a global.

use std::sync::Arc;

use anyhow::{Context, Result};
use crashping_core::config::Config;
use crashping_core::domain::{crash_ping, PingSet};
use crashping_core::ports::{ApplicationContext, ITelemetryClient};
use crashping_core::usecases::InitializeTelemetryUseCase;
use crashping_telemetry::TelemetryClient;
use tracing::{debug, warn};

use crate::screen::MainScreen;

/// Version reported as `app_display_version`
pub const APP_DISPLAY_VERSION: &str = env!("CARGO_PKG_VERSION");

/// The custom pings this application registers
pub fn app_pings() -> PingSet {
    PingSet::new().with(crash_ping())
}

pub struct App {
    config: Config,
    client: Arc<TelemetryClient>,
}

impl App {
    /// Bootstraps telemetry for the process.
    pub fn start(config: Config) -> Result<Self> {
        let client =
            Arc::new(TelemetryClient::new().context("Failed to create telemetry client")?);
        let context = ApplicationContext::from_config(&config.telemetry, APP_DISPLAY_VERSION);

        InitializeTelemetryUseCase::new(client.clone()).execute(
            &context,
            &app_pings(),
            config.telemetry.upload_enabled,
        )?;

        Ok(Self { config, client })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn client(&self) -> &Arc<TelemetryClient> {
        &self.client
    }

    /// The main screen, capturing with the given submission mode.
    pub fn main_screen(&self, submit_on_capture: bool) -> MainScreen {
        MainScreen::new(self.client.clone(), &self.config.crash, submit_on_capture)
    }

    /// Shuts the client down and logs its counters.
    pub fn shutdown(&self) -> Result<()> {
        self.client.shutdown()?;
        match self.client.metrics().encode() {
            Ok(text) => debug!(metrics = %text, "Telemetry counters"),
            Err(e) => warn!(error = %e, "Failed to encode telemetry counters"),
        }
        Ok(())
    }
}
