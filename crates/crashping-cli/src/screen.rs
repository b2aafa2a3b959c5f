//! Main screen controller
//!
//! Showing the screen installs the crash handler; the `crash` action raises
//! an uncaught fault that the handler captures.

use std::sync::Arc;

use crashping_core::config::CrashConfig;
use crashping_core::domain::CaptureState;
use crashping_core::ports::ITelemetryClient;
use crashping_core::usecases::{CaptureFaultUseCase, CaptureOptions};
use crashping_telemetry::{trigger_fault, Anonymizer, CrashHandler};
use tracing::info;

/// Actions available on the main screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Crash,
    Help,
    Quit,
    Unknown(String),
}

impl Action {
    /// Parses one line of user input.
    pub fn parse(input: &str) -> Self {
        match input.trim().to_ascii_lowercase().as_str() {
            "crash" | "c" => Action::Crash,
            "help" | "h" | "?" => Action::Help,
            "quit" | "q" | "exit" => Action::Quit,
            other => Action::Unknown(other.to_string()),
        }
    }
}

pub const HELP: &str = "Actions: crash (raise an uncaught fault), help, quit";

pub struct MainScreen {
    handler: Arc<CrashHandler>,
    shown: bool,
}

impl MainScreen {
    pub fn new(
        client: Arc<dyn ITelemetryClient>,
        crash: &CrashConfig,
        submit_on_capture: bool,
    ) -> Self {
        let usecase = Arc::new(CaptureFaultUseCase::new(
            client,
            CaptureOptions::new(submit_on_capture),
        ));
        let handler = CrashHandler::new(usecase, Anonymizer::new(&crash.anonymize))
            .with_acknowledgment(crash.acknowledge_capture);

        Self {
            handler: Arc::new(handler),
            shown: false,
        }
    }

    /// Displays the screen, installing the crash handler on first display.
    pub fn show(&mut self) {
        if self.shown {
            return;
        }
        Arc::clone(&self.handler).install();
        self.shown = true;
        info!(
            submit_on_capture = self.handler.usecase().options().submit_on_capture,
            "Main screen shown, crash handler installed"
        );
    }

    pub fn capture_state(&self) -> CaptureState {
        self.handler.usecase().state()
    }

    /// The `crash` action.
    pub fn on_crash(&self) -> ! {
        info!("Crash action selected");
        trigger_fault()
    }
}
