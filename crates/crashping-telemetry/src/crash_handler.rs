//! Uncaught fault handler
//!
//! Installs a process-wide panic hook that turns the first uncaught fault
//! into a `crash.exception` event. The previous hook is chained so the
//! default stderr output and process termination are preserved.

use std::panic;
use std::sync::Arc;

use crashping_core::domain::Fault;
use crashping_core::usecases::{CaptureFaultUseCase, CaptureOutcome};
use tracing::debug;

use crate::anonymizer::Anonymizer;

/// Line printed to stderr after a capture when acknowledgment is enabled
pub const ACKNOWLEDGMENT: &str = "crashping: crash captured";

/// Routes uncaught faults to the capture use case
pub struct CrashHandler {
    usecase: Arc<CaptureFaultUseCase>,
    anonymizer: Anonymizer,
    acknowledge: bool,
}

impl CrashHandler {
    pub fn new(usecase: Arc<CaptureFaultUseCase>, anonymizer: Anonymizer) -> Self {
        Self {
            usecase,
            anonymizer,
            acknowledge: false,
        }
    }

    /// Print [`ACKNOWLEDGMENT`] to stderr after each capture.
    pub fn with_acknowledgment(mut self, acknowledge: bool) -> Self {
        self.acknowledge = acknowledge;
        self
    }

    pub fn usecase(&self) -> &Arc<CaptureFaultUseCase> {
        &self.usecase
    }

    /// Anonymizes `fault` and hands it to the capture use case.
    pub fn handle(&self, fault: &Fault) -> Option<CaptureOutcome> {
        let fault = fault.map_messages(&|text: &str| self.anonymizer.anonymize(text));
        let outcome = self.usecase.capture(&fault)?;

        if self.acknowledge {
            eprintln!("{ACKNOWLEDGMENT}");
        }
        Some(outcome)
    }

    /// Installs the handler as the process panic hook.
    ///
    /// Calling this more than once stacks handlers; the capture use case
    /// still records at most one fault.
    pub fn install(self: Arc<Self>) {
        let previous_hook = panic::take_hook();

        panic::set_hook(Box::new(move |panic_info| {
            let fault = Fault::from_panic_payload(panic_info.payload());
            if let Some(location) = panic_info.location() {
                debug!(
                    file = location.file(),
                    line = location.line(),
                    "Uncaught fault"
                );
            }

            self.handle(&fault);

            previous_hook(panic_info);
        }));
    }
}

/// Raises an uncaught null-reference fault with no message and no cause.
pub fn trigger_fault() -> ! {
    panic::panic_any(Fault::null_reference())
}
