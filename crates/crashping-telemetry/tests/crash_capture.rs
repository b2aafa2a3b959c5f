//! End-to-end crash capture through the process panic hook
//!
//! The panic hook is process-wide, so this binary holds a single test.

use std::panic;
use std::sync::Arc;

use crashping_core::domain::{crash_ping, crash_ping_name, CaptureState, PingSet};
use crashping_core::ports::{ApplicationContext, ITelemetryClient};
use crashping_core::usecases::{
    CaptureFaultUseCase, CaptureOptions, InitializeTelemetryUseCase,
};
use crashping_telemetry::{trigger_fault, Anonymizer, CrashHandler, TelemetryClient};

#[test]
fn test_uncaught_null_reference_is_captured_and_submitted() {
    let dir = tempfile::tempdir().unwrap();
    let client = Arc::new(TelemetryClient::new().unwrap());
    InitializeTelemetryUseCase::new(client.clone())
        .execute(
            &ApplicationContext::new("crashping-demo", "0.1.0", dir.path().to_path_buf()),
            &PingSet::new().with(crash_ping()),
            true,
        )
        .unwrap();

    let usecase = Arc::new(CaptureFaultUseCase::new(
        client.clone(),
        CaptureOptions::new(true),
    ));
    let handler = Arc::new(CrashHandler::new(usecase.clone(), Anonymizer::disabled()));
    handler.install();

    let result = panic::catch_unwind(|| trigger_fault());
    assert!(result.is_err());
    assert_eq!(usecase.state(), CaptureState::Captured);

    // Submitted immediately, so nothing is left in storage
    assert!(client.stored_events(&crash_ping_name()).unwrap().is_empty());

    let store = client.pending_store().unwrap();
    let entries = store.list().unwrap();
    assert_eq!(entries.len(), 1);

    let ping = store.read(&entries[0].document_id).unwrap().unwrap();
    assert_eq!(ping.body["ping_info"]["reason"], "crash");
    let events = ping.body["events"].as_array().unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0]["category"], "crash");
    assert_eq!(events[0]["name"], "exception");
    assert_eq!(events[0]["extra"]["cause"], "");
    assert_eq!(events[0]["extra"]["message"], "");

    client.shutdown().unwrap();
}
