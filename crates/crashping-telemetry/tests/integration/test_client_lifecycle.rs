//! Client lifecycle across process restarts

use std::sync::Arc;

use crashping_core::domain::{crash_ping_name, Fault, PingSet};
use crashping_core::ports::ITelemetryClient;
use crashping_core::usecases::{
    CaptureFaultUseCase, CaptureOptions, InitializeTelemetryUseCase,
};
use crashping_telemetry::{ClientState, TelemetryClient};

use crate::common;

#[test]
fn test_batched_crash_is_flushed_on_next_startup() {
    let dir = tempfile::tempdir().unwrap();

    // First run: capture without submitting
    {
        let client = common::ready_client(dir.path());
        let usecase = CaptureFaultUseCase::new(client.clone(), CaptureOptions::new(false));
        let outcome = usecase.capture(&Fault::null_reference()).unwrap();
        assert!(outcome.recorded);
        assert!(!outcome.submitted);
        assert!(client.pending_store().unwrap().list().unwrap().is_empty());
        client.shutdown().unwrap();
    }

    // Second run: the stored event goes out with reason "startup"
    let client: Arc<TelemetryClient> = Arc::new(TelemetryClient::new().unwrap());
    InitializeTelemetryUseCase::new(client.clone())
        .execute(
            &common::context(dir.path()),
            &PingSet::new().with(crashping_core::domain::crash_ping()),
            true,
        )
        .unwrap();
    assert_eq!(client.state(), ClientState::Ready);

    let store = client.pending_store().unwrap();
    let entries = store.list().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].ping_name, "crash");

    let request = store.read(&entries[0].document_id).unwrap().unwrap();
    assert_eq!(request.body["ping_info"]["reason"], "startup");
    assert_eq!(request.body["events"][0]["extra"]["cause"], "");
    assert_eq!(request.body["events"][0]["extra"]["message"], "");
    assert!(client.stored_events(&crash_ping_name()).unwrap().is_empty());
}

#[test]
fn test_startup_without_stored_events_sends_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let client = common::ready_client(dir.path());
    assert!(client.pending_store().unwrap().list().unwrap().is_empty());
}

#[test]
fn test_immediate_submission_sequence_survives_restart() {
    let dir = tempfile::tempdir().unwrap();

    {
        let client = common::ready_client(dir.path());
        common::record_crash(&client, "", "first");
        assert!(client.submit_ping(&crash_ping_name(), Some("crash")).unwrap());
    }

    let client = common::ready_client(dir.path());
    common::record_crash(&client, "", "second");
    assert!(client.submit_ping(&crash_ping_name(), Some("crash")).unwrap());

    let store = client.pending_store().unwrap();
    let mut seqs: Vec<u64> = store
        .list()
        .unwrap()
        .iter()
        .map(|e| {
            store.read(&e.document_id).unwrap().unwrap().body["ping_info"]["seq"]
                .as_u64()
                .unwrap()
        })
        .collect();
    seqs.sort_unstable();
    assert_eq!(seqs, vec![0, 1]);
}

#[test]
fn test_client_id_is_stable_across_runs() {
    let dir = tempfile::tempdir().unwrap();
    let client_id = |client: &TelemetryClient| {
        common::record_crash(client, "", "");
        client.submit_ping(&crash_ping_name(), None).unwrap();
        let store = client.pending_store().unwrap();
        let ids: Vec<String> = store
            .list()
            .unwrap()
            .iter()
            .map(|e| {
                store.read(&e.document_id).unwrap().unwrap().body["client_info"]["client_id"]
                    .as_str()
                    .unwrap()
                    .to_string()
            })
            .collect();
        store.delete_all().unwrap();
        ids
    };

    let first = client_id(&common::ready_client(dir.path()));
    let second = client_id(&common::ready_client(dir.path()));
    assert_eq!(first.len(), 1);
    assert_eq!(first, second);
}

#[test]
fn test_upload_disabled_before_initialize_discards_stored_data() {
    let dir = tempfile::tempdir().unwrap();
    {
        let client = common::ready_client(dir.path());
        common::record_crash(&client, "", "");
    }

    let client = Arc::new(TelemetryClient::new().unwrap());
    InitializeTelemetryUseCase::new(client.clone())
        .execute(
            &common::context(dir.path()),
            &PingSet::new().with(crashping_core::domain::crash_ping()),
            false,
        )
        .unwrap();

    assert!(!client.is_upload_enabled());
    assert!(client.stored_events(&crash_ping_name()).unwrap().is_empty());
    assert!(client.pending_store().unwrap().list().unwrap().is_empty());
}
