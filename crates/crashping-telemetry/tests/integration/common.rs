//! Shared test helpers

use std::path::Path;
use std::sync::Arc;

use crashping_core::domain::{crash_ping, CrashEvent, PingSet};
use crashping_core::ports::{ApplicationContext, ITelemetryClient};
use crashping_telemetry::TelemetryClient;

pub fn context(dir: &Path) -> ApplicationContext {
    ApplicationContext::new("crashping-demo", "0.1.0", dir.to_path_buf())
}

/// A ready client with the `crash` ping registered
pub fn ready_client(dir: &Path) -> Arc<TelemetryClient> {
    let client = Arc::new(TelemetryClient::new().expect("client"));
    client
        .register_pings(&PingSet::new().with(crash_ping()))
        .expect("register pings");
    client.initialize(&context(dir)).expect("initialize");
    client
}

/// Records one `crash.exception` event
pub fn record_crash(client: &TelemetryClient, cause: &str, message: &str) {
    let event = CrashEvent {
        cause: cause.to_string(),
        message: message.to_string(),
    };
    client
        .record_event(&CrashEvent::metric(), event.to_extras())
        .expect("record crash event");
}
