//! Ping payload assembly
//!
//! Builds the JSON document for a ping from its stored events, the
//! client information and the per-ping sequence number.

use chrono::{DateTime, Utc};
use crashping_core::domain::PingName;
use serde::{Deserialize, Serialize};

use crate::os_info::OsInfo;
use crate::storage::StoredEvent;

/// Version of the submission schema in upload paths.
pub const SCHEMA_VERSION: u32 = 1;

/// Telemetry client build reported in `client_info`.
pub const TELEMETRY_SDK_BUILD: &str = env!("CARGO_PKG_VERSION");

/// Time format of `start_time`/`end_time`: minute precision with offset.
const PING_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M%:z";

/// `ping_info` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PingInfo {
    pub seq: u64,
    pub start_time: String,
    pub end_time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// `client_info` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    pub app_id: String,
    pub app_display_version: String,
    pub os: String,
    pub os_version: String,
    pub architecture: String,
    pub telemetry_sdk_build: String,
}

impl ClientInfo {
    pub fn new(
        client_id: Option<String>,
        app_id: &str,
        app_display_version: &str,
        os_info: &OsInfo,
    ) -> Self {
        Self {
            client_id,
            app_id: app_id.to_string(),
            app_display_version: app_display_version.to_string(),
            os: os_info.os.clone(),
            os_version: os_info.os_version.clone(),
            architecture: os_info.architecture.clone(),
            telemetry_sdk_build: TELEMETRY_SDK_BUILD.to_string(),
        }
    }
}

/// Full ping document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PingPayload {
    pub ping_info: PingInfo,
    pub client_info: ClientInfo,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub events: Vec<StoredEvent>,
}

impl PingPayload {
    pub fn new(
        seq: u64,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        reason: Option<&str>,
        client_info: ClientInfo,
        events: Vec<StoredEvent>,
    ) -> Self {
        Self {
            ping_info: PingInfo {
                seq,
                start_time: format_ping_time(start),
                end_time: format_ping_time(end),
                reason: reason.map(ToString::to_string),
            },
            client_info,
            events,
        }
    }
}

/// Formats a ping boundary time.
pub fn format_ping_time(time: DateTime<Utc>) -> String {
    time.format(PING_TIME_FORMAT).to_string()
}

/// Upload path for a ping document.
pub fn submission_path(application_id: &str, ping: &PingName, document_id: &str) -> String {
    format!("/submit/{application_id}/{ping}/{SCHEMA_VERSION}/{document_id}")
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn os_info() -> OsInfo {
        OsInfo {
            os: "linux".into(),
            os_version: "6.1.0".into(),
            architecture: "x86_64".into(),
        }
    }

    #[test]
    fn test_submission_path() {
        let ping = PingName::new("crash").unwrap();
        assert_eq!(
            submission_path("crashping-demo", &ping, "abc"),
            "/submit/crashping-demo/crash/1/abc"
        );
    }

    #[test]
    fn test_format_ping_time() {
        let time = Utc.with_ymd_and_hms(2026, 2, 7, 9, 50, 31).unwrap();
        assert_eq!(format_ping_time(time), "2026-02-07T09:50+00:00");
    }

    #[test]
    fn test_payload_serialization_shape() {
        let time = Utc.with_ymd_and_hms(2026, 2, 7, 9, 50, 0).unwrap();
        let payload = PingPayload::new(
            3,
            time,
            time,
            Some("crash"),
            ClientInfo::new(None, "crashping-demo", "0.1.0", &os_info()),
            Vec::new(),
        );

        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["ping_info"]["seq"], 3);
        assert_eq!(json["ping_info"]["reason"], "crash");
        assert_eq!(json["client_info"]["os"], "linux");
        assert!(json["client_info"].get("client_id").is_none());
        assert!(json.get("events").is_none());
    }
}
