//! Ping uploader port (driven/secondary port)
//!
//! Uploads one assembled ping to the ingestion server and classifies the
//! outcome so the caller can decide whether to keep the ping for a retry.

use serde::{Deserialize, Serialize};

/// A stored ping ready for upload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PingRequest {
    /// UUID of the ping document
    pub document_id: String,
    /// Submission path, `/submit/<app_id>/<ping>/<schema>/<document_id>`
    pub path: String,
    /// Ping payload
    pub body: serde_json::Value,
}

/// Outcome of a single upload attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadResult {
    /// The server accepted the ping (2xx)
    Success { status: u16 },
    /// The server rejected the ping; retrying will not help (4xx)
    UnrecoverableFailure { status: u16 },
    /// Server error or transport failure; the ping is kept
    RecoverableFailure { reason: String },
}

impl UploadResult {
    /// Classifies an HTTP status code
    pub fn from_status(status: u16) -> Self {
        match status {
            200..=299 => UploadResult::Success { status },
            400..=499 => UploadResult::UnrecoverableFailure { status },
            _ => UploadResult::RecoverableFailure {
                reason: format!("HTTP {status}"),
            },
        }
    }

    /// Whether the stored ping should be removed after this attempt
    pub fn is_final(&self) -> bool {
        !matches!(self, UploadResult::RecoverableFailure { .. })
    }
}

/// Port trait for ping upload
#[async_trait::async_trait]
pub trait IPingUploader: Send + Sync {
    /// Uploads one ping. Transport errors are reported as
    /// [`UploadResult::RecoverableFailure`].
    async fn upload(&self, request: &PingRequest) -> UploadResult;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status() {
        assert_eq!(
            UploadResult::from_status(200),
            UploadResult::Success { status: 200 }
        );
        assert_eq!(
            UploadResult::from_status(413),
            UploadResult::UnrecoverableFailure { status: 413 }
        );
        assert!(matches!(
            UploadResult::from_status(503),
            UploadResult::RecoverableFailure { .. }
        ));
        assert!(matches!(
            UploadResult::from_status(302),
            UploadResult::RecoverableFailure { .. }
        ));
    }

    #[test]
    fn test_is_final() {
        assert!(UploadResult::Success { status: 204 }.is_final());
        assert!(UploadResult::UnrecoverableFailure { status: 400 }.is_final());
        assert!(!UploadResult::RecoverableFailure {
            reason: "timeout".into()
        }
        .is_final());
    }
}
