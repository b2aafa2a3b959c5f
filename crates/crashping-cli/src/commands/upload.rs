//! Upload command - Send pending pings to the ingestion server

use std::sync::Arc;

use anyhow::Result;
use crashping_telemetry::{HttpUploader, MetricsRegistry, PendingPingStore, UploadManager};
use tracing::{debug, info};

use crate::output::{get_formatter, OutputFormat};
use crate::Settings;

#[derive(Debug, clap::Args)]
pub struct UploadCommand {
    /// Ingestion server base URL (overrides telemetry.server_endpoint)
    #[arg(long)]
    pub endpoint: Option<String>,
}

impl UploadCommand {
    pub async fn execute(&self, format: OutputFormat, settings: &Settings) -> Result<()> {
        let formatter = get_formatter(format);
        let telemetry = &settings.config.telemetry;

        if !telemetry.upload_enabled {
            formatter.warn("Upload is disabled (telemetry.upload_enabled = false)");
            return Ok(());
        }

        let endpoint = self
            .endpoint
            .clone()
            .unwrap_or_else(|| telemetry.server_endpoint.clone());
        info!(endpoint = %endpoint, "Uploading pending pings");

        let metrics = Arc::new(MetricsRegistry::new()?);
        let manager = UploadManager::new(
            PendingPingStore::new(PendingPingStore::dir_for(&telemetry.data_dir)),
            Arc::new(HttpUploader::new(endpoint)),
            telemetry.max_recoverable_failures,
        )
        .with_metrics(Arc::clone(&metrics));

        let summary = manager.upload_pending().await?;
        debug!(metrics = %metrics.encode()?, "Upload counters");

        if format.is_json() {
            formatter.print_json(&serde_json::json!({
                "uploaded": summary.uploaded,
                "rejected": summary.rejected,
                "failed": summary.failed,
                "remaining": summary.remaining,
            }));
        } else if summary.failed > 0 {
            formatter.warn(&format!(
                "Uploaded {} ping(s), {} failed and will be retried",
                summary.uploaded, summary.failed
            ));
            formatter.field("rejected", &summary.rejected.to_string());
            formatter.field("remaining", &summary.remaining.to_string());
        } else {
            formatter.success(&format!("Uploaded {} ping(s)", summary.uploaded));
            formatter.field("rejected", &summary.rejected.to_string());
            formatter.field("remaining", &summary.remaining.to_string());
        }

        Ok(())
    }
}
