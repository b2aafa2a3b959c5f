//! Pings command - Inspect pings waiting for upload
//!
//! Provides the `crashping pings` CLI command with subcommands:
//! - `list`: Show all pending pings
//! - `view <id>`: Display one ping document
//! - `delete`: Remove pings from local storage

use anyhow::Result;
use clap::Subcommand;
use crashping_telemetry::{PendingPingEntry, PendingPingStore};

use crate::output::{get_formatter, OutputFormat};
use crate::Settings;

#[derive(Debug, Subcommand)]
pub enum PingsCommand {
    /// List pending pings, newest first
    List,
    /// View a pending ping
    View {
        /// Document ID or ID prefix
        id: String,
        /// Show the raw stored request instead of the ping body
        #[arg(long)]
        raw: bool,
    },
    /// Delete pending pings
    Delete {
        /// Document ID or ID prefix
        id: Option<String>,
        /// Delete all pending pings
        #[arg(long)]
        all: bool,
    },
}

impl PingsCommand {
    pub async fn execute(&self, format: OutputFormat, settings: &Settings) -> Result<()> {
        let formatter = get_formatter(format);
        let store = PendingPingStore::new(PendingPingStore::dir_for(
            &settings.config.telemetry.data_dir,
        ));

        match self {
            PingsCommand::List => {
                let entries = store.list()?;

                if format.is_json() {
                    let json: Vec<serde_json::Value> = entries.iter().map(entry_json).collect();
                    formatter.print_json(&serde_json::json!(json));
                } else if entries.is_empty() {
                    formatter.info("No pending pings.");
                } else {
                    println!(
                        "{:<36}  {:<10} {:<17} {:>10}",
                        "Document ID", "Ping", "Submitted", "Size"
                    );
                    println!("{}", "-".repeat(77));
                    for entry in &entries {
                        println!(
                            "{:<36}  {:<10} {:<17} {:>10}",
                            entry.document_id,
                            entry.ping_name,
                            entry.modified.format("%Y-%m-%d %H:%M"),
                            format_size(entry.size_bytes),
                        );
                    }
                    println!();
                    println!("Total: {} ping(s)", entries.len());
                }
            }

            PingsCommand::View { id, raw } => match store.read(id)? {
                Some(request) => {
                    let value = if *raw {
                        serde_json::to_value(&request)?
                    } else {
                        request.body.clone()
                    };
                    if !*raw && !format.is_json() {
                        formatter.field("document_id", &request.document_id);
                        formatter.field("path", &request.path);
                    }
                    println!("{}", serde_json::to_string_pretty(&value)?);
                }
                None => formatter.error(&format!("Ping '{id}' not found")),
            },

            PingsCommand::Delete { id, all } => {
                if *all {
                    let count = store.delete_all()?;
                    formatter.success(&format!("Deleted {count} ping(s)"));
                } else if let Some(ping_id) = id {
                    if store.delete(ping_id)? {
                        formatter.success(&format!("Deleted ping '{ping_id}'"));
                    } else {
                        formatter.error(&format!("Ping '{ping_id}' not found"));
                    }
                } else {
                    formatter.error("Specify a document ID or use --all");
                }
            }
        }

        Ok(())
    }
}

fn entry_json(entry: &PendingPingEntry) -> serde_json::Value {
    serde_json::json!({
        "document_id": entry.document_id,
        "ping": entry.ping_name,
        "submitted": entry.modified.to_rfc3339(),
        "size_bytes": entry.size_bytes,
    })
}

fn format_size(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{bytes} B")
    } else {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    }
}
