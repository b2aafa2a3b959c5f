//! Pending ping storage
//!
//! Submitted pings wait in `<data_dir>/pending_pings/<document_id>.json`
//! until they are uploaded.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use crashping_core::ports::PingRequest;
use tracing::warn;

use crate::error::TelemetryError;

/// Entry in the pending ping store
#[derive(Debug, Clone)]
pub struct PendingPingEntry {
    pub document_id: String,
    pub ping_name: String,
    pub size_bytes: u64,
    pub modified: DateTime<Utc>,
    pub path: PathBuf,
}

/// Manages the directory of pings waiting for upload.
#[derive(Debug, Clone)]
pub struct PendingPingStore {
    dir: PathBuf,
}

impl PendingPingStore {
    /// Creates a store pointing at `dir`.
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    /// The pending pings directory under `data_dir`.
    pub fn dir_for(data_dir: &Path) -> PathBuf {
        data_dir.join("pending_pings")
    }

    /// Writes a ping to the store.
    ///
    /// The file is written under a temporary name and renamed so a crash
    /// mid-write never leaves a truncated ping behind.
    pub fn save(&self, request: &PingRequest) -> Result<PathBuf, TelemetryError> {
        std::fs::create_dir_all(&self.dir)?;

        let path = self.dir.join(format!("{}.json", request.document_id));
        let tmp = self.dir.join(format!(".{}.tmp", request.document_id));
        std::fs::write(&tmp, serde_json::to_vec(request)?)?;
        std::fs::rename(&tmp, &path)?;

        Ok(path)
    }

    /// List all pending pings, newest first.
    pub fn list(&self) -> anyhow::Result<Vec<PendingPingEntry>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }

        let mut entries = Vec::new();
        for entry in std::fs::read_dir(&self.dir)? {
            let entry = entry?;
            let path = entry.path();

            if !path.extension().is_some_and(|e| e == "json") {
                continue;
            }

            let document_id = path
                .file_stem()
                .unwrap_or_default()
                .to_string_lossy()
                .to_string();
            let metadata = entry.metadata()?;
            let modified = metadata
                .modified()
                .map(DateTime::<Utc>::from)
                .unwrap_or_else(|_| Utc::now());

            let ping_name = match read_request(&path) {
                Ok(request) => ping_name_from_path(&request.path),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Unreadable pending ping");
                    "unknown".to_string()
                }
            };

            entries.push(PendingPingEntry {
                document_id,
                ping_name,
                size_bytes: metadata.len(),
                modified,
                path,
            });
        }

        entries.sort_by(|a, b| b.modified.cmp(&a.modified));
        Ok(entries)
    }

    /// Read a ping by document id or unambiguous id prefix.
    pub fn read(&self, id: &str) -> anyhow::Result<Option<PingRequest>> {
        match self.find(id)? {
            Some(entry) => Ok(Some(read_request(&entry.path)?)),
            None => Ok(None),
        }
    }

    /// Delete a ping by document id or unambiguous id prefix.
    pub fn delete(&self, id: &str) -> anyhow::Result<bool> {
        match self.find(id)? {
            Some(entry) => {
                std::fs::remove_file(&entry.path)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Delete all pending pings.
    pub fn delete_all(&self) -> anyhow::Result<u32> {
        let mut count = 0;
        for entry in self.list()? {
            if std::fs::remove_file(&entry.path).is_ok() {
                count += 1;
            }
        }
        Ok(count)
    }

    /// Returns the pending pings directory path.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn find(&self, id: &str) -> anyhow::Result<Option<PendingPingEntry>> {
        if id.is_empty() {
            return Ok(None);
        }

        let entries = self.list()?;
        if let Some(exact) = entries.iter().find(|e| e.document_id == id) {
            return Ok(Some(exact.clone()));
        }

        let mut matches = entries.into_iter().filter(|e| e.document_id.starts_with(id));
        let first = matches.next();
        if first.is_some() && matches.next().is_some() {
            anyhow::bail!("Ping id prefix '{id}' matches more than one pending ping");
        }
        Ok(first)
    }
}

fn read_request(path: &Path) -> anyhow::Result<PingRequest> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Extract the ping name from `/submit/<app_id>/<ping>/<schema>/<id>`.
fn ping_name_from_path(path: &str) -> String {
    path.trim_start_matches('/')
        .split('/')
        .nth(2)
        .unwrap_or("unknown")
        .to_string()
}
