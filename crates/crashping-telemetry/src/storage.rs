//! On-disk state of the telemetry client
//!
//! Layout under the data directory:
//! - `events/<ping>` - recorded events, one JSON object per line
//! - `ping_seq.json` - next sequence number per ping
//! - `client_id` - persistent client UUID

use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use crashping_core::domain::{ExtraMap, PingName};
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::error::TelemetryError;

/// A recorded event as stored and as sent in a ping
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredEvent {
    /// Milliseconds since the client was initialized
    pub timestamp: u64,
    pub category: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: ExtraMap,
}

/// Append-only event storage, one file per ping
#[derive(Debug, Clone)]
pub struct EventStore {
    dir: PathBuf,
}

impl EventStore {
    /// Opens the store under `data_dir/events`, creating it if needed.
    pub fn open(data_dir: &Path) -> Result<Self, TelemetryError> {
        let dir = data_dir.join("events");
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn file(&self, ping: &PingName) -> PathBuf {
        self.dir.join(ping.as_str())
    }

    /// Appends one event to the ping's file.
    pub fn append(&self, ping: &PingName, event: &StoredEvent) -> Result<(), TelemetryError> {
        let line = serde_json::to_string(event)?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.file(ping))?;
        writeln!(file, "{line}")?;
        file.flush()?;
        Ok(())
    }

    /// All events stored for `ping`, in recording order.
    ///
    /// Malformed lines are skipped.
    pub fn snapshot(&self, ping: &PingName) -> Result<Vec<StoredEvent>, TelemetryError> {
        let content = match fs::read_to_string(self.file(ping)) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut events = Vec::new();
        for line in content.lines().filter(|l| !l.trim().is_empty()) {
            match serde_json::from_str(line) {
                Ok(event) => events.push(event),
                Err(e) => warn!(ping = %ping, error = %e, "Skipping malformed stored event"),
            }
        }
        Ok(events)
    }

    /// Removes all events stored for `ping`.
    pub fn clear(&self, ping: &PingName) -> Result<(), TelemetryError> {
        match fs::remove_file(self.file(ping)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Removes every stored event.
    pub fn clear_all(&self) -> Result<(), TelemetryError> {
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.is_file() {
                fs::remove_file(path)?;
            }
        }
        Ok(())
    }
}

/// Persistent per-ping sequence numbers
#[derive(Debug)]
pub struct SequenceStore {
    path: PathBuf,
    next: BTreeMap<String, u64>,
}

impl SequenceStore {
    /// Loads `data_dir/ping_seq.json`; a missing or unreadable file starts at zero.
    pub fn load(data_dir: &Path) -> Self {
        let path = data_dir.join("ping_seq.json");
        let next = fs::read_to_string(&path)
            .ok()
            .and_then(|content| serde_json::from_str(&content).ok())
            .unwrap_or_default();
        Self { path, next }
    }

    /// Returns the current sequence number for `ping` and advances it.
    pub fn next(&mut self, ping: &PingName) -> Result<u64, TelemetryError> {
        let counter = self.next.entry(ping.to_string()).or_insert(0);
        let seq = *counter;
        *counter += 1;
        fs::write(&self.path, serde_json::to_string(&self.next)?)?;
        Ok(seq)
    }
}

/// Reads the client id from `data_dir/client_id`, creating one if absent.
pub fn load_or_create_client_id(data_dir: &Path) -> Result<Uuid, TelemetryError> {
    let path = data_dir.join("client_id");
    if let Ok(content) = fs::read_to_string(&path) {
        match Uuid::parse_str(content.trim()) {
            Ok(id) => return Ok(id),
            Err(e) => warn!(error = %e, "Replacing invalid client id"),
        }
    }

    let id = Uuid::new_v4();
    fs::write(&path, id.to_string())?;
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(timestamp: u64) -> StoredEvent {
        let mut extra = ExtraMap::new();
        extra.insert("cause".into(), "".into());
        StoredEvent {
            timestamp,
            category: "crash".into(),
            name: "exception".into(),
            extra,
        }
    }

    #[test]
    fn test_event_store_append_and_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let store = EventStore::open(dir.path()).unwrap();
        let ping = PingName::new("crash").unwrap();

        assert!(store.snapshot(&ping).unwrap().is_empty());
        store.append(&ping, &event(1)).unwrap();
        store.append(&ping, &event(2)).unwrap();

        let events = store.snapshot(&ping).unwrap();
        assert_eq!(events, vec![event(1), event(2)]);

        store.clear(&ping).unwrap();
        assert!(store.snapshot(&ping).unwrap().is_empty());
        // clearing twice is fine
        store.clear(&ping).unwrap();
    }

    #[test]
    fn test_event_store_skips_malformed_lines() {
        let dir = tempfile::tempdir().unwrap();
        let store = EventStore::open(dir.path()).unwrap();
        let ping = PingName::new("crash").unwrap();

        store.append(&ping, &event(1)).unwrap();
        let mut file = OpenOptions::new()
            .append(true)
            .open(dir.path().join("events/crash"))
            .unwrap();
        writeln!(file, "{{not json").unwrap();

        assert_eq!(store.snapshot(&ping).unwrap().len(), 1);
    }

    #[test]
    fn test_event_store_clear_all() {
        let dir = tempfile::tempdir().unwrap();
        let store = EventStore::open(dir.path()).unwrap();
        let a = PingName::new("crash").unwrap();
        let b = PingName::new("events").unwrap();
        store.append(&a, &event(1)).unwrap();
        store.append(&b, &event(2)).unwrap();

        store.clear_all().unwrap();
        assert!(store.snapshot(&a).unwrap().is_empty());
        assert!(store.snapshot(&b).unwrap().is_empty());
    }

    #[test]
    fn test_sequence_store_persists() {
        let dir = tempfile::tempdir().unwrap();
        let ping = PingName::new("crash").unwrap();

        let mut seq = SequenceStore::load(dir.path());
        assert_eq!(seq.next(&ping).unwrap(), 0);
        assert_eq!(seq.next(&ping).unwrap(), 1);

        let mut reloaded = SequenceStore::load(dir.path());
        assert_eq!(reloaded.next(&ping).unwrap(), 2);
        assert_eq!(reloaded.next(&PingName::new("other").unwrap()).unwrap(), 0);
    }

    #[test]
    fn test_client_id_is_stable() {
        let dir = tempfile::tempdir().unwrap();
        let first = load_or_create_client_id(dir.path()).unwrap();
        let second = load_or_create_client_id(dir.path()).unwrap();
        assert_eq!(first, second);

        fs::write(dir.path().join("client_id"), "garbage").unwrap();
        let replaced = load_or_create_client_id(dir.path()).unwrap();
        assert_ne!(replaced, first);
    }
}
