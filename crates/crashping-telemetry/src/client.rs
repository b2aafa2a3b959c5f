//! Telemetry client
//!
//! File-backed implementation of [`ITelemetryClient`]. Events are appended
//! to per-ping files as they are recorded, so a crash between recording and
//! submission loses nothing; submitted pings are written to the pending
//! ping store for a later upload pass.
//!
//! All state sits behind one mutex. The crash handler calls into the client
//! from a panic hook on an arbitrary thread, so every operation here is
//! synchronous.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use chrono::{DateTime, Utc};
use crashping_core::domain::{EventMetric, ExtraMap, PingDefinition, PingName, PingSet};
use crashping_core::domain::REASON_STARTUP;
use crashping_core::ports::{ApplicationContext, ITelemetryClient, PingRequest};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::TelemetryError;
use crate::metrics::MetricsRegistry;
use crate::os_info::OsInfo;
use crate::pending::PendingPingStore;
use crate::ping_maker::{submission_path, ClientInfo, PingPayload};
use crate::storage::{load_or_create_client_id, EventStore, SequenceStore, StoredEvent};

/// Maximum length in bytes of an event extra value.
pub const MAX_EXTRA_VALUE_BYTES: usize = 500;

/// Lifecycle of the client
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientState {
    Uninitialized,
    Ready,
    ShutDown,
}

/// Storage opened by `initialize`
struct Storage {
    context: ApplicationContext,
    events: EventStore,
    pending: PendingPingStore,
    sequences: SequenceStore,
    client_id: Uuid,
    started: Instant,
    ping_start_times: HashMap<PingName, DateTime<Utc>>,
}

struct Inner {
    state: ClientState,
    upload_enabled: bool,
    pings: BTreeMap<PingName, PingDefinition>,
    storage: Option<Storage>,
}

/// The telemetry client
pub struct TelemetryClient {
    inner: Mutex<Inner>,
    metrics: Arc<MetricsRegistry>,
    os_info: OsInfo,
}

impl TelemetryClient {
    /// Creates an uninitialized client with upload enabled.
    pub fn new() -> Result<Self, TelemetryError> {
        Ok(Self {
            inner: Mutex::new(Inner {
                state: ClientState::Uninitialized,
                upload_enabled: true,
                pings: BTreeMap::new(),
                storage: None,
            }),
            metrics: Arc::new(MetricsRegistry::new()?),
            os_info: OsInfo::collect(),
        })
    }

    pub fn state(&self) -> ClientState {
        self.lock().state
    }

    pub fn is_upload_enabled(&self) -> bool {
        self.lock().upload_enabled
    }

    pub fn metrics(&self) -> Arc<MetricsRegistry> {
        Arc::clone(&self.metrics)
    }

    /// The pending ping store, once the client is initialized.
    pub fn pending_store(&self) -> Option<PendingPingStore> {
        self.lock().storage.as_ref().map(|s| s.pending.clone())
    }

    /// Events currently stored for `ping`.
    pub fn stored_events(&self, ping: &PingName) -> Result<Vec<StoredEvent>, TelemetryError> {
        let inner = self.lock();
        let storage = inner.storage.as_ref().ok_or(TelemetryError::NotInitialized)?;
        storage.events.snapshot(ping)
    }

    // A panic while holding the lock must not disable crash capture.
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn ensure_ready(inner: &Inner) -> Result<(), TelemetryError> {
        match inner.state {
            ClientState::Ready => Ok(()),
            ClientState::Uninitialized => Err(TelemetryError::NotInitialized),
            ClientState::ShutDown => Err(TelemetryError::ShutDown),
        }
    }

    fn clear_stored_data(storage: &Storage) -> anyhow::Result<()> {
        storage.events.clear_all()?;
        let removed = storage.pending.delete_all()?;
        debug!(removed, "Cleared pending pings");
        Ok(())
    }

    /// Assembles, stores and resets one ping. Caller holds the lock.
    fn submit_locked(
        &self,
        inner: &mut Inner,
        definition: &PingDefinition,
        reason: Option<&str>,
    ) -> Result<bool, TelemetryError> {
        let storage = inner.storage.as_mut().ok_or(TelemetryError::NotInitialized)?;
        let name = &definition.name;

        let events = storage.events.snapshot(name)?;
        if events.is_empty() && !definition.send_if_empty {
            debug!(ping = %name, "Skipping empty ping");
            return Ok(false);
        }

        let seq = storage.sequences.next(name)?;
        let now = Utc::now();
        let start = storage.ping_start_times.get(name).copied().unwrap_or(now);
        let client_id = definition
            .include_client_id
            .then(|| storage.client_id.to_string());
        let client_info = ClientInfo::new(
            client_id,
            &storage.context.application_id,
            &storage.context.app_display_version,
            &self.os_info,
        );
        let event_count = events.len();
        let payload = PingPayload::new(seq, start, now, reason, client_info, events);

        let document_id = Uuid::new_v4().to_string();
        let request = PingRequest {
            path: submission_path(&storage.context.application_id, name, &document_id),
            document_id,
            body: serde_json::to_value(&payload)?,
        };
        storage.pending.save(&request)?;
        storage.events.clear(name)?;
        storage.ping_start_times.insert(name.clone(), now);

        self.metrics.record_ping(name.as_str(), reason);
        info!(
            ping = %name,
            seq,
            events = event_count,
            reason = reason.unwrap_or("none"),
            document_id = %request.document_id,
            "Ping submitted"
        );
        Ok(true)
    }

    /// Drops unknown extra keys and truncates oversized values.
    fn sanitize_extras(&self, metric: &EventMetric, extras: ExtraMap) -> ExtraMap {
        let metric_id = metric.id().to_string();
        let mut clean = ExtraMap::new();

        for (key, value) in extras {
            if !metric.allows_extra_key(&key) {
                warn!(metric = %metric_id, key = %key, "Dropping unknown extra key");
                self.metrics.record_error(&metric_id, "invalid_extra_key");
                continue;
            }
            let value = if value.len() > MAX_EXTRA_VALUE_BYTES {
                self.metrics.record_error(&metric_id, "invalid_overflow");
                truncate_at_char_boundary(&value, MAX_EXTRA_VALUE_BYTES).to_string()
            } else {
                value
            };
            clean.insert(key, value);
        }

        clean
    }
}

impl ITelemetryClient for TelemetryClient {
    fn set_upload_enabled(&self, enabled: bool) {
        let mut inner = self.lock();
        let was_enabled = inner.upload_enabled;
        inner.upload_enabled = enabled;

        if was_enabled && !enabled {
            info!("Upload disabled, clearing stored telemetry");
            if let Some(storage) = inner.storage.as_ref() {
                if let Err(e) = Self::clear_stored_data(storage) {
                    warn!(error = %e, "Failed to clear stored telemetry");
                }
            }
        }
    }

    fn initialize(&self, context: &ApplicationContext) -> anyhow::Result<()> {
        let mut inner = self.lock();
        match inner.state {
            ClientState::Ready => {
                debug!("Telemetry client already initialized");
                return Ok(());
            }
            ClientState::ShutDown => return Err(TelemetryError::ShutDown.into()),
            ClientState::Uninitialized => {}
        }

        std::fs::create_dir_all(&context.data_dir)?;
        let now = Utc::now();
        let storage = Storage {
            context: context.clone(),
            events: EventStore::open(&context.data_dir)?,
            pending: PendingPingStore::new(PendingPingStore::dir_for(&context.data_dir)),
            sequences: SequenceStore::load(&context.data_dir),
            client_id: load_or_create_client_id(&context.data_dir)?,
            started: Instant::now(),
            ping_start_times: inner.pings.keys().map(|p| (p.clone(), now)).collect(),
        };

        if !inner.upload_enabled {
            Self::clear_stored_data(&storage)?;
        }

        inner.storage = Some(storage);
        inner.state = ClientState::Ready;
        info!(
            application_id = %context.application_id,
            data_dir = %context.data_dir.display(),
            "Telemetry client initialized"
        );

        if inner.upload_enabled {
            let startup: Vec<PingDefinition> = inner
                .pings
                .values()
                .filter(|p| p.flush_on_startup)
                .cloned()
                .collect();
            for definition in startup {
                let reason = definition
                    .accepts_reason(REASON_STARTUP)
                    .then_some(REASON_STARTUP);
                if let Err(e) = self.submit_locked(&mut inner, &definition, reason) {
                    warn!(ping = %definition.name, error = %e, "Startup flush failed");
                }
            }
        }

        Ok(())
    }

    fn register_pings(&self, pings: &PingSet) -> anyhow::Result<()> {
        let mut inner = self.lock();
        let now = Utc::now();

        for definition in pings.iter() {
            match inner.pings.get(&definition.name) {
                Some(existing) if existing == definition => {
                    debug!(ping = %definition.name, "Ping already registered");
                }
                Some(_) => {
                    return Err(TelemetryError::PingConflict(definition.name.to_string()).into())
                }
                None => {
                    inner
                        .pings
                        .insert(definition.name.clone(), definition.clone());
                    if let Some(storage) = inner.storage.as_mut() {
                        storage
                            .ping_start_times
                            .insert(definition.name.clone(), now);
                    }
                    debug!(ping = %definition.name, "Registered ping");
                }
            }
        }

        Ok(())
    }

    fn record_event(&self, metric: &EventMetric, extras: ExtraMap) -> anyhow::Result<()> {
        let inner = self.lock();
        Self::ensure_ready(&inner)?;

        if !inner.upload_enabled {
            debug!(metric = %metric.id(), "Upload disabled, not recording");
            return Ok(());
        }

        let storage = inner.storage.as_ref().ok_or(TelemetryError::NotInitialized)?;
        let event = StoredEvent {
            timestamp: u64::try_from(storage.started.elapsed().as_millis()).unwrap_or(u64::MAX),
            category: metric.id().category().to_string(),
            name: metric.id().name().to_string(),
            extra: self.sanitize_extras(metric, extras),
        };

        for ping in metric.send_in_pings() {
            storage.events.append(ping, &event)?;
        }

        self.metrics.record_event(&metric.id().to_string());
        debug!(metric = %metric.id(), "Recorded event");
        Ok(())
    }

    fn submit_ping(&self, ping: &PingName, reason: Option<&str>) -> anyhow::Result<bool> {
        let mut inner = self.lock();
        Self::ensure_ready(&inner)?;

        let definition = inner
            .pings
            .get(ping)
            .cloned()
            .ok_or_else(|| TelemetryError::UnknownPing(ping.to_string()))?;

        if let Some(reason) = reason {
            if !definition.accepts_reason(reason) {
                return Err(TelemetryError::InvalidReason {
                    ping: ping.to_string(),
                    reason: reason.to_string(),
                }
                .into());
            }
        }

        if !inner.upload_enabled {
            debug!(ping = %ping, "Upload disabled, not submitting");
            return Ok(false);
        }

        Ok(self.submit_locked(&mut inner, &definition, reason)?)
    }

    fn shutdown(&self) -> anyhow::Result<()> {
        let mut inner = self.lock();
        if inner.state != ClientState::ShutDown {
            inner.state = ClientState::ShutDown;
            info!("Telemetry client shut down");
        }
        Ok(())
    }
}

fn truncate_at_char_boundary(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let mut end = max_bytes;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}
