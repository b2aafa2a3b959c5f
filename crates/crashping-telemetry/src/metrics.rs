//! Prometheus counters for the telemetry client
//!
//! Tracks what the client itself does: events recorded, recording errors,
//! pings submitted and upload outcomes.

use prometheus::{Encoder, IntCounterVec, Opts, Registry, TextEncoder};

/// Central metrics registry holding all Prometheus metrics.
pub struct MetricsRegistry {
    registry: Registry,
    /// Counter: events recorded by metric
    pub events_recorded_total: IntCounterVec,
    /// Counter: recording errors by (metric, error)
    pub recording_errors_total: IntCounterVec,
    /// Counter: pings submitted by (ping, reason)
    pub pings_submitted_total: IntCounterVec,
    /// Counter: upload attempts by result
    pub uploads_total: IntCounterVec,
}

impl MetricsRegistry {
    /// Creates a new `MetricsRegistry` with all metrics registered.
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new_custom(Some("crashping".to_string()), None)?;

        let events_recorded_total = IntCounterVec::new(
            Opts::new("events_recorded_total", "Total events recorded"),
            &["metric"],
        )?;
        registry.register(Box::new(events_recorded_total.clone()))?;

        let recording_errors_total = IntCounterVec::new(
            Opts::new("recording_errors_total", "Total recording errors"),
            &["metric", "error"],
        )?;
        registry.register(Box::new(recording_errors_total.clone()))?;

        let pings_submitted_total = IntCounterVec::new(
            Opts::new("pings_submitted_total", "Total pings submitted"),
            &["ping", "reason"],
        )?;
        registry.register(Box::new(pings_submitted_total.clone()))?;

        let uploads_total = IntCounterVec::new(
            Opts::new("uploads_total", "Total ping upload attempts"),
            &["result"],
        )?;
        registry.register(Box::new(uploads_total.clone()))?;

        Ok(Self {
            registry,
            events_recorded_total,
            recording_errors_total,
            pings_submitted_total,
            uploads_total,
        })
    }

    // ========================================================================
    // Recording helpers
    // ========================================================================

    pub fn record_event(&self, metric: &str) {
        self.events_recorded_total.with_label_values(&[metric]).inc();
    }

    pub fn record_error(&self, metric: &str, error: &str) {
        self.recording_errors_total
            .with_label_values(&[metric, error])
            .inc();
    }

    /// `reason` is recorded as `none` when absent.
    pub fn record_ping(&self, ping: &str, reason: Option<&str>) {
        self.pings_submitted_total
            .with_label_values(&[ping, reason.unwrap_or("none")])
            .inc();
    }

    pub fn record_upload(&self, result: &str) {
        self.uploads_total.with_label_values(&[result]).inc();
    }

    // ========================================================================
    // Encoding
    // ========================================================================

    /// Encode all metrics in Prometheus text exposition format.
    pub fn encode(&self) -> anyhow::Result<String> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}
