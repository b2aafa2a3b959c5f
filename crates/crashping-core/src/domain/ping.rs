//! Ping definitions
//!
//! A ping is a named, independently schedulable batch of telemetry data.
//! Applications register their custom pings as a [`PingSet`] before or
//! after the client is initialized.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::newtypes::PingName;

/// Reason attached to a ping submitted from the crash handler.
pub const REASON_CRASH: &str = "crash";

/// Reason attached to pings flushed when the client starts.
pub const REASON_STARTUP: &str = "startup";

/// Definition of a custom ping
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PingDefinition {
    pub name: PingName,
    /// Include the persistent client id in `client_info`.
    pub include_client_id: bool,
    /// Submit the ping even when it carries no events.
    pub send_if_empty: bool,
    /// Submit stored events with reason `startup` when the client initializes.
    pub flush_on_startup: bool,
    /// Reasons this ping may be submitted with.
    pub reason_codes: Vec<String>,
}

impl PingDefinition {
    /// Creates a definition with default flags and no reason codes
    pub fn new(name: PingName) -> Self {
        Self {
            name,
            include_client_id: true,
            send_if_empty: false,
            flush_on_startup: false,
            reason_codes: Vec::new(),
        }
    }

    pub fn with_send_if_empty(mut self, send_if_empty: bool) -> Self {
        self.send_if_empty = send_if_empty;
        self
    }

    pub fn with_flush_on_startup(mut self, flush: bool) -> Self {
        self.flush_on_startup = flush;
        self
    }

    pub fn with_include_client_id(mut self, include: bool) -> Self {
        self.include_client_id = include;
        self
    }

    pub fn with_reason_codes<I, S>(mut self, reasons: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.reason_codes = reasons.into_iter().map(Into::into).collect();
        self
    }

    /// Whether `reason` may be attached to this ping
    pub fn accepts_reason(&self, reason: &str) -> bool {
        self.reason_codes.iter().any(|r| r == reason)
    }
}

/// The set of custom pings an application registers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PingSet {
    pings: BTreeMap<PingName, PingDefinition>,
}

impl PingSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a definition, replacing any previous one with the same name
    pub fn with(mut self, definition: PingDefinition) -> Self {
        self.pings.insert(definition.name.clone(), definition);
        self
    }

    pub fn get(&self, name: &PingName) -> Option<&PingDefinition> {
        self.pings.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PingDefinition> {
        self.pings.values()
    }

    pub fn len(&self) -> usize {
        self.pings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pings.is_empty()
    }
}
