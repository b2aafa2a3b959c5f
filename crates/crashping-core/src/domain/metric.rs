//! Event metric definitions

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::errors::DomainError;
use super::newtypes::{validate_extra_key, MetricId, PingName};

/// Extra key/value pairs attached to a recorded event.
pub type ExtraMap = BTreeMap<String, String>;

/// Definition of an event metric: where it is sent and which extra keys
/// it accepts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventMetric {
    id: MetricId,
    send_in_pings: Vec<PingName>,
    allowed_extra_keys: Vec<String>,
}

impl EventMetric {
    /// Creates an event metric, validating every extra key.
    pub fn new(
        id: MetricId,
        send_in_pings: Vec<PingName>,
        allowed_extra_keys: Vec<String>,
    ) -> Result<Self, DomainError> {
        for key in &allowed_extra_keys {
            validate_extra_key(key)?;
        }
        Ok(Self {
            id,
            send_in_pings,
            allowed_extra_keys,
        })
    }

    pub fn id(&self) -> &MetricId {
        &self.id
    }

    pub fn send_in_pings(&self) -> &[PingName] {
        &self.send_in_pings
    }

    pub fn allowed_extra_keys(&self) -> &[String] {
        &self.allowed_extra_keys
    }

    pub fn allows_extra_key(&self, key: &str) -> bool {
        self.allowed_extra_keys.iter().any(|k| k == key)
    }
}
