//! Domain newtypes with validation
//!
//! Strongly-typed wrappers for telemetry identifiers. Each newtype ensures
//! data validity at construction time.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::errors::DomainError;

/// Maximum length of a ping name.
pub const MAX_PING_NAME_LEN: usize = 30;

/// Maximum length of a metric category or extra key.
pub const MAX_IDENTIFIER_LEN: usize = 40;

/// Maximum length of a metric name.
pub const MAX_METRIC_NAME_LEN: usize = 30;

/// Name of a ping, e.g. `crash`.
///
/// Lowercase ASCII letters, digits, `-` and `_`, starting with a letter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PingName(String);

impl PingName {
    /// Create a validated ping name
    pub fn new(name: impl Into<String>) -> Result<Self, DomainError> {
        let name = name.into();
        if name.is_empty()
            || name.len() > MAX_PING_NAME_LEN
            || !starts_with_lowercase(&name)
            || !name
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_')
        {
            return Err(DomainError::InvalidPingName(name));
        }
        Ok(Self(name))
    }

    /// Get the name as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for PingName {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for PingName {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for PingName {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PingName> for String {
    fn from(name: PingName) -> Self {
        name.0
    }
}

/// Fully-qualified metric identifier: `category.name`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MetricId {
    category: String,
    name: String,
}

impl MetricId {
    /// Create a validated metric identifier
    ///
    /// The category may contain dots (`browser.engagement`); the name is
    /// plain snake case.
    pub fn new(category: impl Into<String>, name: impl Into<String>) -> Result<Self, DomainError> {
        let category = category.into();
        let name = name.into();

        let category_ok = is_identifier(&category, MAX_IDENTIFIER_LEN, true);
        let name_ok = is_identifier(&name, MAX_METRIC_NAME_LEN, false);
        if !category_ok || !name_ok {
            return Err(DomainError::InvalidMetricId(format!("{category}.{name}")));
        }

        Ok(Self { category, name })
    }

    #[must_use]
    pub fn category(&self) -> &str {
        &self.category
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Display for MetricId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.category, self.name)
    }
}

/// Validate an event extra key.
pub fn validate_extra_key(key: &str) -> Result<(), DomainError> {
    if is_identifier(key, MAX_IDENTIFIER_LEN, true) {
        Ok(())
    } else {
        Err(DomainError::InvalidExtraKey(key.to_string()))
    }
}

fn starts_with_lowercase(s: &str) -> bool {
    s.chars().next().is_some_and(|c| c.is_ascii_lowercase())
}

fn is_identifier(s: &str, max_len: usize, allow_dots: bool) -> bool {
    !s.is_empty()
        && s.len() <= max_len
        && starts_with_lowercase(s)
        && !s.ends_with('.')
        && s.chars().all(|c| {
            c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || (allow_dots && c == '.')
        })
}
