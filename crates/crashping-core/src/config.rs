//! Configuration module for crashping.
//!
//! Provides typed configuration structs that map to the YAML configuration file,
//! with loading, validation, defaults, and a builder pattern for programmatic use.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Config struct with sub-sections
// ---------------------------------------------------------------------------

/// Top-level configuration for crashping.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub telemetry: TelemetryConfig,
    pub crash: CrashConfig,
    pub logging: LoggingConfig,
}

/// Telemetry client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    /// Application identifier used in submission paths (`/submit/<app_id>/...`).
    pub application_id: String,
    /// Whether collected data may be uploaded. Disabling clears stored data.
    pub upload_enabled: bool,
    /// Base URL of the ingestion server.
    pub server_endpoint: String,
    /// Directory holding stored events, pending pings and client state.
    pub data_dir: PathBuf,
    /// Recoverable upload failures tolerated in one upload pass.
    pub max_recoverable_failures: u32,
}

/// Crash capture settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CrashConfig {
    /// Submit the `crash` ping immediately after recording the crash event.
    /// When `false` the event waits for the next startup flush.
    pub submit_on_capture: bool,
    /// Print a short acknowledgment to stderr once a crash was captured.
    pub acknowledge_capture: bool,
    /// PII stripping applied to the captured fields.
    pub anonymize: AnonymizeConfig,
}

/// Anonymization settings for captured crash fields. Both are off by default.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnonymizeConfig {
    /// Replace the home directory with `<HOME>`.
    pub strip_paths: bool,
    /// Replace the current user name with `<USER>`.
    pub strip_usernames: bool,
}

/// Logging / tracing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: `trace`, `debug`, `info`, `warn`, or `error`.
    pub level: String,
    /// Emit JSON log lines instead of human-readable output.
    pub json: bool,
}

// ---------------------------------------------------------------------------
// Config::load()
// ---------------------------------------------------------------------------

impl Config {
    /// Load configuration from a YAML file at `path`.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Try to load from `path`; fall back to [`Config::default`] on any error.
    pub fn load_or_default(path: &Path) -> Self {
        Self::load(path).unwrap_or_default()
    }

    /// Platform-appropriate default path for the configuration file.
    ///
    /// Typically `$XDG_CONFIG_HOME/crashping/config.yaml` on Linux.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("crashping")
            .join("config.yaml")
    }
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

/// Default ingestion endpoint.
pub const DEFAULT_SERVER_ENDPOINT: &str = "https://incoming.telemetry.mozilla.org";

/// Default application identifier.
pub const DEFAULT_APPLICATION_ID: &str = "crashping-demo";

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            application_id: DEFAULT_APPLICATION_ID.to_string(),
            upload_enabled: true,
            server_endpoint: DEFAULT_SERVER_ENDPOINT.to_string(),
            data_dir: dirs::data_local_dir()
                .unwrap_or_else(|| PathBuf::from("~/.local/share"))
                .join("crashping")
                .join("telemetry"),
            max_recoverable_failures: 3,
        }
    }
}

impl Default for CrashConfig {
    fn default() -> Self {
        Self {
            submit_on_capture: true,
            acknowledge_capture: false,
            anonymize: AnonymizeConfig::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Config::validate()
// ---------------------------------------------------------------------------

/// A single validation error found in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path to the offending field, e.g. `"telemetry.application_id"`.
    pub field: String,
    /// Human-readable explanation.
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Valid values for `logging.level`.
const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

impl Config {
    /// Validate the configuration and return all errors found.
    ///
    /// An empty vector means the configuration is valid.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        // --- telemetry ---
        let app_id = &self.telemetry.application_id;
        if app_id.is_empty() {
            errors.push(ValidationError {
                field: "telemetry.application_id".into(),
                message: "must not be empty".into(),
            });
        } else if !app_id
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        {
            errors.push(ValidationError {
                field: "telemetry.application_id".into(),
                message: format!(
                    "must contain only lowercase letters, digits and '-': {app_id}"
                ),
            });
        }

        let endpoint = &self.telemetry.server_endpoint;
        if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
            errors.push(ValidationError {
                field: "telemetry.server_endpoint".into(),
                message: format!("must be an http(s) URL: {endpoint}"),
            });
        }

        if self.telemetry.data_dir.as_os_str().is_empty() {
            errors.push(ValidationError {
                field: "telemetry.data_dir".into(),
                message: "must not be empty".into(),
            });
        }

        if self.telemetry.max_recoverable_failures == 0 {
            errors.push(ValidationError {
                field: "telemetry.max_recoverable_failures".into(),
                message: "must be greater than 0".into(),
            });
        }

        // --- logging ---
        if !VALID_LOG_LEVELS.contains(&self.logging.level.as_str()) {
            errors.push(ValidationError {
                field: "logging.level".into(),
                message: format!(
                    "invalid log level '{}', expected one of: {}",
                    self.logging.level,
                    VALID_LOG_LEVELS.join(", ")
                ),
            });
        }

        errors
    }
}

// ---------------------------------------------------------------------------
// ConfigBuilder
// ---------------------------------------------------------------------------

/// Fluent builder for [`Config`].
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a new builder initialised with [`Config::default`] values.
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    // --- telemetry ---

    pub fn application_id(mut self, id: impl Into<String>) -> Self {
        self.config.telemetry.application_id = id.into();
        self
    }

    pub fn upload_enabled(mut self, enabled: bool) -> Self {
        self.config.telemetry.upload_enabled = enabled;
        self
    }

    pub fn server_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.config.telemetry.server_endpoint = endpoint.into();
        self
    }

    pub fn data_dir(mut self, dir: PathBuf) -> Self {
        self.config.telemetry.data_dir = dir;
        self
    }

    pub fn max_recoverable_failures(mut self, n: u32) -> Self {
        self.config.telemetry.max_recoverable_failures = n;
        self
    }

    // --- crash ---

    pub fn submit_on_capture(mut self, submit: bool) -> Self {
        self.config.crash.submit_on_capture = submit;
        self
    }

    pub fn acknowledge_capture(mut self, acknowledge: bool) -> Self {
        self.config.crash.acknowledge_capture = acknowledge;
        self
    }

    pub fn anonymize(mut self, strip_paths: bool, strip_usernames: bool) -> Self {
        self.config.crash.anonymize = AnonymizeConfig {
            strip_paths,
            strip_usernames,
        };
        self
    }

    // --- logging ---

    pub fn logging_level(mut self, level: impl Into<String>) -> Self {
        self.config.logging.level = level.into();
        self
    }

    pub fn logging_json(mut self, json: bool) -> Self {
        self.config.logging.json = json;
        self
    }

    // --- build ---

    /// Consume the builder and return the finished [`Config`].
    pub fn build(self) -> Config {
        self.config
    }

    /// Build and validate in one step. Returns `Err` with the list of
    /// validation errors if the configuration is invalid.
    pub fn build_validated(self) -> Result<Config, Vec<ValidationError>> {
        let config = self.build();
        let errors = config.validate();
        if errors.is_empty() {
            Ok(config)
        } else {
            Err(errors)
        }
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
