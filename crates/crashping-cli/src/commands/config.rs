//! Config command - View and manage crashping configuration
//!
//! Provides the `crashping config` CLI command which:
//! 1. Shows the current configuration (YAML or JSON)
//! 2. Sets individual configuration values via dot-notation keys
//! 3. Validates the configuration file and reports errors

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Subcommand;
use crashping_core::config::Config;
use tracing::info;

use crate::output::{get_formatter, OutputFormat};
use crate::Settings;

/// Keys accepted by `config set`
const SUPPORTED_KEYS: &[(&str, &str)] = &[
    ("telemetry.application_id", "Application id in submission paths"),
    ("telemetry.upload_enabled", "true|false"),
    ("telemetry.server_endpoint", "Ingestion server base URL"),
    ("telemetry.data_dir", "Telemetry storage directory"),
    ("telemetry.max_recoverable_failures", "Failures tolerated per upload pass"),
    ("crash.submit_on_capture", "true|false"),
    ("crash.acknowledge_capture", "true|false"),
    ("crash.anonymize.strip_paths", "true|false"),
    ("crash.anonymize.strip_usernames", "true|false"),
    ("logging.level", "trace|debug|info|warn|error"),
    ("logging.json", "true|false"),
];

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Display current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key (e.g., "crash.submit_on_capture")
        key: String,
        /// New value
        value: String,
    },
    /// Validate configuration file
    Validate,
}

impl ConfigCommand {
    pub async fn execute(&self, format: OutputFormat, settings: &Settings) -> Result<()> {
        match self {
            ConfigCommand::Show => execute_show(format, settings),
            ConfigCommand::Set { key, value } => execute_set(key, value, format, settings),
            ConfigCommand::Validate => execute_validate(format, settings),
        }
    }
}

fn execute_show(format: OutputFormat, settings: &Settings) -> Result<()> {
    let formatter = get_formatter(format);

    info!(config_path = %settings.path.display(), "Showing configuration");

    if format.is_json() {
        let json = serde_json::to_value(&settings.config)
            .context("Failed to serialize configuration to JSON")?;
        formatter.print_json(&json);
    } else {
        formatter.success(&format!("Configuration ({})", settings.path.display()));
        formatter.info("");

        let yaml = serde_yaml::to_string(&settings.config)
            .context("Failed to serialize configuration to YAML")?;
        for line in yaml.lines() {
            formatter.info(line);
        }
    }

    Ok(())
}

fn execute_set(key: &str, value: &str, format: OutputFormat, settings: &Settings) -> Result<()> {
    let formatter = get_formatter(format);
    let mut config = settings.config.clone();

    info!(key = %key, value = %value, "Setting configuration value");

    if let Err(e) = apply_config_value(&mut config, key, value) {
        if format.is_json() {
            formatter.print_json(&serde_json::json!({
                "success": false,
                "key": key,
                "value": value,
                "error": e.to_string(),
            }));
        } else {
            formatter.error(&format!("Failed to set '{key}': {e}"));
            formatter.info("");
            formatter.info("Supported keys:");
            for (name, help) in SUPPORTED_KEYS {
                formatter.info(&format!("  {name:<38} - {help}"));
            }
        }
        return Ok(());
    }

    let errors: Vec<String> = config.validate().iter().map(ToString::to_string).collect();
    if !errors.is_empty() {
        if format.is_json() {
            formatter.print_json(&serde_json::json!({
                "success": false,
                "key": key,
                "value": value,
                "errors": errors,
            }));
        } else {
            formatter.error(&format!("Invalid value for '{key}': {}", errors.join("; ")));
        }
        return Ok(());
    }

    if let Some(parent) = settings.path.parent() {
        std::fs::create_dir_all(parent).context("Failed to create configuration directory")?;
    }
    let yaml = serde_yaml::to_string(&config).context("Failed to serialize configuration")?;
    std::fs::write(&settings.path, yaml).context("Failed to write configuration file")?;

    if format.is_json() {
        formatter.print_json(&serde_json::json!({
            "success": true,
            "key": key,
            "value": value,
            "config_path": settings.path.display().to_string(),
        }));
    } else {
        formatter.success(&format!("Set {key} = {value}"));
        formatter.info(&format!("Saved to {}", settings.path.display()));
    }

    Ok(())
}

fn execute_validate(format: OutputFormat, settings: &Settings) -> Result<()> {
    let formatter = get_formatter(format);
    let config_path = &settings.path;

    // Load explicitly; the resolved settings fall back to defaults on error
    let config = match Config::load(config_path) {
        Ok(config) => config,
        Err(e) => {
            let message = if config_path.exists() {
                format!("Failed to parse configuration: {e}")
            } else {
                "Configuration file not found. Using defaults.".to_string()
            };

            if format.is_json() {
                formatter.print_json(&serde_json::json!({
                    "valid": false,
                    "config_path": config_path.display().to_string(),
                    "errors": [message],
                }));
            } else if config_path.exists() {
                formatter.error(&message);
                formatter.info(&format!("File: {}", config_path.display()));
            } else {
                formatter.info(&format!(
                    "Configuration file not found at {}",
                    config_path.display()
                ));
                formatter.info(
                    "Using default configuration. Run 'crashping config set <key> <value>' to create one.",
                );
            }
            return Ok(());
        }
    };

    info!(config_path = %config_path.display(), "Validating configuration");

    let errors = config.validate();

    if format.is_json() {
        let error_strings: Vec<String> = errors.iter().map(ToString::to_string).collect();
        formatter.print_json(&serde_json::json!({
            "valid": errors.is_empty(),
            "config_path": config_path.display().to_string(),
            "errors": error_strings,
        }));
    } else if errors.is_empty() {
        formatter.success("Configuration is valid");
        formatter.info(&format!("File: {}", config_path.display()));
    } else {
        formatter.error(&format!(
            "Configuration has {} error{}:",
            errors.len(),
            if errors.len() == 1 { "" } else { "s" }
        ));
        formatter.info(&format!("File: {}", config_path.display()));
        formatter.info("");
        for error in &errors {
            formatter.info(&format!("  {} - {}", error.field, error.message));
        }
    }

    Ok(())
}

/// Apply a dot-notation key/value pair to a Config struct
fn apply_config_value(config: &mut Config, key: &str, value: &str) -> Result<()> {
    match key {
        // --- telemetry ---
        "telemetry.application_id" => config.telemetry.application_id = value.to_string(),
        "telemetry.upload_enabled" => config.telemetry.upload_enabled = parse_bool(key, value)?,
        "telemetry.server_endpoint" => config.telemetry.server_endpoint = value.to_string(),
        "telemetry.data_dir" => config.telemetry.data_dir = PathBuf::from(value),
        "telemetry.max_recoverable_failures" => {
            config.telemetry.max_recoverable_failures = value
                .parse::<u32>()
                .context("Expected a positive integer")?;
        }

        // --- crash ---
        "crash.submit_on_capture" => config.crash.submit_on_capture = parse_bool(key, value)?,
        "crash.acknowledge_capture" => {
            config.crash.acknowledge_capture = parse_bool(key, value)?;
        }
        "crash.anonymize.strip_paths" => {
            config.crash.anonymize.strip_paths = parse_bool(key, value)?;
        }
        "crash.anonymize.strip_usernames" => {
            config.crash.anonymize.strip_usernames = parse_bool(key, value)?;
        }

        // --- logging ---
        "logging.level" => config.logging.level = value.to_string(),
        "logging.json" => config.logging.json = parse_bool(key, value)?,

        _ => anyhow::bail!("Unknown configuration key: '{}'", key),
    }

    Ok(())
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    value
        .parse::<bool>()
        .with_context(|| format!("Expected true or false for {key}"))
}
