//! crashping CLI - Crash reporting demo application
//!
//! Provides commands for:
//! - Running the interactive demo screen
//! - Raising a one-shot uncaught fault
//! - Inspecting and uploading pending pings
//! - Viewing and editing configuration

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use crashping_core::config::Config;
use tracing::warn;
use tracing_subscriber::EnvFilter;

mod app;
mod commands;
mod output;
mod screen;

use commands::{
    completions::CompletionsCommand, config::ConfigCommand, crash::CrashCommand,
    pings::PingsCommand, run::RunCommand, upload::UploadCommand,
};
use output::OutputFormat;

#[derive(Debug, Parser)]
#[command(
    name = "crashping",
    version,
    about = "Telemetry crash reporting demo"
)]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    json: bool,

    /// Verbose output (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Use alternate config file
    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Start the demo and show the main screen
    Run(RunCommand),
    /// Start the demo and raise an uncaught fault immediately
    Crash(CrashCommand),
    /// Inspect pings waiting for upload
    #[command(subcommand)]
    Pings(PingsCommand),
    /// Upload pending pings to the ingestion server
    Upload(UploadCommand),
    /// View and manage configuration
    #[command(subcommand)]
    Config(ConfigCommand),
    /// Generate shell completions
    Completions(CompletionsCommand),
}

/// Configuration resolved from `--config` or the default location
#[derive(Debug, Clone)]
pub struct Settings {
    pub path: PathBuf,
    pub config: Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli
        .config
        .as_ref()
        .map(PathBuf::from)
        .unwrap_or_else(Config::default_path);
    let (config, load_error) = match Config::load(&config_path) {
        Ok(config) => (config, None),
        Err(e) => (Config::default(), config_path.exists().then_some(e)),
    };

    // Setup tracing
    let level = match cli.verbose {
        0 => config.logging.level.as_str(),
        1 => "debug",
        _ => "trace",
    };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    if config.logging.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    }

    if let Some(e) = load_error {
        warn!(path = %config_path.display(), error = %e, "Failed to load configuration, using defaults");
    }

    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Human
    };
    let settings = Settings {
        path: config_path,
        config,
    };

    match cli.command {
        Commands::Run(cmd) => cmd.execute(format, &settings).await,
        Commands::Crash(cmd) => cmd.execute(format, &settings).await,
        Commands::Pings(cmd) => cmd.execute(format, &settings).await,
        Commands::Upload(cmd) => cmd.execute(format, &settings).await,
        Commands::Config(cmd) => cmd.execute(format, &settings).await,
        Commands::Completions(cmd) => cmd.execute(format).await,
    }
}
