//! Run command - Interactive demo screen
//!
//! Bootstraps telemetry, shows the main screen and reads actions from
//! stdin until `quit` or end of input. The `crash` action does not return.

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

use crate::app::App;
use crate::output::{get_formatter, OutputFormat};
use crate::screen::{Action, HELP};
use crate::Settings;

#[derive(Debug, clap::Args)]
pub struct RunCommand {
    /// Leave the crash event for the next startup instead of submitting it
    #[arg(long)]
    pub batch: bool,
}

impl RunCommand {
    pub async fn execute(&self, format: OutputFormat, settings: &Settings) -> Result<()> {
        let formatter = get_formatter(format);

        let app = App::start(settings.config.clone())?;
        let mut screen = app.main_screen(super::submit_on_capture(app.config(), self.batch));
        screen.show();

        formatter.success("crashping demo running");
        formatter.info(HELP);

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Some(line) = lines.next_line().await.context("Failed to read input")? {
            if line.trim().is_empty() {
                continue;
            }
            match Action::parse(&line) {
                Action::Crash => screen.on_crash(),
                Action::Help => formatter.info(HELP),
                Action::Quit => break,
                Action::Unknown(action) => {
                    formatter.warn(&format!("Unknown action '{action}'"));
                    formatter.info(HELP);
                }
            }
        }

        debug!(capture_state = %screen.capture_state(), "Leaving main screen");
        app.shutdown()?;
        formatter.success("Telemetry client shut down");
        if let Some(store) = app.client().pending_store() {
            formatter.info(&format!("{} ping(s) pending upload", store.list()?.len()));
        }
        Ok(())
    }
}
