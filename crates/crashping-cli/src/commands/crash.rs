//! Crash command - Raise an uncaught fault without the interactive screen

use anyhow::Result;

use crate::app::App;
use crate::output::{get_formatter, OutputFormat};
use crate::Settings;

#[derive(Debug, clap::Args)]
pub struct CrashCommand {
    /// Leave the crash event for the next startup instead of submitting it
    #[arg(long)]
    pub batch: bool,
}

impl CrashCommand {
    /// Never returns normally: the process terminates with the fault.
    pub async fn execute(&self, format: OutputFormat, settings: &Settings) -> Result<()> {
        let formatter = get_formatter(format);

        let app = App::start(settings.config.clone())?;
        let mut screen = app.main_screen(super::submit_on_capture(app.config(), self.batch));
        screen.show();

        formatter.info("Raising an uncaught null-reference fault");
        screen.on_crash()
    }
}
