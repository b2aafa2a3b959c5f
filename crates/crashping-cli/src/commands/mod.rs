pub mod completions;
pub mod config;
pub mod crash;
pub mod pings;
pub mod run;
pub mod upload;

use crashping_core::config::Config;

/// Whether the crash ping is submitted at capture time. `--batch` leaves
/// the event for the next startup flush.
pub fn submit_on_capture(config: &Config, batch: bool) -> bool {
    config.crash.submit_on_capture && !batch
}
