//! Erase command implementation

use indicatif::{ProgressBar, ProgressStyle};
use norlog_core::device::Flash;
use norlog_core::logger::LogState;
use norlog_sim::SimFlash;
use std::time::Duration;

/// Run the erase command: full chip erase, cursor reset
pub fn run_erase(
    flash: &mut Flash<SimFlash>,
    state: &mut LogState,
) -> Result<(), Box<dyn std::error::Error>> {
    let entries = state.entry_count();

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.set_message("Erasing entire flash...");
    pb.enable_steady_tick(Duration::from_millis(100));

    state.erase_all(flash)?;

    pb.finish_with_message(format!("Flash erased ({} entries discarded)", entries));
    Ok(())
}
