//! Status command implementation

use norlog_core::logger::{LogState, LogStatus, MAX_ENTRIES};

/// Run the status command
pub fn run_status(state: &LogState) -> Result<(), Box<dyn std::error::Error>> {
    let used = state.entry_count();
    let percent = used as f64 * 100.0 / MAX_ENTRIES as f64;

    println!("Log Status");
    println!("==========");
    println!();
    println!("Entries:       {} / {} ({:.1}%)", used, MAX_ENTRIES, percent);
    println!("Cursor:        0x{:06X}", state.cursor());
    println!("Last sequence: {}", state.last_sequence());
    println!(
        "State:         {}",
        match state.status() {
            LogStatus::Ready => "Ready",
            LogStatus::Full => "Full",
        }
    );

    Ok(())
}
