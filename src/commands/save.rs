//! Save command implementation

use norlog_core::device::Flash;
use norlog_core::logger::LogState;
use norlog_core::record::SensorSnapshot;
use norlog_sim::SimFlash;

/// Run the save command: append one snapshot and report the sequence
pub fn run_save(
    flash: &mut Flash<SimFlash>,
    state: &mut LogState,
    snapshot: &SensorSnapshot,
) -> Result<(), Box<dyn std::error::Error>> {
    let sequence = state.append(flash, snapshot)?;

    println!("Saved entry #{}", sequence);
    println!(
        "{} / {} slots used",
        state.entry_count(),
        norlog_core::logger::MAX_ENTRIES
    );

    Ok(())
}
