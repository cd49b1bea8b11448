//! Probe command implementation

use norlog_core::device::{self, Flash};
use norlog_core::logger;
use norlog_sim::SimFlash;

/// Run the probe command
pub fn run_probe(flash: &mut Flash<SimFlash>) -> Result<(), Box<dyn std::error::Error>> {
    let (manufacturer, device_id) = flash.probe()?;

    println!("Flash Chip Information");
    println!("======================");
    println!();
    println!("JEDEC ID:        {:02X} {:04X}", manufacturer, device_id);
    println!(
        "Size:            {} bytes ({} KiB / {} MiB)",
        device::TOTAL_SIZE,
        device::TOTAL_SIZE / 1024,
        device::TOTAL_SIZE / (1024 * 1024)
    );
    println!("Page size:       {} bytes", device::PAGE_SIZE);
    println!(
        "Erase blocks:    {} / {} / {} bytes, whole chip",
        device::SECTOR_SIZE,
        device::BLOCK32_SIZE,
        device::BLOCK64_SIZE
    );
    println!();
    println!(
        "Log region:      0x{:06X} - 0x{:06X} ({} record slots)",
        logger::LOG_START,
        logger::LOG_END,
        logger::MAX_ENTRIES
    );

    Ok(())
}
