//! norlog - flash-backed multi-sensor log tool
//!
//! Drives the append-only log engine from `norlog-core` against a
//! simulated W25Q64 backed by an image file, so the operator intents
//! of the recorder (save, dump, erase) can be exercised on a host.
//! Every invocation re-runs cursor recovery from the persisted flash
//! contents; the image file is the flash, a process exit is a power
//! cut.

mod cli;
mod commands;
mod image;

use clap::Parser;
use cli::{Cli, Commands};
use norlog_core::device::Flash;
use norlog_core::logger::LogState;
use norlog_core::record::SensorSnapshot;
use norlog_sim::{SimConfig, SimFlash};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    // Set log level based on verbosity
    match cli.verbose {
        0 => {} // default (info)
        1 => log::set_max_level(log::LevelFilter::Debug),
        _ => log::set_max_level(log::LevelFilter::Trace),
    }

    let contents = image::load(&cli.image)?;
    let mut flash = Flash::new(SimFlash::with_image(SimConfig::default(), &contents));
    drop(contents);

    // Presence check: report, but keep going - the log layer does not
    // depend on the ID and the operator can still inspect the image
    if !matches!(cli.command, Commands::Probe) {
        if let Err(e) = flash.probe() {
            log::warn!("flash probe failed: {}", e);
        }
    }

    match cli.command {
        Commands::Probe => commands::run_probe(&mut flash),
        Commands::Save {
            ds18b20_temp,
            mpu_temp,
            accel,
            gyro,
        } => {
            let snapshot = SensorSnapshot {
                ds18b20_temp: ds18b20_temp.map(centi),
                mpu_temp: centi(mpu_temp),
                accel: axes("--accel", &accel)?,
                gyro: axes("--gyro", &gyro)?,
            };
            let mut state = LogState::recover(&mut flash)?;
            commands::run_save(&mut flash, &mut state, &snapshot)?;
            image::save(&cli.image, flash.into_bus().mem())?;
            Ok(())
        }
        Commands::Dump { output } => {
            let state = LogState::recover(&mut flash)?;
            commands::run_dump(&mut flash, &state, output.as_deref())
        }
        Commands::Erase => {
            let mut state = LogState::recover(&mut flash)?;
            commands::run_erase(&mut flash, &mut state)?;
            image::save(&cli.image, flash.into_bus().mem())?;
            Ok(())
        }
        Commands::Status => {
            let state = LogState::recover(&mut flash)?;
            commands::run_status(&state)
        }
    }
}

/// Degrees to hundredths of a degree, as stored on flash
fn centi(degrees: f32) -> i16 {
    (degrees * 100.0).round() as i16
}

/// Parse a comma-separated axis triple
fn axes(flag: &str, values: &[i16]) -> Result<[i16; 3], Box<dyn std::error::Error>> {
    match values {
        [x, y, z] => Ok([*x, *y, *z]),
        _ => Err(format!("{} expects three comma-separated values", flag).into()),
    }
}
