//! CLI argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "norlog")]
#[command(author, version, about = "NOR-flash sensor log tool", long_about = None)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Flash image file backing the simulated chip
    #[arg(long, global = true, default_value = "norlog.img")]
    pub image: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Probe the flash chip and print its identity
    Probe,

    /// Append one sensor snapshot to the log
    Save {
        /// DS18B20 probe temperature in degrees C (omit when the probe is absent)
        #[arg(long)]
        ds18b20_temp: Option<f32>,

        /// MPU6050 die temperature in degrees C
        #[arg(long, default_value_t = 0.0)]
        mpu_temp: f32,

        /// Raw accelerometer axes as x,y,z
        #[arg(long, value_delimiter = ',', default_value = "0,0,0")]
        accel: Vec<i16>,

        /// Raw gyroscope axes as x,y,z
        #[arg(long, value_delimiter = ',', default_value = "0,0,0")]
        gyro: Vec<i16>,
    },

    /// Dump the whole log as CSV
    Dump {
        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Erase the entire chip and reset the log
    Erase,

    /// Show log occupancy
    Status,
}
