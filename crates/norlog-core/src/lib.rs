//! norlog-core - NOR-flash block driver and append-only sensor log engine
//!
//! This crate provides the storage stack of a multi-sensor data recorder:
//! a command-level driver for a Winbond W25Q64-class SPI NOR flash and,
//! on top of it, an append-only log of fixed-size sensor records with
//! crash-consistent write-cursor recovery. It is designed to be `no_std`
//! compatible for use in embedded environments.
//!
//! # Features
//!
//! - `std` - Enable standard library support (`std::error::Error` impls)
//!
//! # Example
//!
//! ```ignore
//! use norlog_core::{bus::SpiBus, device::Flash, logger::LogState};
//!
//! fn boot<B: SpiBus>(bus: B) -> norlog_core::Result<()> {
//!     let mut flash = Flash::new(bus);
//!     flash.probe()?;
//!     let mut state = LogState::recover(&mut flash)?;
//!     println!("{} entries on flash", state.entry_count());
//!     Ok(())
//! }
//! ```

#![no_std]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

#[cfg(feature = "std")]
extern crate std;

pub mod bus;
pub mod device;
pub mod error;
pub mod logger;
pub mod protocol;
pub mod record;
pub mod spi;

pub use error::{Error, Result};
