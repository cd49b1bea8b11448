//! SPI transaction types
//!
//! This module provides the transaction structure used by the flash
//! protocol layer, together with the JEDEC opcode constants for the
//! commands the W25Q64 understands.

mod command;
pub mod opcodes;

pub use command::{encode_addr, SpiCommand};
