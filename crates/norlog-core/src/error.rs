//! Error types for norlog-core
//!
//! This module provides a no_std compatible error type that can be used
//! throughout the crate.

use core::fmt;

/// Core error type - no_std compatible, Copy for efficiency
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    // SPI errors
    /// SPI transfer failed
    SpiTransferFailed,
    /// Device stayed busy past the operation deadline
    Timeout,

    // Chip errors
    /// Flash chip not found (JEDEC ID read returned bus idle levels)
    ChipNotFound,
    /// JEDEC ID does not match the expected W25Q64 identity
    JedecIdMismatch,

    // Address/size errors
    /// Address is beyond flash chip size
    AddressOutOfBounds,
    /// Operation requires an aligned address
    InvalidAlignment,

    // Log errors
    /// Log region is full, record was not written
    LogFull,

    // I/O errors
    /// Writing to the dump sink failed
    IoError,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SpiTransferFailed => write!(f, "SPI transfer failed"),
            Self::Timeout => write!(f, "flash operation timed out"),
            Self::ChipNotFound => write!(f, "flash chip not found"),
            Self::JedecIdMismatch => write!(f, "JEDEC ID mismatch"),
            Self::AddressOutOfBounds => write!(f, "address out of bounds"),
            Self::InvalidAlignment => write!(f, "invalid alignment"),
            Self::LogFull => write!(f, "log region is full"),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

/// Result type alias using the core Error type
pub type Result<T> = core::result::Result<T, Error>;
