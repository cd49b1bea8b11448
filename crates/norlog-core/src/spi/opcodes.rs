//! JEDEC SPI flash opcodes used by the W25Q64 driver
//!
//! Only the commands the driver actually issues are listed; the chip
//! understands more (fast read, dual/quad I/O, SFDP) but none of them
//! are needed for a plain single-I/O logger.

// ============================================================================
// Write control
// ============================================================================

/// Write Enable - required before any program/erase operation
pub const WREN: u8 = 0x06;
/// Write Disable - clears WEL bit in status register
pub const WRDI: u8 = 0x04;

// ============================================================================
// Status register
// ============================================================================

/// Read Status Register 1
pub const RDSR: u8 = 0x05;

// ============================================================================
// Identification
// ============================================================================

/// Read JEDEC ID (manufacturer + device ID)
pub const RDID: u8 = 0x9F;

// ============================================================================
// Read / program
// ============================================================================

/// Read Data (3-byte address)
pub const READ: u8 = 0x03;
/// Page Program (3-byte address, max 256 bytes, no page wrap)
pub const PP: u8 = 0x02;

// ============================================================================
// Erase
// ============================================================================

/// Sector Erase 4KB
pub const SE_20: u8 = 0x20;
/// Block Erase 32KB
pub const BE_52: u8 = 0x52;
/// Block Erase 64KB
pub const BE_D8: u8 = 0xD8;
/// Chip Erase (entire chip)
pub const CE_C7: u8 = 0xC7;
