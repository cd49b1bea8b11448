//! W25Q64 block device
//!
//! [`Flash`] owns the transport and turns logical operations (read,
//! program, erase) into the chip's command sequences, respecting the
//! physical constraints: programs never cross a 256-byte page boundary
//! and erases happen at sector/block/chip granularity only.

use crate::bus::SpiBus;
use crate::error::{Error, Result};
use crate::protocol::{self, timing, Status};
use crate::spi::opcodes;

/// Program page size in bytes
pub const PAGE_SIZE: usize = 256;
/// Smallest erase unit in bytes
pub const SECTOR_SIZE: u32 = 4096;
/// 32 KiB erase block
pub const BLOCK32_SIZE: u32 = 32 * 1024;
/// 64 KiB erase block
pub const BLOCK64_SIZE: u32 = 64 * 1024;
/// Number of erase sectors on the chip
pub const SECTOR_COUNT: u32 = 2048;
/// Total device size in bytes (8 MiB)
pub const TOTAL_SIZE: u32 = SECTOR_COUNT * SECTOR_SIZE;

/// The erased value for flash memory (all bits set)
pub const ERASED_BYTE: u8 = 0xFF;

/// JEDEC manufacturer ID (Winbond)
pub const JEDEC_MANUFACTURER: u8 = 0xEF;
/// JEDEC device ID (W25Q64)
pub const JEDEC_DEVICE: u16 = 0x4017;

/// W25Q64 flash device over a byte-exchange transport
pub struct Flash<B> {
    bus: B,
}

impl<B: SpiBus> Flash<B> {
    /// Wrap a transport
    pub fn new(bus: B) -> Self {
        Self { bus }
    }

    /// Borrow the underlying transport
    pub fn bus(&self) -> &B {
        &self.bus
    }

    /// Borrow the underlying transport mutably
    pub fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }

    /// Release the underlying transport
    pub fn into_bus(self) -> B {
        self.bus
    }

    /// Check that the expected chip answers on the bus
    ///
    /// Reads the JEDEC ID and compares it against the W25Q64 identity.
    /// An all-0x00 or all-0xFF answer means nothing drove the bus and
    /// yields [`Error::ChipNotFound`]; a readable but different ID
    /// yields [`Error::JedecIdMismatch`]. Returns the raw ID pair.
    pub fn probe(&mut self) -> Result<(u8, u16)> {
        let (manufacturer, device) = protocol::read_jedec_id(&mut self.bus)?;

        if manufacturer == 0x00 || manufacturer == 0xFF {
            return Err(Error::ChipNotFound);
        }
        if manufacturer != JEDEC_MANUFACTURER || device != JEDEC_DEVICE {
            log::warn!(
                "unexpected flash ID {:02X} {:04X} (expected {:02X} {:04X})",
                manufacturer,
                device,
                JEDEC_MANUFACTURER,
                JEDEC_DEVICE
            );
            return Err(Error::JedecIdMismatch);
        }

        log::debug!("flash present: JEDEC {:02X} {:04X}", manufacturer, device);
        Ok((manufacturer, device))
    }

    /// Read status register 1
    pub fn status(&mut self) -> Result<Status> {
        protocol::read_status(&mut self.bus)
    }

    /// Read `buf.len()` bytes starting at `addr`
    ///
    /// No alignment constraint; reads may span page and sector
    /// boundaries freely and need no status checks.
    pub fn read(&mut self, addr: u32, buf: &mut [u8]) -> Result<()> {
        check_range(addr, buf.len())?;
        protocol::read_data(&mut self.bus, addr, buf)
    }

    /// Program at most one page starting at `addr`
    ///
    /// If `data` would cross the page boundary from `addr`, the write
    /// silently truncates to the bytes remaining in that page; the
    /// device would otherwise wrap within the page and corrupt the
    /// wrapped-around bytes. Returns the number of bytes programmed,
    /// so a caller can reissue for the remainder.
    pub fn write_page(&mut self, addr: u32, data: &[u8]) -> Result<usize> {
        let len = page_bounded_len(addr, data.len());
        check_range(addr, len)?;
        if len == 0 {
            return Ok(0);
        }

        protocol::page_program(&mut self.bus, addr, &data[..len])?;
        Ok(len)
    }

    /// Program an arbitrary-length, arbitrary-alignment range
    ///
    /// Splits the write into the minimal sequence of page programs,
    /// each with its own write-enable and busy-wait. This is the only
    /// write entry point the log layer uses. The target range must be
    /// in the erased state; programming can only clear bits.
    pub fn write(&mut self, addr: u32, data: &[u8]) -> Result<()> {
        check_range(addr, data.len())?;

        let mut offset = 0usize;
        while offset < data.len() {
            let chunk = page_bounded_len(addr + offset as u32, data.len() - offset);
            protocol::page_program(
                &mut self.bus,
                addr + offset as u32,
                &data[offset..offset + chunk],
            )?;
            offset += chunk;
        }

        Ok(())
    }

    /// Erase the 4 KiB sector at `addr` (must be sector-aligned)
    pub fn erase_sector(&mut self, addr: u32) -> Result<()> {
        check_erase(addr, SECTOR_SIZE)?;
        protocol::erase_block(
            &mut self.bus,
            opcodes::SE_20,
            addr,
            timing::SECTOR_ERASE_POLL_US,
            timing::SECTOR_ERASE_TIMEOUT_US,
        )
    }

    /// Erase a 32 KiB block
    pub fn erase_block32(&mut self, addr: u32) -> Result<()> {
        check_erase(addr, BLOCK32_SIZE)?;
        protocol::erase_block(
            &mut self.bus,
            opcodes::BE_52,
            addr,
            timing::BLOCK_ERASE_POLL_US,
            timing::BLOCK_ERASE_TIMEOUT_US,
        )
    }

    /// Erase a 64 KiB block
    pub fn erase_block64(&mut self, addr: u32) -> Result<()> {
        check_erase(addr, BLOCK64_SIZE)?;
        protocol::erase_block(
            &mut self.bus,
            opcodes::BE_D8,
            addr,
            timing::BLOCK_ERASE_POLL_US,
            timing::BLOCK_ERASE_TIMEOUT_US,
        )
    }

    /// Erase the entire chip
    ///
    /// Blocks for the duration; a chip erase runs for tens of seconds
    /// on a healthy part.
    pub fn erase_chip(&mut self) -> Result<()> {
        log::info!("chip erase started");
        protocol::chip_erase(&mut self.bus)
    }
}

/// Bytes that can be programmed from `addr` without crossing the page
/// boundary, capped at `len`
pub fn page_bounded_len(addr: u32, len: usize) -> usize {
    let page_offset = (addr as usize) % PAGE_SIZE;
    core::cmp::min(PAGE_SIZE - page_offset, len)
}

fn check_range(addr: u32, len: usize) -> Result<()> {
    let end = addr as u64 + len as u64;
    if end <= TOTAL_SIZE as u64 {
        Ok(())
    } else {
        Err(Error::AddressOutOfBounds)
    }
}

fn check_erase(addr: u32, unit: u32) -> Result<()> {
    check_range(addr, unit as usize)?;
    if addr.is_multiple_of(unit) {
        Ok(())
    } else {
        Err(Error::InvalidAlignment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_bounded_len_within_page() {
        assert_eq!(page_bounded_len(0, 100), 100);
        assert_eq!(page_bounded_len(0, 256), 256);
        assert_eq!(page_bounded_len(10, 256), 246);
    }

    #[test]
    fn page_bounded_len_truncates_at_boundary() {
        // 250 bytes into the page, only 6 remain
        assert_eq!(page_bounded_len(4096 + 250, 20), 6);
        assert_eq!(page_bounded_len(255, 2), 1);
        assert_eq!(page_bounded_len(256, 2), 2);
    }

    #[test]
    fn range_checks() {
        assert!(check_range(0, TOTAL_SIZE as usize).is_ok());
        assert_eq!(
            check_range(TOTAL_SIZE - 1, 2),
            Err(Error::AddressOutOfBounds)
        );
        assert_eq!(check_erase(100, SECTOR_SIZE), Err(Error::InvalidAlignment));
        assert!(check_erase(SECTOR_SIZE * 3, SECTOR_SIZE).is_ok());
        assert_eq!(
            check_erase(TOTAL_SIZE, SECTOR_SIZE),
            Err(Error::AddressOutOfBounds)
        );
    }
}
