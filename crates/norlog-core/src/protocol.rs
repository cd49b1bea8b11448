//! W25Q64 command sequences
//!
//! This module implements the common SPI flash command sequences as
//! defined by JEDEC: identification, status polling, write-enable
//! latching, page programming and the erase family. All functions are
//! free functions generic over the [`SpiBus`] transport.
//!
//! Every program/erase sequence follows the same shape the datasheet
//! mandates: wait for the device to go idle, set the write-enable
//! latch, issue the command, then poll the busy flag until the device
//! finishes. The poll loop is bounded and reports [`Error::Timeout`]
//! instead of hanging when a device never clears busy.

use crate::bus::{execute, SpiBus};
use crate::error::{Error, Result};
use crate::spi::{opcodes, SpiCommand};
use bitflags::bitflags;

bitflags! {
    /// Status register 1 contents
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Status: u8 {
        /// Write In Progress - device is completing a program or erase
        const BUSY = 0x01;
        /// Write Enable Latch - set by WREN, cleared when the operation completes
        const WEL = 0x02;
    }
}

/// Poll cadences and deadlines per operation class
///
/// Typical operation times for W25Q64-class parts:
/// * Page program: 0.7-3 ms
/// * 4KB sector erase: 45-400 ms
/// * 32KB/64KB block erase: 120-2000 ms
/// * Chip erase: 20-100 s
pub mod timing {
    /// Page program: poll every 10us, give up after 10ms
    pub const PROGRAM_POLL_US: u32 = 10;
    /// Page program deadline
    pub const PROGRAM_TIMEOUT_US: u32 = 10_000;

    /// Sector erase: poll every 10ms, give up after 1s
    pub const SECTOR_ERASE_POLL_US: u32 = 10_000;
    /// Sector erase deadline
    pub const SECTOR_ERASE_TIMEOUT_US: u32 = 1_000_000;

    /// Block erase: poll every 100ms, give up after 4s
    pub const BLOCK_ERASE_POLL_US: u32 = 100_000;
    /// Block erase deadline
    pub const BLOCK_ERASE_TIMEOUT_US: u32 = 4_000_000;

    /// Chip erase: poll every 1s; a full chip erase can run for minutes
    /// and must not be treated as failed merely because it is slow
    pub const CHIP_ERASE_POLL_US: u32 = 1_000_000;
    /// Chip erase deadline
    pub const CHIP_ERASE_TIMEOUT_US: u32 = 200_000_000;
}

/// Read the JEDEC ID from the flash chip
///
/// Returns (manufacturer_id, device_id) on success.
pub fn read_jedec_id<B: SpiBus + ?Sized>(bus: &mut B) -> Result<(u8, u16)> {
    let mut buf = [0u8; 3];
    let mut cmd = SpiCommand::read_reg(opcodes::RDID, &mut buf);
    execute(bus, &mut cmd)?;

    let manufacturer = buf[0];
    let device = ((buf[1] as u16) << 8) | (buf[2] as u16);

    Ok((manufacturer, device))
}

/// Read status register 1
pub fn read_status<B: SpiBus + ?Sized>(bus: &mut B) -> Result<Status> {
    let mut buf = [0u8; 1];
    let mut cmd = SpiCommand::read_reg(opcodes::RDSR, &mut buf);
    execute(bus, &mut cmd)?;
    Ok(Status::from_bits_truncate(buf[0]))
}

/// Send the Write Enable command
pub fn write_enable<B: SpiBus + ?Sized>(bus: &mut B) -> Result<()> {
    let mut cmd = SpiCommand::simple(opcodes::WREN);
    execute(bus, &mut cmd)
}

/// Send the Write Disable command
pub fn write_disable<B: SpiBus + ?Sized>(bus: &mut B) -> Result<()> {
    let mut cmd = SpiCommand::simple(opcodes::WRDI);
    execute(bus, &mut cmd)
}

/// Wait for the busy flag to clear
///
/// Polls the status register until the busy bit clears, pausing
/// `poll_delay_us` between polls. Gives up after `timeout_us` worth of
/// polls and returns [`Error::Timeout`].
pub fn wait_ready<B: SpiBus + ?Sized>(
    bus: &mut B,
    poll_delay_us: u32,
    timeout_us: u32,
) -> Result<()> {
    let max_polls = if poll_delay_us > 0 {
        timeout_us / poll_delay_us
    } else {
        timeout_us
    };

    for _ in 0..max_polls {
        if !read_status(bus)?.contains(Status::BUSY) {
            return Ok(());
        }
        if poll_delay_us > 0 {
            bus.delay_us(poll_delay_us);
        }
    }

    Err(Error::Timeout)
}

/// Check if a program or erase operation is in progress
pub fn is_busy<B: SpiBus + ?Sized>(bus: &mut B) -> Result<bool> {
    Ok(read_status(bus)?.contains(Status::BUSY))
}

/// Program a single page (up to 256 bytes)
///
/// The data must not cross a page boundary; the device would wrap
/// within the page and corrupt the wrapped-around bytes. Boundary
/// handling lives in [`crate::device::Flash`].
pub fn page_program<B: SpiBus + ?Sized>(bus: &mut B, addr: u32, data: &[u8]) -> Result<()> {
    wait_ready(bus, timing::PROGRAM_POLL_US, timing::PROGRAM_TIMEOUT_US)?;
    write_enable(bus)?;

    let mut cmd = SpiCommand::write(opcodes::PP, addr, data);
    execute(bus, &mut cmd)?;

    wait_ready(bus, timing::PROGRAM_POLL_US, timing::PROGRAM_TIMEOUT_US)
}

/// Read data starting at `addr`
///
/// The read command streams for as long as the select line stays
/// asserted, so any length and alignment is fine in one transaction.
pub fn read_data<B: SpiBus + ?Sized>(bus: &mut B, addr: u32, buf: &mut [u8]) -> Result<()> {
    let mut cmd = SpiCommand::read(opcodes::READ, addr, buf);
    execute(bus, &mut cmd)
}

/// Erase a sector or block at the given address
pub fn erase_block<B: SpiBus + ?Sized>(
    bus: &mut B,
    opcode: u8,
    addr: u32,
    poll_delay_us: u32,
    timeout_us: u32,
) -> Result<()> {
    wait_ready(bus, timing::PROGRAM_POLL_US, timing::PROGRAM_TIMEOUT_US)?;
    write_enable(bus)?;

    let mut cmd = SpiCommand::erase(opcode, addr);
    execute(bus, &mut cmd)?;

    wait_ready(bus, poll_delay_us, timeout_us)
}

/// Erase the entire chip
pub fn chip_erase<B: SpiBus + ?Sized>(bus: &mut B) -> Result<()> {
    wait_ready(bus, timing::PROGRAM_POLL_US, timing::PROGRAM_TIMEOUT_US)?;
    write_enable(bus)?;

    let mut cmd = SpiCommand::simple(opcodes::CE_C7);
    execute(bus, &mut cmd)?;

    wait_ready(bus, timing::CHIP_ERASE_POLL_US, timing::CHIP_ERASE_TIMEOUT_US)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Answers every status read with busy for the first `busy_reads`
    /// polls, idle afterwards
    struct BusyBus {
        busy_reads: u32,
        delays: u32,
    }

    impl SpiBus for BusyBus {
        fn select(&mut self, _active: bool) {}

        fn exchange(&mut self, byte: u8) -> Result<u8> {
            if byte == opcodes::RDSR {
                return Ok(0xFF);
            }
            // Fill byte of the status read phase
            if self.busy_reads > 0 {
                self.busy_reads -= 1;
                Ok(Status::BUSY.bits())
            } else {
                Ok(0)
            }
        }

        fn delay_us(&mut self, _us: u32) {
            self.delays += 1;
        }
    }

    #[test]
    fn wait_ready_returns_once_idle() {
        let mut bus = BusyBus {
            busy_reads: 3,
            delays: 0,
        };
        wait_ready(&mut bus, 10, 1_000).unwrap();
        assert_eq!(bus.delays, 3);
    }

    #[test]
    fn wait_ready_times_out_on_stuck_busy() {
        let mut bus = BusyBus {
            busy_reads: u32::MAX,
            delays: 0,
        };
        assert_eq!(wait_ready(&mut bus, 10, 100), Err(Error::Timeout));
        assert_eq!(bus.delays, 10);
    }

    #[test]
    fn status_bits_decode() {
        let status = Status::from_bits_truncate(0x03);
        assert!(status.contains(Status::BUSY));
        assert!(status.contains(Status::WEL));

        let status = Status::from_bits_truncate(0xFC);
        assert!(!status.contains(Status::BUSY));
        assert!(!status.contains(Status::WEL));
    }
}
