//! Byte-exchange transport abstraction
//!
//! The flash chip hangs off a plain full-duplex SPI link: a chip-select
//! line plus a single-byte exchange primitive. Everything the driver
//! does is expressed as [`SpiCommand`] transactions framed over that
//! link by [`execute`].
//!
//! The trait is synchronous by design: the surrounding system runs a
//! single cooperative task loop and every flash operation blocks until
//! the hardware sequence completes.

use crate::error::Result;
use crate::spi::{encode_addr, SpiCommand};

/// Idle byte clocked out while the device drives the read phase
const FILL_BYTE: u8 = 0xFF;

/// Full-duplex byte transport with chip-select control
///
/// Implementations must not share the link with any other device or
/// interrupt context while a transaction is in flight; the framing in
/// [`execute`] assumes exclusive ownership between the select edges.
pub trait SpiBus {
    /// Drive the chip-select line (`true` = asserted)
    fn select(&mut self, active: bool);

    /// Transfer one byte out and clock one byte in
    fn exchange(&mut self, byte: u8) -> Result<u8>;

    /// Pause between status polls
    fn delay_us(&mut self, us: u32);
}

/// Execute a single SPI transaction over the bus
///
/// Frames the command as opcode, optional 3-byte address, write data,
/// then the read phase (clocking [`FILL_BYTE`] for every byte read).
/// The chip-select line is released even when a transfer fails, so a
/// bus error never leaves the device mid-command.
pub fn execute<B: SpiBus + ?Sized>(bus: &mut B, cmd: &mut SpiCommand<'_>) -> Result<()> {
    bus.select(true);
    let result = transfer(bus, cmd);
    bus.select(false);
    result
}

fn transfer<B: SpiBus + ?Sized>(bus: &mut B, cmd: &mut SpiCommand<'_>) -> Result<()> {
    bus.exchange(cmd.opcode)?;

    if let Some(addr) = cmd.address {
        let mut bytes = [0u8; 3];
        encode_addr(addr, &mut bytes);
        for byte in bytes {
            bus.exchange(byte)?;
        }
    }

    for &byte in cmd.write_data {
        bus.exchange(byte)?;
    }

    for slot in cmd.read_buf.iter_mut() {
        *slot = bus.exchange(FILL_BYTE)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spi::opcodes;

    /// Records every select edge and exchanged byte
    struct RecordingBus {
        log: [u8; 64],
        len: usize,
        selects: [bool; 8],
        select_count: usize,
    }

    impl RecordingBus {
        fn new() -> Self {
            Self {
                log: [0; 64],
                len: 0,
                selects: [false; 8],
                select_count: 0,
            }
        }

        fn sent(&self) -> &[u8] {
            &self.log[..self.len]
        }
    }

    impl SpiBus for RecordingBus {
        fn select(&mut self, active: bool) {
            self.selects[self.select_count] = active;
            self.select_count += 1;
        }

        fn exchange(&mut self, byte: u8) -> Result<u8> {
            self.log[self.len] = byte;
            self.len += 1;
            Ok(0xA5)
        }

        fn delay_us(&mut self, _us: u32) {}
    }

    #[test]
    fn write_command_framing() {
        let mut bus = RecordingBus::new();
        let data = [0xDE, 0xAD];
        let mut cmd = SpiCommand::write(opcodes::PP, 0x001234, &data);
        execute(&mut bus, &mut cmd).unwrap();

        assert_eq!(bus.sent(), &[opcodes::PP, 0x00, 0x12, 0x34, 0xDE, 0xAD]);
        assert_eq!(&bus.selects[..2], &[true, false]);
    }

    #[test]
    fn read_command_clocks_fill_bytes() {
        let mut bus = RecordingBus::new();
        let mut buf = [0u8; 3];
        let mut cmd = SpiCommand::read(opcodes::READ, 0x000100, &mut buf);
        execute(&mut bus, &mut cmd).unwrap();

        assert_eq!(
            bus.sent(),
            &[opcodes::READ, 0x00, 0x01, 0x00, FILL_BYTE, FILL_BYTE, FILL_BYTE]
        );
        assert_eq!(buf, [0xA5; 3]);
    }

    #[test]
    fn erase_command_has_no_data_phase() {
        let mut bus = RecordingBus::new();
        let mut cmd = SpiCommand::erase(opcodes::SE_20, 0x002000);
        execute(&mut bus, &mut cmd).unwrap();

        assert_eq!(bus.sent(), &[opcodes::SE_20, 0x00, 0x20, 0x00]);
    }

    #[test]
    fn select_released_after_failed_transfer() {
        struct FailingBus {
            selects: [bool; 4],
            select_count: usize,
        }

        impl SpiBus for FailingBus {
            fn select(&mut self, active: bool) {
                self.selects[self.select_count] = active;
                self.select_count += 1;
            }

            fn exchange(&mut self, _byte: u8) -> Result<u8> {
                Err(crate::Error::SpiTransferFailed)
            }

            fn delay_us(&mut self, _us: u32) {}
        }

        let mut bus = FailingBus {
            selects: [false; 4],
            select_count: 0,
        };
        let mut cmd = SpiCommand::simple(opcodes::WREN);
        assert_eq!(
            execute(&mut bus, &mut cmd),
            Err(crate::Error::SpiTransferFailed)
        );
        assert_eq!(&bus.selects[..2], &[true, false]);
    }
}
