//! Append-only log engine
//!
//! The log owns record placement over the flash address space: sector 0
//! is reserved, the log occupies sectors 1..2046, and the last sector
//! stays untouched as the exclusive upper bound. Records are written
//! back to back in [`RECORD_SIZE`] strides.
//!
//! The write cursor is never persisted separately from the data it
//! describes. It is *derived*: [`LogState::recover`] scans the region
//! for the first still-erased slot, which makes recovery a pure
//! function of flash contents and survives any power cut between
//! appends.

use core::fmt::Write as _;

use embedded_io::Write;

use crate::bus::SpiBus;
use crate::device::{Flash, ERASED_BYTE, SECTOR_COUNT, SECTOR_SIZE};
use crate::error::{Error, Result};
use crate::record::{LogRecord, SensorSnapshot, RECORD_SIZE};

/// First byte of the log region (sector 1; sector 0 is reserved)
pub const LOG_START: u32 = SECTOR_SIZE;
/// Exclusive end of the log region (the last sector is never written)
pub const LOG_END: u32 = (SECTOR_COUNT - 1) * SECTOR_SIZE;
/// Number of record slots that fit in the log region
pub const MAX_ENTRIES: u32 = (LOG_END - LOG_START) / RECORD_SIZE as u32;

/// CSV column header emitted by [`LogState::dump`]
pub const DUMP_HEADER: &str = "Seq,DS18B20,MPU,AccelX,AccelY,AccelZ,GyroX,GyroY,GyroZ\r\n";

/// Operational state of the log, derived from the cursor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogStatus {
    /// Appends are accepted
    Ready,
    /// No record fits before [`LOG_END`]; only an erase leaves this state
    Full,
}

/// Owned cursor and counters of the append-only log
///
/// Constructed exclusively through [`LogState::recover`], so an
/// initialized value always reflects actual flash contents. All
/// mutation goes through [`append`](Self::append) and
/// [`erase_all`](Self::erase_all), keeping the invariant
/// `LOG_START <= cursor <= LOG_END` at all times.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogState {
    cursor: u32,
    entry_count: u32,
    last_sequence: u16,
}

impl LogState {
    /// Recover the write cursor by scanning flash
    ///
    /// Scans forward from [`LOG_START`] in record strides; the first
    /// slot that still reads all-erased becomes the cursor. The entry
    /// count is the number of slots before it and the last-used
    /// sequence number is taken from the final occupied slot itself
    /// rather than inferred from the count, so the two can never
    /// desynchronize. When no erased slot fits before [`LOG_END`] the
    /// log is full and the cursor pins at the end of the last slot.
    pub fn recover<B: SpiBus>(flash: &mut Flash<B>) -> Result<Self> {
        let mut addr = LOG_START;
        let mut entry_count = 0u32;
        let mut last_sequence = 0u16;
        let mut buf = [0u8; RECORD_SIZE];

        while addr + RECORD_SIZE as u32 <= LOG_END {
            flash.read(addr, &mut buf)?;

            if slot_is_erased(&buf) {
                break;
            }

            last_sequence = LogRecord::from_bytes(&buf).sequence.get();
            entry_count += 1;
            addr += RECORD_SIZE as u32;
        }

        let state = Self {
            cursor: addr,
            entry_count,
            last_sequence,
        };
        log::info!(
            "log recovered: {} entries, cursor 0x{:06X}, last sequence {}",
            state.entry_count,
            state.cursor,
            state.last_sequence
        );
        Ok(state)
    }

    /// Append one snapshot as the next record
    ///
    /// Stamps the next sequence number, writes the record in a single
    /// driver write and advances the cursor. Returns the assigned
    /// sequence number, or [`Error::LogFull`] without touching flash
    /// when no slot remains. There is no read-after-write verification.
    pub fn append<B: SpiBus>(
        &mut self,
        flash: &mut Flash<B>,
        snapshot: &SensorSnapshot,
    ) -> Result<u16> {
        if self.is_full() {
            return Err(Error::LogFull);
        }

        let sequence = self.last_sequence.wrapping_add(1);
        let record = LogRecord::from_snapshot(snapshot, sequence);
        flash.write(self.cursor, &record.to_bytes())?;

        self.cursor += RECORD_SIZE as u32;
        self.entry_count += 1;
        self.last_sequence = sequence;

        log::debug!("saved entry #{} at 0x{:06X}", sequence, self.cursor - RECORD_SIZE as u32);
        Ok(sequence)
    }

    /// Emit every record as CSV into `sink`
    ///
    /// Writes the [`DUMP_HEADER`] line, one row per record in flash
    /// order and a trailing `Total: N entries` summary, all with CRLF
    /// line endings. Pure read pass: neither the cursor nor flash
    /// contents change. Returns the number of rows emitted.
    pub fn dump<B: SpiBus, W: Write>(&self, flash: &mut Flash<B>, sink: &mut W) -> Result<u32> {
        sink.write_all(DUMP_HEADER.as_bytes())
            .map_err(|_| Error::IoError)?;

        let mut addr = LOG_START;
        let mut count = 0u32;
        let mut buf = [0u8; RECORD_SIZE];
        let mut line: heapless::String<96> = heapless::String::new();

        while addr < self.cursor {
            flash.read(addr, &mut buf)?;
            let record = LogRecord::from_bytes(&buf);

            line.clear();
            write!(
                line,
                "{},{},{},{},{},{},{},{},{}\r\n",
                record.sequence.get(),
                record.ds18b20_temp.get(),
                record.mpu_temp.get(),
                record.accel_x.get(),
                record.accel_y.get(),
                record.accel_z.get(),
                record.gyro_x.get(),
                record.gyro_y.get(),
                record.gyro_z.get(),
            )
            .map_err(|_| Error::IoError)?;
            sink.write_all(line.as_bytes()).map_err(|_| Error::IoError)?;

            count += 1;
            addr += RECORD_SIZE as u32;
        }

        line.clear();
        write!(line, "Total: {} entries\r\n", count).map_err(|_| Error::IoError)?;
        sink.write_all(line.as_bytes()).map_err(|_| Error::IoError)?;

        Ok(count)
    }

    /// Erase the whole chip and reset the log
    ///
    /// The log does not track which sectors are occupied, so the only
    /// erase granularity it exercises is the full chip. Blocks until
    /// the erase completes, then resets cursor and counters.
    pub fn erase_all<B: SpiBus>(&mut self, flash: &mut Flash<B>) -> Result<()> {
        flash.erase_chip()?;

        self.cursor = LOG_START;
        self.entry_count = 0;
        self.last_sequence = 0;

        log::info!("log erased");
        Ok(())
    }

    /// Byte address of the next free record slot
    pub fn cursor(&self) -> u32 {
        self.cursor
    }

    /// Number of records currently in the log; O(1), no flash access
    pub fn entry_count(&self) -> u32 {
        self.entry_count
    }

    /// Sequence number of the most recent record (0 when empty)
    pub fn last_sequence(&self) -> u16 {
        self.last_sequence
    }

    /// True when no further record fits before [`LOG_END`]
    pub fn is_full(&self) -> bool {
        self.cursor + RECORD_SIZE as u32 > LOG_END
    }

    /// Current operational state
    pub fn status(&self) -> LogStatus {
        if self.is_full() {
            LogStatus::Full
        } else {
            LogStatus::Ready
        }
    }
}

fn slot_is_erased(buf: &[u8; RECORD_SIZE]) -> bool {
    buf.iter().all(|&b| b == ERASED_BYTE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn region_constants() {
        assert_eq!(LOG_START, 4096);
        assert_eq!(LOG_END, 8_384_512);
        // The region is not a record multiple; the trailing partial
        // slot is never used
        assert_eq!(MAX_ENTRIES, 465_578);
        assert!(LOG_START + MAX_ENTRIES * RECORD_SIZE as u32 + RECORD_SIZE as u32 > LOG_END);
    }

    #[test]
    fn erased_slot_detection() {
        let erased = [ERASED_BYTE; RECORD_SIZE];
        assert!(slot_is_erased(&erased));

        let mut touched = erased;
        touched[17] = 0xFE;
        assert!(!slot_is_erased(&touched));
    }

    #[test]
    fn full_detection_at_region_end() {
        let state = LogState {
            cursor: LOG_START + MAX_ENTRIES * RECORD_SIZE as u32,
            entry_count: MAX_ENTRIES,
            last_sequence: 1,
        };
        assert!(state.is_full());
        assert_eq!(state.status(), LogStatus::Full);

        let state = LogState {
            cursor: LOG_START,
            entry_count: 0,
            last_sequence: 0,
        };
        assert!(!state.is_full());
        assert_eq!(state.status(), LogStatus::Ready);
    }
}
