//! Log record layout
//!
//! A record is exactly 18 bytes on flash, little-endian, no padding.
//! The layout is stable and positionally addressable: records are
//! never updated or deleted in place, only appended or bulk-erased,
//! so the on-flash offset of slot `n` is always `n * RECORD_SIZE`.

use zerocopy::byteorder::little_endian::{I16, U16};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

/// On-flash size of one record in bytes
pub const RECORD_SIZE: usize = core::mem::size_of::<LogRecord>();

/// Sentinel in `ds18b20_temp` meaning "no valid probe reading"
///
/// Distinguishes probe absence from a legitimate 0.00 degC reading.
pub const PROBE_UNAVAILABLE: i16 = 0x7FFF;

/// One persisted sensor sample
///
/// Temperatures are in hundredths of a degree Celsius; accelerometer
/// and gyroscope axes carry the raw sensor values. `sequence` starts
/// at 1 and increases by one per append (wrapping at 65535, with no
/// special wrap handling).
#[derive(FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned, Clone, Copy, Debug, PartialEq, Eq)]
#[repr(C)]
pub struct LogRecord {
    /// DS18B20 probe temperature x100, or [`PROBE_UNAVAILABLE`]
    pub ds18b20_temp: I16,
    /// MPU6050 die temperature x100
    pub mpu_temp: I16,
    /// Raw accelerometer X axis
    pub accel_x: I16,
    /// Raw accelerometer Y axis
    pub accel_y: I16,
    /// Raw accelerometer Z axis
    pub accel_z: I16,
    /// Raw gyroscope X axis
    pub gyro_x: I16,
    /// Raw gyroscope Y axis
    pub gyro_y: I16,
    /// Raw gyroscope Z axis
    pub gyro_z: I16,
    /// Monotonic sequence number, assigned on append
    pub sequence: U16,
}

impl LogRecord {
    /// Build a record from a snapshot, stamping the sequence number
    pub fn from_snapshot(snapshot: &SensorSnapshot, sequence: u16) -> Self {
        Self {
            ds18b20_temp: I16::new(snapshot.ds18b20_temp.unwrap_or(PROBE_UNAVAILABLE)),
            mpu_temp: I16::new(snapshot.mpu_temp),
            accel_x: I16::new(snapshot.accel[0]),
            accel_y: I16::new(snapshot.accel[1]),
            accel_z: I16::new(snapshot.accel[2]),
            gyro_x: I16::new(snapshot.gyro[0]),
            gyro_y: I16::new(snapshot.gyro[1]),
            gyro_z: I16::new(snapshot.gyro[2]),
            sequence: U16::new(sequence),
        }
    }

    /// Probe temperature, `None` when the sentinel is stored
    pub fn probe_temp(&self) -> Option<i16> {
        let raw = self.ds18b20_temp.get();
        (raw != PROBE_UNAVAILABLE).then_some(raw)
    }

    /// Serialize into the on-flash byte layout
    pub fn to_bytes(&self) -> [u8; RECORD_SIZE] {
        zerocopy::transmute!(*self)
    }

    /// Reconstruct a record from an on-flash slot
    pub fn from_bytes(buf: &[u8; RECORD_SIZE]) -> Self {
        zerocopy::transmute!(*buf)
    }
}

/// A snapshot of typed readings as produced by the sensor tasks
///
/// This is the record minus the sequence number; the probe temperature
/// is optional because the DS18B20 may be absent or mid-conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SensorSnapshot {
    /// DS18B20 probe temperature x100, `None` when unavailable
    pub ds18b20_temp: Option<i16>,
    /// MPU6050 die temperature x100
    pub mpu_temp: i16,
    /// Raw accelerometer axes
    pub accel: [i16; 3],
    /// Raw gyroscope axes
    pub gyro: [i16; 3],
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_is_exactly_18_bytes() {
        assert_eq!(RECORD_SIZE, 18);
    }

    #[test]
    fn layout_is_little_endian_in_field_order() {
        let record = LogRecord {
            ds18b20_temp: I16::new(0x0102),
            mpu_temp: I16::new(-2),
            accel_x: I16::new(3),
            accel_y: I16::new(4),
            accel_z: I16::new(5),
            gyro_x: I16::new(6),
            gyro_y: I16::new(7),
            gyro_z: I16::new(8),
            sequence: U16::new(0xABCD),
        };

        let bytes = record.to_bytes();
        assert_eq!(&bytes[0..2], &[0x02, 0x01]);
        assert_eq!(&bytes[2..4], &[0xFE, 0xFF]);
        assert_eq!(&bytes[16..18], &[0xCD, 0xAB]);
    }

    #[test]
    fn snapshot_round_trips_through_bytes() {
        let snapshot = SensorSnapshot {
            ds18b20_temp: Some(2350),
            mpu_temp: 2711,
            accel: [-100, 0, 16384],
            gyro: [1, -2, 3],
        };
        let record = LogRecord::from_snapshot(&snapshot, 42);

        let decoded = LogRecord::from_bytes(&record.to_bytes());
        assert_eq!(decoded, record);
        assert_eq!(decoded.sequence.get(), 42);
        assert_eq!(decoded.probe_temp(), Some(2350));
    }

    #[test]
    fn missing_probe_stores_sentinel() {
        let snapshot = SensorSnapshot {
            ds18b20_temp: None,
            ..Default::default()
        };
        let record = LogRecord::from_snapshot(&snapshot, 1);
        assert_eq!(record.ds18b20_temp.get(), PROBE_UNAVAILABLE);
        assert_eq!(record.probe_temp(), None);
    }
}
