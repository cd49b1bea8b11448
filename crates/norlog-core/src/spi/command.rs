//! SPI command structure

/// A single SPI transaction
///
/// Designed to avoid allocation - uses slices for data.
/// The lifetime parameter `'a` ties the command to the buffers it references.
///
/// The W25Q64 is an 8 MiB part, so every addressed command uses a 3-byte
/// (24-bit) address, sent most-significant byte first.
pub struct SpiCommand<'a> {
    /// The opcode byte
    pub opcode: u8,

    /// Address (if any), encoded as 3 bytes MSB-first
    pub address: Option<u32>,

    /// Data to write after opcode/address
    pub write_data: &'a [u8],

    /// Buffer to read into (mutable)
    pub read_buf: &'a mut [u8],
}

impl<'a> SpiCommand<'a> {
    /// Create a simple command with no address or data (e.g., WREN, WRDI)
    pub fn simple(opcode: u8) -> Self {
        Self {
            opcode,
            address: None,
            write_data: &[],
            read_buf: &mut [],
        }
    }

    /// Create a read register command with no address (e.g., RDSR, RDID)
    pub fn read_reg(opcode: u8, buf: &'a mut [u8]) -> Self {
        Self {
            opcode,
            address: None,
            write_data: &[],
            read_buf: buf,
        }
    }

    /// Create an addressed read command (e.g., READ)
    pub fn read(opcode: u8, addr: u32, buf: &'a mut [u8]) -> Self {
        Self {
            opcode,
            address: Some(addr),
            write_data: &[],
            read_buf: buf,
        }
    }

    /// Create an addressed write command (e.g., PP)
    pub fn write(opcode: u8, addr: u32, data: &'a [u8]) -> Self {
        Self {
            opcode,
            address: Some(addr),
            write_data: data,
            read_buf: &mut [],
        }
    }

    /// Create an addressed erase command with no data phase
    pub fn erase(opcode: u8, addr: u32) -> Self {
        Self {
            opcode,
            address: Some(addr),
            write_data: &[],
            read_buf: &mut [],
        }
    }
}

/// Encode a 24-bit address into its wire representation, MSB first
pub fn encode_addr(addr: u32, buf: &mut [u8; 3]) {
    buf[0] = (addr >> 16) as u8;
    buf[1] = (addr >> 8) as u8;
    buf[2] = addr as u8;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn addr_encoding_is_msb_first() {
        let mut buf = [0u8; 3];
        encode_addr(0x123456, &mut buf);
        assert_eq!(buf, [0x12, 0x34, 0x56]);

        encode_addr(0x001000, &mut buf);
        assert_eq!(buf, [0x00, 0x10, 0x00]);
    }

    #[test]
    fn simple_command_has_no_phases() {
        let cmd = SpiCommand::simple(0x06);
        assert_eq!(cmd.opcode, 0x06);
        assert!(cmd.address.is_none());
        assert!(cmd.write_data.is_empty());
        assert!(cmd.read_buf.is_empty());
    }
}
