//! norlog-sim - In-memory W25Q64 behavioral model
//!
//! This crate provides a simulated flash chip that speaks the real
//! byte-exchange transport: it decodes opcode, address and data phases
//! from individual [`SpiBus::exchange`] calls, delimited by the
//! chip-select edges. It is useful for testing and for running the log
//! engine on a host without hardware.
//!
//! The model keeps the properties the storage stack depends on:
//! programming only clears bits, over-long page programs wrap within
//! the page, program/erase commands are ignored unless the
//! write-enable latch is set, and the busy flag stays set for a
//! configurable number of status polls after each program/erase.

use norlog_core::bus::SpiBus;
use norlog_core::error::Result;
use norlog_core::spi::opcodes;

/// Configuration for the simulated flash
#[derive(Debug, Clone)]
pub struct SimConfig {
    /// JEDEC manufacturer ID
    pub jedec_manufacturer: u8,
    /// JEDEC device ID
    pub jedec_device: u16,
    /// Flash size in bytes
    pub size: usize,
    /// Page size for programming
    pub page_size: usize,
    /// Sector size for the smallest erase
    pub sector_size: usize,
    /// Status polls that report busy after each program/erase
    pub busy_polls: u32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            jedec_manufacturer: norlog_core::device::JEDEC_MANUFACTURER,
            jedec_device: norlog_core::device::JEDEC_DEVICE,
            size: norlog_core::device::TOTAL_SIZE as usize,
            page_size: norlog_core::device::PAGE_SIZE,
            sector_size: norlog_core::device::SECTOR_SIZE as usize,
            busy_polls: 2,
        }
    }
}

/// Per-transaction decode state
#[derive(Debug, Clone, Copy)]
enum Xfer {
    /// Awaiting the opcode byte
    Opcode,
    /// Collecting the 3-byte address
    Address { opcode: u8, bytes: [u8; 3], have: u8 },
    /// Streaming the JEDEC ID out
    JedecId { index: usize },
    /// Answering status register reads
    Status,
    /// Streaming memory out
    ReadOut { addr: usize },
    /// Latching program data
    Program,
    /// Remainder of the transaction carries no information
    Discard,
}

/// Bytes latched by an in-flight page program, committed on deselect
struct PageLatch {
    start: u32,
    cursor: usize,
    data: Vec<(usize, u8)>,
}

/// Simulated W25Q64 flash chip
pub struct SimFlash {
    config: SimConfig,
    mem: Vec<u8>,
    selected: bool,
    state: Xfer,
    wel: bool,
    busy_left: u32,
    latch: Option<PageLatch>,
    armed_erase: Option<(u8, u32)>,
    page_programs: Vec<(u32, Vec<u8>)>,
}

impl SimFlash {
    /// Create a factory-fresh (all 0xFF) chip with the given configuration
    pub fn new(config: SimConfig) -> Self {
        let mem = vec![0xFF; config.size];
        Self {
            config,
            mem,
            selected: false,
            state: Xfer::Opcode,
            wel: false,
            busy_left: 0,
            latch: None,
            armed_erase: None,
            page_programs: Vec::new(),
        }
    }

    /// Create a factory-fresh W25Q64
    pub fn w25q64() -> Self {
        Self::new(SimConfig::default())
    }

    /// Create a chip pre-loaded with an image (padded with 0xFF)
    pub fn with_image(config: SimConfig, image: &[u8]) -> Self {
        let mut flash = Self::new(config);
        let len = image.len().min(flash.mem.len());
        flash.mem[..len].copy_from_slice(&image[..len]);
        flash
    }

    /// Current memory contents
    pub fn mem(&self) -> &[u8] {
        &self.mem
    }

    /// Mutable access to memory, for arranging test fixtures
    pub fn mem_mut(&mut self) -> &mut [u8] {
        &mut self.mem
    }

    /// The configuration in use
    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Trace of committed page programs: `(start_addr, data)` per
    /// program command, in the order the data bytes arrived
    pub fn page_programs(&self) -> &[(u32, Vec<u8>)] {
        &self.page_programs
    }

    /// Forget the recorded page programs
    pub fn clear_page_programs(&mut self) {
        self.page_programs.clear();
    }

    fn decode_opcode(&mut self, opcode: u8) {
        // While busy the device only answers status reads
        if self.busy_left > 0 && opcode != opcodes::RDSR {
            self.state = Xfer::Discard;
            return;
        }

        self.state = match opcode {
            opcodes::WREN => {
                self.wel = true;
                Xfer::Discard
            }
            opcodes::WRDI => {
                self.wel = false;
                Xfer::Discard
            }
            opcodes::RDSR => Xfer::Status,
            opcodes::RDID => Xfer::JedecId { index: 0 },
            opcodes::READ | opcodes::PP | opcodes::SE_20 | opcodes::BE_52 | opcodes::BE_D8 => {
                Xfer::Address {
                    opcode,
                    bytes: [0; 3],
                    have: 0,
                }
            }
            opcodes::CE_C7 => {
                self.armed_erase = Some((opcode, 0));
                Xfer::Discard
            }
            other => {
                log::debug!("sim: ignoring unknown opcode 0x{:02X}", other);
                Xfer::Discard
            }
        };
    }

    fn dispatch(&mut self, opcode: u8, addr: u32) -> Xfer {
        match opcode {
            opcodes::READ => Xfer::ReadOut { addr: addr as usize },
            opcodes::PP => {
                self.latch = Some(PageLatch {
                    start: addr,
                    cursor: addr as usize,
                    data: Vec::new(),
                });
                Xfer::Program
            }
            _ => {
                // Erase commands take effect on the deselect edge
                self.armed_erase = Some((opcode, addr));
                Xfer::Discard
            }
        }
    }

    fn commit(&mut self) {
        if let Some(latch) = self.latch.take() {
            if self.wel && !latch.data.is_empty() {
                for &(idx, byte) in &latch.data {
                    let i = idx % self.mem.len();
                    // Programming can only clear bits
                    self.mem[i] &= byte;
                }
                self.page_programs
                    .push((latch.start, latch.data.iter().map(|&(_, b)| b).collect()));
                self.wel = false;
                self.busy_left = self.config.busy_polls;
            }
        }

        if let Some((opcode, addr)) = self.armed_erase.take() {
            if self.wel {
                self.do_erase(opcode, addr);
                self.wel = false;
                self.busy_left = self.config.busy_polls;
            }
        }
    }

    fn do_erase(&mut self, opcode: u8, addr: u32) {
        let unit = match opcode {
            opcodes::SE_20 => self.config.sector_size,
            opcodes::BE_52 => 32 * 1024,
            opcodes::BE_D8 => 64 * 1024,
            opcodes::CE_C7 => {
                self.mem.fill(0xFF);
                return;
            }
            _ => return,
        };

        // The device ignores address bits below the erase unit
        let start = (addr as usize / unit) * unit;
        if start >= self.mem.len() {
            return;
        }
        let end = (start + unit).min(self.mem.len());
        self.mem[start..end].fill(0xFF);
    }
}

impl SpiBus for SimFlash {
    fn select(&mut self, active: bool) {
        if active {
            self.selected = true;
            self.state = Xfer::Opcode;
            return;
        }

        // Program and erase commands execute on the deselect edge
        if self.selected {
            self.commit();
        }
        self.selected = false;
        self.state = Xfer::Opcode;
    }

    fn exchange(&mut self, byte: u8) -> Result<u8> {
        if !self.selected {
            return Ok(0xFF);
        }

        match self.state {
            Xfer::Opcode => {
                self.decode_opcode(byte);
                Ok(0xFF)
            }
            Xfer::Address {
                opcode,
                mut bytes,
                have,
            } => {
                bytes[have as usize] = byte;
                if have == 2 {
                    let addr = ((bytes[0] as u32) << 16) | ((bytes[1] as u32) << 8) | bytes[2] as u32;
                    self.state = self.dispatch(opcode, addr);
                } else {
                    self.state = Xfer::Address {
                        opcode,
                        bytes,
                        have: have + 1,
                    };
                }
                Ok(0xFF)
            }
            Xfer::JedecId { index } => {
                let id = [
                    self.config.jedec_manufacturer,
                    (self.config.jedec_device >> 8) as u8,
                    self.config.jedec_device as u8,
                ];
                self.state = Xfer::JedecId {
                    index: (index + 1).min(2),
                };
                Ok(id[index.min(2)])
            }
            Xfer::Status => {
                let mut status = 0u8;
                if self.busy_left > 0 {
                    self.busy_left -= 1;
                    status |= 0x01;
                }
                if self.wel {
                    status |= 0x02;
                }
                Ok(status)
            }
            Xfer::ReadOut { addr } => {
                let out = self.mem[addr % self.mem.len()];
                self.state = Xfer::ReadOut { addr: addr + 1 };
                Ok(out)
            }
            Xfer::Program => {
                if let Some(latch) = self.latch.as_mut() {
                    latch.data.push((latch.cursor, byte));
                    // The physical part wraps within the page, never past it
                    let page = self.config.page_size;
                    let base = (latch.cursor / page) * page;
                    latch.cursor = base + ((latch.cursor - base + 1) % page);
                }
                Ok(0xFF)
            }
            Xfer::Discard => Ok(0xFF),
        }
    }

    fn delay_us(&mut self, _us: u32) {
        // No delay needed for in-memory operations
    }
}
