//! mx25-dummy - In-memory MX25 flash emulator for testing
//!
//! Implements the driver's [`Transport`] capability on top of a byte
//! array, decoding the command stream byte-exactly: opcode, 3-byte
//! big-endian address, the fast-read dummy byte, data phases. Commands
//! with side effects (program, erase, WRSR) commit when chip-select
//! deasserts, matching the latch-on-CS-rising-edge behaviour of the real
//! parts. Useful for testing and development without hardware.

use log::{debug, warn};

use mx25_core::spi::opcodes;
use mx25_core::{Status, Transport};

/// Identity and geometry of the emulated chip.
#[derive(Debug, Clone)]
pub struct DummyConfig {
    /// RDID manufacturer byte
    pub manufacturer_id: u8,
    /// RDID memory type byte
    pub memory_type: u8,
    /// RDID memory density byte
    pub memory_density: u8,
    /// RES electronic signature byte
    pub electronic_id: u8,
    /// Array size in bytes
    pub size: usize,
    /// Program page size in bytes
    pub page_size: usize,
}

impl Default for DummyConfig {
    fn default() -> Self {
        // MX25R6435F
        Self {
            manufacturer_id: 0xC2,
            memory_type: 0x28,
            memory_density: 0x17,
            electronic_id: 0x16,
            size: 8 * 1024 * 1024,
            page_size: 256,
        }
    }
}

/// Pin-level call recorded by the emulator, in order of arrival.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinEvent {
    /// Chip-select driven to the given level
    Cs(bool),
    /// Reset driven to the given level
    Reset(bool),
    /// Write-protect driven to the given level
    Wp(bool),
}

/// In-memory flash emulator.
pub struct DummyFlash {
    config: DummyConfig,
    data: Vec<u8>,
    status_reg: u8,
    config_reg: u16,
    security_reg: u8,
    selected: bool,
    /// Opcode of the transaction in flight, while selected.
    current: Option<u8>,
    /// Operand bytes received since the opcode.
    operands: Vec<u8>,
    /// Read cursor for a data-read transaction in flight.
    read_pos: Option<usize>,
    pin_events: Vec<PinEvent>,
}

impl DummyFlash {
    /// Create an emulator with the given configuration, erased to 0xFF.
    pub fn new(config: DummyConfig) -> Self {
        let data = vec![0xFF; config.size];
        Self {
            config,
            data,
            status_reg: 0,
            config_reg: 0,
            security_reg: 0,
            selected: false,
            current: None,
            operands: Vec::new(),
            read_pos: None,
            pin_events: Vec::new(),
        }
    }

    /// Create an emulator with the default configuration (MX25R6435F).
    pub fn new_default() -> Self {
        Self::new(DummyConfig::default())
    }

    /// The emulated array contents.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Mutable access to the emulated array, for pre-seeding tests.
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Current status register value.
    pub fn status_reg(&self) -> u8 {
        self.status_reg
    }

    /// Current configuration register value.
    pub fn config_reg(&self) -> u16 {
        self.config_reg
    }

    /// The configuration this emulator was built with.
    pub fn config(&self) -> &DummyConfig {
        &self.config
    }

    /// Every pin-level call seen so far, in order.
    pub fn pin_events(&self) -> &[PinEvent] {
        &self.pin_events
    }

    fn write_enabled(&self) -> bool {
        self.status_reg & opcodes::SR_WEL != 0
    }

    fn clear_wel(&mut self) {
        self.status_reg &= !opcodes::SR_WEL;
    }

    fn operand_address(&self) -> Option<usize> {
        if self.operands.len() < 3 {
            return None;
        }
        Some(
            (self.operands[0] as usize) << 16
                | (self.operands[1] as usize) << 8
                | self.operands[2] as usize,
        )
    }

    /// Commit the transaction in flight. Runs on chip-select deassert;
    /// program/erase/WRSR take effect here and consume the WEL latch.
    fn commit(&mut self) {
        let Some(opcode) = self.current.take() else {
            return;
        };

        match opcode {
            opcodes::PP => {
                if !self.write_enabled() {
                    debug!("PP ignored: WEL not latched");
                    return;
                }
                let Some(addr) = self.operand_address() else {
                    warn!("PP without a full address");
                    return;
                };
                let payload = &self.operands[3..];
                if addr + payload.len() > self.data.len() {
                    warn!("PP beyond array end: {:06X}+{}", addr, payload.len());
                    return;
                }
                // Programming only clears bits.
                for (i, &byte) in payload.iter().enumerate() {
                    self.data[addr + i] &= byte;
                }
                self.clear_wel();
            }
            opcodes::SE => self.erase_block(4 * 1024),
            opcodes::BE32K => self.erase_block(32 * 1024),
            opcodes::BE64K => self.erase_block(64 * 1024),
            opcodes::CE => {
                if !self.write_enabled() {
                    debug!("CE ignored: WEL not latched");
                    return;
                }
                self.data.fill(0xFF);
                self.clear_wel();
            }
            opcodes::WRSR => {
                if !self.write_enabled() {
                    debug!("WRSR ignored: WEL not latched");
                    return;
                }
                if let Some(&sr) = self.operands.first() {
                    // WIP and WEL are read-only through WRSR.
                    self.status_reg =
                        sr & !(opcodes::SR_WIP | opcodes::SR_WEL);
                }
                if self.operands.len() >= 3 {
                    self.config_reg =
                        u16::from_le_bytes([self.operands[1], self.operands[2]]);
                }
                self.clear_wel();
            }
            _ => {}
        }
    }

    fn erase_block(&mut self, granularity: usize) {
        if !self.write_enabled() {
            debug!("erase ignored: WEL not latched");
            return;
        }
        let Some(addr) = self.operand_address() else {
            warn!("erase without a full address");
            return;
        };
        let start = addr & !(granularity - 1);
        if start + granularity > self.data.len() {
            warn!("erase beyond array end: {:06X}", start);
            return;
        }
        self.data[start..start + granularity].fill(0xFF);
        self.clear_wel();
    }

    /// Resolve the data cursor for a read-data transaction, consuming the
    /// address operands (and the dummy byte in fast mode) received so far.
    fn data_read_pos(&mut self, opcode: u8) -> Option<usize> {
        if let Some(pos) = self.read_pos {
            return Some(pos);
        }
        let expected = match opcode {
            opcodes::READ => 3,
            opcodes::FAST_READ => 4,
            _ => return None,
        };
        if self.operands.len() < expected {
            warn!("data read before full address/dummy phase");
            return None;
        }
        self.operand_address()
    }
}

impl Transport for DummyFlash {
    fn issue_command(&mut self, opcode: u8) -> Status {
        if !self.selected {
            warn!("opcode {:02X} issued while deselected", opcode);
            return Status::ERROR;
        }
        self.current = Some(opcode);
        self.operands.clear();
        self.read_pos = None;

        // Write-enable latching has no data phase; take effect directly.
        match opcode {
            opcodes::WREN => self.status_reg |= opcodes::SR_WEL,
            opcodes::WRDI => self.clear_wel(),
            _ => {}
        }
        Status::OK
    }

    fn read(&mut self, buf: &mut [u8]) -> Status {
        if !self.selected {
            return Status::ERROR;
        }
        let Some(opcode) = self.current else {
            return Status::ERROR;
        };

        match opcode {
            opcodes::RDID => {
                let id = [
                    self.config.manufacturer_id,
                    self.config.memory_type,
                    self.config.memory_density,
                ];
                let n = id.len().min(buf.len());
                buf[..n].copy_from_slice(&id[..n]);
                Status::OK
            }
            opcodes::RES => {
                if let Some(first) = buf.first_mut() {
                    *first = self.config.electronic_id;
                }
                Status::OK
            }
            opcodes::REMS => {
                // Manufacturer byte followed by the device ID byte.
                let id = [self.config.manufacturer_id, self.config.memory_density];
                let n = id.len().min(buf.len());
                buf[..n].copy_from_slice(&id[..n]);
                Status::OK
            }
            opcodes::RDSR => {
                if let Some(first) = buf.first_mut() {
                    *first = self.status_reg;
                }
                Status::OK
            }
            opcodes::RDCR => {
                let cr = self.config_reg.to_le_bytes();
                let n = cr.len().min(buf.len());
                buf[..n].copy_from_slice(&cr[..n]);
                Status::OK
            }
            opcodes::RDSCUR => {
                if let Some(first) = buf.first_mut() {
                    *first = self.security_reg;
                }
                Status::OK
            }
            opcodes::READ | opcodes::FAST_READ => {
                let Some(pos) = self.data_read_pos(opcode) else {
                    return Status::ERROR;
                };
                if pos + buf.len() > self.data.len() {
                    warn!("read beyond array end: {:06X}+{}", pos, buf.len());
                    return Status::ERROR;
                }
                buf.copy_from_slice(&self.data[pos..pos + buf.len()]);
                self.read_pos = Some(pos + buf.len());
                Status::OK
            }
            _ => {
                warn!("read phase for unhandled opcode {:02X}", opcode);
                Status::ERROR
            }
        }
    }

    fn write(&mut self, data: &[u8]) -> Status {
        if !self.selected || self.current.is_none() {
            return Status::ERROR;
        }
        self.operands.extend_from_slice(data);
        Status::OK
    }

    fn set_chip_select(&mut self, _pin: u8, active: bool) {
        self.pin_events.push(PinEvent::Cs(active));
        if active {
            self.selected = true;
            self.current = None;
            self.operands.clear();
            self.read_pos = None;
        } else {
            if self.selected {
                self.commit();
            }
            self.selected = false;
        }
    }

    fn set_reset(&mut self, _pin: u8, active: bool) {
        self.pin_events.push(PinEvent::Reset(active));
        if active {
            // Reset drops volatile state.
            self.clear_wel();
            self.current = None;
            self.selected = false;
        }
    }

    fn set_write_protect(&mut self, _pin: u8, active: bool) {
        self.pin_events.push(PinEvent::Wp(active));
    }

    fn delay_us(&mut self, _us: u32) {
        // Everything completes instantly in memory.
    }
}
