//! Typed views of the status and configuration registers
//!
//! RDSR returns one status byte; RDCR returns two configuration bytes.
//! These wrappers keep the raw bits available while naming the fields the
//! rest of the code cares about.

use bitflags::bitflags;

use crate::spi::opcodes;

bitflags! {
    /// Status register bits (RDSR).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct StatusRegister: u8 {
        /// Write In Progress: a program/erase/WRSR cycle is ongoing
        const WIP = opcodes::SR_WIP;
        /// Write Enable Latch: a WREN has been latched and not yet consumed
        const WEL = opcodes::SR_WEL;
        /// Block Protect bit 0
        const BP0 = 1 << 2;
        /// Block Protect bit 1
        const BP1 = 1 << 3;
        /// Block Protect bit 2
        const BP2 = 1 << 4;
        /// Block Protect bit 3
        const BP3 = 1 << 5;
        /// Quad Enable
        const QE = opcodes::SR_QE;
        /// Status Register Write Disable
        const SRWD = opcodes::SR_SRWD;
    }
}

impl StatusRegister {
    /// True while a program/erase/write-status cycle is ongoing.
    pub const fn write_in_progress(self) -> bool {
        self.bits() & opcodes::SR_WIP != 0
    }

    /// True when the write-enable latch is set.
    pub const fn write_enable_latch(self) -> bool {
        self.bits() & opcodes::SR_WEL != 0
    }

    /// Block-protect level (0..=15) selecting how much of the address
    /// space is protected from program/erase.
    pub const fn block_protect_level(self) -> u8 {
        (self.bits() & opcodes::SR_BP_MASK) >> opcodes::SR_BP_POS
    }

    /// True when status-register writes are hardware-disabled.
    pub const fn status_write_disabled(self) -> bool {
        self.bits() & opcodes::SR_SRWD != 0
    }
}

/// Configuration register (RDCR), two bytes wide.
///
/// The wire order is low byte first; [`ConfigRegister::from_bytes`] takes
/// the bytes in the order they are clocked in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConfigRegister(u16);

impl ConfigRegister {
    /// Assemble from the two bytes in wire order.
    pub const fn from_bytes(low: u8, high: u8) -> Self {
        Self((high as u16) << 8 | low as u16)
    }

    /// Raw 16-bit value.
    pub const fn bits(self) -> u16 {
        self.0
    }

    /// Dummy Cycle configuration bit.
    pub const fn dummy_cycle(self) -> bool {
        self.0 & opcodes::CR_DC != 0
    }

    /// True when the block-protect area grows from the bottom of the
    /// array instead of the top.
    pub const fn bottom_protect(self) -> bool {
        self.0 & opcodes::CR_TB != 0
    }

    /// Low Power / High Performance switch: true in high-performance mode.
    pub const fn high_performance(self) -> bool {
        self.0 & opcodes::CR_LH != 0
    }
}
