//! Chip descriptors for the MX25 family
//!
//! A [`ChipInfo`] is an immutable record of identity bytes, capacity
//! geometry and operation-timing bounds for one chip variant in one power
//! mode. The caller supplies a descriptor at device initialization; the
//! driver only ever reads it. Two descriptors may exist per physical chip
//! model, one per power mode, differing only in timing.

use crate::spi::opcodes;

/// Maximum-duration bounds for the chip's internally timed operations, in
/// microseconds. Values come from the datasheet AC characteristics table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    /// Byte-Program max time
    pub byte_program_us: u32,
    /// Page Program max time
    pub page_program_us: u32,
    /// Sector Erase (4 KB) max time
    pub sector_erase_us: u32,
    /// 32 KB Block Erase max time
    pub block_erase_32k_us: u32,
    /// 64 KB Block Erase max time
    pub block_erase_64k_us: u32,
    /// Chip Erase max time
    pub chip_erase_us: u32,
    /// Status Register Write cycle max time
    pub status_register_write_us: u32,
    /// Fallback bound for operations without a published figure
    pub unknown_us: u32,
}

/// Identity, geometry and timing of one chip variant/power mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChipInfo {
    /// JEDEC manufacturer ID byte returned by RDID
    pub manufacturer_id: u8,
    /// Memory type byte returned by RDID
    pub memory_type: u8,
    /// Memory density byte returned by RDID
    pub memory_density: u8,
    /// Total capacity in bytes
    pub memory_size: u32,
    /// Program page size in bytes
    pub page_size: u32,
    /// Operation timing bounds
    pub timing: Timing,
    /// Human-readable model name
    pub name: &'static str,
}

impl ChipInfo {
    /// Maximum duration bound for one erase class, in microseconds.
    ///
    /// Unrecognized classes fall back to [`Timing::unknown_us`].
    pub const fn erase_max_time_us(&self, op: EraseOp) -> u32 {
        match op {
            EraseOp::Sector4K => self.timing.sector_erase_us,
            EraseOp::Block32K => self.timing.block_erase_32k_us,
            EraseOp::Block64K => self.timing.block_erase_64k_us,
            EraseOp::Chip => self.timing.chip_erase_us,
            EraseOp::Undefined => self.timing.unknown_us,
        }
    }
}

/// Erase granularity classes, each backed by its command opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EraseOp {
    /// No valid erase class selected
    Undefined,
    /// 4 KB sector erase (SE)
    Sector4K,
    /// 32 KB block erase (BE32K)
    Block32K,
    /// 64 KB block erase (BE64K)
    Block64K,
    /// Whole-chip erase (CE)
    Chip,
}

impl EraseOp {
    /// Command opcode for this erase class; `None` for [`EraseOp::Undefined`].
    pub const fn opcode(self) -> Option<u8> {
        match self {
            Self::Sector4K => Some(opcodes::SE),
            Self::Block32K => Some(opcodes::BE32K),
            Self::Block64K => Some(opcodes::BE64K),
            Self::Chip => Some(opcodes::CE),
            Self::Undefined => None,
        }
    }

    /// Canonical human-readable label for this erase class.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Sector4K => "4 KB",
            Self::Block32K => "32 KB",
            Self::Block64K => "64 KB",
            Self::Chip => "Entire Chip",
            Self::Undefined => "Undefined",
        }
    }

    /// Whether the erase command transmits a 3-byte address. Chip erase
    /// addresses the whole array and omits it.
    pub const fn takes_address(self) -> bool {
        matches!(self, Self::Sector4K | Self::Block32K | Self::Block64K)
    }
}

/// Fallback timing bound for operations without a published figure.
pub const UNKNOWN_TIMING_US: u32 = 5_000_000;

/// MX25R6435F in Ultra Low Power mode. Datasheet page 69.
pub const MX25R6435F_LOW_POWER: ChipInfo = ChipInfo {
    manufacturer_id: 0xC2,
    memory_type: 0x28,
    memory_density: 0x17,
    memory_size: 0x80_0000,
    page_size: 256,
    timing: Timing {
        byte_program_us: 100,
        page_program_us: 10_000,
        sector_erase_us: 240_000,
        block_erase_32k_us: 3_000_000,
        block_erase_64k_us: 3_500_000,
        chip_erase_us: 240_000_000,
        status_register_write_us: 30_000,
        unknown_us: UNKNOWN_TIMING_US,
    },
    name: "MX25R6435F",
};

/// MX25R6435F in High Performance mode. Identity and geometry match the
/// low-power descriptor; only the timing bounds tighten.
pub const MX25R6435F_HIGH_PERFORMANCE: ChipInfo = ChipInfo {
    manufacturer_id: 0xC2,
    memory_type: 0x28,
    memory_density: 0x17,
    memory_size: 0x80_0000,
    page_size: 256,
    timing: Timing {
        byte_program_us: 100,
        page_program_us: 10_000,
        sector_erase_us: 240_000,
        block_erase_32k_us: 1_500_000,
        block_erase_64k_us: 3_000_000,
        chip_erase_us: 150_000_000,
        status_register_write_us: 20_000,
        unknown_us: UNKNOWN_TIMING_US,
    },
    name: "MX25R6435F",
};
