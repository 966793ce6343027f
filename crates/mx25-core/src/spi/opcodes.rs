//! MX25-family SPI flash command opcodes and register bit definitions
//!
//! Opcode values follow the MX25R6435F datasheet command tables; most are
//! the common JEDEC assignments shared across 25-series SPI NOR chips.

// ============================================================================
// Read commands
// ============================================================================

/// Read Data (normal mode, no dummy byte)
pub const READ: u8 = 0x03;
/// Fast Read (one dummy byte between address and data)
pub const FAST_READ: u8 = 0x0B;
/// Dual Output Read (1-1-2)
pub const DOR: u8 = 0x3B;
/// Dual I/O Read (1-2-2)
pub const DIOR: u8 = 0xBB;
/// Quad Output Read (1-1-4)
pub const QOR: u8 = 0x6B;
/// Quad I/O Read (1-4-4)
pub const QIOR: u8 = 0xEB;

// ============================================================================
// Program and erase
// ============================================================================

/// Page Program
pub const PP: u8 = 0x02;
/// Quad Page Program (4-line data phase)
pub const QPP: u8 = 0x38;
/// Sector Erase (4 KB)
pub const SE: u8 = 0x20;
/// Block Erase (32 KB)
pub const BE32K: u8 = 0x52;
/// Block Erase (64 KB)
pub const BE64K: u8 = 0xD8;
/// Chip Erase (alternate opcode 0xC7)
pub const CE: u8 = 0x60;

// ============================================================================
// Write control and registers
// ============================================================================

/// Write Enable - latches WEL before any program/erase/WRSR
pub const WREN: u8 = 0x06;
/// Write Disable - clears the WEL bit
pub const WRDI: u8 = 0x04;
/// Read Status Register
pub const RDSR: u8 = 0x05;
/// Read Configuration Register (two bytes)
pub const RDCR: u8 = 0x15;
/// Write Status Register (status byte plus two configuration bytes)
pub const WRSR: u8 = 0x01;

// ============================================================================
// Identification
// ============================================================================

/// Read Identification (manufacturer, memory type, memory density)
pub const RDID: u8 = 0x9F;
/// Read Electronic Signature / Release from Deep Power Down
pub const RES: u8 = 0xAB;
/// Read Electronic Manufacturer and Device ID
pub const REMS: u8 = 0x90;
/// Read SFDP (JEDEC JESD216)
pub const RDSFDP: u8 = 0x5A;

// ============================================================================
// Security registers and secured OTP
// ============================================================================

/// Read Security Register
pub const RDSCUR: u8 = 0x2B;
/// Write Security Register
pub const WRSCUR: u8 = 0x2F;
/// Enter Secured OTP
pub const ENSO: u8 = 0xB1;
/// Exit Secured OTP
pub const EXSO: u8 = 0xC1;

// ============================================================================
// Power management and mode control
// ============================================================================

/// Deep Power Down
pub const DP: u8 = 0xB9;
/// Set Burst Length
pub const SBL: u8 = 0xC0;
/// Program/Erase Suspend (alternate opcode 0xB0)
pub const SUSPEND: u8 = 0x75;
/// Program/Erase Resume (alternate opcode 0x30)
pub const RESUME: u8 = 0x7A;

// ============================================================================
// Status register bit definitions
// ============================================================================

/// Status register: Write In Progress
pub const SR_WIP: u8 = 1 << 0;
/// Status register: Write Enable Latch
pub const SR_WEL: u8 = 1 << 1;
/// Status register: Block Protect field mask (BP3..BP0)
pub const SR_BP_MASK: u8 = 0x0F << 2;
/// Status register: Block Protect field position
pub const SR_BP_POS: u8 = 2;
/// Status register: Quad Enable
pub const SR_QE: u8 = 1 << 6;
/// Status register: Status Register Write Disable
pub const SR_SRWD: u8 = 1 << 7;

// ============================================================================
// Configuration register bit definitions (16-bit view, low byte first)
// ============================================================================

/// Configuration register: Dummy Cycle
pub const CR_DC: u16 = 1 << 14;
/// Configuration register: Top/Bottom protect selection
pub const CR_TB: u16 = 1 << 11;
/// Configuration register: Low Power / High Performance switch
pub const CR_LH: u16 = 1 << 1;
