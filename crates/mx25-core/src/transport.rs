//! Platform capability seam
//!
//! The driver consumes the physical transport through [`Transport`]: bus
//! transfer primitives, pin drivers for the chip-select, reset and
//! write-protect lines, and a blocking microsecond delay. An implementation
//! owns whatever bus handle or platform context it needs; the driver only
//! forwards logical pin identifiers from [`Pins`].
//!
//! Supplying the trait at construction replaces the link-time weak-hook
//! scheme some platforms use: a missing capability set is a compile error,
//! never a runtime sentinel.

use crate::status::Status;

/// Logical pin assignments for one device. Opaque to the driver and
/// interpreted by the [`Transport`] implementation, so several device
/// handles can share one physical bus with distinct chip-select lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pins {
    /// Chip-select line
    pub cs: u8,
    /// Reset line
    pub reset: u8,
    /// Hardware write-protect line
    pub wp: u8,
}

/// Bus and pin primitives supplied by the host platform.
///
/// The transfer primitives return a [`Status`] instead of a `Result` so a
/// failing sub-step can be folded into an operation's aggregate with
/// bitwise OR without aborting the remaining calls of the transaction.
///
/// All methods are synchronous and blocking; scheduling is entirely the
/// caller's concern.
pub trait Transport {
    /// Transmit one opcode byte.
    fn issue_command(&mut self, opcode: u8) -> Status;

    /// Clock `buf.len()` bytes in from the bus.
    fn read(&mut self, buf: &mut [u8]) -> Status;

    /// Clock `data.len()` bytes out on the bus.
    fn write(&mut self, data: &[u8]) -> Status;

    /// Drive the chip-select line. `active = true` means the
    /// hardware-active (low) level.
    fn set_chip_select(&mut self, pin: u8, active: bool);

    /// Drive the reset line. `active = true` means the hardware-active
    /// (low) level.
    fn set_reset(&mut self, pin: u8, active: bool);

    /// Drive the write-protect line. `active = true` means the
    /// hardware-active (low) level.
    fn set_write_protect(&mut self, pin: u8, active: bool);

    /// Busy-wait for the given number of microseconds.
    fn delay_us(&mut self, us: u32);

    /// Diagnostic probe for transports that bridge to a foreign backend
    /// (FFI, separately linked firmware). A bridge should override this to
    /// report whether the backing implementation is actually present.
    fn link_ok(&mut self) -> bool {
        true
    }
}

// Allow passing `&mut T` where a transport is expected, so tests and
// callers can keep ownership of the transport across driver calls.
impl<T: Transport + ?Sized> Transport for &mut T {
    fn issue_command(&mut self, opcode: u8) -> Status {
        (**self).issue_command(opcode)
    }

    fn read(&mut self, buf: &mut [u8]) -> Status {
        (**self).read(buf)
    }

    fn write(&mut self, data: &[u8]) -> Status {
        (**self).write(data)
    }

    fn set_chip_select(&mut self, pin: u8, active: bool) {
        (**self).set_chip_select(pin, active)
    }

    fn set_reset(&mut self, pin: u8, active: bool) {
        (**self).set_reset(pin, active)
    }

    fn set_write_protect(&mut self, pin: u8, active: bool) {
        (**self).set_write_protect(pin, active)
    }

    fn delay_us(&mut self, us: u32) {
        (**self).delay_us(us)
    }

    fn link_ok(&mut self) -> bool {
        (**self).link_ok()
    }
}
