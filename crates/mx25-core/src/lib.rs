//! mx25-core - Command-protocol driver for Macronix MX25 serial NOR flash
//!
//! This crate translates high-level storage operations (read, program,
//! erase, identify, configure) into the exact byte sequences an MX25-family
//! chip expects on its SPI bus, and decodes the chip's responses and status
//! flags into typed results. It is `no_std` compatible for use in embedded
//! environments.
//!
//! The physical transport (bus transfer primitives, chip-select/reset/
//! write-protect pin drivers, microsecond delay) is supplied by the host
//! platform through the [`Transport`] trait. The driver is synchronous and
//! blocking by contract: every operation runs its transport calls to
//! completion and returns a composed [`Status`].
//!
//! # Features
//!
//! - `std` - Enable standard library support (`std::error::Error` for
//!   [`Status`])
//!
//! # Example
//!
//! ```ignore
//! use mx25_core::{chip, Mx25, Pins};
//!
//! let pins = Pins { cs: 5, reset: 6, wp: 7 };
//! let (mut dev, status) =
//!     Mx25::init(transport, pins, 0xFF, Some(&chip::MX25R6435F_LOW_POWER));
//! assert!(!status.has_error());
//!
//! let id = dev.read_identification()?;
//! ```

#![no_std]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

#[cfg(any(test, feature = "std"))]
extern crate std;

pub mod chip;
pub mod driver;
pub mod regs;
pub mod spi;
pub mod status;
pub mod transport;

pub use chip::{ChipInfo, EraseOp, Timing};
pub use driver::{Identification, Mx25};
pub use status::{Result, Status};
pub use transport::{Pins, Transport};
