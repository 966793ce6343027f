//! SPI command-stream building blocks: opcodes, register bit positions and
//! address encoding.

mod address;
pub mod opcodes;

pub use address::encode_address;
