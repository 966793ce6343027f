//! 24-bit address encoding
//!
//! MX25 commands that carry an address transmit it as three bytes, most
//! significant first. Only 24 bits of the address reach the chip, which
//! bounds 3-byte-addressed SPI NOR parts at 16 MiB.

/// Split a 24-bit memory address into the three bytes transmitted on the
/// bus, MSB first.
pub const fn encode_address(addr: u32) -> [u8; 3] {
    [(addr >> 16) as u8, (addr >> 8) as u8, addr as u8]
}
