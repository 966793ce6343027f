//! The MX25 protocol driver
//!
//! Every operation follows the same bracketing discipline: assert
//! chip-select, issue the opcode, issue/read the operands, deassert
//! chip-select. Deassertion happens on every exit path so the bus is never
//! left held. Operations that issue several transport calls merge each
//! call's status with bitwise OR and keep going, so a failing sub-step
//! marks the whole operation as failed without cutting the remaining
//! transport calls short.

use log::{trace, warn};

use crate::chip::{ChipInfo, EraseOp};
use crate::regs::{ConfigRegister, StatusRegister};
use crate::spi::{encode_address, opcodes};
use crate::status::{Result, Status};
use crate::transport::{Pins, Transport};

/// Identity bytes returned by the RDID command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identification {
    /// JEDEC manufacturer ID
    pub manufacturer_id: u8,
    /// Memory type
    pub memory_type: u8,
    /// Memory density
    pub memory_density: u8,
}

/// Device handle for one MX25 chip.
///
/// The handle owns its transport and logical pin assignments and holds a
/// non-owning reference to the active [`ChipInfo`]. The descriptor may be
/// absent; the handle stays usable for identification retries, but every
/// capacity- or timing-dependent operation reports
/// [`Status::INVALID_CHIP_DEF`] until one is attached.
///
/// Operations on one handle must not overlap; concurrent use from several
/// execution contexts requires external mutual exclusion.
pub struct Mx25<'c, T: Transport> {
    transport: T,
    pins: Pins,
    dummy_byte: u8,
    chip: Option<&'c ChipInfo>,
}

impl<'c, T: Transport> Mx25<'c, T> {
    /// Initialize a device handle.
    ///
    /// Drives the chip-select, reset and write-protect lines to their
    /// inactive level exactly once each, regardless of descriptor
    /// validity. The returned status is [`Status::INVALID_CHIP_DEF`] when
    /// no descriptor is supplied and [`Status::OK`] otherwise; the handle
    /// is fully initialized either way and a descriptor can be attached
    /// later with [`Mx25::set_chip`].
    ///
    /// `dummy_byte` is the byte transmitted in dummy-cycle slots, such as
    /// the fast-read address-to-data gap.
    pub fn init(
        transport: T,
        pins: Pins,
        dummy_byte: u8,
        chip: Option<&'c ChipInfo>,
    ) -> (Self, Status) {
        let mut dev = Self {
            transport,
            pins,
            dummy_byte,
            chip,
        };
        dev.transport.set_chip_select(pins.cs, false);
        dev.transport.set_reset(pins.reset, false);
        dev.transport.set_write_protect(pins.wp, false);

        let status = if dev.chip.is_none() {
            Status::INVALID_CHIP_DEF
        } else {
            Status::OK
        };
        (dev, status)
    }

    /// Attach or replace the chip descriptor.
    pub fn set_chip(&mut self, chip: &'c ChipInfo) {
        self.chip = Some(chip);
    }

    /// The attached descriptor, or [`Status::INVALID_CHIP_DEF`].
    pub fn chip(&self) -> Result<&'c ChipInfo> {
        self.chip.ok_or(Status::INVALID_CHIP_DEF)
    }

    /// Consume the handle and hand the transport back.
    pub fn release(self) -> T {
        self.transport
    }

    /// Run one bracketed transaction: chip-select is asserted before `f`
    /// and deasserted afterwards on every path.
    fn select<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        let cs = self.pins.cs;
        self.transport.set_chip_select(cs, true);
        let out = f(self);
        self.transport.set_chip_select(cs, false);
        out
    }

    /// Issue RDID and compare the three identity bytes against the
    /// attached descriptor.
    ///
    /// The mismatch test deliberately keeps the long-standing behaviour of
    /// this driver family: [`Status::INCORRECT_IDS`] is reported only when
    /// the response differs from the descriptor in *every* field. A
    /// response matching any single field passes.
    pub fn read_identification(&mut self) -> Result<Identification> {
        let mut value = [0u8; 3];
        let status = self.select(|dev| {
            let mut status = Status::INIT;
            status |= dev.transport.issue_command(opcodes::RDID);
            status |= dev.transport.read(&mut value);
            status
        });

        let id = Identification {
            manufacturer_id: value[0],
            memory_type: value[1],
            memory_density: value[2],
        };
        trace!(
            "RDID: {:02X} {:02X} {:02X}",
            id.manufacturer_id,
            id.memory_type,
            id.memory_density
        );

        let chip = self.chip()?;
        if id.manufacturer_id != chip.manufacturer_id
            && id.memory_type != chip.memory_type
            && id.memory_density != chip.memory_density
        {
            warn!(
                "RDID mismatch: expected {:02X} {:02X} {:02X} for {}",
                chip.manufacturer_id, chip.memory_type, chip.memory_density, chip.name
            );
            return Err(Status::INCORRECT_IDS);
        }

        status.ok_or(id)
    }

    /// Issue RES and return the one-byte electronic signature.
    pub fn read_electronic_signature(&mut self) -> Result<u8> {
        let mut value = [0u8; 1];
        let status = self.select(|dev| {
            let mut status = Status::INIT;
            status |= dev.transport.issue_command(opcodes::RES);
            status |= dev.transport.read(&mut value);
            status
        });
        status.ok_or(value[0])
    }

    /// Issue REMS and return the manufacturer and device ID bytes.
    pub fn read_manufacturer_device_id(&mut self) -> Result<[u8; 2]> {
        let mut value = [0u8; 2];
        let status = self.select(|dev| {
            let mut status = Status::INIT;
            status |= dev.transport.issue_command(opcodes::REMS);
            status |= dev.transport.read(&mut value);
            status
        });
        status.ok_or(value)
    }

    /// Read the status register.
    pub fn read_status_register(&mut self) -> Result<StatusRegister> {
        let mut value = [0u8; 1];
        let status = self.select(|dev| {
            let mut status = Status::INIT;
            status |= dev.transport.issue_command(opcodes::RDSR);
            status |= dev.transport.read(&mut value);
            status
        });
        status.ok_or(StatusRegister::from_bits_retain(value[0]))
    }

    /// Read the two-byte configuration register.
    pub fn read_configuration_register(&mut self) -> Result<ConfigRegister> {
        let mut value = [0u8; 2];
        let status = self.select(|dev| {
            let mut status = Status::INIT;
            status |= dev.transport.issue_command(opcodes::RDCR);
            status |= dev.transport.read(&mut value);
            status
        });
        status.ok_or(ConfigRegister::from_bytes(value[0], value[1]))
    }

    /// Write the status register and both configuration bytes in one
    /// bracketed WRSR transaction. The chip expects WEL to be latched
    /// first; see [`Mx25::set_write_enable`].
    pub fn configure_chip(&mut self, status_register: u8, configuration_register: u16) -> Result<()> {
        let status = self.select(|dev| {
            let mut status = Status::INIT;
            status |= dev.transport.issue_command(opcodes::WRSR);
            status |= dev.transport.write(&[status_register]);
            status |= dev.transport.write(&configuration_register.to_le_bytes());
            status
        });
        status.ok_or(())
    }

    /// Issue WREN (`enable = true`) or WRDI (`enable = false`).
    pub fn set_write_enable(&mut self, enable: bool) -> Result<()> {
        let opcode = if enable { opcodes::WREN } else { opcodes::WRDI };
        let status = self.select(|dev| dev.transport.issue_command(opcode));
        status.ok_or(())
    }

    /// Read `buf.len()` bytes starting at the 24-bit `memory_address`.
    ///
    /// In fast mode the FAST_READ opcode is used and the configured dummy
    /// byte bridges the address-to-data gap; normal mode issues READ with
    /// no dummy byte.
    pub fn read_stored_data(
        &mut self,
        use_fast_mode: bool,
        memory_address: u32,
        buf: &mut [u8],
    ) -> Result<()> {
        let address = encode_address(memory_address);
        let dummy = self.dummy_byte;
        trace!(
            "read {} bytes @ {:06X} (fast={})",
            buf.len(),
            memory_address,
            use_fast_mode
        );
        let status = self.select(|dev| {
            let mut status = Status::INIT;
            let opcode = if use_fast_mode {
                opcodes::FAST_READ
            } else {
                opcodes::READ
            };
            status |= dev.transport.issue_command(opcode);
            status |= dev.transport.write(&address);
            if use_fast_mode {
                status |= dev.transport.write(&[dummy]);
            }
            status |= dev.transport.read(buf);
            status
        });
        status.ok_or(())
    }

    /// Program `data` starting at the 24-bit `memory_address` with a
    /// single PP command.
    ///
    /// The driver does not split or validate against the descriptor's
    /// page size; staying within one page is the caller's discipline. The
    /// chip expects WEL to be latched first.
    pub fn write_stored_data(&mut self, memory_address: u32, data: &[u8]) -> Result<()> {
        let address = encode_address(memory_address);
        trace!("program {} bytes @ {:06X}", data.len(), memory_address);
        let status = self.select(|dev| {
            let mut status = Status::INIT;
            status |= dev.transport.issue_command(opcodes::PP);
            status |= dev.transport.write(&address);
            status |= dev.transport.write(data);
            status
        });
        status.ok_or(())
    }

    /// Erase the region of the given class containing `memory_address`.
    ///
    /// Chip erase ignores the address and omits it from the command
    /// frame. [`EraseOp::Undefined`] performs no transport calls and
    /// returns the initial, non-error status; the permissive no-op is a
    /// deliberate policy of this driver family.
    pub fn erase(&mut self, erase_type: EraseOp, memory_address: u32) -> Result<()> {
        let Some(opcode) = erase_type.opcode() else {
            return Status::INIT.ok_or(());
        };

        let address = encode_address(memory_address);
        trace!(
            "erase {} @ {:06X}",
            erase_type.label(),
            memory_address
        );
        let status = self.select(|dev| {
            let mut status = Status::INIT;
            status |= dev.transport.issue_command(opcode);
            if erase_type.takes_address() {
                status |= dev.transport.write(&address);
            }
            status
        });
        status.ok_or(())
    }

    /// Read the security register.
    pub fn read_security_register(&mut self) -> Result<u8> {
        let mut value = [0u8; 1];
        let status = self.select(|dev| {
            let mut status = Status::INIT;
            status |= dev.transport.issue_command(opcodes::RDSCUR);
            status |= dev.transport.read(&mut value);
            status
        });
        status.ok_or(value[0])
    }

    /// Write the security register. Not implemented for this chip family:
    /// reports [`Status::UNSUPPORTED`] without touching the bus.
    pub fn write_security_register(&mut self, _value: u8) -> Result<()> {
        Err(Status::UNSUPPORTED)
    }

    /// Maximum duration bound for the given erase class, in microseconds,
    /// from the attached descriptor. Callers poll
    /// [`Mx25::read_status_register`] within this bound; the driver does
    /// not enforce it.
    pub fn erasure_max_time(&self, erase_type: EraseOp) -> Result<u32> {
        Ok(self.chip()?.erase_max_time_us(erase_type))
    }

    /// Poll the status register until the write-in-progress flag clears.
    ///
    /// Reads RDSR up to `timeout_us / poll_us` times, delaying `poll_us`
    /// between polls, and reports [`Status::TIMEOUT`] when the bound
    /// elapses with WIP still set. Pick `timeout_us` from
    /// [`Mx25::erasure_max_time`] or the descriptor's program/write
    /// bounds.
    pub fn wait_while_busy(&mut self, poll_us: u32, timeout_us: u32) -> Result<()> {
        let max_polls = if poll_us > 0 {
            timeout_us / poll_us
        } else {
            timeout_us
        };

        for _ in 0..max_polls {
            let sr = self.read_status_register()?;
            if !sr.write_in_progress() {
                return Ok(());
            }
            if poll_us > 0 {
                self.transport.delay_us(poll_us);
            }
        }

        Err(Status::TIMEOUT)
    }

    /// Drive the reset line. `active = true` means the hardware-active
    /// (low) level.
    pub fn set_reset(&mut self, active: bool) {
        let pin = self.pins.reset;
        self.transport.set_reset(pin, active);
    }

    /// Drive the hardware write-protect line. `active = true` means the
    /// hardware-active (low) level.
    pub fn set_write_protect(&mut self, active: bool) {
        let pin = self.pins.wp;
        self.transport.set_write_protect(pin, active);
    }

    /// Ask the transport whether its backing implementation is present.
    pub fn probe_link(&mut self) -> bool {
        self.transport.link_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chip::MX25R6435F_LOW_POWER;
    use std::collections::VecDeque;
    use std::vec;
    use std::vec::Vec;

    const PINS: Pins = Pins {
        cs: 1,
        reset: 2,
        wp: 3,
    };
    const DUMMY: u8 = 0xA5;

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Event {
        Command(u8),
        Write(Vec<u8>),
        Read(usize),
        Cs(bool),
        Reset(bool),
        Wp(bool),
        Delay(u32),
    }

    /// Recording transport with scripted responses and per-call statuses.
    struct Mock {
        events: Vec<Event>,
        /// Responses popped per read call; empty buffers when exhausted.
        reads: VecDeque<Vec<u8>>,
        /// Statuses popped per issue_command call; OK when exhausted.
        command_statuses: VecDeque<Status>,
        /// Statuses popped per write call; OK when exhausted.
        write_statuses: VecDeque<Status>,
    }

    impl Mock {
        fn new() -> Self {
            Self {
                events: Vec::new(),
                reads: VecDeque::new(),
                command_statuses: VecDeque::new(),
                write_statuses: VecDeque::new(),
            }
        }

        fn with_reads(reads: &[&[u8]]) -> Self {
            let mut mock = Self::new();
            mock.reads = reads.iter().map(|r| r.to_vec()).collect();
            mock
        }
    }

    impl Transport for Mock {
        fn issue_command(&mut self, opcode: u8) -> Status {
            self.events.push(Event::Command(opcode));
            self.command_statuses.pop_front().unwrap_or(Status::OK)
        }

        fn read(&mut self, buf: &mut [u8]) -> Status {
            self.events.push(Event::Read(buf.len()));
            if let Some(data) = self.reads.pop_front() {
                let n = data.len().min(buf.len());
                buf[..n].copy_from_slice(&data[..n]);
            }
            Status::OK
        }

        fn write(&mut self, data: &[u8]) -> Status {
            self.events.push(Event::Write(data.to_vec()));
            self.write_statuses.pop_front().unwrap_or(Status::OK)
        }

        fn set_chip_select(&mut self, pin: u8, active: bool) {
            assert_eq!(pin, PINS.cs);
            self.events.push(Event::Cs(active));
        }

        fn set_reset(&mut self, pin: u8, active: bool) {
            assert_eq!(pin, PINS.reset);
            self.events.push(Event::Reset(active));
        }

        fn set_write_protect(&mut self, pin: u8, active: bool) {
            assert_eq!(pin, PINS.wp);
            self.events.push(Event::Wp(active));
        }

        fn delay_us(&mut self, us: u32) {
            self.events.push(Event::Delay(us));
        }
    }

    fn init(mock: Mock) -> Mx25<'static, Mock> {
        let (dev, status) = Mx25::init(mock, PINS, DUMMY, Some(&MX25R6435F_LOW_POWER));
        assert_eq!(status, Status::OK);
        dev
    }

    #[test]
    fn init_drives_all_pins_inactive_once() {
        let (dev, status) = Mx25::init(Mock::new(), PINS, DUMMY, None);
        assert_eq!(status, Status::INVALID_CHIP_DEF);
        let events = dev.release().events;
        assert_eq!(
            events,
            vec![Event::Cs(false), Event::Reset(false), Event::Wp(false)]
        );
    }

    #[test]
    fn init_with_descriptor_reports_ok() {
        let (dev, status) = Mx25::init(Mock::new(), PINS, DUMMY, Some(&MX25R6435F_LOW_POWER));
        assert_eq!(status, Status::OK);
        assert_eq!(dev.chip().unwrap().name, "MX25R6435F");
    }

    #[test]
    fn descriptor_can_be_attached_later() {
        let (mut dev, status) = Mx25::init(Mock::new(), PINS, DUMMY, None);
        assert_eq!(status, Status::INVALID_CHIP_DEF);
        assert_eq!(dev.chip(), Err(Status::INVALID_CHIP_DEF));
        dev.set_chip(&MX25R6435F_LOW_POWER);
        assert!(dev.chip().is_ok());
    }

    #[test]
    fn fast_read_frame_is_byte_exact() {
        let mut dev = init(Mock::with_reads(&[&[0u8; 8]]));
        let mut buf = [0u8; 8];
        dev.read_stored_data(true, 0x001234, &mut buf).unwrap();

        let events = &dev.release().events[3..];
        assert_eq!(
            events,
            &[
                Event::Cs(true),
                Event::Command(opcodes::FAST_READ),
                Event::Write(vec![0x00, 0x12, 0x34]),
                Event::Write(vec![DUMMY]),
                Event::Read(8),
                Event::Cs(false),
            ]
        );
    }

    #[test]
    fn normal_read_omits_the_dummy_byte() {
        let mut dev = init(Mock::with_reads(&[&[0u8; 4]]));
        let mut buf = [0u8; 4];
        dev.read_stored_data(false, 0xABCDEF, &mut buf).unwrap();

        let events = &dev.release().events[3..];
        assert_eq!(
            events,
            &[
                Event::Cs(true),
                Event::Command(opcodes::READ),
                Event::Write(vec![0xAB, 0xCD, 0xEF]),
                Event::Read(4),
                Event::Cs(false),
            ]
        );
    }

    #[test]
    fn page_program_frame() {
        let mut dev = init(Mock::new());
        dev.write_stored_data(0x010000, &[0xDE, 0xAD]).unwrap();

        let events = &dev.release().events[3..];
        assert_eq!(
            events,
            &[
                Event::Cs(true),
                Event::Command(opcodes::PP),
                Event::Write(vec![0x01, 0x00, 0x00]),
                Event::Write(vec![0xDE, 0xAD]),
                Event::Cs(false),
            ]
        );
    }

    #[test]
    fn sector_erase_transmits_the_address() {
        let mut dev = init(Mock::new());
        dev.erase(EraseOp::Sector4K, 0x002000).unwrap();

        let events = &dev.release().events[3..];
        assert_eq!(
            events,
            &[
                Event::Cs(true),
                Event::Command(opcodes::SE),
                Event::Write(vec![0x00, 0x20, 0x00]),
                Event::Cs(false),
            ]
        );
    }

    #[test]
    fn chip_erase_omits_the_address() {
        let mut dev = init(Mock::new());
        dev.erase(EraseOp::Chip, 0x002000).unwrap();

        let events = &dev.release().events[3..];
        assert_eq!(
            events,
            &[
                Event::Cs(true),
                Event::Command(opcodes::CE),
                Event::Cs(false),
            ]
        );
    }

    #[test]
    fn undefined_erase_is_a_silent_no_op() {
        let mut dev = init(Mock::new());
        assert_eq!(dev.erase(EraseOp::Undefined, 0x002000), Ok(()));
        // No transport traffic beyond init.
        assert_eq!(dev.release().events.len(), 3);
    }

    #[test]
    fn identification_matching_descriptor_passes() {
        let mut dev = init(Mock::with_reads(&[&[0xC2, 0x28, 0x17]]));
        let id = dev.read_identification().unwrap();
        assert_eq!(id.manufacturer_id, 0xC2);
        assert_eq!(id.memory_type, 0x28);
        assert_eq!(id.memory_density, 0x17);
    }

    #[test]
    fn identification_differing_in_all_fields_is_flagged() {
        let mut dev = init(Mock::with_reads(&[&[0xEF, 0x40, 0x18]]));
        assert_eq!(dev.read_identification(), Err(Status::INCORRECT_IDS));
    }

    #[test]
    fn identification_differing_in_one_field_passes() {
        // Only the density byte differs; the historical AND-of-inequality
        // check does not flag a partial mismatch.
        let mut dev = init(Mock::with_reads(&[&[0xC2, 0x28, 0x99]]));
        assert!(dev.read_identification().is_ok());
    }

    #[test]
    fn identification_without_descriptor_fails_after_the_transaction() {
        let (mut dev, _) = Mx25::init(
            Mock::with_reads(&[&[0xC2, 0x28, 0x17]]),
            PINS,
            DUMMY,
            None,
        );
        assert_eq!(dev.read_identification(), Err(Status::INVALID_CHIP_DEF));
        // The RDID exchange still ran, bracketed by CS.
        let events = &dev.release().events[3..];
        assert_eq!(events.first(), Some(&Event::Cs(true)));
        assert_eq!(events.last(), Some(&Event::Cs(false)));
    }

    #[test]
    fn configure_chip_aggregates_and_continues_on_failure() {
        let mut mock = Mock::new();
        // First data write fails; the configuration write must still run.
        mock.write_statuses.push_back(Status::ERROR);
        let mut dev = init(mock);

        let result = dev.configure_chip(0x42, 0x4802);
        assert!(result.is_err());
        assert!(result.unwrap_err().has_error());

        let events = &dev.release().events[3..];
        assert_eq!(
            events,
            &[
                Event::Cs(true),
                Event::Command(opcodes::WRSR),
                Event::Write(vec![0x42]),
                Event::Write(vec![0x02, 0x48]),
                Event::Cs(false),
            ]
        );
    }

    #[test]
    fn failing_command_still_deasserts_chip_select() {
        let mut mock = Mock::new();
        mock.command_statuses.push_back(Status::ERROR);
        let mut dev = init(mock);

        assert!(dev.set_write_enable(true).is_err());
        let events = dev.release().events;
        assert_eq!(events.last(), Some(&Event::Cs(false)));
    }

    #[test]
    fn write_enable_and_disable_opcodes() {
        let mut dev = init(Mock::new());
        dev.set_write_enable(true).unwrap();
        dev.set_write_enable(false).unwrap();

        let events = &dev.release().events[3..];
        assert_eq!(
            events,
            &[
                Event::Cs(true),
                Event::Command(opcodes::WREN),
                Event::Cs(false),
                Event::Cs(true),
                Event::Command(opcodes::WRDI),
                Event::Cs(false),
            ]
        );
    }

    #[test]
    fn electronic_signature_returns_the_data_byte() {
        let mut dev = init(Mock::with_reads(&[&[0x16]]));
        assert_eq!(dev.read_electronic_signature(), Ok(0x16));
    }

    #[test]
    fn status_register_is_typed() {
        let mut dev = init(Mock::with_reads(&[&[0x03]]));
        let sr = dev.read_status_register().unwrap();
        assert!(sr.write_in_progress());
        assert!(sr.write_enable_latch());
    }

    #[test]
    fn configuration_register_is_assembled_in_wire_order() {
        let mut dev = init(Mock::with_reads(&[&[0x02, 0x48]]));
        let cr = dev.read_configuration_register().unwrap();
        assert_eq!(cr.bits(), 0x4802);
        assert!(cr.dummy_cycle());
    }

    #[test]
    fn write_security_register_is_unsupported_and_silent() {
        let mut dev = init(Mock::new());
        assert_eq!(dev.write_security_register(0xFF), Err(Status::UNSUPPORTED));
        assert_eq!(dev.release().events.len(), 3);
    }

    #[test]
    fn erasure_max_time_requires_a_descriptor() {
        let (dev, _) = Mx25::init(Mock::new(), PINS, DUMMY, None);
        assert_eq!(
            dev.erasure_max_time(EraseOp::Sector4K),
            Err(Status::INVALID_CHIP_DEF)
        );

        let dev = init(Mock::new());
        assert_eq!(
            dev.erasure_max_time(EraseOp::Sector4K),
            Ok(MX25R6435F_LOW_POWER.timing.sector_erase_us)
        );
        assert_eq!(
            dev.erasure_max_time(EraseOp::Undefined),
            Ok(MX25R6435F_LOW_POWER.timing.unknown_us)
        );
    }

    #[test]
    fn wait_while_busy_returns_once_wip_clears() {
        let mut dev = init(Mock::with_reads(&[&[0x01], &[0x01], &[0x00]]));
        dev.wait_while_busy(10, 1_000).unwrap();

        let delays: Vec<_> = dev
            .release()
            .events
            .iter()
            .filter(|e| matches!(e, Event::Delay(_)))
            .cloned()
            .collect();
        assert_eq!(delays, vec![Event::Delay(10), Event::Delay(10)]);
    }

    #[test]
    fn wait_while_busy_times_out() {
        let mut dev = init(Mock::with_reads(&[&[0x01], &[0x01], &[0x01]]));
        assert_eq!(dev.wait_while_busy(10, 30), Err(Status::TIMEOUT));
    }
}
