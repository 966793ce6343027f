//! Status-code domain shared by every chip operation.
//!
//! Operations that issue several transport calls merge each call's status
//! into one aggregate with bitwise OR and keep going, so a failing sub-step
//! marks the whole operation as failed without cutting the remaining calls
//! short. Error sub-kinds compose the [`Status::ERROR`] bit with one extra
//! discriminating bit, and callers test for failure with a single bitwise
//! AND rather than equality.

use bitflags::bitflags;
use core::fmt;

bitflags! {
    /// Composed result of one chip operation.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Status: u8 {
        /// The operation produced no transport traffic that reported back.
        const NOT_REPORTED = 1 << 0;
        /// Error bit, set in every failing status.
        const ERROR = 1 << 1;
        /// Successful completion.
        const OK = 1 << 2;
        /// Status-register polling exceeded the operation's timing bound.
        const TIMEOUT = 1 << 3 | Self::ERROR.bits();
        /// Identity bytes did not match the attached chip descriptor.
        const INCORRECT_IDS = 1 << 4 | Self::ERROR.bits();
        /// No chip descriptor is attached to the device handle.
        const INVALID_CHIP_DEF = 1 << 5 | Self::ERROR.bits();
        /// The operation is not implemented for this chip family.
        const UNSUPPORTED = 1 << 6 | Self::ERROR.bits();
    }
}

impl Status {
    /// Sentinel pre-operation state. Never returned as a final result of a
    /// successful transport exchange; it is the identity element of the
    /// OR-aggregation.
    pub const INIT: Status = Status::empty();

    /// True iff the error bit is set.
    pub const fn has_error(self) -> bool {
        self.bits() & Status::ERROR.bits() != 0
    }

    /// Fold an aggregate into a [`Result`], yielding `value` when no error
    /// bit accumulated.
    pub fn ok_or<T>(self, value: T) -> Result<T> {
        if self.has_error() {
            Err(self)
        } else {
            Ok(value)
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.contains(Status::INVALID_CHIP_DEF) {
            write!(f, "no valid chip definition attached")
        } else if self.contains(Status::INCORRECT_IDS) {
            write!(f, "identity bytes do not match chip definition")
        } else if self.contains(Status::TIMEOUT) {
            write!(f, "operation timed out")
        } else if self.contains(Status::UNSUPPORTED) {
            write!(f, "operation not supported")
        } else if self.has_error() {
            write!(f, "transport error")
        } else if self.contains(Status::OK) {
            write!(f, "ok")
        } else if self.contains(Status::NOT_REPORTED) {
            write!(f, "status not reported")
        } else {
            write!(f, "init")
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Status {}

/// Result type alias carrying the composed [`Status`] on failure.
pub type Result<T> = core::result::Result<T, Status>;
