//! Register write transport.
//!
//! `RegisterPort` is the seam between the driver's composite operations
//! (voice program, key-on, key-off, velocity) and whatever carries a single
//! register write to the chip:
//!
//! - `ParallelBus`: bit-banged 8-bit parallel bus over `embedded-hal` pins,
//!   with the chip's write timing
//! - `RecordingPort` (feature `std`): keeps the writes in memory, for tests
//!   and offline rendering
//!
//! A port performs one complete transaction per `write` call. The driver
//! never interleaves two transactions, and holding the driver by `&mut`
//! is the only way to reach its port.

pub mod parallel;
#[cfg(any(test, feature = "std"))]
pub mod recording;

pub use parallel::{ControlPins, DataBus, ParallelBus, PinDataBus};
#[cfg(any(test, feature = "std"))]
pub use recording::RecordingPort;

use crate::chip::registers::RegisterWrite;
use crate::error::BusError;

/// Default settle time around every strobe edge, in nanoseconds.
pub const DEFAULT_SETTLE_NS: u32 = 25_000;

/// Default hold time for each level of the reset pulse, in nanoseconds.
pub const DEFAULT_RESET_NS: u32 = 25_000;

/// Timing constants for the parallel bus.
///
/// `settle_ns` must cover the chip's minimum write recovery time at the
/// master clock in use; slower clocks or other chip revisions may need a
/// longer value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BusTiming {
    /// Hold time after asserting and after releasing a strobe.
    pub settle_ns: u32,
    /// Hold time for each level of the IC (reset) pulse.
    pub reset_ns: u32,
}

impl Default for BusTiming {
    fn default() -> Self {
        Self {
            settle_ns: DEFAULT_SETTLE_NS,
            reset_ns: DEFAULT_RESET_NS,
        }
    }
}

impl BusTiming {
    pub fn from_micros(settle_us: u32, reset_us: u32) -> Self {
        Self {
            settle_ns: settle_us.saturating_mul(1_000),
            reset_ns: reset_us.saturating_mul(1_000),
        }
    }
}

/// Carries register writes to the chip.
pub trait RegisterPort {
    /// Perform one complete address + data transaction.
    ///
    /// When this returns the bus is idle and ready for the next write.
    fn write(&mut self, write: RegisterWrite) -> Result<(), BusError>;

    /// Hardware-reset the chip. Ports without a reset line do nothing.
    fn reset(&mut self) -> Result<(), BusError> {
        Ok(())
    }
}

impl<P: RegisterPort + ?Sized> RegisterPort for &mut P {
    fn write(&mut self, write: RegisterWrite) -> Result<(), BusError> {
        (**self).write(write)
    }

    fn reset(&mut self) -> Result<(), BusError> {
        (**self).reset()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timing_from_micros() {
        assert_eq!(BusTiming::from_micros(25, 25), BusTiming::default());
        assert_eq!(BusTiming::from_micros(u32::MAX, 1).settle_ns, u32::MAX);
    }

    #[test]
    fn test_port_through_mutable_reference() {
        let mut port = RecordingPort::new();
        let mut borrowed = &mut port;
        RegisterPort::write(&mut borrowed, RegisterWrite::global(0x22, 0x08)).unwrap();
        RegisterPort::reset(&mut borrowed).unwrap();
        assert_eq!(port.writes(), &[RegisterWrite::global(0x22, 0x08)]);
        assert_eq!(port.resets(), 1);
    }
}
