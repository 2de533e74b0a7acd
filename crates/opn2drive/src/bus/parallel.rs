//! Bit-banged parallel bus.
//!
//! The YM2612 latches a register address and then its data through the same
//! 8-bit bus. Each phase is one strobe: A0 selects address (low) or data
//! (high), A1 selects the port, and CS/WR (both active low) latch the byte.
//! The chip needs a minimum recovery time after every strobe; this bus
//! busy-waits for `BusTiming::settle_ns` around each edge instead of polling
//! the busy flag, so it never needs the read strobe.
//!
//! Write sequence:
//!
//! | step | A1   | A0 | D7..D0  | CS/WR         |
//! |------|------|----|---------|---------------|
//! | 1    | port | 0  |         |               |
//! | 2    |      |    | address |               |
//! | 3    |      |    |         | low, settle, high |
//! | 4    |      | 1  | data    | settle        |
//! | 5    |      |    |         | low, settle, high |
//! | 6    |      |    |         | settle (idle) |

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{OutputPin, PinState};

use super::{BusTiming, RegisterPort};
use crate::chip::registers::{Port, RegisterWrite};
use crate::error::BusError;

/// 8-bit output bus.
pub trait DataBus {
    /// Drive `byte` onto D7..D0.
    fn write_byte(&mut self, byte: u8) -> Result<(), BusError>;
}

/// `DataBus` over eight individual pins, D0 (LSB) first.
pub struct PinDataBus<P> {
    pins: [P; 8],
}

impl<P: OutputPin> PinDataBus<P> {
    pub fn new(pins: [P; 8]) -> Self {
        Self { pins }
    }

    pub fn release(self) -> [P; 8] {
        self.pins
    }
}

impl<P: OutputPin> DataBus for PinDataBus<P> {
    fn write_byte(&mut self, byte: u8) -> Result<(), BusError> {
        for (bit, pin) in self.pins.iter_mut().enumerate() {
            pin.set_state(PinState::from((byte >> bit) & 1 == 1))
                .map_err(|_| BusError::DataBus)?;
        }
        Ok(())
    }
}

/// Control lines of the chip.
///
/// `cs`, `wr`, `rd` and `ic` are active low. `a0` selects address (low) or
/// data (high); `a1` selects the port.
pub struct ControlPins<CS, WR, RD, A0, A1, IC> {
    pub cs: CS,
    pub wr: WR,
    pub rd: RD,
    pub a0: A0,
    pub a1: A1,
    pub ic: IC,
}

/// Register port driving the chip over GPIO.
pub struct ParallelBus<D, CS, WR, RD, A0, A1, IC, DL> {
    data: D,
    pins: ControlPins<CS, WR, RD, A0, A1, IC>,
    delay: DL,
    timing: BusTiming,
}

fn pin<E: embedded_hal::digital::Error>(e: E) -> BusError {
    BusError::Pin(e.kind())
}

impl<D, CS, WR, RD, A0, A1, IC, DL> ParallelBus<D, CS, WR, RD, A0, A1, IC, DL>
where
    D: DataBus,
    CS: OutputPin,
    WR: OutputPin,
    RD: OutputPin,
    A0: OutputPin,
    A1: OutputPin,
    IC: OutputPin,
    DL: DelayNs,
{
    /// Take ownership of already configured output pins and drive the
    /// control lines to idle (CS, WR, RD, IC high).
    pub fn new(
        data: D,
        pins: ControlPins<CS, WR, RD, A0, A1, IC>,
        delay: DL,
        timing: BusTiming,
    ) -> Result<Self, BusError> {
        let mut bus = Self {
            data,
            pins,
            delay,
            timing,
        };
        bus.pins.ic.set_high().map_err(pin)?;
        bus.pins.rd.set_high().map_err(pin)?;
        bus.idle()?;
        Ok(bus)
    }

    pub fn timing(&self) -> BusTiming {
        self.timing
    }

    pub fn set_timing(&mut self, timing: BusTiming) {
        self.timing = timing;
    }

    /// Give the pins and delay back.
    pub fn release(self) -> (D, ControlPins<CS, WR, RD, A0, A1, IC>, DL) {
        (self.data, self.pins, self.delay)
    }

    fn idle(&mut self) -> Result<(), BusError> {
        self.pins.wr.set_high().map_err(pin)?;
        self.pins.cs.set_high().map_err(pin)?;
        Ok(())
    }

    /// Assert CS and WR, hold, release.
    fn strobe(&mut self) -> Result<(), BusError> {
        self.pins.cs.set_low().map_err(pin)?;
        self.pins.wr.set_low().map_err(pin)?;
        self.delay.delay_ns(self.timing.settle_ns);
        self.idle()
    }

    fn select_port(&mut self, port: Port) -> Result<(), BusError> {
        match port {
            Port::Zero => self.pins.a1.set_low().map_err(pin),
            Port::One => self.pins.a1.set_high().map_err(pin),
        }
    }
}

impl<D, CS, WR, RD, A0, A1, IC, DL> RegisterPort for ParallelBus<D, CS, WR, RD, A0, A1, IC, DL>
where
    D: DataBus,
    CS: OutputPin,
    WR: OutputPin,
    RD: OutputPin,
    A0: OutputPin,
    A1: OutputPin,
    IC: OutputPin,
    DL: DelayNs,
{
    fn write(&mut self, write: RegisterWrite) -> Result<(), BusError> {
        // address phase
        self.select_port(write.port)?;
        self.pins.a0.set_low().map_err(pin)?;
        self.data.write_byte(write.address)?;
        self.strobe()?;

        // data phase
        self.pins.a0.set_high().map_err(pin)?;
        self.data.write_byte(write.data)?;
        self.delay.delay_ns(self.timing.settle_ns);
        self.strobe()?;

        self.delay.delay_ns(self.timing.settle_ns);
        Ok(())
    }

    fn reset(&mut self) -> Result<(), BusError> {
        self.pins.ic.set_high().map_err(pin)?;
        self.delay.delay_ns(self.timing.reset_ns);
        self.pins.ic.set_low().map_err(pin)?;
        self.delay.delay_ns(self.timing.reset_ns);
        self.pins.ic.set_high().map_err(pin)?;
        self.delay.delay_ns(self.timing.reset_ns);
        Ok(())
    }
}
