use std::cell::RefCell;
use std::convert::Infallible;
use std::rc::Rc;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{ErrorKind, ErrorType, OutputPin};
use opn2drive::BusError;
use opn2drive::bus::{BusTiming, ControlPins, DataBus, ParallelBus, PinDataBus, RegisterPort};
use opn2drive::chip::{Port, RegisterWrite};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Event {
    High(&'static str),
    Low(&'static str),
    Byte(u8),
    Delay(u32),
}

type Log = Rc<RefCell<Vec<Event>>>;

struct LinePin {
    name: &'static str,
    log: Log,
}

impl ErrorType for LinePin {
    type Error = Infallible;
}

impl OutputPin for LinePin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.log.borrow_mut().push(Event::Low(self.name));
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.log.borrow_mut().push(Event::High(self.name));
        Ok(())
    }
}

struct LineBus {
    log: Log,
}

impl DataBus for LineBus {
    fn write_byte(&mut self, byte: u8) -> Result<(), BusError> {
        self.log.borrow_mut().push(Event::Byte(byte));
        Ok(())
    }
}

struct LineDelay {
    log: Log,
}

impl DelayNs for LineDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.log.borrow_mut().push(Event::Delay(ns));
    }
}

fn control_pins(log: &Log) -> ControlPins<LinePin, LinePin, LinePin, LinePin, LinePin, LinePin> {
    let pin = |name| LinePin {
        name,
        log: log.clone(),
    };
    ControlPins {
        cs: pin("CS"),
        wr: pin("WR"),
        rd: pin("RD"),
        a0: pin("A0"),
        a1: pin("A1"),
        ic: pin("IC"),
    }
}

const TIMING: BusTiming = BusTiming {
    settle_ns: 25_000,
    reset_ns: 50_000,
};

fn bus(
    log: &Log,
) -> ParallelBus<LineBus, LinePin, LinePin, LinePin, LinePin, LinePin, LinePin, LineDelay> {
    ParallelBus::new(
        LineBus { log: log.clone() },
        control_pins(log),
        LineDelay { log: log.clone() },
        TIMING,
    )
    .unwrap()
}

#[test]
fn test_new_drives_idle_levels() {
    let log = Log::default();
    let _bus = bus(&log);
    assert_eq!(
        *log.borrow(),
        vec![
            Event::High("IC"),
            Event::High("RD"),
            Event::High("WR"),
            Event::High("CS"),
        ]
    );
}

#[test]
fn test_write_transaction_order() {
    use Event::*;

    let log = Log::default();
    let mut bus = bus(&log);
    log.borrow_mut().clear();

    bus.write(RegisterWrite::new(0xA5, 0x1D, Port::One)).unwrap();
    assert_eq!(
        *log.borrow(),
        vec![
            // address phase
            High("A1"),
            Low("A0"),
            Byte(0xA5),
            Low("CS"),
            Low("WR"),
            Delay(25_000),
            High("WR"),
            High("CS"),
            // data phase
            High("A0"),
            Byte(0x1D),
            Delay(25_000),
            Low("CS"),
            Low("WR"),
            Delay(25_000),
            High("WR"),
            High("CS"),
            // idle
            Delay(25_000),
        ]
    );
}

#[test]
fn test_port_select_line() {
    let log = Log::default();
    let mut bus = bus(&log);
    log.borrow_mut().clear();

    bus.write(RegisterWrite::global(0x28, 0xF0)).unwrap();
    assert_eq!(log.borrow()[0], Event::Low("A1"));
}

#[test]
fn test_address_strobe_released_before_data() {
    let log = Log::default();
    let mut bus = bus(&log);
    log.borrow_mut().clear();

    bus.write(RegisterWrite::global(0x22, 0x00)).unwrap();
    let events = log.borrow();
    let data_select = events
        .iter()
        .position(|e| *e == Event::High("A0"))
        .unwrap();
    let strobes: Vec<usize> = events
        .iter()
        .enumerate()
        .filter(|(_, e)| **e == Event::High("CS"))
        .map(|(i, _)| i)
        .collect();
    assert_eq!(strobes.len(), 2);
    assert!(strobes[0] < data_select);
    assert!(strobes[1] > data_select);
}

#[test]
fn test_reset_pulse() {
    let log = Log::default();
    let mut bus = bus(&log);
    log.borrow_mut().clear();

    bus.reset().unwrap();
    assert_eq!(
        *log.borrow(),
        vec![
            Event::High("IC"),
            Event::Delay(50_000),
            Event::Low("IC"),
            Event::Delay(50_000),
            Event::High("IC"),
            Event::Delay(50_000),
        ]
    );
}

#[test]
fn test_pin_data_bus_bit_order() {
    let log = Log::default();
    let names = ["D0", "D1", "D2", "D3", "D4", "D5", "D6", "D7"];
    let mut data = PinDataBus::new(names.map(|name| LinePin {
        name,
        log: log.clone(),
    }));

    data.write_byte(0b1000_0101).unwrap();
    assert_eq!(
        *log.borrow(),
        vec![
            Event::High("D0"),
            Event::Low("D1"),
            Event::High("D2"),
            Event::Low("D3"),
            Event::Low("D4"),
            Event::Low("D5"),
            Event::Low("D6"),
            Event::High("D7"),
        ]
    );
}

struct BrokenPin;

impl ErrorType for BrokenPin {
    type Error = ErrorKind;
}

impl OutputPin for BrokenPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        Err(ErrorKind::Other)
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        Err(ErrorKind::Other)
    }
}

#[test]
fn test_pin_failure_maps_to_bus_error() {
    let log = Log::default();
    let pins = ControlPins {
        cs: LinePin {
            name: "CS",
            log: log.clone(),
        },
        wr: LinePin {
            name: "WR",
            log: log.clone(),
        },
        rd: LinePin {
            name: "RD",
            log: log.clone(),
        },
        a0: LinePin {
            name: "A0",
            log: log.clone(),
        },
        a1: BrokenPin,
        ic: LinePin {
            name: "IC",
            log: log.clone(),
        },
    };
    let mut bus = ParallelBus::new(
        LineBus { log: log.clone() },
        pins,
        LineDelay { log: log.clone() },
        BusTiming::default(),
    )
    .unwrap();

    assert_eq!(
        bus.write(RegisterWrite::global(0x28, 0x00)),
        Err(BusError::Pin(ErrorKind::Other))
    );

    let mut data = PinDataBus::new([(); 8].map(|_| BrokenPin));
    assert_eq!(data.write_byte(0xFF), Err(BusError::DataBus));
}
