#![doc = include_str!("../README.md")]
//! opn2drive: six-voice driver for the YM2612 / YM3438 (OPN2) FM chip
//!
//! `opn2drive` plays notes on an OPN2 wired to a microcontroller's GPIO.
//! It is `no_std` when the default `std` feature is disabled.
//!
//! Key features:
//! - Voice allocation: note-on claims the lowest free of six voices,
//!   note-off releases the voice sounding that note. A seventh note is
//!   rejected, never stolen.
//! - Frequency encoding: MIDI-style note numbers to the chip's 11-bit
//!   F-number and 3-bit block.
//! - Register bus: the two-phase address/data write over an 8-bit parallel
//!   bus, with configurable settle and reset timing, on `embedded-hal` 1.0
//!   pins and delays.
//! - A `RegisterPort` seam so the same driver can record writes in memory
//!   (`RecordingPort`) or feed any other transport.
//!
//! Layout
//!
//! - `chip`: register map, frequency encoder, voice patch data
//! - `voice`: channel state and the allocator
//! - `bus`: `RegisterPort`, the GPIO `ParallelBus` and `RecordingPort`
//! - `driver`: the `Ym2612` facade
//!
//! Example: driving real pins
//!
//! ```no_run
//! use embedded_hal::delay::DelayNs;
//! use embedded_hal::digital::OutputPin;
//! use opn2drive::Ym2612;
//! use opn2drive::bus::{BusTiming, ControlPins, ParallelBus, PinDataBus};
//!
//! fn play<P, D>(data: [P; 8], pins: ControlPins<P, P, P, P, P, P>, delay: D)
//! where
//!     P: OutputPin,
//!     D: DelayNs,
//! {
//!     let bus = ParallelBus::new(PinDataBus::new(data), pins, delay, BusTiming::default())
//!         .unwrap();
//!     let mut chip = Ym2612::new(bus);
//!     chip.init().unwrap();
//!     chip.key_on(60, 100).unwrap();
//!     chip.key_off(60).unwrap();
//! }
//! ```
#![cfg_attr(not(any(test, feature = "std")), no_std)]

pub mod bus;
pub mod chip;
pub mod driver;
pub mod error;
pub mod voice;

pub use driver::{DriverConfig, VelocityScope, Ym2612};
pub use error::{BusError, DriverError, VoiceError};
