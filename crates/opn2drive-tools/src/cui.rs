//! Command implementations.
pub mod fnum;
pub mod render;
pub mod trace;

use std::fmt;

use anyhow::Result;
use opn2drive::bus::RegisterPort;
use opn2drive::voice::ChannelIndex;
use opn2drive::{DriverError, VoiceError, Ym2612};

use crate::script::Event;

/// What the driver did with one script event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Keyed(ChannelIndex),
    Released(ChannelIndex),
    Silenced(usize),
    Waited(u32),
    /// The note was not sounded or not found. Not fatal.
    Rejected(VoiceError),
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Keyed(index) => write!(f, "channel {} on", index),
            Outcome::Released(index) => write!(f, "channel {} off", index),
            Outcome::Silenced(count) => write!(f, "{} channels off", count),
            Outcome::Waited(samples) => write!(f, "{} samples", samples),
            Outcome::Rejected(e) => write!(f, "rejected: {}", e),
        }
    }
}

/// Feed one event to the driver.
///
/// Voice-level rejections come back as `Outcome::Rejected`; only bus
/// failures are errors. Waits write nothing and are left to the caller.
pub fn apply<B: RegisterPort>(chip: &mut Ym2612<B>, event: Event) -> Result<Outcome> {
    let result = match event {
        Event::On { note, velocity } => chip.key_on(note, velocity).map(Outcome::Keyed),
        Event::Off { note } => chip.key_off(note).map(Outcome::Released),
        Event::Panic => return Ok(Outcome::Silenced(chip.all_notes_off()?)),
        Event::Wait(samples) => return Ok(Outcome::Waited(samples)),
    };
    match result {
        Ok(outcome) => Ok(outcome),
        Err(DriverError::Voice(e)) => {
            tracing::warn!("{}: {}", event, e);
            Ok(Outcome::Rejected(e))
        }
        Err(DriverError::Bus(e)) => Err(e.into()),
    }
}
