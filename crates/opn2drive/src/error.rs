//! Error types returned by the allocator, the bus and the driver facade.
//!
//! None of these are fatal. A rejected note simply does not sound; the
//! caller decides whether to report it.
use core::fmt;

use embedded_hal::digital::ErrorKind;

/// Outcome of a note request that could not be honoured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VoiceError {
    /// All six voices are sounding; the note-on was dropped.
    ChannelsExhausted { note: u8 },

    /// Note-off for a note that is not sounding on any voice.
    NoteNotActive { note: u8 },

    /// The note cannot be encoded into the frequency registers.
    NoteOutOfRange { note: u8 },

    /// Velocity above 127.
    VelocityOutOfRange { velocity: u8 },
}

impl fmt::Display for VoiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VoiceError::ChannelsExhausted { note } => {
                write!(f, "no free channel for note {}", note)
            }
            VoiceError::NoteNotActive { note } => write!(f, "note {} is not active", note),
            VoiceError::NoteOutOfRange { note } => write!(f, "note {} is out of range", note),
            VoiceError::VelocityOutOfRange { velocity } => {
                write!(f, "velocity {} is out of range (0..=127)", velocity)
            }
        }
    }
}

impl core::error::Error for VoiceError {}

/// Failure while driving the physical bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusError {
    /// A control line could not be set.
    Pin(ErrorKind),

    /// The data bus could not be driven.
    DataBus,
}

impl fmt::Display for BusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BusError::Pin(kind) => write!(f, "control line error: {}", kind),
            BusError::DataBus => write!(f, "data bus error"),
        }
    }
}

impl core::error::Error for BusError {}

/// Error returned by the `Ym2612` facade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverError {
    Voice(VoiceError),
    Bus(BusError),
}

impl DriverError {
    /// The voice-level outcome, if this is one.
    pub fn voice(&self) -> Option<VoiceError> {
        match self {
            DriverError::Voice(e) => Some(*e),
            DriverError::Bus(_) => None,
        }
    }
}

impl fmt::Display for DriverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DriverError::Voice(e) => write!(f, "{}", e),
            DriverError::Bus(e) => write!(f, "{}", e),
        }
    }
}

impl core::error::Error for DriverError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            DriverError::Voice(e) => Some(e),
            DriverError::Bus(e) => Some(e),
        }
    }
}

impl From<VoiceError> for DriverError {
    fn from(e: VoiceError) -> Self {
        DriverError::Voice(e)
    }
}

impl From<BusError> for DriverError {
    fn from(e: BusError) -> Self {
        DriverError::Bus(e)
    }
}
