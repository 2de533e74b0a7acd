//! Channel state tracking.
//!
//! This module provides the `Channel` type for one hardware voice, and
//! `ChannelIndex`, the voice identity from which all per-voice register
//! addressing derives.

use core::fmt;

use crate::chip::fnumber::{self, FrequencyRegisters};
use crate::chip::registers::Port;
use crate::error::VoiceError;

/// Key state for a channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum KeyState {
    /// Channel is not producing sound
    #[default]
    Off,
    /// Channel is producing sound
    On,
}

/// Identity of one of the six voices, 0-5.
///
/// Voices 0-2 live on port 0 and voices 3-5 on port 1, each at slot
/// `index % 3` within its port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChannelIndex(u8);

impl ChannelIndex {
    /// Returns `None` for indices above 5.
    pub fn new(index: u8) -> Option<Self> {
        (index < 6).then_some(Self(index))
    }

    pub fn get(self) -> u8 {
        self.0
    }

    /// Register bank carrying this voice.
    pub fn port(self) -> Port {
        Port::from_bit(self.0 / 3)
    }

    /// Slot within the port, added to per-voice register addresses.
    pub fn offset(self) -> u8 {
        self.0 % 3
    }

    /// Channel code for the key on/off register: D1..D0 offset, D2 port.
    pub fn key_offset(self) -> u8 {
        self.offset() | (self.port().bit() << 2)
    }

    /// Every voice, in allocation order.
    pub fn all() -> impl Iterator<Item = ChannelIndex> {
        (0..6).map(ChannelIndex)
    }
}

impl fmt::Display for ChannelIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The note a channel is sounding, with its encoded frequency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ActiveNote {
    pub index: ChannelIndex,
    pub note: u8,
    pub frequency: FrequencyRegisters,
    pub velocity: u8,
}

/// One hardware voice.
///
/// The voice identity, note, frequency and velocity exist only while the
/// channel is sounding; an inactive channel holds nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Channel {
    active: Option<ActiveNote>,
}

impl Channel {
    /// Create an inactive channel
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign this channel to `note`.
    ///
    /// The frequency is encoded first; when the note is out of range the
    /// channel is left untouched.
    pub fn activate(
        &mut self,
        index: ChannelIndex,
        note: u8,
        velocity: u8,
    ) -> Result<&ActiveNote, VoiceError> {
        let frequency =
            fnumber::encode(note).map_err(|_| VoiceError::NoteOutOfRange { note })?;
        Ok(self.active.insert(ActiveNote {
            index,
            note,
            frequency,
            velocity,
        }))
    }

    /// Resets the channel to its inactive state.
    pub fn reset(&mut self) {
        self.active = None;
    }

    pub fn active(&self) -> Option<&ActiveNote> {
        self.active.as_ref()
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn key_state(&self) -> KeyState {
        if self.is_active() {
            KeyState::On
        } else {
            KeyState::Off
        }
    }

    pub fn index(&self) -> Option<ChannelIndex> {
        self.active.map(|a| a.index)
    }

    pub fn port(&self) -> Option<Port> {
        self.index().map(ChannelIndex::port)
    }

    pub fn offset(&self) -> Option<u8> {
        self.index().map(ChannelIndex::offset)
    }

    pub fn key_offset(&self) -> Option<u8> {
        self.index().map(ChannelIndex::key_offset)
    }

    pub fn note(&self) -> Option<u8> {
        self.active.map(|a| a.note)
    }

    pub fn frequency(&self) -> Option<FrequencyRegisters> {
        self.active.map(|a| a.frequency)
    }

    pub fn velocity(&self) -> Option<u8> {
        self.active.map(|a| a.velocity)
    }
}
