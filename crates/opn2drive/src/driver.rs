//! YM2612 driver facade.
//!
//! `Ym2612` owns the channel allocator and the register port and turns
//! note events into register write sequences:
//!
//! - `init`: reset the chip, silence every voice, program the patch
//! - `key_on`: allocate a voice, write its frequency, apply velocity, key on
//! - `key_off`: release the voice sounding the note and key it off
//!
//! Every operation takes `&mut self`, so a driver shared between threads
//! must sit behind one lock spanning the allocator and the port. That is
//! the only serialization the chip needs: one transaction at a time, and
//! the allocate/release bookkeeping kept in step with the writes.
//!
//! # Examples
//!
//! ```
//! use opn2drive::Ym2612;
//! use opn2drive::bus::RecordingPort;
//!
//! let mut chip = Ym2612::new(RecordingPort::new());
//! chip.init().unwrap();
//!
//! let index = chip.key_on(60, 100).unwrap();
//! assert_eq!(index.get(), 0);
//! assert_eq!(chip.key_off(60).unwrap(), index);
//! ```

use log::{debug, trace, warn};

use crate::bus::RegisterPort;
use crate::chip::patch::Patch;
use crate::chip::registers::{self, RegisterWrite};
use crate::error::{BusError, DriverError, VoiceError};
use crate::voice::{ActiveNote, Channel, ChannelAllocator, ChannelIndex, NUM_CHANNELS};

/// Highest accepted note-on velocity.
pub const MAX_VELOCITY: u8 = 127;

/// Velocity mapped to zero attenuation. Anything louder saturates.
pub const FULL_SCALE_VELOCITY: u8 = 100;

/// Key offsets silenced by `init`, one per voice.
const ALL_KEY_OFFSETS: [u8; NUM_CHANNELS] = [0, 1, 2, 4, 5, 6];

/// Attenuation (Total Level) for a velocity.
///
/// `FULL_SCALE_VELOCITY - velocity`, saturating at 0 and masked to the
/// 7-bit register range. Lower values are louder.
pub fn attenuation(velocity: u8) -> u8 {
    FULL_SCALE_VELOCITY.saturating_sub(velocity) & 0x7F
}

/// Which voices a note-on velocity is written to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum VelocityScope {
    /// Every voice on both ports. A note-on changes the loudness of the
    /// notes already sounding.
    #[default]
    AllVoices,
    /// Only the voice that was just keyed.
    KeyedVoice,
}

/// Driver settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DriverConfig {
    /// Tone programmed into every voice by `init`.
    pub patch: Patch,
    pub velocity_scope: VelocityScope,
}

/// Six-voice FM chip behind a register port.
#[derive(Debug)]
pub struct Ym2612<B> {
    bus: B,
    allocator: ChannelAllocator,
    config: DriverConfig,
}

impl<B: RegisterPort> Ym2612<B> {
    /// Driver with the default configuration. Nothing is written until
    /// `init`.
    pub fn new(bus: B) -> Self {
        Self::with_config(bus, DriverConfig::default())
    }

    pub fn with_config(bus: B, config: DriverConfig) -> Self {
        Self {
            bus,
            allocator: ChannelAllocator::new(),
            config,
        }
    }

    /// Reset the chip and program every voice.
    ///
    /// Sequence: hardware reset; LFO off; channel 3 normal mode; key-off
    /// for each voice; DAC off; then the configured patch for voices 0-5.
    /// Any channel bookkeeping left from before is discarded.
    pub fn init(&mut self) -> Result<(), BusError> {
        self.bus.reset()?;

        let cleared = self.allocator.release_all().count();
        if cleared > 0 {
            debug!("init discarded {} sounding channels", cleared);
        }

        self.write(RegisterWrite::global(registers::LFO, 0x00))?;
        self.write(RegisterWrite::global(registers::TIMER_CH3_MODE, 0x00))?;
        for key_offset in ALL_KEY_OFFSETS {
            self.write(RegisterWrite::global(
                registers::KEY_ON_OFF,
                registers::key_on_off(0, key_offset),
            ))?;
        }
        self.write(RegisterWrite::global(registers::DAC_ENABLE, 0x00))?;

        let patch = self.config.patch;
        for index in ChannelIndex::all() {
            self.program_voice(index, &patch)?;
        }
        debug!("init done, algorithm {}", patch.algorithm.get());
        Ok(())
    }

    /// Write `patch` into one voice and record its algorithm for velocity.
    pub fn program_voice(&mut self, index: ChannelIndex, patch: &Patch) -> Result<(), BusError> {
        for write in patch.writes(index.offset(), index.port()) {
            self.write(write)?;
        }
        self.allocator.set_algorithm(index, patch.algorithm);
        Ok(())
    }

    /// Sound `note` on the lowest free voice.
    ///
    /// Writes, in order: block/F-number high and F-number low on the
    /// voice's port, the velocity Total Level writes, and key-on for all
    /// four operators. Rejected notes (velocity above 127, note out of
    /// range, no free voice) write nothing. If the port fails part way the
    /// voice is freed again and the bus error is returned.
    pub fn key_on(&mut self, note: u8, velocity: u8) -> Result<ChannelIndex, DriverError> {
        if velocity > MAX_VELOCITY {
            return Err(VoiceError::VelocityOutOfRange { velocity }.into());
        }
        let active = *self.allocator.allocate(note, velocity)?;
        if let Err(e) = self.sound(&active) {
            self.allocator.release_index(active.index);
            return Err(e.into());
        }
        Ok(active.index)
    }

    fn sound(&mut self, active: &ActiveNote) -> Result<(), BusError> {
        let index = active.index;
        let port = index.port();
        let offset = index.offset();

        self.write(RegisterWrite::new(
            registers::BLOCK_FNUM_HIGH + offset,
            active.frequency.high,
            port,
        ))?;
        self.write(RegisterWrite::new(
            registers::FNUM_LOW + offset,
            active.frequency.low,
            port,
        ))?;

        let level = attenuation(active.velocity);
        match self.config.velocity_scope {
            VelocityScope::AllVoices => self.write_total_level_all(level)?,
            VelocityScope::KeyedVoice => self.write_total_level(index, level)?,
        }

        self.write(RegisterWrite::global(
            registers::KEY_ON_OFF,
            registers::key_on_off(registers::ALL_SLOTS, index.key_offset()),
        ))
    }

    /// Silence the voice sounding `note`.
    ///
    /// A single key-off write for the voice. A note that is not sounding
    /// writes nothing and returns `VoiceError::NoteNotActive`. The voice is
    /// freed only once the key-off write succeeds, so after a bus error the
    /// same call can be retried.
    pub fn key_off(&mut self, note: u8) -> Result<ChannelIndex, DriverError> {
        let Some(index) = self.allocator.find(note) else {
            warn!("key off for note {} which is not sounding", note);
            return Err(VoiceError::NoteNotActive { note }.into());
        };
        self.key_off_index(index)?;
        self.allocator.release_index(index);
        debug!("released channel {} from note {}", index, note);
        Ok(index)
    }

    fn key_off_index(&mut self, index: ChannelIndex) -> Result<(), BusError> {
        self.write(RegisterWrite::global(
            registers::KEY_ON_OFF,
            registers::key_on_off(0, index.key_offset()),
        ))
    }

    /// Key off every sounding voice, returning how many there were.
    ///
    /// Stops at the first bus error. Voices keyed off before it are freed;
    /// the rest stay active.
    pub fn all_notes_off(&mut self) -> Result<usize, BusError> {
        let mut count = 0;
        for index in self.allocator.active_indices() {
            self.key_off_index(index)?;
            self.allocator.release_index(index);
            count += 1;
        }
        Ok(count)
    }

    /// Write the attenuation for `velocity` into the output operators of
    /// every voice, on both ports.
    pub fn set_velocity(&mut self, velocity: u8) -> Result<(), DriverError> {
        if velocity > MAX_VELOCITY {
            return Err(VoiceError::VelocityOutOfRange { velocity }.into());
        }
        self.write_total_level_all(attenuation(velocity))?;
        Ok(())
    }

    fn write_total_level_all(&mut self, level: u8) -> Result<(), BusError> {
        for index in ChannelIndex::all() {
            self.write_total_level(index, level)?;
        }
        Ok(())
    }

    fn write_total_level(&mut self, index: ChannelIndex, level: u8) -> Result<(), BusError> {
        let algorithm = self.allocator.algorithm(index);
        for &operator in algorithm.output_operators() {
            self.write(RegisterWrite::new(
                registers::operator_register(registers::TOTAL_LEVEL, operator, index.offset()),
                level,
                index.port(),
            ))?;
        }
        Ok(())
    }

    fn write(&mut self, write: RegisterWrite) -> Result<(), BusError> {
        trace!("{} {}", write, registers::register_name(write.address));
        self.bus.write(write).inspect_err(|e| {
            warn!("register write {} failed: {}", write, e);
        })
    }

    pub fn channels(&self) -> &[Channel; NUM_CHANNELS] {
        self.allocator.channels()
    }

    pub fn allocator(&self) -> &ChannelAllocator {
        &self.allocator
    }

    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    pub fn bus(&self) -> &B {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }

    /// Give the port back.
    pub fn into_inner(self) -> B {
        self.bus
    }
}
