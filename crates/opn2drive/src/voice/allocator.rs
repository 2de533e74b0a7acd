//! Channel allocation.
//!
//! `ChannelAllocator` owns the six channels. Allocation scans for the
//! lowest-index inactive channel; release scans for the lowest-index active
//! channel sounding the note. Both scans are linear over the fixed pool.
//! There is no voice stealing and no queue: a note-on with every channel
//! busy is rejected.

use log::{debug, warn};

use super::channel::{ActiveNote, Channel, ChannelIndex};
use crate::chip::patch::Algorithm;
use crate::error::VoiceError;

/// Number of FM voices on the chip.
pub const NUM_CHANNELS: usize = 6;

/// Fixed pool of voices and the allocate/release policy.
#[derive(Debug, Clone, Default)]
pub struct ChannelAllocator {
    channels: [Channel; NUM_CHANNELS],
    /// Algorithm programmed into each voice, recorded at voice-program time.
    algorithms: [Algorithm; NUM_CHANNELS],
}

impl ChannelAllocator {
    /// Create a pool with every channel inactive.
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the lowest-index free channel for `note`.
    ///
    /// On success the channel's index (and so its port, offset and key
    /// offset) is fixed and its frequency registers are encoded.
    ///
    /// Returns `VoiceError::ChannelsExhausted` when every channel is active
    /// and `VoiceError::NoteOutOfRange` when the note cannot be encoded.
    /// Neither error changes any channel.
    pub fn allocate(&mut self, note: u8, velocity: u8) -> Result<&ActiveNote, VoiceError> {
        let Some((index, channel)) = ChannelIndex::all()
            .zip(self.channels.iter_mut())
            .find(|(_, c)| !c.is_active())
        else {
            warn!("no free channel for note {}", note);
            return Err(VoiceError::ChannelsExhausted { note });
        };
        let active = channel.activate(index, note, velocity)?;
        debug!(
            "allocated channel {} (port {}, offset {}) to note {}",
            index,
            index.port(),
            index.offset(),
            note
        );
        Ok(active)
    }

    /// Index of the first active channel sounding `note`, without freeing it.
    pub fn find(&self, note: u8) -> Option<ChannelIndex> {
        self.channels
            .iter()
            .find(|c| c.note() == Some(note))
            .and_then(Channel::index)
    }

    /// Indices of every active channel, in index order.
    pub fn active_indices(&self) -> impl Iterator<Item = ChannelIndex> + use<> {
        let mut active = [None; NUM_CHANNELS];
        for (slot, channel) in active.iter_mut().zip(self.channels.iter()) {
            *slot = channel.index();
        }
        active.into_iter().flatten()
    }

    /// Free the first active channel sounding `note`.
    ///
    /// Returns the freed channel's index, captured before the reset, so the
    /// caller can still address its key-off. If several channels were to
    /// share the note only the lowest-index one is released.
    pub fn release(&mut self, note: u8) -> Result<ChannelIndex, VoiceError> {
        let index = self.find(note).ok_or(VoiceError::NoteNotActive { note })?;
        self.release_index(index);
        debug!("released channel {} from note {}", index, note);
        Ok(index)
    }

    /// Free the channel at `index` regardless of its note.
    ///
    /// Returns `true` if the channel was active.
    pub fn release_index(&mut self, index: ChannelIndex) -> bool {
        let channel = &mut self.channels[index.get() as usize];
        let was_active = channel.is_active();
        channel.reset();
        was_active
    }

    /// Free every channel, returning the indices that were active.
    pub fn release_all(&mut self) -> impl Iterator<Item = ChannelIndex> + use<> {
        let mut released = [None; NUM_CHANNELS];
        for (slot, channel) in released.iter_mut().zip(self.channels.iter_mut()) {
            *slot = channel.index();
            channel.reset();
        }
        released.into_iter().flatten()
    }

    pub fn channels(&self) -> &[Channel; NUM_CHANNELS] {
        &self.channels
    }

    pub fn channel(&self, index: ChannelIndex) -> &Channel {
        &self.channels[index.get() as usize]
    }

    /// Number of channels currently sounding.
    pub fn active_count(&self) -> usize {
        self.channels.iter().filter(|c| c.is_active()).count()
    }

    pub fn set_algorithm(&mut self, index: ChannelIndex, algorithm: Algorithm) {
        self.algorithms[index.get() as usize] = algorithm;
    }

    pub fn algorithm(&self, index: ChannelIndex) -> Algorithm {
        self.algorithms[index.get() as usize]
    }
}
