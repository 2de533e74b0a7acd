//! In-memory register port.

use super::RegisterPort;
use crate::chip::registers::RegisterWrite;
use crate::error::BusError;

/// Register port that keeps every write, in order, instead of driving pins.
///
/// # Examples
///
/// ```
/// use opn2drive::bus::{RecordingPort, RegisterPort};
/// use opn2drive::chip::RegisterWrite;
///
/// let mut port = RecordingPort::new();
/// port.write(RegisterWrite::global(0x28, 0xF0)).unwrap();
/// assert_eq!(port.writes().len(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordingPort {
    writes: Vec<RegisterWrite>,
    resets: usize,
}

impl RecordingPort {
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes recorded so far.
    pub fn writes(&self) -> &[RegisterWrite] {
        &self.writes
    }

    /// Number of `reset` calls.
    pub fn resets(&self) -> usize {
        self.resets
    }

    /// Take the recorded writes, leaving the log empty.
    pub fn take(&mut self) -> Vec<RegisterWrite> {
        std::mem::take(&mut self.writes)
    }

    pub fn clear(&mut self) {
        self.writes.clear();
        self.resets = 0;
    }
}

impl RegisterPort for RecordingPort {
    fn write(&mut self, write: RegisterWrite) -> Result<(), BusError> {
        self.writes.push(write);
        Ok(())
    }

    fn reset(&mut self) -> Result<(), BusError> {
        self.resets += 1;
        Ok(())
    }
}
