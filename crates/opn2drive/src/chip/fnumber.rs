//! F-number utilities for the YM2612 frequency registers.
//!
//! The chip takes a pitch as an 11-bit F-number (mantissa) scaled by a 3-bit
//! block (exponent). `encode` quantizes a note index into that format using a
//! one-octave table of equal-tempered frequencies, and `fnum_block_to_freq`
//! goes the other way, computing the tone the chip produces for a given pair.
//!
//! # Examples
//!
//! ```rust
//! use opn2drive::chip::fnumber::encode;
//!
//! let regs = encode(60).unwrap();
//! assert_eq!(regs.block(), 2);
//! assert_eq!(regs.fnum(), 277);
//! assert_eq!((regs.high, regs.low), (0x11, 0x15));
//! ```
//!
//! ```rust
//! use opn2drive::chip::fnumber::{fnum_block_to_freq, DEFAULT_MASTER_CLOCK_HZ};
//!
//! let freq = fnum_block_to_freq(0x26D, 4, DEFAULT_MASTER_CLOCK_HZ).unwrap();
//! println!("frequency = {} Hz", freq);
//! ```
use core::fmt;

/// Semitone frequencies (Hz) for one octave, C#4 to C5.
///
/// Index 0 is the base pitch of note 0 within its octave. The values are the
/// YM3438 datasheet note set.
pub const SEMITONE_HZ: [f32; 12] = [
    277.2, 293.7, 311.1, 329.6, 349.2, 370.0, 392.0, 415.3, 440.0, 466.2, 493.9, 523.3,
];

/// Power-of-two octave multipliers, `2^(octave - 5)` for octave 0..=10.
pub const OCTAVE_MULTIPLIER: [f32; 11] = [
    0.03125, 0.0625, 0.125, 0.25, 0.5, 1.0, 2.0, 4.0, 8.0, 16.0, 32.0,
];

/// Highest note index `encode` accepts (octave 10, semitone 11).
pub const MAX_NOTE: u8 = (OCTAVE_MULTIPLIER.len() * 12 - 1) as u8;

/// Block the normalization loop starts from.
const BASE_BLOCK: u8 = 2;

/// Exclusive upper bound of the 11-bit F-number range.
const FNUM_LIMIT: f32 = 2048.0;

const FNUM_MASK: u16 = 0x7FF;
const BLOCK_MASK: u8 = 0x07;

/// NTSC Mega Drive master clock.
pub const DEFAULT_MASTER_CLOCK_HZ: f64 = 7_670_454.0;

/// Error enum used by F-number utilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FNumberError {
    /// The note's octave falls outside `OCTAVE_MULTIPLIER`.
    NoteOutOfRange { note: u8 },
    /// Non-finite or non-positive clock.
    InvalidInput,
    /// A field does not fit its register bits.
    ExcessiveBits { param: &'static str, bits: u32 },
}

impl fmt::Display for FNumberError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FNumberError::NoteOutOfRange { note } => {
                write!(f, "note {} is out of range (0..={})", note, MAX_NOTE)
            }
            FNumberError::InvalidInput => write!(f, "invalid input"),
            FNumberError::ExcessiveBits { param, bits } => {
                write!(f, "{} exceeds {} bits", param, bits)
            }
        }
    }
}

impl core::error::Error for FNumberError {}

/// Packed frequency register pair for one voice.
///
/// - `high`: written to `0xA4 + offset`. D5..D3 block, D2..D0 F-number bits 10..8.
/// - `low`: written to `0xA0 + offset`. F-number bits 7..0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrequencyRegisters {
    pub high: u8,
    pub low: u8,
}

impl FrequencyRegisters {
    /// Pack an F-number and block. Bits above the field widths are dropped.
    pub fn from_parts(fnum: u16, block: u8) -> Self {
        Self {
            high: pack_block_fnum_high(fnum, block),
            low: fnum_low(fnum),
        }
    }

    /// The 11-bit F-number.
    pub fn fnum(&self) -> u16 {
        ((self.high & 0x07) as u16) << 8 | self.low as u16
    }

    /// The 3-bit block.
    pub fn block(&self) -> u8 {
        (self.high >> 3) & BLOCK_MASK
    }
}

/// Block (D5..D3) and F-number high bits (D2..D0) for register `0xA4 + n`.
pub fn pack_block_fnum_high(fnum: u16, block: u8) -> u8 {
    (((fnum >> 8) & 0x07) as u8) | ((block & BLOCK_MASK) << 3)
}

/// F-number low byte for register `0xA0 + n`.
pub fn fnum_low(fnum: u16) -> u8 {
    (fnum & 0xFF) as u8
}

/// Quantize a note index into the chip's frequency registers.
///
/// `note` counts semitones above the table base. The scaled table frequency
/// is halved until it fits 11 bits, incrementing the block from 2 each time,
/// then truncated to an integer F-number.
///
/// Returns `FNumberError::NoteOutOfRange` for notes above `MAX_NOTE`.
pub fn encode(note: u8) -> Result<FrequencyRegisters, FNumberError> {
    let octave = (note / 12) as usize;
    let semitone = (note % 12) as usize;
    let multiplier = OCTAVE_MULTIPLIER
        .get(octave)
        .ok_or(FNumberError::NoteOutOfRange { note })?;

    let mut frequency = SEMITONE_HZ[semitone] * multiplier;
    let mut block = BASE_BLOCK;
    while frequency >= FNUM_LIMIT {
        frequency /= 2.0;
        block += 1;
    }
    let fnum = (frequency as u16) & FNUM_MASK;

    Ok(FrequencyRegisters::from_parts(fnum, block))
}

/// Compute the frequency (Hz) the chip produces for `fnum` and `block`.
///
/// `freq = fnum * master_clock / 144 / 2^(21 - block)`
pub fn fnum_block_to_freq(fnum: u16, block: u8, master_clock_hz: f64) -> Result<f64, FNumberError> {
    if !master_clock_hz.is_finite() || master_clock_hz <= 0.0 {
        return Err(FNumberError::InvalidInput);
    }
    if fnum > FNUM_MASK {
        return Err(FNumberError::ExcessiveBits {
            param: "fnum",
            bits: 11,
        });
    }
    if block > BLOCK_MASK {
        return Err(FNumberError::ExcessiveBits {
            param: "block",
            bits: 3,
        });
    }
    let denom_pow = (1_u32 << (21 - block as u32)) as f64;
    Ok((fnum as f64) * master_clock_hz / 144.0 / denom_pow)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_middle_octave_is_unscaled() {
        // octave 5 uses multiplier 1.0, so the table value lands directly in fnum
        for semitone in 0..12u8 {
            let regs = encode(60 + semitone).unwrap();
            assert_eq!(regs.block(), 2);
            assert_eq!(regs.fnum(), SEMITONE_HZ[semitone as usize] as u16);
        }
    }

    #[test]
    fn test_encode_normalizes_into_11_bits() {
        // 349.2 * 8 = 2793.6 -> halved once
        let regs = encode(100).unwrap();
        assert_eq!(regs.block(), 3);
        assert_eq!(regs.fnum(), 1396);
        assert_eq!(regs.high, 0x1D);
        assert_eq!(regs.low, 0x74);
    }

    #[test]
    fn test_encode_lowest_note() {
        // 277.2 / 32 = 8.66
        let regs = encode(0).unwrap();
        assert_eq!(regs.block(), 2);
        assert_eq!(regs.fnum(), 8);
    }

    #[test]
    fn test_encode_out_of_range() {
        assert_eq!(encode(MAX_NOTE).map(|r| r.block()), Ok(6));
        assert_eq!(
            encode(MAX_NOTE + 1),
            Err(FNumberError::NoteOutOfRange { note: 132 })
        );
        assert!(encode(u8::MAX).is_err());
    }

    #[test]
    fn test_pack_and_unpack() {
        let regs = FrequencyRegisters::from_parts(0x26D, 4);
        assert_eq!(regs.high, 0x22);
        assert_eq!(regs.low, 0x6D);
        assert_eq!(regs.fnum(), 0x26D);
        assert_eq!(regs.block(), 4);

        // bits above the fields are dropped
        assert_eq!(pack_block_fnum_high(0xFFFF, 0xFF), 0x3F);
    }

    #[test]
    fn test_fnum_block_to_freq_rejects_bad_input() {
        assert_eq!(
            fnum_block_to_freq(0x800, 4, DEFAULT_MASTER_CLOCK_HZ),
            Err(FNumberError::ExcessiveBits {
                param: "fnum",
                bits: 11
            })
        );
        assert_eq!(
            fnum_block_to_freq(0x100, 8, DEFAULT_MASTER_CLOCK_HZ),
            Err(FNumberError::ExcessiveBits {
                param: "block",
                bits: 3
            })
        );
        assert_eq!(
            fnum_block_to_freq(0x100, 4, f64::NAN),
            Err(FNumberError::InvalidInput)
        );
    }
}
