//! YM2612 register map.
//!
//! Address constants for the subset of the register space the driver uses,
//! the `RegisterWrite` transaction value, and bit-field packers for the
//! registers whose values combine several fields.
//!
//! Register layout:
//! - Port 0 carries the global registers (0x21..0x2F) and voices 0-2.
//! - Port 1 carries voices 3-5 at the same per-voice addresses.
//! - Per-voice registers add the voice offset (0-2) to the base address.
//! - Per-operator registers add `4 * (operator - 1)` on top of that.

use core::fmt;

/// LFO enable and frequency.
pub const LFO: u8 = 0x22;
/// Timer control and channel 3 special mode.
pub const TIMER_CH3_MODE: u8 = 0x27;
/// Key on/off, global (always written on port 0).
pub const KEY_ON_OFF: u8 = 0x28;
/// DAC enable.
pub const DAC_ENABLE: u8 = 0x2B;

/// Detune / multiple.
pub const DT1_MUL: u8 = 0x30;
/// Total level (attenuation, 0 = loudest, 127 = silent).
pub const TOTAL_LEVEL: u8 = 0x40;
/// Rate scaling / attack rate.
pub const RS_AR: u8 = 0x50;
/// Amplitude modulation enable / first decay rate.
pub const AM_D1R: u8 = 0x60;
/// Secondary decay rate.
pub const D2R: u8 = 0x70;
/// Secondary amplitude / release rate.
pub const D1L_RR: u8 = 0x80;
/// SSG-EG, proprietary, kept at zero.
pub const SSG_EG: u8 = 0x90;

/// F-number bits 7..0.
pub const FNUM_LOW: u8 = 0xA0;
/// Block and F-number bits 10..8.
pub const BLOCK_FNUM_HIGH: u8 = 0xA4;
/// Feedback and algorithm.
pub const FEEDBACK_ALGORITHM: u8 = 0xB0;
/// Stereo output and LFO sensitivity.
pub const PAN_AMS_PMS: u8 = 0xB4;

/// Key-on slot mask selecting all four operators.
pub const ALL_SLOTS: u8 = 0x0F;

/// One of the two register banks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum Port {
    #[default]
    Zero,
    One,
}

impl Port {
    /// Port from the A1 line level. Only bit 0 is used.
    pub fn from_bit(bit: u8) -> Self {
        if bit & 1 == 0 { Port::Zero } else { Port::One }
    }

    /// A1 line level for this port.
    pub fn bit(self) -> u8 {
        match self {
            Port::Zero => 0,
            Port::One => 1,
        }
    }

    pub const ALL: [Port; 2] = [Port::Zero, Port::One];
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.bit())
    }
}

/// One bus transaction: latch `address`, then write `data`, on `port`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RegisterWrite {
    pub address: u8,
    pub data: u8,
    pub port: Port,
}

impl RegisterWrite {
    pub fn new(address: u8, data: u8, port: Port) -> Self {
        Self {
            address,
            data,
            port,
        }
    }

    /// A write to a global register (port 0).
    pub fn global(address: u8, data: u8) -> Self {
        Self::new(address, data, Port::Zero)
    }
}

impl fmt::Display for RegisterWrite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "p{} 0x{:02X}=0x{:02X}",
            self.port.bit(),
            self.address,
            self.data
        )
    }
}

/// One of the four operators of a voice, in register order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Operator {
    One = 1,
    Two = 2,
    Three = 3,
    Four = 4,
}

impl Operator {
    pub const ALL: [Operator; 4] = [Operator::One, Operator::Two, Operator::Three, Operator::Four];

    /// Address step of this operator within a per-operator register block.
    pub fn register_step(self) -> u8 {
        4 * (self as u8 - 1)
    }
}

/// Address of a per-operator register.
///
/// `base` is one of the operator register bases (`DT1_MUL` .. `SSG_EG`),
/// `offset` is the voice slot within its port (0-2).
pub fn operator_register(base: u8, operator: Operator, offset: u8) -> u8 {
    base + operator.register_step() + offset
}

/// Value for the key on/off register.
///
/// - D7..D4: operator slot mask (D4 = operator 1 .. D7 = operator 4)
/// - D2..D0: voice key offset (`offset | port << 2`)
///
/// An empty slot mask keys the voice off.
pub fn key_on_off(slots: u8, key_offset: u8) -> u8 {
    ((slots & ALL_SLOTS) << 4) | (key_offset & 0x07)
}

/// Value for the feedback/algorithm register.
///
/// - D5..D3: operator 1 self-feedback
/// - D2..D0: algorithm
pub fn feedback_algorithm(feedback: u8, algorithm: u8) -> u8 {
    ((feedback & 0x07) << 3) | (algorithm & 0x07)
}

/// Short mnemonic for a register address, for traces.
pub fn register_name(address: u8) -> &'static str {
    match address {
        LFO => "LFO",
        TIMER_CH3_MODE => "CH3 MODE",
        KEY_ON_OFF => "KEY ON/OFF",
        DAC_ENABLE => "DAC EN",
        0x30..=0x3F => "DT1/MUL",
        0x40..=0x4F => "TL",
        0x50..=0x5F => "RS/AR",
        0x60..=0x6F => "AM/D1R",
        0x70..=0x7F => "D2R",
        0x80..=0x8F => "D1L/RR",
        0x90..=0x9F => "SSG-EG",
        0xA0..=0xA2 => "FNUM LO",
        0xA4..=0xA6 => "BLOCK/FNUM HI",
        0xB0..=0xB2 => "FB/ALG",
        0xB4..=0xB6 => "PAN/AMS/PMS",
        _ => "?",
    }
}
