//! Voice patches (tone color).
//!
//! A `Patch` is the fixed set of operator and channel register values that
//! shapes a voice's timbre. The driver programs one patch into every voice
//! at `init()`; the values themselves are data, not logic.

use super::registers::{self, Operator, Port, RegisterWrite};

/// Register values for one operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct OperatorPatch {
    /// Detune (D6..D4) and frequency multiple (D3..D0).
    pub dt1_mul: u8,
    /// Attenuation, 0 (loudest) to 127.
    pub total_level: u8,
    /// Rate scaling (D7..D6) and attack rate (D4..D0).
    pub rs_ar: u8,
    /// AM enable (D7) and first decay rate (D4..D0).
    pub am_d1r: u8,
    /// Secondary decay rate (D4..D0).
    pub d2r: u8,
    /// Secondary amplitude (D7..D4) and release rate (D3..D0).
    pub d1l_rr: u8,
    pub ssg_eg: u8,
}

impl OperatorPatch {
    /// `(register base, value)` pairs in write order.
    fn fields(&self) -> [(u8, u8); 7] {
        [
            (registers::DT1_MUL, self.dt1_mul),
            (registers::TOTAL_LEVEL, self.total_level),
            (registers::RS_AR, self.rs_ar),
            (registers::AM_D1R, self.am_d1r),
            (registers::D2R, self.d2r),
            (registers::D1L_RR, self.d1l_rr),
            (registers::SSG_EG, self.ssg_eg),
        ]
    }
}

/// FM algorithm, the fixed topology connecting a voice's four operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Algorithm(u8);

impl Algorithm {
    /// Returns `None` above 7.
    pub fn new(algorithm: u8) -> Option<Self> {
        (algorithm <= 7).then_some(Self(algorithm))
    }

    pub fn get(self) -> u8 {
        self.0
    }

    /// Operators whose output is audible (the "slots" / carriers).
    ///
    /// Only these operators' total level changes loudness without changing
    /// the timbre.
    pub fn output_operators(self) -> &'static [Operator] {
        match self.0 {
            0..=3 => &[Operator::Four],
            4 => &[Operator::Two, Operator::Four],
            5 | 6 => &[Operator::Two, Operator::Three, Operator::Four],
            _ => &Operator::ALL,
        }
    }
}

/// Complete register image of one voice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Patch {
    pub operators: [OperatorPatch; 4],
    /// Operator 1 self-feedback, 0-7.
    pub feedback: u8,
    pub algorithm: Algorithm,
    /// Value for the pan/AMS/PMS register. D7 = left, D6 = right.
    pub pan: u8,
}

impl Default for Patch {
    /// Bright electric-piano-like tone, algorithm 3, both speakers on.
    fn default() -> Self {
        Self {
            operators: [
                OperatorPatch {
                    dt1_mul: 0x71,
                    total_level: 0x23,
                    rs_ar: 0x5F,
                    am_d1r: 0x05,
                    d2r: 0x02,
                    d1l_rr: 0x11,
                    ssg_eg: 0x00,
                },
                OperatorPatch {
                    dt1_mul: 0x0D,
                    total_level: 0x2D,
                    rs_ar: 0x99,
                    am_d1r: 0x05,
                    d2r: 0x02,
                    d1l_rr: 0x11,
                    ssg_eg: 0x00,
                },
                OperatorPatch {
                    dt1_mul: 0x33,
                    total_level: 0x26,
                    rs_ar: 0x5F,
                    am_d1r: 0x05,
                    d2r: 0x02,
                    d1l_rr: 0x11,
                    ssg_eg: 0x00,
                },
                OperatorPatch {
                    dt1_mul: 0x01,
                    total_level: 0x00,
                    rs_ar: 0x94,
                    am_d1r: 0x07,
                    d2r: 0x02,
                    d1l_rr: 0xA6,
                    ssg_eg: 0x00,
                },
            ],
            feedback: 0,
            algorithm: Algorithm(3),
            pan: 0xC0,
        }
    }
}

impl Patch {
    /// Number of writes `writes` yields per voice.
    pub const WRITES_PER_VOICE: usize = 4 * 7 + 2;

    /// Register writes programming this patch into voice `offset` on `port`.
    ///
    /// Order: operators 1..4, each DT1/MUL, TL, RS/AR, AM/D1R, D2R, D1L/RR,
    /// SSG-EG; then feedback/algorithm; then pan.
    pub fn writes(&self, offset: u8, port: Port) -> impl Iterator<Item = RegisterWrite> + '_ {
        let operators = Operator::ALL
            .into_iter()
            .zip(self.operators.iter())
            .flat_map(move |(operator, op)| {
                op.fields().into_iter().map(move |(base, value)| {
                    RegisterWrite::new(
                        registers::operator_register(base, operator, offset),
                        value,
                        port,
                    )
                })
            });
        let channel = [
            RegisterWrite::new(
                registers::FEEDBACK_ALGORITHM + offset,
                registers::feedback_algorithm(self.feedback, self.algorithm.get()),
                port,
            ),
            RegisterWrite::new(registers::PAN_AMS_PMS + offset, self.pan, port),
        ];
        operators.chain(channel)
    }
}
