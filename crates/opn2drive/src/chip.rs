//! Chip-level data: frequency encoding, register map and voice patches.
//!
//! Nothing in this module touches the bus. The functions here only compute
//! register addresses and values, so the hardware contract can be checked
//! without any pins attached.
pub mod fnumber;
pub mod patch;
pub mod registers;

pub use fnumber::{FNumberError, FrequencyRegisters, encode};
pub use patch::{Algorithm, OperatorPatch, Patch};
pub use registers::{Operator, Port, RegisterWrite};
