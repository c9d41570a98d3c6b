//! Spreading codes
//!
//! Linear-feedback shift registers, Gold families built from a pair of
//! maximal sequences, and the four-entry codebook used by the quadrature
//! spreading scheme.

mod lfsr;
mod gold;

pub use lfsr::{parse_binary, to_binary_string, ShiftRegister};
pub use gold::{build_gold_family, cross_correlation, GoldCodebook};
