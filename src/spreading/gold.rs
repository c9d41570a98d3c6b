//! Gold code families
//!
//! A Gold family is formed by XORing one maximal sequence with every
//! cyclic shift of a second maximal sequence of the same length. Members
//! have low mutual cross-correlation, which is what lets the quadrature
//! spreading scheme tell four symbol codes apart.

use super::lfsr::ShiftRegister;
use crate::error::{EstimationError, EstimationResult};

/// Build the Gold family of two feedback structures
///
/// Both registers start from the all-ones state. Member `k` is
/// `seq_a[i] ^ seq_b[(i + k) mod len]`, one member per relative shift.
///
/// # Errors
/// `StructureLengthMismatch` if the structures differ in width (argument
/// error), `SequenceLengthMismatch` if the two registers produce sequences
/// of different period (consistency error; never truncated).
pub fn build_gold_family(structure_a: &str, structure_b: &str) -> EstimationResult<Vec<Vec<bool>>> {
    let mut reg_a = ShiftRegister::new(structure_a)?;
    let mut reg_b = ShiftRegister::new(structure_b)?;

    if reg_a.width() != reg_b.width() {
        return Err(EstimationError::StructureLengthMismatch {
            left: reg_a.width(),
            right: reg_b.width(),
        });
    }

    let seed = "1".repeat(reg_a.width());
    let seq_a = reg_a.generate_sequence(&seed)?;
    let seq_b = reg_b.generate_sequence(&seed)?;

    if seq_a.len() != seq_b.len() {
        return Err(EstimationError::SequenceLengthMismatch {
            left: seq_a.len(),
            right: seq_b.len(),
        });
    }

    let len = seq_a.len();
    let family = (0..len)
        .map(|shift| {
            (0..len)
                .map(|i| seq_a[i] ^ seq_b[(i + shift) % len])
                .collect()
        })
        .collect();

    Ok(family)
}

/// Count of coinciding one-bits between `left` and `right` cyclically
/// shifted by `m`, for every `m` in `[0, min(len_left, len_right))`
///
/// Uses AND rather than a bipolar product; the zero-shift value of a code
/// against itself is its weight.
pub fn cross_correlation(left: &[bool], right: &[bool]) -> Vec<usize> {
    let n = left.len().min(right.len());
    if n == 0 {
        return Vec::new();
    }

    (0..n)
        .map(|m| {
            (0..n)
                .filter(|&j| left[j] && right[(j + m) % right.len()])
                .count()
        })
        .collect()
}

/// The four spreading codes that carry 2-bit symbols
///
/// Each entry is a family member with a parity spacer appended when the
/// member length is odd, so every code splits into whole I/Q chip pairs.
#[derive(Debug, Clone, PartialEq)]
pub struct GoldCodebook {
    codes: [Vec<bool>; 4],
    code_len: usize,
}

impl GoldCodebook {
    /// Build the codebook from two structures and four family shift selectors
    ///
    /// # Errors
    /// Family construction errors, or `InvalidParameter` if a shift is
    /// outside the family or two selectors pick the same member.
    pub fn new(structure_a: &str, structure_b: &str, shifts: [usize; 4]) -> EstimationResult<Self> {
        let family = build_gold_family(structure_a, structure_b)?;
        Self::from_family(&family, shifts)
    }

    /// Select four members of an already-built family
    pub fn from_family(family: &[Vec<bool>], shifts: [usize; 4]) -> EstimationResult<Self> {
        for (i, &shift) in shifts.iter().enumerate() {
            if shift >= family.len() {
                return Err(EstimationError::invalid(format!(
                    "gold shift {} outside family of {} members",
                    shift,
                    family.len()
                )));
            }
            if shifts[..i].contains(&shift) {
                return Err(EstimationError::invalid(format!(
                    "gold shift {} selected twice",
                    shift
                )));
            }
        }

        let code_len = family[shifts[0]].len();
        let codes = shifts.map(|shift| with_spacer(&family[shift]));

        Ok(Self { codes, code_len })
    }

    /// Code bits (spacer included) for a 2-bit symbol value 0..=3
    pub fn code(&self, symbol: usize) -> &[bool] {
        &self.codes[symbol & 0x03]
    }

    /// Length of the underlying family member (without spacer)
    pub fn code_len(&self) -> usize {
        self.code_len
    }

    /// Complex I/Q chips per symbol
    pub fn chips_per_symbol(&self) -> usize {
        self.codes[0].len() / 2
    }
}

fn with_spacer(code: &[bool]) -> Vec<bool> {
    let mut chips = code.to_vec();
    if chips.len() % 2 == 1 {
        let parity = code.iter().fold(false, |acc, &b| acc ^ b);
        chips.push(parity);
    }
    chips
}
