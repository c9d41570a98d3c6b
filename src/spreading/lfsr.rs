//! Linear-feedback shift register
//!
//! State and feedback structure are `k`-bit words written as binary
//! strings, most significant bit first. One step computes the parity of
//! `structure & state`, shifts the state right, inserts the parity at the
//! MSB, and emits the bit that fell out of the LSB.

use crate::common::MAX_REGISTER_WIDTH;
use crate::error::{EstimationError, EstimationResult};

/// Parse a string of '0'/'1' characters into bits (MSB first)
///
/// # Errors
/// `InvalidBinaryDigit` on the first character that is neither '0' nor '1'.
pub fn parse_binary(text: &str) -> EstimationResult<Vec<bool>> {
    text.chars()
        .map(|c| match c {
            '0' => Ok(false),
            '1' => Ok(true),
            other => Err(EstimationError::InvalidBinaryDigit(other)),
        })
        .collect()
}

/// Render bits as a '0'/'1' string
pub fn to_binary_string(bits: &[bool]) -> String {
    bits.iter().map(|&b| if b { '1' } else { '0' }).collect()
}

/// Linear-feedback shift register
#[derive(Debug, Clone)]
pub struct ShiftRegister {
    structure: u32,
    state: u32,
    width: usize,
}

impl ShiftRegister {
    /// Create a register with the given feedback structure and an all-zero state
    ///
    /// # Errors
    /// `InvalidBinaryDigit` for malformed text, `RegisterTooWide` when the
    /// structure is empty or wider than 24 bits.
    pub fn new(structure: &str) -> EstimationResult<Self> {
        let bits = parse_binary(structure)?;
        let width = bits.len();
        if width == 0 || width > MAX_REGISTER_WIDTH {
            return Err(EstimationError::RegisterTooWide(width));
        }

        Ok(Self {
            structure: pack(&bits),
            state: 0,
            width,
        })
    }

    /// Register width `k`
    pub fn width(&self) -> usize {
        self.width
    }

    /// Current state as a binary string
    pub fn state(&self) -> String {
        to_binary_string(&unpack(self.state, self.width))
    }

    /// Feedback structure as a binary string
    pub fn structure(&self) -> String {
        to_binary_string(&unpack(self.structure, self.width))
    }

    /// Load a new state
    ///
    /// # Errors
    /// `InvalidBinaryDigit` for malformed text, `StateLengthMismatch` if the
    /// state is not exactly `k` bits.
    pub fn set_state(&mut self, state: &str) -> EstimationResult<()> {
        let bits = parse_binary(state)?;
        if bits.len() != self.width {
            return Err(EstimationError::StateLengthMismatch {
                expected: self.width,
                actual: bits.len(),
            });
        }
        self.state = pack(&bits);
        Ok(())
    }

    /// Clock the register once and return the bit shifted out
    pub fn step(&mut self) -> bool {
        let feedback = (self.structure & self.state).count_ones() & 1;
        let out = self.state & 1 == 1;
        self.state = (self.state >> 1) | (feedback << (self.width - 1));
        out
    }

    /// Run one full period starting from `initial_state`
    ///
    /// Steps until the state returns to `initial_state` and returns the
    /// emitted bits. For a primitive structure and a non-zero seed this is
    /// a maximal-length sequence of `2^k - 1` bits.
    ///
    /// # Errors
    /// Format errors from [`set_state`](Self::set_state), or
    /// `NonPeriodicRegister` if the seed is not revisited within `2^k`
    /// steps (a structure whose last tap is clear is not invertible).
    pub fn generate_sequence(&mut self, initial_state: &str) -> EstimationResult<Vec<bool>> {
        self.set_state(initial_state)?;
        let seed = self.state;
        let limit = 1usize << self.width;
        let mut sequence = Vec::new();

        loop {
            sequence.push(self.step());
            if self.state == seed {
                return Ok(sequence);
            }
            if sequence.len() >= limit {
                return Err(EstimationError::NonPeriodicRegister {
                    structure: self.structure(),
                });
            }
        }
    }
}

fn pack(bits: &[bool]) -> u32 {
    bits.iter().fold(0u32, |acc, &b| (acc << 1) | b as u32)
}

fn unpack(word: u32, width: usize) -> Vec<bool> {
    (0..width).rev().map(|i| (word >> i) & 1 == 1).collect()
}
