//! Fixed symbol timing
//!
//! Each symbol occupies `ceil(sample_rate / symbol_rate)` samples. The
//! rates do not have to divide evenly; the symbol is rounded up so it is
//! never shorter than its nominal period.

use crate::error::{EstimationError, EstimationResult};
use crate::traits::SymbolTiming;

/// Fixed symbol timing (deterministic sample count)
#[derive(Debug, Clone, Copy)]
pub struct FixedTiming {
    sample_rate: f64,
    symbol_rate: f64,
    samples_per_symbol: usize,
}

impl FixedTiming {
    /// Create fixed timing from sample and symbol rates
    ///
    /// # Errors
    /// `InvalidParameter` if either rate is not positive and finite, or
    /// the sample rate is below the symbol rate (less than one sample per
    /// symbol).
    pub fn new(sample_rate: f64, symbol_rate: f64) -> EstimationResult<Self> {
        if !(sample_rate.is_finite() && sample_rate > 0.0) {
            return Err(EstimationError::invalid(format!(
                "sample rate must be positive, got {}",
                sample_rate
            )));
        }
        if !(symbol_rate.is_finite() && symbol_rate > 0.0) {
            return Err(EstimationError::invalid(format!(
                "symbol rate must be positive, got {}",
                symbol_rate
            )));
        }
        if sample_rate < symbol_rate {
            return Err(EstimationError::invalid(format!(
                "sample rate {} cannot represent symbol rate {}",
                sample_rate, symbol_rate
            )));
        }

        Ok(Self {
            sample_rate,
            symbol_rate,
            samples_per_symbol: (sample_rate / symbol_rate).ceil() as usize,
        })
    }
}

impl SymbolTiming for FixedTiming {
    fn samples_per_symbol(&self) -> usize {
        self.samples_per_symbol
    }

    fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    fn symbol_rate(&self) -> f64 {
        self.symbol_rate
    }
}
