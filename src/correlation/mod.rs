//! Cross-correlation engines
//!
//! Three ways of computing the same lag trace:
//!
//! - [`DirectCorrelator`]: per-lag dot products, parallel across lags
//! - [`FftCorrelator`]: one zero-padded transform pair with the reference
//!   spectrum conjugated
//! - [`OverlapAddCorrelator`]: reference-length blocks, each transformed
//!   separately and summed into the lag array
//!
//! Every engine returns lags `[0, N - M)` normalised by `M`, where `N` is
//! the received length and `M` the reference length.

mod direct;
mod fft;
mod overlap_add;

pub use direct::DirectCorrelator;
pub use fft::FftCorrelator;
pub use overlap_add::OverlapAddCorrelator;

use rustfft::num_complex::Complex64;
use std::fmt;
use std::str::FromStr;

use crate::error::{EstimationError, EstimationResult};
use crate::traits::Correlator;

/// Correlation algorithm selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CorrelationAlgorithm {
    #[default]
    Direct,
    Fft,
    OverlapAdd,
}

impl CorrelationAlgorithm {
    pub const ALL: [CorrelationAlgorithm; 3] = [Self::Direct, Self::Fft, Self::OverlapAdd];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Direct => "direct",
            Self::Fft => "fft",
            Self::OverlapAdd => "overlap_add",
        }
    }

    /// Boxed engine for this selector
    pub fn correlator(&self) -> Box<dyn Correlator> {
        match self {
            Self::Direct => Box::new(DirectCorrelator),
            Self::Fft => Box::new(FftCorrelator),
            Self::OverlapAdd => Box::new(OverlapAddCorrelator),
        }
    }

    /// Run the selected engine
    pub fn correlate(
        &self,
        received: &[Complex64],
        reference: &[Complex64],
    ) -> EstimationResult<Vec<Complex64>> {
        match self {
            Self::Direct => DirectCorrelator.correlate(received, reference),
            Self::Fft => FftCorrelator.correlate(received, reference),
            Self::OverlapAdd => OverlapAddCorrelator.correlate(received, reference),
        }
    }
}

impl fmt::Display for CorrelationAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CorrelationAlgorithm {
    type Err = EstimationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|algorithm| algorithm.as_str() == wanted)
            .ok_or_else(|| {
                EstimationError::NotImplemented(format!("correlation algorithm '{}'", s))
            })
    }
}

/// Argument checks shared by every engine; returns the number of valid lags
pub(crate) fn valid_lags(received: &[Complex64], reference: &[Complex64]) -> EstimationResult<usize> {
    if reference.len() > received.len() {
        return Err(EstimationError::ReferenceLongerThanReceived {
            received: received.len(),
            reference: reference.len(),
        });
    }
    if reference.is_empty() {
        return Err(EstimationError::EmptyReference);
    }
    Ok(received.len() - reference.len())
}
