//! Frequency-domain correlation
//!
//! `IFFT(X · conj(S))[k] = Σ x[i + k] · conj(s[i])` as long as the
//! transform is long enough that no valid lag wraps around. Padding to
//! `next_pow2(N + M)` guarantees that for every `k < N - M`, so the valid
//! slice is simply the first `N - M` outputs.

use rustfft::{num_complex::Complex64, Fft, FftPlanner};
use std::fmt;
use std::sync::Arc;

use super::valid_lags;
use crate::error::EstimationResult;
use crate::traits::Correlator;
use crate::utils::next_pow2;

/// Planned forward/inverse transform pair of one size
///
/// Holds no scratch of its own so one plan can be shared by rayon workers.
pub(crate) struct SpectrumPlan {
    size: usize,
    forward: Arc<dyn Fft<f64>>,
    inverse: Arc<dyn Fft<f64>>,
}

impl fmt::Debug for SpectrumPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpectrumPlan").field("size", &self.size).finish()
    }
}

impl SpectrumPlan {
    pub(crate) fn new(size: usize) -> Self {
        let mut planner = FftPlanner::new();
        Self {
            size,
            forward: planner.plan_fft_forward(size),
            inverse: planner.plan_fft_inverse(size),
        }
    }

    pub(crate) fn size(&self) -> usize {
        self.size
    }

    /// Zero-pad `input` to the plan size and transform it
    pub(crate) fn forward(&self, input: &[Complex64]) -> Vec<Complex64> {
        let mut buffer = Vec::with_capacity(self.size);
        buffer.extend_from_slice(&input[..input.len().min(self.size)]);
        buffer.resize(self.size, Complex64::new(0.0, 0.0));
        self.forward.process(&mut buffer);
        buffer
    }

    /// Conjugated spectrum of a reference
    pub(crate) fn conjugate_spectrum(&self, reference: &[Complex64]) -> Vec<Complex64> {
        let mut spectrum = self.forward(reference);
        for bin in spectrum.iter_mut() {
            *bin = bin.conj();
        }
        spectrum
    }

    /// Multiply by `filter` bin-wise, inverse-transform, scale by `scale / size`
    pub(crate) fn filter_inverse(
        &self,
        spectrum: &mut [Complex64],
        filter: &[Complex64],
        scale: f64,
    ) {
        for (bin, f) in spectrum.iter_mut().zip(filter) {
            *bin *= f;
        }
        self.inverse.process(spectrum);

        let scale = scale / self.size as f64;
        for sample in spectrum.iter_mut() {
            *sample *= scale;
        }
    }
}

/// Single transform-pair correlation
#[derive(Debug, Clone, Copy, Default)]
pub struct FftCorrelator;

impl Correlator for FftCorrelator {
    fn correlate(
        &self,
        received: &[Complex64],
        reference: &[Complex64],
    ) -> EstimationResult<Vec<Complex64>> {
        let lags = valid_lags(received, reference)?;
        if lags == 0 {
            return Ok(Vec::new());
        }

        let plan = SpectrumPlan::new(next_pow2(received.len() + reference.len()));
        let filter = plan.conjugate_spectrum(reference);
        let mut spectrum = plan.forward(received);
        plan.filter_inverse(&mut spectrum, &filter, 1.0 / reference.len() as f64);

        spectrum.truncate(lags);
        Ok(spectrum)
    }

    fn name(&self) -> &'static str {
        "fft"
    }
}
