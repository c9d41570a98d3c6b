//! Time-domain correlation

use rayon::prelude::*;
use rustfft::num_complex::Complex64;

use super::valid_lags;
use crate::error::EstimationResult;
use crate::traits::Correlator;

/// O(N·M) correlation, one rayon task per lag
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectCorrelator;

impl DirectCorrelator {
    /// Circular variant: `N` lags, indices into `received` wrap modulo `N`
    pub fn correlate_circular(
        &self,
        received: &[Complex64],
        reference: &[Complex64],
    ) -> EstimationResult<Vec<Complex64>> {
        valid_lags(received, reference)?;
        let n = received.len();
        let scale = 1.0 / reference.len() as f64;

        Ok((0..n)
            .into_par_iter()
            .map(|k| {
                let sum: Complex64 = reference
                    .iter()
                    .enumerate()
                    .map(|(i, r)| received[(i + k) % n] * r.conj())
                    .sum();
                sum * scale
            })
            .collect())
    }
}

impl Correlator for DirectCorrelator {
    fn correlate(
        &self,
        received: &[Complex64],
        reference: &[Complex64],
    ) -> EstimationResult<Vec<Complex64>> {
        let lags = valid_lags(received, reference)?;
        let m = reference.len();
        let scale = 1.0 / m as f64;

        Ok((0..lags)
            .into_par_iter()
            .map(|k| {
                let sum: Complex64 = received[k..k + m]
                    .iter()
                    .zip(reference)
                    .map(|(x, r)| x * r.conj())
                    .sum();
                sum * scale
            })
            .collect())
    }

    fn name(&self) -> &'static str {
        "direct"
    }
}
