//! Block overlap-add correlation
//!
//! The received buffer is cut into blocks of the reference length `M`.
//! Each block is correlated against the reference spectrum with a
//! transform of length `L = next_pow2(2M)`, which holds every local lag in
//! `(-M, M)` without overlap: bins `[0, M)` are lags `0..M`, bins
//! `(L - M, L)` are the negative lags `i - L`. A block starting at `p`
//! contributes local lag `j` to global lag `p + j`; neighbouring blocks
//! land on the same global lags and are summed.

use rayon::prelude::*;
use rustfft::num_complex::Complex64;

use super::fft::SpectrumPlan;
use super::valid_lags;
use crate::error::EstimationResult;
use crate::traits::Correlator;
use crate::utils::next_pow2;

/// Fixed-size block correlation, blocks transformed in parallel
#[derive(Debug, Clone, Copy, Default)]
pub struct OverlapAddCorrelator;

impl Correlator for OverlapAddCorrelator {
    fn correlate(
        &self,
        received: &[Complex64],
        reference: &[Complex64],
    ) -> EstimationResult<Vec<Complex64>> {
        let lags = valid_lags(received, reference)?;
        if lags == 0 {
            return Ok(Vec::new());
        }

        let m = reference.len();
        let plan = SpectrumPlan::new(next_pow2(2 * m));
        let size = plan.size();
        let filter = plan.conjugate_spectrum(reference);
        let scale = 1.0 / m as f64;

        // Blocks are independent; only the accumulation below is ordered
        let blocks: Vec<(usize, Vec<Complex64>)> = received
            .par_chunks(m)
            .enumerate()
            .map(|(b, block)| {
                let mut spectrum = plan.forward(block);
                plan.filter_inverse(&mut spectrum, &filter, scale);
                (b * m, spectrum)
            })
            .collect();

        let mut output = vec![Complex64::new(0.0, 0.0); lags];
        for (start, local) in blocks {
            for (bin, value) in local.iter().enumerate() {
                let global = if bin < m {
                    start + bin
                } else if bin > size - m && start + bin >= size {
                    start + bin - size
                } else {
                    continue;
                };
                if global < lags {
                    output[global] += value;
                }
            }
        }

        Ok(output)
    }

    fn name(&self) -> &'static str {
        "overlap_add"
    }
}
