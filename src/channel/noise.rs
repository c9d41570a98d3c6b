//! Additive noise calibrated to a realized SNR
//!
//! Unlike a fixed-variance AWGN source, the injector measures the energy
//! of the signal and of the specific noise draw and scales the noise so
//! that `E_signal / E_noise` equals the requested ratio exactly for every
//! call.

use rustfft::num_complex::Complex64;

use super::random::RandomSource;
use crate::error::{EstimationError, EstimationResult};
use crate::utils::energy;

/// Noise injector owning its own random source
#[derive(Debug, Clone)]
pub struct NoiseInjector {
    rng: RandomSource,
}

impl NoiseInjector {
    pub fn new(rng: RandomSource) -> Self {
        Self { rng }
    }

    /// Add noise to a real buffer at linear SNR `snr_linear`
    ///
    /// Empty input yields empty output. `+∞` returns an exact copy.
    ///
    /// # Errors
    /// `InvalidSnr` for a non-positive or NaN ratio.
    pub fn apply(&mut self, signal: &[f64], snr_linear: f64) -> EstimationResult<Vec<f64>> {
        if signal.is_empty() {
            return Ok(Vec::new());
        }
        check_snr(snr_linear)?;
        if snr_linear.is_infinite() {
            return Ok(signal.to_vec());
        }

        let noise: Vec<f64> = signal.iter().map(|_| self.rng.gaussian_approx()).collect();
        let energy_signal: f64 = signal.iter().map(|s| s * s).sum();
        let energy_noise: f64 = noise.iter().map(|n| n * n).sum();

        let Some(gain) = noise_gain(energy_signal, energy_noise, snr_linear) else {
            return Ok(signal.to_vec());
        };

        Ok(signal
            .iter()
            .zip(noise.iter())
            .map(|(s, n)| s + n * gain)
            .collect())
    }

    /// Add noise to a complex buffer at linear SNR `snr_linear`
    ///
    /// Each noise sample has an approximate-Gaussian magnitude and a
    /// uniformly random phase.
    ///
    /// # Errors
    /// `InvalidSnr` for a non-positive or NaN ratio.
    pub fn apply_complex(
        &mut self,
        signal: &[Complex64],
        snr_linear: f64,
    ) -> EstimationResult<Vec<Complex64>> {
        if signal.is_empty() {
            return Ok(Vec::new());
        }
        check_snr(snr_linear)?;
        if snr_linear.is_infinite() {
            return Ok(signal.to_vec());
        }

        let noise: Vec<Complex64> = signal
            .iter()
            .map(|_| {
                let magnitude = self.rng.gaussian_approx();
                let phase = self.rng.phase();
                Complex64::from_polar(magnitude, phase)
            })
            .collect();
        let energy_signal = energy(signal);
        let energy_noise = energy(&noise);

        let Some(gain) = noise_gain(energy_signal, energy_noise, snr_linear) else {
            return Ok(signal.to_vec());
        };

        Ok(signal
            .iter()
            .zip(noise.iter())
            .map(|(s, n)| s + n * gain)
            .collect())
    }
}

fn check_snr(snr_linear: f64) -> EstimationResult<()> {
    if snr_linear > 0.0 {
        Ok(())
    } else {
        Err(EstimationError::InvalidSnr(snr_linear))
    }
}

/// `sqrt(E_s / (E_n · snr))`, or `None` when either energy is zero
fn noise_gain(energy_signal: f64, energy_noise: f64, snr_linear: f64) -> Option<f64> {
    if energy_signal <= 0.0 || energy_noise <= 0.0 {
        return None;
    }
    Some((energy_signal / (energy_noise * snr_linear)).sqrt())
}
