//! Small DSP math helpers

use rustfft::num_complex::Complex64;
use std::f64::consts::PI;

/// Convert a power ratio in dB to linear scale
#[inline]
pub fn db_to_power_ratio(db: f64) -> f64 {
    10.0_f64.powf(db / 10.0)
}

/// Normalize angle to [0, 2π)
#[inline]
pub fn normalize_angle(angle: f64) -> f64 {
    let a = angle.rem_euclid(2.0 * PI);
    // rem_euclid can round up to exactly 2π for tiny negative inputs
    if a >= 2.0 * PI {
        0.0
    } else {
        a
    }
}

/// Smallest power of two >= n (1 for n = 0)
#[inline]
pub fn next_pow2(n: usize) -> usize {
    n.max(1).next_power_of_two()
}

/// Magnitudes of a complex buffer
pub fn magnitudes(samples: &[Complex64]) -> Vec<f64> {
    samples.iter().map(|s| s.norm()).collect()
}

/// Total energy (sum of squared magnitudes)
pub fn energy(samples: &[Complex64]) -> f64 {
    samples.iter().map(|s| s.norm_sqr()).sum()
}

/// Lift a real buffer into the complex domain
pub fn to_complex(samples: &[f64]) -> Vec<Complex64> {
    samples.iter().map(|&s| Complex64::new(s, 0.0)).collect()
}
