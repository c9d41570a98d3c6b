//! Waveform oscillator (phase accumulator)
//!
//! Generates the carrier for every modulation scheme. Phase-continuous,
//! frequency-adjustable, and able to take permanent phase jumps for
//! differential keying.

use rustfft::num_complex::Complex64;
use std::f64::consts::PI;

use crate::traits::Carrier;
use crate::utils::normalize_angle;

/// Phase-accumulator oscillator
#[derive(Debug, Clone)]
pub struct WaveformOscillator {
    phase: f64,
    phase_inc: f64,
    freq_hz: f64,
    sample_rate: f64,
}

impl WaveformOscillator {
    /// Create a new oscillator at zero phase
    ///
    /// # Arguments
    /// * `freq_hz` - Carrier frequency in Hz
    /// * `sample_rate` - Sample rate in Hz
    pub fn new(freq_hz: f64, sample_rate: f64) -> Self {
        Self {
            phase: 0.0,
            phase_inc: 2.0 * PI * freq_hz / sample_rate,
            freq_hz,
            sample_rate,
        }
    }

    fn advance(&mut self) {
        self.phase += self.phase_inc;

        // Keep phase in [0, 2π) for numerical stability
        if !(0.0..2.0 * PI).contains(&self.phase) {
            self.phase = normalize_angle(self.phase);
        }
    }
}

impl Carrier for WaveformOscillator {
    fn next_real(&mut self) -> f64 {
        self.advance();
        self.phase.sin()
    }

    fn next_complex(&mut self) -> Complex64 {
        self.advance();
        Complex64::from_polar(1.0, self.phase)
    }

    fn reset(&mut self) {
        self.phase = 0.0;
    }

    fn phase(&self) -> f64 {
        self.phase
    }

    fn shift_phase(&mut self, delta: f64) {
        self.phase = normalize_angle(self.phase + delta);
    }

    fn frequency(&self) -> f64 {
        self.freq_hz
    }

    fn set_frequency(&mut self, freq_hz: f64) {
        self.freq_hz = freq_hz;
        self.phase_inc = 2.0 * PI * freq_hz / self.sample_rate;
    }
}
