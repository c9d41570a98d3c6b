//! Carrier trait - Frequency/phase generation
//!
//! Defines the oscillator that modulators key. Pure physics: the carrier
//! knows nothing about bits or schemes.

use rustfft::num_complex::Complex64;

/// Stateful carrier oscillator
///
/// Every `next_*` call advances the phase before sampling, so two calls
/// never return the same sample for a non-zero frequency.
pub trait Carrier: Send + Sync {
    /// Advance the phase and return `sin(phase)`
    fn next_real(&mut self) -> f64;

    /// Advance the phase and return `exp(i·phase)`
    fn next_complex(&mut self) -> Complex64;

    /// Reset the oscillator phase to zero
    fn reset(&mut self);

    /// Current phase in [0, 2π)
    fn phase(&self) -> f64;

    /// Apply a permanent phase offset (differential keying)
    fn shift_phase(&mut self, delta: f64);

    /// Carrier frequency in Hz
    fn frequency(&self) -> f64;

    /// Retune without a phase discontinuity
    fn set_frequency(&mut self, freq_hz: f64);
}
