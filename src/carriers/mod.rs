//! Carrier oscillator implementations
//!
//! Currently only the phase-accumulator waveform oscillator.

mod oscillator;

pub use oscillator::WaveformOscillator;
