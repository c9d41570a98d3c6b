//! Shared defaults for scenario synthesis

/// Sample rate (Hz)
pub const SAMPLE_RATE: f64 = 10_000.0;

/// Symbol (bit) rate in baud
pub const SYMBOL_RATE: f64 = 100.0;

/// Carrier frequency (Hz)
pub const CARRIER_FREQ: f64 = 1000.0;

/// Amplitude / frequency deviation fraction
pub const MODULATION_DEPTH: f64 = 0.8;

/// Transmitted bits per trial
pub const BIT_SEQUENCE_LENGTH: usize = 64;

/// Injected propagation delay (s)
pub const INJECTED_DELAY: f64 = 0.08;

/// SNR applied to the reference window (dB)
pub const CLEAN_SNR_DB: f64 = 10.0;

/// SNR applied to the received window (dB)
pub const NOISY_SNR_DB: f64 = -10.0;

/// Preferred pair of degree-5 feedback structures (x^5+x^2+1, x^5+x^4+x^3+x^2+1)
pub const GOLD_STRUCTURE_A: &str = "01001";
pub const GOLD_STRUCTURE_B: &str = "01111";

/// Family members used as the four 2-bit symbol codes
pub const GOLD_CODE_SHIFTS: [usize; 4] = [0, 5, 10, 15];

/// Uniform draws accumulated per approximate-Gaussian sample
pub const GAUSSIAN_ACCUMULATE: usize = 12;

/// Largest number of points one sweep may visit
pub const MAX_SWEEP_POINTS: usize = 1_000_000;

/// Widest shift register accepted (sequence length 2^24 - 1)
pub const MAX_REGISTER_WIDTH: usize = 24;
