//! Channel impairments
//!
//! Seeded randomness and additive noise calibrated to a target SNR.

mod random;
mod noise;

pub use random::RandomSource;
pub use noise::NoiseInjector;
