//! Modulation
//!
//! A single `Modulator` keyed at runtime by `ModulationScheme`, composed
//! from a `Carrier` and a `SymbolTiming` implementation.

mod scheme;
mod modulator;

pub use scheme::ModulationScheme;
pub use modulator::Modulator;
