//! Symbol timing implementations
//!
//! Currently only fixed timing (deterministic sample count per symbol).

mod fixed;

pub use fixed::FixedTiming;
