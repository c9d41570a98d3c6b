//! Multipath Signal - correlation-based delay estimation engine
//!
//! This crate synthesizes digitally modulated test signals with a known
//! delay, Doppler offset and SNR, recovers the delay by cross-correlation
//! against a clean reference, and aggregates estimator performance over
//! repeated Monte Carlo trials. Plotting and parameter entry live in the
//! host application; the core only consumes a [`ScenarioConfig`] and
//! reports through a [`ReportSink`].

pub mod traits;
pub mod carriers;
pub mod timing;
pub mod spreading;
pub mod channel;
pub mod modem;
pub mod correlation;
pub mod estimation;
pub mod observe;
pub mod common;
pub mod error;
mod utils;

// Re-export core types for convenience
pub use traits::{Carrier, SymbolTiming, Correlator, ReportSink};
pub use carriers::WaveformOscillator;
pub use timing::FixedTiming;
pub use spreading::{ShiftRegister, GoldCodebook, build_gold_family, cross_correlation};
pub use channel::{NoiseInjector, RandomSource};
pub use modem::{Modulator, ModulationScheme};
pub use correlation::{CorrelationAlgorithm, DirectCorrelator, FftCorrelator, OverlapAddCorrelator};
pub use estimation::{
    BatchConfig, BatchMetric, CancellationHandle, Diagnostics, DopplerSearch,
    EstimationOrchestrator, NullSink, RunOutcome, ScenarioConfig, SweepAxis, SweepConfig,
    SweepPoint, TracingSink, TrialResult,
};
pub use error::{EstimationError, EstimationResult};

/// Complex sample type shared by every stage of the pipeline
pub use rustfft::num_complex::Complex64;
