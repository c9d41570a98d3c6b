//! Delay / Doppler / bit-error estimation
//!
//! A trial runs Generate → Impair → Correlate → Estimate. The orchestrator
//! scatters trials across the rayon pool, reduces them to one aggregate
//! per batch, and walks sweep axes point by point.

mod cancel;
mod config;
mod gold_decode;
mod orchestrator;
mod scenario;
mod sink;
mod statistics;

#[cfg(test)]
mod estimation_tests;

pub use cancel::CancellationHandle;
pub use config::{BatchConfig, BatchMetric, DopplerSearch, ScenarioConfig, SweepAxis, SweepConfig};
pub use orchestrator::{EstimationOrchestrator, RunOutcome, SweepPoint};
pub use scenario::{Diagnostics, TrialResult};
pub use sink::{NullSink, TracingSink};
pub use statistics::{find_peak, mean, stability_metric};
