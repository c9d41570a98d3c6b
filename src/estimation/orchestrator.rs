//! Monte Carlo orchestration
//!
//! Trials are scattered over the rayon pool and gathered before the
//! aggregate is computed. Every trial owns a `RandomSource` forked from
//! the caller's source before dispatch, so results do not depend on
//! thread scheduling.

use rayon::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

use super::cancel::CancellationHandle;
use super::config::{BatchConfig, BatchMetric, ScenarioConfig, SweepConfig};
use super::scenario::{Diagnostics, TrialResult, TrialRunner};
use super::statistics::mean;
use crate::channel::{NoiseInjector, RandomSource};
use crate::error::EstimationResult;
use crate::spreading::GoldCodebook;
use crate::traits::ReportSink;

type TrialOutcome = (TrialResult, Option<Diagnostics>);

/// Result of a run that may be cancelled
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome<T> {
    Completed(T),
    /// Stopped by the cancellation handle; the handle has been reset
    Cancelled,
}

impl<T> RunOutcome<T> {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    pub fn completed(self) -> Option<T> {
        match self {
            Self::Completed(value) => Some(value),
            Self::Cancelled => None,
        }
    }
}

/// One aggregate on a sweep axis
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepPoint {
    pub x: f64,
    pub value: f64,
}

/// Drives single runs, batches and sweeps for one scenario
pub struct EstimationOrchestrator {
    runner: TrialRunner,
    codebook: Option<Arc<GoldCodebook>>,
    sink: Arc<dyn ReportSink>,
    cancel: CancellationHandle,
}

impl EstimationOrchestrator {
    /// Validate `config` and prepare its codebook
    pub fn new(config: ScenarioConfig, sink: Arc<dyn ReportSink>) -> EstimationResult<Self> {
        config.validate()?;
        let codebook = config.codebook()?;
        let runner = TrialRunner::new(config, codebook.clone())?;

        Ok(Self {
            runner,
            codebook,
            sink,
            cancel: CancellationHandle::new(),
        })
    }

    /// Use an externally owned cancellation handle
    pub fn with_cancellation(mut self, cancel: CancellationHandle) -> Self {
        self.cancel = cancel;
        self
    }

    /// Handle that aborts the current batch or sweep
    pub fn cancellation_handle(&self) -> CancellationHandle {
        self.cancel.clone()
    }

    pub fn config(&self) -> &ScenarioConfig {
        self.runner.config()
    }

    /// One diagnostic trial at the configured delay
    ///
    /// Cancellation is observed after generation and after correlation.
    pub fn run_single(&self, rng: &mut RandomSource) -> EstimationResult<RunOutcome<TrialResult>> {
        self.sink.on_status("Processing one signal...");
        let synthesis = self.runner.generate(self.config().injected_delay, rng)?;
        if self.cancel.is_cancelled() {
            return Ok(self.cancelled());
        }

        self.sink
            .on_status("Signal generation is complete. Calculating correlation...");
        let mut noise = NoiseInjector::new(rng.fork());
        let (result, diagnostics) = self.runner.estimate(synthesis, &mut noise, true)?;
        if self.cancel.is_cancelled() {
            return Ok(self.cancelled());
        }

        if let Some(diagnostics) = diagnostics {
            self.sink.on_diagnostic(&diagnostics);
        }
        info!(
            true_delay = result.true_delay,
            estimated_delay = result.estimated_delay,
            peak_lag = result.peak_lag,
            "single trial complete"
        );
        Ok(RunOutcome::Completed(result))
    }

    /// Fixed-count batch reduced to one aggregate
    pub fn run_batch(
        &self,
        batch: &BatchConfig,
        rng: &mut RandomSource,
    ) -> EstimationResult<RunOutcome<f64>> {
        batch.validate()?;
        batch.metric.check_supported(self.config())?;

        match self.batch(&self.runner, batch, rng)? {
            Some(value) => Ok(RunOutcome::Completed(value)),
            None => Ok(self.cancelled()),
        }
    }

    /// One batch per axis value, stopping between points on cancellation
    pub fn run_sweep(
        &self,
        sweep: &SweepConfig,
        rng: &mut RandomSource,
    ) -> EstimationResult<RunOutcome<Vec<SweepPoint>>> {
        sweep.validate()?;
        let batch = sweep.batch();
        batch.metric.check_supported(self.config())?;

        let values = sweep.values();
        info!(
            axis = sweep.axis.as_str(),
            points = values.len(),
            metric = batch.metric.as_str(),
            "sweep started"
        );

        let mut points = Vec::with_capacity(values.len());
        for x in values {
            if self.cancel.is_cancelled() {
                return Ok(self.cancelled());
            }

            let config = sweep.axis.apply(self.config(), x);
            config.validate()?;
            let runner = TrialRunner::new(config, self.codebook.clone())?;

            let Some(value) = self.batch(&runner, &batch, rng)? else {
                return Ok(self.cancelled());
            };

            let point = SweepPoint { x, value };
            self.sink.on_sweep_point(&point);
            points.push(point);
        }

        info!(points = points.len(), "sweep complete");
        Ok(RunOutcome::Completed(points))
    }

    /// Scatter the trials of one batch and gather the aggregate
    ///
    /// `None` when cancellation was observed.
    fn batch(
        &self,
        runner: &TrialRunner,
        batch: &BatchConfig,
        rng: &mut RandomSource,
    ) -> EstimationResult<Option<f64>> {
        let config = runner.config();
        let metric = batch.metric;
        let count = batch.total_trials();

        let sources: Vec<RandomSource> = (0..count).map(|_| rng.fork()).collect();
        let progress_step = (count / 10).max(1);
        let completed = AtomicUsize::new(0);
        let started = Instant::now();

        info!(
            trials = count,
            metric = metric.as_str(),
            scheme = config.modulation_scheme.as_str(),
            algorithm = config.correlation_algorithm.as_str(),
            "batch started"
        );

        let outcomes = sources
            .into_par_iter()
            .enumerate()
            .map(|(index, mut trial_rng)| -> EstimationResult<Option<TrialOutcome>> {
                if self.cancel.is_cancelled() {
                    return Ok(None);
                }

                let keep = index == 0;
                let outcome = match metric {
                    BatchMetric::BitErrorRate => runner.run_bit_error_trial(trial_rng, keep)?,
                    BatchMetric::DetectionRate => {
                        let delay = trial_rng.uniform_range(0.0, 2.0 * config.injected_delay);
                        runner.run_delay_trial(delay, trial_rng, keep)?
                    }
                    _ => runner.run_delay_trial(config.injected_delay, trial_rng, keep)?,
                };

                debug!(
                    trial = index,
                    true_delay = outcome.0.true_delay,
                    estimated_delay = outcome.0.estimated_delay,
                    peak_lag = outcome.0.peak_lag,
                    "trial complete"
                );

                let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
                if done % progress_step == 0 {
                    self.sink.on_status(&format!("Trial {} of {}", done, count));
                }
                Ok(Some(outcome))
            })
            .collect::<EstimationResult<Vec<_>>>()?;

        if self.cancel.is_cancelled() || outcomes.iter().any(Option::is_none) {
            return Ok(None);
        }

        let mut results = Vec::with_capacity(outcomes.len());
        for (result, diagnostics) in outcomes.into_iter().flatten() {
            if let Some(diagnostics) = diagnostics {
                self.sink.on_diagnostic(&diagnostics);
            }
            results.push(result);
        }

        let value = aggregate(metric, &results, config);
        let elapsed = started.elapsed().as_secs_f64();
        self.sink
            .on_status(&format!("{} trials completed in {:.2} s", count, elapsed));
        info!(trials = count, elapsed_s = elapsed, value, "batch complete");

        Ok(Some(value))
    }

    fn cancelled<T>(&self) -> RunOutcome<T> {
        warn!("run cancelled");
        self.sink.on_status("Cancelled");
        self.cancel.reset();
        RunOutcome::Cancelled
    }
}

/// Reduce trial results to the batch metric
///
/// Means over empty sets (no finite stability, for instance) are NaN.
fn aggregate(metric: BatchMetric, results: &[TrialResult], config: &ScenarioConfig) -> f64 {
    match metric {
        BatchMetric::MeanDelay => {
            let delays: Vec<f64> = results.iter().map(|r| r.estimated_delay).collect();
            mean(&delays).unwrap_or(f64::NAN)
        }
        BatchMetric::DetectionRate => {
            let tolerance = 0.5 * config.symbol_period();
            let hits: Vec<f64> = results
                .iter()
                .map(|r| {
                    if (r.estimated_delay - r.true_delay).abs() < tolerance {
                        1.0
                    } else {
                        0.0
                    }
                })
                .collect();
            mean(&hits).unwrap_or(f64::NAN)
        }
        BatchMetric::MeanStability => {
            let values: Vec<f64> = results.iter().filter_map(|r| r.stability).collect();
            mean(&values).unwrap_or(f64::NAN)
        }
        BatchMetric::BitErrorRate => {
            let (errors, bits) = results
                .iter()
                .filter_map(|r| r.bit_errors)
                .fold((0, 0), |(e, n), (de, dn)| (e + de, n + dn));
            if bits == 0 {
                f64::NAN
            } else {
                errors as f64 / bits as f64
            }
        }
        BatchMetric::MeanDopplerError => {
            let errors: Vec<f64> = results
                .iter()
                .filter_map(|r| r.estimated_doppler)
                .map(|d| (d - config.injected_doppler).abs())
                .collect();
            mean(&errors).unwrap_or(f64::NAN)
        }
    }
}
