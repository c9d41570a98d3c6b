//! Scenario, batch and sweep configuration

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::common::{
    BIT_SEQUENCE_LENGTH, CARRIER_FREQ, CLEAN_SNR_DB, GOLD_CODE_SHIFTS, GOLD_STRUCTURE_A,
    GOLD_STRUCTURE_B, INJECTED_DELAY, MAX_SWEEP_POINTS, MODULATION_DEPTH, NOISY_SNR_DB,
    SAMPLE_RATE, SYMBOL_RATE,
};
use crate::correlation::CorrelationAlgorithm;
use crate::error::{EstimationError, EstimationResult};
use crate::modem::ModulationScheme;
use crate::spreading::GoldCodebook;
use crate::timing::FixedTiming;
use crate::utils::db_to_power_ratio;

/// Doppler hypothesis grid
///
/// `bins` relative carrier offsets evenly spaced over `[-span, span]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DopplerSearch {
    pub span: f64,
    pub bins: usize,
}

impl DopplerSearch {
    pub fn new(span: f64, bins: usize) -> Self {
        Self { span, bins }
    }

    /// Relative offsets to try, lowest first
    pub fn hypotheses(&self) -> Vec<f64> {
        match self.bins {
            0 => Vec::new(),
            1 => vec![0.0],
            n => (0..n)
                .map(|i| self.span * (2.0 * i as f64 / (n - 1) as f64 - 1.0))
                .collect(),
        }
    }

    fn validate(&self) -> EstimationResult<()> {
        if !(self.span.is_finite() && self.span >= 0.0 && self.span < 1.0) {
            return Err(EstimationError::invalid(format!(
                "doppler search span must be in [0, 1), got {}",
                self.span
            )));
        }
        if self.bins == 0 {
            return Err(EstimationError::invalid("doppler search needs at least one bin"));
        }
        Ok(())
    }
}

/// Everything that defines one synthetic trial
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioConfig {
    pub modulation_scheme: ModulationScheme,
    /// Hz
    pub carrier_frequency: f64,
    /// Baud
    pub symbol_rate: f64,
    /// Hz
    pub sample_rate: f64,
    /// Amplitude (OOK) or frequency (BFSK) deviation fraction
    pub modulation_depth: f64,
    pub bit_sequence_length: usize,
    /// Seconds
    pub injected_delay: f64,
    /// Relative carrier offset; the received carrier is `f·(1 + doppler)`
    pub injected_doppler: f64,
    pub clean_snr_db: f64,
    pub noisy_snr_db: f64,
    pub correlation_algorithm: CorrelationAlgorithm,
    pub gold_structure_a: String,
    pub gold_structure_b: String,
    pub gold_code_shifts: [usize; 4],
    pub doppler_search: Option<DopplerSearch>,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            modulation_scheme: ModulationScheme::Ook,
            carrier_frequency: CARRIER_FREQ,
            symbol_rate: SYMBOL_RATE,
            sample_rate: SAMPLE_RATE,
            modulation_depth: MODULATION_DEPTH,
            bit_sequence_length: BIT_SEQUENCE_LENGTH,
            injected_delay: INJECTED_DELAY,
            injected_doppler: 0.0,
            clean_snr_db: CLEAN_SNR_DB,
            noisy_snr_db: NOISY_SNR_DB,
            correlation_algorithm: CorrelationAlgorithm::Direct,
            gold_structure_a: GOLD_STRUCTURE_A.to_string(),
            gold_structure_b: GOLD_STRUCTURE_B.to_string(),
            gold_code_shifts: GOLD_CODE_SHIFTS,
            doppler_search: None,
        }
    }
}

impl ScenarioConfig {
    /// Check every parameter a trial depends on
    ///
    /// Builds the Gold codebook for the Gold scheme, so structure and
    /// shift errors surface here rather than inside a trial.
    pub fn validate(&self) -> EstimationResult<()> {
        self.timing()?;

        if !(self.carrier_frequency.is_finite() && self.carrier_frequency > 0.0) {
            return Err(EstimationError::invalid(format!(
                "carrier frequency must be positive, got {}",
                self.carrier_frequency
            )));
        }
        if !(self.modulation_depth.is_finite() && self.modulation_depth >= 0.0) {
            return Err(EstimationError::invalid(format!(
                "modulation depth must be non-negative, got {}",
                self.modulation_depth
            )));
        }
        if self.bit_sequence_length == 0 {
            return Err(EstimationError::invalid("bit sequence length must be non-zero"));
        }
        if !(self.injected_delay.is_finite() && self.injected_delay >= 0.0) {
            return Err(EstimationError::invalid(format!(
                "injected delay must be non-negative, got {}",
                self.injected_delay
            )));
        }
        if !(self.injected_doppler.is_finite() && 1.0 + self.injected_doppler > 0.0) {
            return Err(EstimationError::invalid(format!(
                "doppler factor 1 + {} must be positive",
                self.injected_doppler
            )));
        }
        // +inf dB means noiseless; -inf dB would ask for infinite noise
        for (name, db) in [("clean", self.clean_snr_db), ("noisy", self.noisy_snr_db)] {
            if !(db > f64::NEG_INFINITY) {
                return Err(EstimationError::invalid(format!(
                    "{} SNR must be a number above -inf dB, got {}",
                    name, db
                )));
            }
        }
        if let Some(search) = &self.doppler_search {
            search.validate()?;
        }

        self.codebook()?;
        Ok(())
    }

    /// Symbol timing for these rates
    pub fn timing(&self) -> EstimationResult<FixedTiming> {
        FixedTiming::new(self.sample_rate, self.symbol_rate)
    }

    /// Spreading codebook, built only for the Gold scheme
    pub fn codebook(&self) -> EstimationResult<Option<Arc<GoldCodebook>>> {
        if self.modulation_scheme != ModulationScheme::GoldQuadrature {
            return Ok(None);
        }
        GoldCodebook::new(&self.gold_structure_a, &self.gold_structure_b, self.gold_code_shifts)
            .map(|book| Some(Arc::new(book)))
    }

    pub fn clean_snr_linear(&self) -> f64 {
        db_to_power_ratio(self.clean_snr_db)
    }

    pub fn noisy_snr_linear(&self) -> f64 {
        db_to_power_ratio(self.noisy_snr_db)
    }

    /// Seconds per bit
    pub fn symbol_period(&self) -> f64 {
        1.0 / self.symbol_rate
    }
}

/// Aggregate reported by a batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BatchMetric {
    /// Mean estimated delay (s) over the trials plus the diagnostic trial
    MeanDelay,
    /// Fraction of trials within half a symbol period of a random true delay,
    /// diagnostic trial included
    DetectionRate,
    /// Mean peak-to-deviation ratio of the correlation trace
    MeanStability,
    /// Decoded bit errors over decoded bits (Gold scheme only)
    BitErrorRate,
    /// Mean |estimated − injected| relative Doppler (needs a search grid)
    MeanDopplerError,
}

impl BatchMetric {
    pub const ALL: [BatchMetric; 5] = [
        Self::MeanDelay,
        Self::DetectionRate,
        Self::MeanStability,
        Self::BitErrorRate,
        Self::MeanDopplerError,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MeanDelay => "mean_delay",
            Self::DetectionRate => "detection_rate",
            Self::MeanStability => "mean_stability",
            Self::BitErrorRate => "bit_error_rate",
            Self::MeanDopplerError => "mean_doppler_error",
        }
    }

    /// Reject metrics the scenario cannot produce
    pub fn check_supported(&self, scenario: &ScenarioConfig) -> EstimationResult<()> {
        match self {
            Self::BitErrorRate if scenario.modulation_scheme != ModulationScheme::GoldQuadrature => {
                Err(EstimationError::UnsupportedMetric {
                    metric: self.as_str(),
                    reason: "only the gold_quadrature scheme is decoded",
                })
            }
            Self::MeanDopplerError if scenario.doppler_search.is_none() => {
                Err(EstimationError::UnsupportedMetric {
                    metric: self.as_str(),
                    reason: "no doppler search grid is configured",
                })
            }
            _ => Ok(()),
        }
    }
}

impl fmt::Display for BatchMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BatchMetric {
    type Err = EstimationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|metric| metric.as_str() == wanted)
            .ok_or_else(|| EstimationError::NotImplemented(format!("batch metric '{}'", s)))
    }
}

/// Fixed-count batch
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BatchConfig {
    pub trial_count: usize,
    pub metric: BatchMetric,
}

impl BatchConfig {
    pub fn new(trial_count: usize, metric: BatchMetric) -> Self {
        Self { trial_count, metric }
    }

    pub fn validate(&self) -> EstimationResult<()> {
        if self.trial_count == 0 {
            return Err(EstimationError::invalid("trial count must be non-zero"));
        }
        Ok(())
    }

    /// Trials actually run: the requested count plus the diagnostic trial
    /// for the delay metrics
    pub fn total_trials(&self) -> usize {
        match self.metric {
            BatchMetric::MeanDelay | BatchMetric::DetectionRate => self.trial_count + 1,
            _ => self.trial_count,
        }
    }
}

/// Scenario parameter varied by a sweep
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SweepAxis {
    /// `noisy_snr_db`
    NoisySnr,
    /// `injected_doppler`
    Doppler,
}

impl SweepAxis {
    /// Copy of `base` with this axis set to `value`
    pub fn apply(&self, base: &ScenarioConfig, value: f64) -> ScenarioConfig {
        let mut config = base.clone();
        match self {
            Self::NoisySnr => config.noisy_snr_db = value,
            Self::Doppler => config.injected_doppler = value,
        }
        config
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoisySnr => "noisy_snr_db",
            Self::Doppler => "injected_doppler",
        }
    }
}

/// One batch per axis value in `start..=max`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepConfig {
    pub axis: SweepAxis,
    pub start: f64,
    pub max: f64,
    pub step: f64,
    pub trial_count: usize,
    pub metric: BatchMetric,
}

impl SweepConfig {
    pub fn validate(&self) -> EstimationResult<()> {
        if !(self.start.is_finite() && self.max.is_finite()) {
            return Err(EstimationError::invalid("sweep bounds must be finite"));
        }
        if !(self.step.is_finite() && self.step > 0.0) {
            return Err(EstimationError::invalid(format!(
                "sweep step must be positive, got {}",
                self.step
            )));
        }
        if self.start > self.max {
            return Err(EstimationError::invalid(format!(
                "sweep start {} exceeds max {}",
                self.start, self.max
            )));
        }
        if self.point_count().is_none() {
            return Err(EstimationError::invalid(format!(
                "sweep from {} to {} in steps of {} exceeds {} points",
                self.start, self.max, self.step, MAX_SWEEP_POINTS
            )));
        }
        BatchConfig::new(self.trial_count, self.metric).validate()
    }

    /// Grid size, `None` for an inverted or oversized grid
    fn point_count(&self) -> Option<usize> {
        // Half a step of slack so accumulated rounding cannot drop `max`
        let steps = ((self.max - self.start) / self.step + 0.5).floor();
        if !(steps >= 0.0 && steps < MAX_SWEEP_POINTS as f64) {
            return None;
        }
        (steps as usize).checked_add(1)
    }

    /// Axis values, `max` included when it lies on the grid
    ///
    /// Empty for a grid `validate` rejects.
    pub fn values(&self) -> Vec<f64> {
        let count = self.point_count().unwrap_or(0);
        (0..count)
            .map(|i| self.start + i as f64 * self.step)
            .filter(|&x| x <= self.max + self.step * 1e-9)
            .collect()
    }

    pub fn batch(&self) -> BatchConfig {
        BatchConfig::new(self.trial_count, self.metric)
    }
}
