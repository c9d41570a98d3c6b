//! Single-trial pipeline: Generate → Impair → Correlate → Estimate

use rustfft::num_complex::Complex64;
use std::ops::Range;
use std::sync::Arc;

use super::config::ScenarioConfig;
use super::gold_decode::{count_bit_errors, decode_symbols, symbols_to_bits};
use super::statistics::{find_peak, stability_metric};
use crate::carriers::WaveformOscillator;
use crate::channel::{NoiseInjector, RandomSource};
use crate::error::{EstimationError, EstimationResult};
use crate::modem::{ModulationScheme, Modulator};
use crate::spreading::GoldCodebook;
use crate::timing::FixedTiming;
use crate::traits::SymbolTiming;
use crate::utils::{magnitudes, to_complex};

/// Outcome of one trial
#[derive(Debug, Clone, PartialEq)]
pub struct TrialResult {
    /// Delay actually injected (s); zero for bit-error trials
    pub true_delay: f64,
    /// Peak lag divided by the sample rate (s)
    pub estimated_delay: f64,
    pub peak_lag: usize,
    pub stability: Option<f64>,
    /// Winning hypothesis when a Doppler search grid is configured
    pub estimated_doppler: Option<f64>,
    /// `(errors, bits)` for Gold decode trials
    pub bit_errors: Option<(usize, usize)>,
}

/// Buffers of the designated diagnostic trial
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostics {
    /// Reference after impairment at the clean SNR
    pub clean: Vec<Complex64>,
    /// Received window after impairment at the noisy SNR
    pub impaired: Vec<Complex64>,
    /// Correlation magnitude per lag
    pub correlation: Vec<f64>,
    /// The trial's scalar estimate (delay in s, or bit-error rate)
    pub estimate: f64,
}

/// Generated but not yet impaired signals
#[derive(Debug, Clone)]
pub(crate) struct Synthesis {
    pub(crate) true_delay: f64,
    /// Whole transmitted stream, delay prefix included
    pub(crate) bits: Vec<bool>,
    /// Sample range of the clean window within a modulation of `bits`
    pub(crate) window: Range<usize>,
    pub(crate) clean: Vec<Complex64>,
    pub(crate) dirty: Vec<Complex64>,
}

/// Runs trials for one scenario
///
/// Holds no mutable state; every trial brings its own `RandomSource`, so
/// one runner is shared by all rayon workers.
#[derive(Debug, Clone)]
pub(crate) struct TrialRunner {
    config: ScenarioConfig,
    timing: FixedTiming,
    codebook: Option<Arc<GoldCodebook>>,
}

impl TrialRunner {
    pub(crate) fn new(
        config: ScenarioConfig,
        codebook: Option<Arc<GoldCodebook>>,
    ) -> EstimationResult<Self> {
        let timing = config.timing()?;
        Ok(Self {
            config,
            timing,
            codebook,
        })
    }

    pub(crate) fn config(&self) -> &ScenarioConfig {
        &self.config
    }

    /// Fresh modulator with its carrier at `f·(1 + doppler)`
    fn modulator(&self, doppler: f64) -> EstimationResult<Modulator<WaveformOscillator, FixedTiming>> {
        let carrier = WaveformOscillator::new(
            self.config.carrier_frequency * (1.0 + doppler),
            self.config.sample_rate,
        );
        Modulator::new(
            self.config.modulation_scheme,
            carrier,
            self.timing,
            self.config.modulation_depth,
            self.codebook.clone(),
        )
    }

    /// Generate stage
    ///
    /// `symbol_delay` extra symbols precede the clean bits. The clean
    /// window is cut from a nominal-carrier modulation of the whole
    /// stream, so it shares carrier phase with the received window; the
    /// received window is then trimmed so the clean content starts exactly
    /// `round(delay · fs)` samples in.
    pub(crate) fn generate(&self, delay: f64, rng: &mut RandomSource) -> EstimationResult<Synthesis> {
        let mut dirty_mod = self.modulator(self.config.injected_doppler)?;

        let span = dirty_mod.symbol_span();
        let bps = dirty_mod.bits_per_symbol();
        let n = self.config.bit_sequence_length;

        let delay_samples = self.timing.samples_for(delay);
        let symbol_delay = delay_samples.div_ceil(span);
        let total_bits = (symbol_delay * bps + 2 * n).div_ceil(bps) * bps;

        let bits = rng.random_bits(total_bits);
        let start = symbol_delay * span;
        let window = start..start + dirty_mod.samples_for_bits(n);

        let clean = self.reference(0.0, &bits, &window)?;
        let mut dirty = dirty_mod.modulate(&bits);
        dirty.drain(..start - delay_samples);

        Ok(Synthesis {
            true_delay: delay,
            bits,
            window,
            clean,
            dirty,
        })
    }

    /// Clean window of `bits` modulated at carrier offset `doppler`
    fn reference(
        &self,
        doppler: f64,
        bits: &[bool],
        window: &Range<usize>,
    ) -> EstimationResult<Vec<Complex64>> {
        let samples = self.modulator(doppler)?.modulate(bits);
        samples
            .get(window.clone())
            .map(<[Complex64]>::to_vec)
            .ok_or_else(|| EstimationError::invalid("clean window exceeds the generated stream"))
    }

    /// Impair, Correlate and Estimate stages
    pub(crate) fn estimate(
        &self,
        synthesis: Synthesis,
        noise: &mut NoiseInjector,
        keep_diagnostics: bool,
    ) -> EstimationResult<(TrialResult, Option<Diagnostics>)> {
        let impaired = self.impair(noise, &synthesis.dirty, self.config.noisy_snr_linear())?;

        let hypotheses = match &self.config.doppler_search {
            Some(search) => search.hypotheses(),
            None => vec![0.0],
        };

        let mut best: Option<(f64, f64, Vec<Complex64>, Vec<f64>, usize)> = None;
        for &hypothesis in &hypotheses {
            let reference = if self.config.doppler_search.is_some() {
                self.reference(hypothesis, &synthesis.bits, &synthesis.window)?
            } else {
                synthesis.clean.clone()
            };
            let reference = self.impair(noise, &reference, self.config.clean_snr_linear())?;

            let trace = self.config.correlation_algorithm.correlate(&impaired, &reference)?;
            let peak = find_peak(&trace).ok_or_else(|| {
                EstimationError::invalid("received window leaves no lags to search")
            })?;
            let mags = magnitudes(&trace);
            let height = mags[peak];

            if best.as_ref().map_or(true, |b| height > b.1) {
                best = Some((hypothesis, height, reference, mags, peak));
            }
        }

        let (hypothesis, _, reference, mags, peak) = best.ok_or_else(|| {
            EstimationError::invalid("doppler search produced no hypotheses")
        })?;

        let estimated_delay = peak as f64 / self.config.sample_rate;
        let result = TrialResult {
            true_delay: synthesis.true_delay,
            estimated_delay,
            peak_lag: peak,
            stability: stability_metric(&mags, peak, self.timing.samples_per_symbol()),
            estimated_doppler: self.config.doppler_search.map(|_| hypothesis),
            bit_errors: None,
        };

        let diagnostics = keep_diagnostics.then(|| Diagnostics {
            clean: reference,
            impaired,
            correlation: mags,
            estimate: estimated_delay,
        });

        Ok((result, diagnostics))
    }

    /// Full delay trial with its own random source
    pub(crate) fn run_delay_trial(
        &self,
        delay: f64,
        mut rng: RandomSource,
        keep_diagnostics: bool,
    ) -> EstimationResult<(TrialResult, Option<Diagnostics>)> {
        let synthesis = self.generate(delay, &mut rng)?;
        let mut noise = NoiseInjector::new(rng.fork());
        self.estimate(synthesis, &mut noise, keep_diagnostics)
    }

    /// Gold encode → noise → four-code correlation → window decode
    ///
    /// One idle symbol span of silence follows the data so the last
    /// symbol's lag still falls inside the valid correlation range.
    pub(crate) fn run_bit_error_trial(
        &self,
        mut rng: RandomSource,
        keep_diagnostics: bool,
    ) -> EstimationResult<(TrialResult, Option<Diagnostics>)> {
        if self.config.modulation_scheme != ModulationScheme::GoldQuadrature {
            return Err(EstimationError::UnsupportedMetric {
                metric: "bit_error_rate",
                reason: "only the gold_quadrature scheme is decoded",
            });
        }

        let mut tx = self.modulator(self.config.injected_doppler)?;
        let span = tx.symbol_span();
        let n = self.config.bit_sequence_length.div_ceil(2) * 2;
        let symbol_count = n / 2;

        let bits = rng.random_bits(n);
        let mut signal = tx.modulate(&bits);
        signal.resize(signal.len() + span, Complex64::new(0.0, 0.0));

        let mut noise = NoiseInjector::new(rng.fork());
        let impaired = noise.apply_complex(&signal, self.config.noisy_snr_linear())?;

        let mut traces: [Vec<f64>; 4] = Default::default();
        for (symbol, trace) in traces.iter_mut().enumerate() {
            let reference = self
                .modulator(0.0)?
                .modulate(&[symbol & 0b10 != 0, symbol & 0b01 != 0]);
            let correlation = self.config.correlation_algorithm.correlate(&impaired, &reference)?;
            *trace = magnitudes(&correlation);
        }

        let decoded = symbols_to_bits(&decode_symbols(&traces, span, symbol_count));
        let errors = count_bit_errors(&bits, &decoded);
        let rate = errors as f64 / n as f64;

        let result = TrialResult {
            true_delay: 0.0,
            estimated_delay: 0.0,
            peak_lag: 0,
            stability: None,
            estimated_doppler: None,
            bit_errors: Some((errors, n)),
        };

        let diagnostics = keep_diagnostics.then(|| {
            // Decision envelope: the best code at every lag
            let envelope = (0..traces[0].len())
                .map(|lag| traces.iter().map(|t| t[lag]).fold(0.0, f64::max))
                .collect();
            Diagnostics {
                clean: signal,
                impaired,
                correlation: envelope,
                estimate: rate,
            }
        });

        Ok((result, diagnostics))
    }

    /// Noise for real schemes goes on the real part only
    fn impair(
        &self,
        noise: &mut NoiseInjector,
        samples: &[Complex64],
        snr_linear: f64,
    ) -> EstimationResult<Vec<Complex64>> {
        if self.config.modulation_scheme.is_quadrature() {
            noise.apply_complex(samples, snr_linear)
        } else {
            let real: Vec<f64> = samples.iter().map(|s| s.re).collect();
            Ok(to_complex(&noise.apply(&real, snr_linear)?))
        }
    }
}
