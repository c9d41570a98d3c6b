//! End-to-end estimation tests
//!
//! Each part exercises one orchestrator entry point on small scenarios
//! (short bit sequences, 10 samples per bit) so the whole file runs in
//! seconds. Noisy cases assert aggregates, never single trials.

use std::sync::{Arc, Mutex};

use super::*;
use crate::channel::RandomSource;
use crate::correlation::CorrelationAlgorithm;
use crate::error::EstimationError;
use crate::modem::ModulationScheme;
use crate::traits::ReportSink;

/// Sink that records everything and can pull the cancel handle
#[derive(Default)]
struct RecordingSink {
    statuses: Mutex<Vec<String>>,
    estimates: Mutex<Vec<f64>>,
    points: Mutex<Vec<SweepPoint>>,
    cancel_on_progress: Option<CancellationHandle>,
    cancel_on_point: Option<CancellationHandle>,
}

impl RecordingSink {
    fn statuses(&self) -> Vec<String> {
        self.statuses.lock().unwrap().clone()
    }

    fn diagnostic_count(&self) -> usize {
        self.estimates.lock().unwrap().len()
    }

    fn points(&self) -> Vec<SweepPoint> {
        self.points.lock().unwrap().clone()
    }
}

impl ReportSink for RecordingSink {
    fn on_status(&self, text: &str) {
        if text.starts_with("Trial ") {
            if let Some(handle) = &self.cancel_on_progress {
                handle.cancel();
            }
        }
        self.statuses.lock().unwrap().push(text.to_string());
    }

    fn on_diagnostic(&self, diagnostics: &Diagnostics) {
        self.estimates.lock().unwrap().push(diagnostics.estimate);
    }

    fn on_sweep_point(&self, point: &SweepPoint) {
        if let Some(handle) = &self.cancel_on_point {
            handle.cancel();
        }
        self.points.lock().unwrap().push(*point);
    }
}

/// 1 kBd at 10 kHz: 10 samples per bit, one carrier cycle per bit
fn small_scenario(scheme: ModulationScheme) -> ScenarioConfig {
    ScenarioConfig {
        modulation_scheme: scheme,
        symbol_rate: 1000.0,
        bit_sequence_length: 32,
        injected_delay: 0.005,
        clean_snr_db: 20.0,
        noisy_snr_db: 0.0,
        ..ScenarioConfig::default()
    }
}

fn noiseless(mut config: ScenarioConfig) -> ScenarioConfig {
    config.clean_snr_db = f64::INFINITY;
    config.noisy_snr_db = f64::INFINITY;
    config
}

fn orchestrator(config: ScenarioConfig) -> (EstimationOrchestrator, Arc<RecordingSink>) {
    let sink = Arc::new(RecordingSink::default());
    let orch = EstimationOrchestrator::new(config, sink.clone()).unwrap();
    (orch, sink)
}

// =============================================================================
// PART 1: Single Run
// =============================================================================

#[cfg(test)]
mod single_run_tests {
    use super::*;

    /// 10 kHz, 100 Bd OOK, 64 bits, 80 ms delay, 10 dB / -10 dB
    #[test]
    fn test_example_scenario_direct() {
        let (orch, sink) = orchestrator(ScenarioConfig::default());
        let result = orch.run_single(&mut RandomSource::from_seed(2024)).unwrap().completed().unwrap();

        println!(
            "estimated {:.4} s (lag {}), stability {:?}",
            result.estimated_delay, result.peak_lag, result.stability
        );
        assert!(
            (result.estimated_delay - 0.08).abs() < 0.01,
            "estimate {} not within one symbol of 0.08",
            result.estimated_delay
        );

        let statuses = sink.statuses();
        assert_eq!(statuses[0], "Processing one signal...");
        assert_eq!(statuses[1], "Signal generation is complete. Calculating correlation...");
        assert_eq!(sink.diagnostic_count(), 1);
    }

    #[test]
    fn test_noiseless_recovery_every_scheme() {
        for scheme in ModulationScheme::ALL {
            let config = ScenarioConfig {
                bit_sequence_length: 16,
                injected_delay: 0.0037,
                ..noiseless(small_scenario(scheme))
            };
            let (orch, _) = orchestrator(config);
            let result = orch.run_single(&mut RandomSource::from_seed(17)).unwrap().completed().unwrap();

            println!("{}: lag {}", scheme, result.peak_lag);
            assert_eq!(result.peak_lag, 37, "{}", scheme);
            assert!((result.estimated_delay - 0.0037).abs() < 1.0 / 10_000.0);
        }
    }

    #[test]
    fn test_algorithms_agree_on_peak() {
        let mut lags = Vec::new();
        for algorithm in CorrelationAlgorithm::ALL {
            let config = ScenarioConfig {
                correlation_algorithm: algorithm,
                ..small_scenario(ModulationScheme::Msk)
            };
            let (orch, _) = orchestrator(config);
            let result = orch.run_single(&mut RandomSource::from_seed(99)).unwrap().completed().unwrap();
            lags.push(result.peak_lag);
        }

        println!("peak lags per algorithm: {:?}", lags);
        for lag in &lags[1..] {
            assert!(lag.abs_diff(lags[0]) <= 1, "{:?}", lags);
        }
    }

    #[test]
    fn test_invalid_scenario_rejected() {
        let config = ScenarioConfig {
            sample_rate: 50.0,
            ..ScenarioConfig::default()
        };
        let sink: Arc<dyn ReportSink> = Arc::new(NullSink);
        assert!(matches!(
            EstimationOrchestrator::new(config, sink),
            Err(EstimationError::InvalidParameter(_))
        ));
    }
}

// =============================================================================
// PART 2: Batches
// =============================================================================

#[cfg(test)]
mod batch_tests {
    use super::*;

    #[test]
    fn test_mean_delay_includes_diagnostic_trial() {
        let (orch, sink) = orchestrator(small_scenario(ModulationScheme::BpskNrz));
        let outcome = orch
            .run_batch(&BatchConfig::new(8, BatchMetric::MeanDelay), &mut RandomSource::from_seed(1))
            .unwrap();

        let mean_delay = outcome.completed().unwrap();
        println!("mean delay {:.5} s", mean_delay);
        assert!((mean_delay - 0.005).abs() < 0.0005);

        assert_eq!(sink.diagnostic_count(), 1);
        let last = sink.statuses().pop().unwrap();
        assert!(last.starts_with("9 trials completed in "), "{}", last);
        assert!(last.ends_with(" s"), "{}", last);
    }

    #[test]
    fn test_progress_reported() {
        let (orch, sink) = orchestrator(small_scenario(ModulationScheme::BpskNrz));
        orch.run_batch(&BatchConfig::new(20, BatchMetric::DetectionRate), &mut RandomSource::from_seed(4))
            .unwrap();

        let progress: Vec<String> = sink
            .statuses()
            .into_iter()
            .filter(|s| s.starts_with("Trial "))
            .collect();
        // 20 trials plus the diagnostic one, reported every second trial
        assert_eq!(progress.len(), 10);
        assert!(progress.contains(&"Trial 20 of 21".to_string()));

        let last = sink.statuses().pop().unwrap();
        assert!(last.starts_with("21 trials completed in "), "{}", last);
    }

    #[test]
    fn test_detection_rate_high_snr() {
        let (orch, _) = orchestrator(small_scenario(ModulationScheme::BpskNrz));
        let rate = orch
            .run_batch(&BatchConfig::new(20, BatchMetric::DetectionRate), &mut RandomSource::from_seed(8))
            .unwrap()
            .completed()
            .unwrap();

        println!("detection rate {}", rate);
        assert!(rate >= 0.9);
    }

    #[test]
    fn test_batch_reproducible_from_seed() {
        let (orch, _) = orchestrator(small_scenario(ModulationScheme::Ook));
        let batch = BatchConfig::new(6, BatchMetric::MeanDelay);

        let a = orch.run_batch(&batch, &mut RandomSource::from_seed(77)).unwrap();
        let b = orch.run_batch(&batch, &mut RandomSource::from_seed(77)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_mean_stability_positive() {
        let (orch, _) = orchestrator(small_scenario(ModulationScheme::Msk));
        let stability = orch
            .run_batch(&BatchConfig::new(4, BatchMetric::MeanStability), &mut RandomSource::from_seed(3))
            .unwrap()
            .completed()
            .unwrap();
        assert!(stability > 1.0, "{}", stability);
    }

    #[test]
    fn test_doppler_search_noiseless() {
        let config = ScenarioConfig {
            injected_doppler: 0.02,
            doppler_search: Some(DopplerSearch::new(0.04, 5)),
            ..noiseless(small_scenario(ModulationScheme::Msk))
        };
        let (orch, _) = orchestrator(config);

        let single = orch.run_single(&mut RandomSource::from_seed(6)).unwrap().completed().unwrap();
        assert_eq!(single.estimated_doppler, Some(0.02));
        assert_eq!(single.peak_lag, 50);

        let error = orch
            .run_batch(&BatchConfig::new(3, BatchMetric::MeanDopplerError), &mut RandomSource::from_seed(6))
            .unwrap()
            .completed()
            .unwrap();
        assert!(error < 1e-12, "{}", error);
    }

    #[test]
    fn test_unsupported_metrics() {
        let (orch, _) = orchestrator(small_scenario(ModulationScheme::Ook));
        let mut rng = RandomSource::from_seed(0);

        assert!(matches!(
            orch.run_batch(&BatchConfig::new(2, BatchMetric::BitErrorRate), &mut rng),
            Err(EstimationError::UnsupportedMetric { .. })
        ));
        assert!(matches!(
            orch.run_batch(&BatchConfig::new(2, BatchMetric::MeanDopplerError), &mut rng),
            Err(EstimationError::UnsupportedMetric { .. })
        ));
        assert!(orch.run_batch(&BatchConfig::new(0, BatchMetric::MeanDelay), &mut rng).is_err());
    }
}

// =============================================================================
// PART 3: Gold Decoding
// =============================================================================

#[cfg(test)]
mod gold_tests {
    use super::*;

    /// 4 samples per chip, 16 chips per symbol
    fn gold_scenario() -> ScenarioConfig {
        ScenarioConfig {
            modulation_scheme: ModulationScheme::GoldQuadrature,
            symbol_rate: 2500.0,
            bit_sequence_length: 16,
            ..ScenarioConfig::default()
        }
    }

    #[test]
    fn test_ber_zero_without_noise() {
        let (orch, sink) = orchestrator(noiseless(gold_scenario()));
        let ber = orch
            .run_batch(&BatchConfig::new(4, BatchMetric::BitErrorRate), &mut RandomSource::from_seed(12))
            .unwrap()
            .completed()
            .unwrap();

        assert_eq!(ber, 0.0);
        assert_eq!(sink.diagnostic_count(), 1);
    }

    #[test]
    fn test_odd_length_padded_to_symbols() {
        let config = ScenarioConfig {
            bit_sequence_length: 15,
            ..noiseless(gold_scenario())
        };
        let (orch, _) = orchestrator(config);
        let ber = orch
            .run_batch(&BatchConfig::new(2, BatchMetric::BitErrorRate), &mut RandomSource::from_seed(5))
            .unwrap()
            .completed()
            .unwrap();
        assert_eq!(ber, 0.0);
    }

    #[test]
    fn test_ber_falls_with_snr() {
        let (orch, sink) = orchestrator(gold_scenario());
        let sweep = SweepConfig {
            axis: SweepAxis::NoisySnr,
            start: -25.0,
            max: 5.0,
            step: 10.0,
            trial_count: 12,
            metric: BatchMetric::BitErrorRate,
        };

        let points = orch
            .run_sweep(&sweep, &mut RandomSource::from_seed(21))
            .unwrap()
            .completed()
            .unwrap();

        println!("BER sweep: {:?}", points);
        assert_eq!(points.len(), 4);
        for pair in points.windows(2) {
            assert!(pair[1].value <= pair[0].value, "BER rose: {:?}", points);
        }
        assert!(points[0].value > points[3].value);
        assert!(points[3].value < 0.05);
        assert_eq!(sink.points(), points);
    }

    #[test]
    fn test_delay_estimation_on_gold() {
        let config = ScenarioConfig {
            injected_delay: 0.005,
            ..noiseless(gold_scenario())
        };
        let (orch, _) = orchestrator(config);
        let result = orch.run_single(&mut RandomSource::from_seed(31)).unwrap().completed().unwrap();
        assert_eq!(result.peak_lag, 50);
    }
}

// =============================================================================
// PART 4: Sweeps and Cancellation
// =============================================================================

#[cfg(test)]
mod sweep_tests {
    use super::*;

    fn snr_sweep(trial_count: usize) -> SweepConfig {
        SweepConfig {
            axis: SweepAxis::NoisySnr,
            start: -10.0,
            max: 0.0,
            step: 5.0,
            trial_count,
            metric: BatchMetric::DetectionRate,
        }
    }

    #[test]
    fn test_sweep_points_follow_axis() {
        let (orch, sink) = orchestrator(small_scenario(ModulationScheme::BpskNrz));
        let points = orch
            .run_sweep(&snr_sweep(4), &mut RandomSource::from_seed(10))
            .unwrap()
            .completed()
            .unwrap();

        let xs: Vec<f64> = points.iter().map(|p| p.x).collect();
        assert_eq!(xs, vec![-10.0, -5.0, 0.0]);
        assert!(points.iter().all(|p| (0.0..=1.0).contains(&p.value)));
        assert_eq!(sink.points().len(), 3);
        assert_eq!(sink.diagnostic_count(), 3);
    }

    #[test]
    fn test_detection_rises_with_snr() {
        let (orch, _) = orchestrator(small_scenario(ModulationScheme::BpskNrz));
        let sweep = SweepConfig {
            axis: SweepAxis::NoisySnr,
            start: -40.0,
            max: 0.0,
            step: 20.0,
            trial_count: 24,
            metric: BatchMetric::DetectionRate,
        };

        let points = orch
            .run_sweep(&sweep, &mut RandomSource::from_seed(15))
            .unwrap()
            .completed()
            .unwrap();

        println!("detection sweep: {:?}", points);
        assert_eq!(points.len(), 3);
        for pair in points.windows(2) {
            assert!(pair[1].value >= pair[0].value, "detection fell: {:?}", points);
        }
        assert!(points[0].value < points[2].value);
        assert!(points[2].value >= 0.9);
    }

    #[test]
    fn test_doppler_axis_rejects_invalid_point() {
        let (orch, _) = orchestrator(small_scenario(ModulationScheme::BpskNrz));
        let sweep = SweepConfig {
            axis: SweepAxis::Doppler,
            start: -1.5,
            max: 0.0,
            step: 1.5,
            trial_count: 2,
            metric: BatchMetric::MeanDelay,
        };
        assert!(matches!(
            orch.run_sweep(&sweep, &mut RandomSource::from_seed(1)),
            Err(EstimationError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_cancel_before_sweep_then_reset() {
        let (orch, sink) = orchestrator(small_scenario(ModulationScheme::BpskNrz));
        let handle = orch.cancellation_handle();
        handle.cancel();

        let outcome = orch.run_sweep(&snr_sweep(4), &mut RandomSource::from_seed(2)).unwrap();
        assert!(outcome.is_cancelled());
        assert_eq!(sink.statuses().last().map(String::as_str), Some("Cancelled"));
        assert!(sink.points().is_empty());

        // The orchestrator cleared the flag; the next run is unaffected
        assert!(!handle.is_cancelled());
        let outcome = orch
            .run_batch(&BatchConfig::new(2, BatchMetric::MeanDelay), &mut RandomSource::from_seed(2))
            .unwrap();
        assert!(!outcome.is_cancelled());
    }

    #[test]
    fn test_cancel_during_single_run_is_cleared() {
        let (orch, sink) = orchestrator(small_scenario(ModulationScheme::BpskNrz));
        let handle = orch.cancellation_handle();
        handle.cancel();

        let outcome = orch.run_single(&mut RandomSource::from_seed(5)).unwrap();
        assert!(outcome.is_cancelled());
        assert_eq!(sink.statuses().last().map(String::as_str), Some("Cancelled"));
        assert_eq!(sink.diagnostic_count(), 0);
        assert!(!handle.is_cancelled());

        let mean_delay = orch
            .run_batch(&BatchConfig::new(4, BatchMetric::MeanDelay), &mut RandomSource::from_seed(5))
            .unwrap()
            .completed();
        assert!(mean_delay.is_some());
        assert!(sink.statuses().last().unwrap().starts_with("5 trials completed in "));
    }

    #[test]
    fn test_cancel_during_batch() {
        let handle = CancellationHandle::new();
        let sink = Arc::new(RecordingSink {
            cancel_on_progress: Some(handle.clone()),
            ..Default::default()
        });
        let orch = EstimationOrchestrator::new(small_scenario(ModulationScheme::BpskNrz), sink.clone())
            .unwrap()
            .with_cancellation(handle.clone());

        let outcome = orch
            .run_batch(&BatchConfig::new(30, BatchMetric::DetectionRate), &mut RandomSource::from_seed(3))
            .unwrap();

        assert_eq!(outcome, RunOutcome::Cancelled);
        assert!(sink.statuses().contains(&"Cancelled".to_string()));
        assert!(!sink.statuses().iter().any(|s| s.contains("trials completed")));
        assert_eq!(sink.diagnostic_count(), 0);
        assert!(!handle.is_cancelled());
    }

    #[test]
    fn test_cancel_between_sweep_points() {
        let handle = CancellationHandle::new();
        let sink = Arc::new(RecordingSink {
            cancel_on_point: Some(handle.clone()),
            ..Default::default()
        });
        let orch = EstimationOrchestrator::new(small_scenario(ModulationScheme::BpskNrz), sink.clone())
            .unwrap()
            .with_cancellation(handle.clone());

        let outcome = orch.run_sweep(&snr_sweep(2), &mut RandomSource::from_seed(4)).unwrap();

        assert!(outcome.is_cancelled());
        assert_eq!(sink.points().len(), 1);
        assert!(!handle.is_cancelled());
    }
}
