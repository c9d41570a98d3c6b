//! Modulation benchmarks

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use multipath_signal::*;
use std::sync::Arc;

fn benchmark_schemes(c: &mut Criterion) {
    let bits = RandomSource::from_seed(1).random_bits(1000);
    let codebook = GoldCodebook::new("01001", "01111", [0, 5, 10, 15]).map(Arc::new).ok();

    for scheme in ModulationScheme::ALL {
        let timing = FixedTiming::new(10_000.0, 100.0).unwrap();
        let carrier = WaveformOscillator::new(1000.0, 10_000.0);
        let mut modulator = Modulator::new(scheme, carrier, timing, 0.8, codebook.clone()).unwrap();

        c.bench_function(&format!("{}_modulate_1000_bits", scheme), |b| {
            b.iter(|| {
                modulator.reset();
                black_box(modulator.modulate(&bits))
            })
        });
    }
}

fn benchmark_gold_family(c: &mut Criterion) {
    c.bench_function("gold_family_degree_5", |b| {
        b.iter(|| black_box(build_gold_family("01001", "01111")))
    });
}

criterion_group!(benches, benchmark_schemes, benchmark_gold_family);
criterion_main!(benches);
