// ─────────────────────────────────────────────────────────────────────
// Trit Kernel — Classification Benchmarks
// ─────────────────────────────────────────────────────────────────────
//! Criterion benchmarks for the per-sample hot path and consensus.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use trit_core::{classify, majority, weighted_consensus, TritClassifier, Vote};
use trit_types::{Trit, TritConfig};

// ── classify() ──────────────────────────────────────────────────────

fn bench_classify(c: &mut Criterion) {
    c.bench_function("classify", |b| {
        b.iter(|| classify(black_box(0.52), black_box(0.5), black_box(0.05)))
    });
}

// ── TritClassifier.process() ────────────────────────────────────────

fn bench_process_1000_samples(c: &mut Criterion) {
    let classifier = match TritClassifier::new(TritConfig::default()) {
        Ok(classifier) => classifier,
        Err(e) => panic!("default config rejected: {e}"),
    };
    let samples: Vec<f64> = (0..1000).map(|i| (i % 100) as f64 / 100.0).collect();
    c.bench_function("process_1000", |b| {
        b.iter(|| {
            for &s in &samples {
                black_box(classifier.process(black_box(s)));
            }
        })
    });
}

fn bench_process_raw(c: &mut Criterion) {
    let classifier = match TritClassifier::new(TritConfig::default()) {
        Ok(classifier) => classifier,
        Err(e) => panic!("default config rejected: {e}"),
    };
    c.bench_function("process_raw", |b| {
        b.iter(|| classifier.process_raw(black_box(3_000_000_000)))
    });
}

// ── Consensus ───────────────────────────────────────────────────────

fn bench_weighted_consensus_100_votes(c: &mut Criterion) {
    let votes: Vec<Vote> = (0..100)
        .map(|i| {
            let trit = match i % 3 {
                0 => Trit::Zero,
                1 => Trit::Psi,
                _ => Trit::One,
            };
            Vote::new(trit, 1.0 + (i % 7) as f64)
        })
        .collect();
    c.bench_function("weighted_consensus_100", |b| {
        b.iter(|| weighted_consensus(black_box(&votes), black_box(0.1)))
    });
}

fn bench_majority_100(c: &mut Criterion) {
    let trits: Vec<Trit> = (0..100)
        .map(|i| if i % 4 == 0 { Trit::Psi } else { Trit::One })
        .collect();
    c.bench_function("majority_100", |b| b.iter(|| majority(black_box(&trits))));
}

criterion_group!(
    benches,
    bench_classify,
    bench_process_1000_samples,
    bench_process_raw,
    bench_weighted_consensus_100_votes,
    bench_majority_100,
);
criterion_main!(benches);
