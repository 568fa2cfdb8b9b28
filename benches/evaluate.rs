//! Evaluation latency benchmarks.
//!
//! One evaluation is closed-form with no iteration or I/O; it should stay in
//! the microsecond range so interactive consumers can recompute on every
//! parameter change without debouncing heroics.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use horizon::{evaluate, sweep_scores, Parameters};

fn bench_single_evaluation(c: &mut Criterion) {
    let params = Parameters::default();
    c.bench_function("evaluate/default", |b| {
        b.iter(|| evaluate(black_box(&params)).unwrap());
    });
}

fn bench_sweep(c: &mut Criterion) {
    let params = Parameters::default();
    c.bench_function("sweep/safeguard_strength_100pt", |b| {
        b.iter(|| sweep_scores(black_box(&params), "safeguard_strength", 0.0, 100.0, 100).unwrap());
    });
}

criterion_group!(benches, bench_single_evaluation, bench_sweep);
criterion_main!(benches);
