//! Benchmarks for the Standard Library's [`BTreeSet`].

use std::collections::BTreeSet;

use criterion::{AxisScale, BenchmarkId, Criterion, PlotConfiguration, black_box};
use rand::{Rng, SeedableRng, rngs::StdRng};

/// Benchmarking sizes.
const SIZES: [usize; 5] = [1, 10, 100, 1000, 10_000];

/// Benchmarking insertion of random keys.
pub fn insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("BTreeSet Insert");
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    for size in SIZES {
        group.bench_function(BenchmarkId::from_parameter(size), |b| {
            let mut rng = StdRng::seed_from_u64(0x1234_abcd);
            let mut set: BTreeSet<u64> =
                std::iter::repeat_with(|| rng.random()).take(size).collect();

            b.iter(|| {
                set.insert(rng.random());
            });
        });
    }
}

/// Benchmarking search of random keys.
pub fn search(c: &mut Criterion) {
    let mut group = c.benchmark_group("BTreeSet Search");
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    for size in SIZES {
        group.bench_function(BenchmarkId::from_parameter(size), |b| {
            let mut rng = StdRng::seed_from_u64(0x1234_abcd);
            let keys: Vec<u64> = std::iter::repeat_with(|| rng.random())
                .take(size)
                .collect();
            let set: BTreeSet<u64> = keys.iter().copied().collect();
            let keys_to_find: Vec<_> = std::iter::repeat_with(|| keys[rng.random_range(0..keys.len())])
                .take(10)
                .collect();

            b.iter(|| {
                for key in &keys_to_find {
                    black_box(set.get(key));
                }
            });
        });
    }
}

/// Benchmarking iteration.
pub fn iter(c: &mut Criterion) {
    c.bench_function("BTreeSet Iter", |b| {
        let mut rng = StdRng::seed_from_u64(0x1234_abcd);
        let set: BTreeSet<u64> = std::iter::repeat_with(|| rng.random())
            .take(100_000)
            .collect();

        b.iter(|| {
            for key in &set {
                black_box(key);
            }
        });
    });
}
