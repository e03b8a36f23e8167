use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use rand_distr::Normal;
use trend_core::CensoredValue;
use trend_kendall::{mk_statistic, sen_slopes, CensorMultipliers};

/// Noisy upward series with roughly a fifth of the values below a detection limit
fn generate_censored_series(size: usize, seed: u64) -> (Vec<CensoredValue>, Vec<f64>) {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let noise = Normal::new(0.0, 2.0).unwrap();
    let limit = 1.0;

    let values = (0..size)
        .map(|i| {
            let x = 0.01 * i as f64 + noise.sample(&mut rng);
            if x < limit {
                CensoredValue::less_than(limit).unwrap()
            } else {
                CensoredValue::exact(x).unwrap()
            }
        })
        .collect();
    let times = (0..size).map(|i| i as f64).collect();
    (values, times)
}

fn bench_mk_statistic(c: &mut Criterion) {
    let mut group = c.benchmark_group("MannKendall");
    for &size in &[100, 500, 1000, 2000] {
        let (values, _) = generate_censored_series(size, 42);
        group.bench_with_input(BenchmarkId::new("s_statistic", size), &values, |b, values| {
            b.iter(|| mk_statistic(black_box(values)))
        });
    }
    group.finish();
}

fn bench_sen_slopes(c: &mut Criterion) {
    let mut group = c.benchmark_group("SenSlope");
    let multipliers = CensorMultipliers::default();
    for &size in &[100, 500, 1000] {
        let data = generate_censored_series(size, 43);
        group.bench_with_input(BenchmarkId::new("pairwise_slopes", size), &data, |b, (values, times)| {
            b.iter(|| sen_slopes(black_box(values), black_box(times), &multipliers))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_mk_statistic, bench_sen_slopes);
criterion_main!(benches);
