//! Tier classification benchmark

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use loyalty_tiers::{classify_tier, tier_progress, Tier};

fn ladder(size: i64) -> Vec<Tier> {
    std::iter::once(Tier::system())
        .chain((1..=size).map(|i| Tier::user(format!("Tier {i}"), i * 1000)))
        .collect()
}

fn classify_benchmark(c: &mut Criterion) {
    let tiers = ladder(5);
    let mut group = c.benchmark_group("classify");

    group.bench_function("guest", |b| {
        b.iter(|| classify_tier(black_box(&tiers), black_box(0)))
    });

    group.bench_function("top", |b| {
        b.iter(|| classify_tier(black_box(&tiers), black_box(1_000_000)))
    });

    group.bench_function("progress", |b| {
        b.iter(|| tier_progress(black_box(&tiers), black_box(2500)))
    });

    group.finish();
}

fn classify_scaling_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("classify_scaling");

    for size in [5i64, 20, 100, 1000].iter() {
        let tiers = ladder(*size);
        let spend = size * 500;
        group.bench_with_input(BenchmarkId::from_parameter(size), &tiers, |b, tiers| {
            b.iter(|| classify_tier(black_box(tiers), black_box(spend)))
        });
    }

    group.finish();
}

criterion_group!(benches, classify_benchmark, classify_scaling_benchmark);
criterion_main!(benches);
