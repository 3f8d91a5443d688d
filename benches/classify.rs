use criterion::{black_box, BenchmarkId, Criterion};
use criterion::{criterion_group, criterion_main};

use partition_splicer::ooo::classify::classify;

fn bench_classify(c: &mut Criterion) {
    let mut group = c.benchmark_group("classify");
    for &size in &[1_000_usize, 10_000, 100_000] {
        let data: Vec<i64> = (0..size as i64).map(|i| i * 10).collect();
        let ooo: Vec<i64> = (0..size as i64 / 10).map(|i| i * 10 + 5).collect();

        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| {
                black_box(classify(black_box(&data), black_box(&ooo), 0, ooo.len() as i64 - 1));
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_classify);
criterion_main!(benches);
