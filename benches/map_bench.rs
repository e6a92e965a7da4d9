//! Benchmark for Map against the standard BTreeMap.

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use cslib::map::Map;
use std::collections::BTreeMap;
use std::hint::black_box;

fn keys(size: usize) -> Vec<String> {
    (0..size)
        .map(|index| format!("key-{:06}", (index * 7919) % size))
        .collect()
}

// =============================================================================
// put Benchmark
// =============================================================================

fn benchmark_put(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("put");

    for size in [100, 1000, 10000] {
        let keys = keys(size);

        group.bench_with_input(BenchmarkId::new("Map", size), &keys, |bencher, keys| {
            bencher.iter(|| {
                let mut map = Map::new();
                for (index, key) in keys.iter().enumerate() {
                    map.put(black_box(key), index);
                }
                black_box(map)
            });
        });

        group.bench_with_input(
            BenchmarkId::new("BTreeMap", size),
            &keys,
            |bencher, keys| {
                bencher.iter(|| {
                    let mut map = BTreeMap::new();
                    for (index, key) in keys.iter().enumerate() {
                        map.insert(black_box(key.clone()), index);
                    }
                    black_box(map)
                });
            },
        );
    }

    group.finish();
}

// =============================================================================
// get Benchmark
// =============================================================================

fn benchmark_get(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("get");

    for size in [100, 1000, 10000] {
        let keys = keys(size);
        let map: Map<usize> = keys.iter().cloned().zip(0..).collect();

        group.bench_with_input(BenchmarkId::new("Map", size), &keys, |bencher, keys| {
            bencher.iter(|| {
                let mut sum = 0;
                for key in keys {
                    if let Some(&value) = map.get(black_box(key)) {
                        sum += value;
                    }
                }
                black_box(sum)
            });
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_put, benchmark_get);
criterion_main!(benches);
