use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use packlet_rs::{IntStore, NullableStore, StoreRead, StoreWrite, testutil::StoreGen};

const LEN: usize = 4096;
const RANGES: [u32; 5] = [2, 3, 4, 5, 200];

fn benchmark_get(c: &mut Criterion) {
    let mut group = c.benchmark_group("get");
    let mut store_gen = StoreGen::new(0xDEAD_BEEF);

    for &range in &RANGES {
        let store = IntStore::from_values(range, store_gen.values(range, LEN)).unwrap();
        group.bench_function(BenchmarkId::new("store", range), |b| {
            b.iter(|| store.get(black_box(LEN / 3)).unwrap())
        });
    }
    group.finish();
}

fn benchmark_set(c: &mut Criterion) {
    let mut group = c.benchmark_group("set");
    let mut store_gen = StoreGen::new(0xDEAD_BEEF);

    for &range in &RANGES {
        let mut store = IntStore::from_values(range, store_gen.values(range, LEN)).unwrap();
        group.bench_function(BenchmarkId::new("store", range), |b| {
            b.iter(|| store.set(black_box(LEN / 3), black_box(range - 1)).unwrap())
        });
    }
    group.finish();
}

fn benchmark_fill(c: &mut Criterion) {
    let mut group = c.benchmark_group("fill");

    for &range in &RANGES {
        let mut store = IntStore::with_range(LEN, range).unwrap();
        group.bench_function(BenchmarkId::new("broadcast", range), |b| {
            b.iter(|| store.fill(black_box(range - 1)).unwrap())
        });

        let mut store = IntStore::with_range(LEN, range).unwrap();
        group.bench_function(BenchmarkId::new("clear", range), |b| {
            b.iter(|| store.fill(black_box(0)).unwrap())
        });
    }
    group.finish();
}

fn benchmark_nullable(c: &mut Criterion) {
    let mut group = c.benchmark_group("nullable");
    let mut store_gen = StoreGen::new(0xDEAD_BEEF);

    for &range in &[1u32, 2, 200] {
        let mut store = NullableStore::with_range(LEN, range).unwrap();
        for (index, value) in store_gen.sparse(range, LEN).into_iter().enumerate() {
            store.set(index, value).unwrap();
        }

        group.bench_function(BenchmarkId::new("get", range), |b| {
            b.iter(|| store.get(black_box(LEN / 3)).unwrap())
        });

        group.bench_function(BenchmarkId::new("population", range), |b| {
            b.iter(|| black_box(&store).population())
        });
    }
    group.finish();
}

criterion_group!(benches, benchmark_get, benchmark_set, benchmark_fill, benchmark_nullable);
criterion_main!(benches);
