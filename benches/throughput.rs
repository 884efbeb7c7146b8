//! Throughput Benchmark for stashkv
//!
//! This benchmark measures the performance of the store
//! under various workloads.

use bytes::Bytes;
use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use stashkv::storage::Store;
use std::sync::Arc;

/// Benchmark SET operations
fn bench_set(c: &mut Criterion) {
    let store = Arc::new(Store::new());

    let mut group = c.benchmark_group("set");
    group.throughput(Throughput::Elements(1));

    group.bench_function("set_small", |b| {
        let mut i = 0u64;
        b.iter(|| {
            let key = format!("key:{}", i);
            store.set(&key, Bytes::from("small_value"));
            i += 1;
        });
    });

    group.bench_function("set_large", |b| {
        let mut i = 0u64;
        let value = Bytes::from("x".repeat(64 * 1024)); // 64KB value
        b.iter(|| {
            let key = format!("key:{}", i);
            store.set(&key, value.clone());
            i += 1;
        });
    });

    group.finish();
}

/// Benchmark GET operations
fn bench_get(c: &mut Criterion) {
    let store = Arc::new(Store::new());

    // Pre-populate with data
    for i in 0..100_000 {
        let key = format!("key:{}", i);
        store.set(&key, Bytes::from(format!("value:{}", i)));
    }

    let mut group = c.benchmark_group("get");
    group.throughput(Throughput::Elements(1));

    group.bench_function("get_hit", |b| {
        let mut i = 0u64;
        b.iter(|| {
            let key = format!("key:{}", i % 100_000);
            black_box(store.get(&key));
            i += 1;
        });
    });

    group.bench_function("get_miss", |b| {
        b.iter(|| {
            black_box(store.get("missing-key"));
        });
    });

    group.finish();
}

/// Benchmark APP and GETVAL on a growing list
fn bench_list_ops(c: &mut Criterion) {
    let store = Arc::new(Store::new());

    let mut group = c.benchmark_group("list");
    group.throughput(Throughput::Elements(1));

    group.bench_function("append", |b| {
        b.iter(|| {
            store.append("applog", vec![Bytes::from("entry")]);
        });
    });

    let ranged = Arc::new(Store::new());
    for i in 0..1_000 {
        ranged.append("ranged", vec![Bytes::from(format!("v{}", i))]);
    }

    group.bench_function("get_range", |b| {
        b.iter(|| {
            black_box(ranged.get_range("ranged", &[100, 200]));
        });
    });

    group.finish();
}

/// Benchmark the expiry sweep with a populated expiry index
fn bench_sweep(c: &mut Criterion) {
    let store = Arc::new(Store::new());

    for i in 0..10_000 {
        let key = format!("key:{}", i);
        store.set(&key, Bytes::from("value"));
        // Far-future deadlines: the sweep scans but evicts nothing
        store.expire(&key, 3_600);
    }

    c.bench_function("sweep_expired_noop", |b| {
        b.iter(|| {
            black_box(store.sweep_expired());
        });
    });
}

criterion_group!(benches, bench_set, bench_get, bench_list_ops, bench_sweep);
criterion_main!(benches);
