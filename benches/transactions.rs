// Copyright 2025 Ojima Abraham
// SPDX-License-Identifier: Apache-2.0

//! Benchmarks for transaction operations.

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use rubidium_kv::{Engine, EngineConfig, Key, TransactionManager, Value};
use std::sync::atomic::{AtomicU64, Ordering};

fn bench_begin_abort(c: &mut Criterion) {
    let engine = Engine::new(EngineConfig::default());

    c.bench_function("txn::begin_abort", |b| {
        b.iter(|| {
            let txn = engine.begin().unwrap();
            engine.abort(black_box(txn));
        })
    });
}

fn bench_put_commit(c: &mut Criterion) {
    let engine = Engine::new(EngineConfig::default());
    let counter = AtomicU64::new(0);

    c.bench_function("txn::put_commit", |b| {
        b.iter_batched(
            || {
                let i = counter.fetch_add(1, Ordering::Relaxed);
                let txn = engine.begin().unwrap();
                // Cycling a bounded key set keeps bucket chains short.
                let key = Key::from(format!("key{}", i % 64));
                let value = Value::new(vec![0u8; 100]);
                (txn, key, value)
            },
            |(mut txn, key, value)| {
                engine.put(&mut txn, key, value).unwrap();
                engine.commit(txn).unwrap();
            },
            // A setup-begun transaction holds a pool slot until the routine
            // frees it, and the pool is bounded; batches stay at one
            // iteration so setup never outruns the slots.
            BatchSize::PerIteration,
        )
    });
}

fn bench_get_buffered(c: &mut Criterion) {
    let engine = Engine::new(EngineConfig::default());
    let key = Key::from("bufkey");

    // The reading transaction lives across iterations: only commit/abort can
    // free its slot, so per-iteration setup cannot produce it.
    let mut txn = engine.begin().unwrap();
    engine.put(&mut txn, key.clone(), Value::from("value")).unwrap();

    c.bench_function("txn::get_buffered", |b| {
        b.iter(|| {
            let value = engine.get(&mut txn, &key).unwrap();
            black_box(value)
        })
    });
}

fn bench_get_committed(c: &mut Criterion) {
    let engine = Engine::new(EngineConfig::default());
    let key = Key::from("key");

    let mut seed = engine.begin().unwrap();
    engine
        .put(&mut seed, key.clone(), Value::from("value"))
        .unwrap();
    engine.commit(seed).unwrap();

    let mut txn = engine.begin().unwrap();

    c.bench_function("txn::get_committed", |b| {
        b.iter(|| {
            let value = engine.get(&mut txn, &key).unwrap();
            black_box(value)
        })
    });
}

criterion_group!(
    benches,
    bench_begin_abort,
    bench_put_commit,
    bench_get_buffered,
    bench_get_committed
);
criterion_main!(benches);
