use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use std::time::Instant;

use spinpool::Producer;

mod common;
use common::SpinResult;

/// Benchmark single-threaded acquire/release cycles
fn bench_acquire_release(c: &mut Criterion) {
    let producer: Producer<SpinResult> = Producer::new(SpinResult::default);

    let mut group = c.benchmark_group("acquire_release");
    group.throughput(Throughput::Elements(1));

    group.bench_function("empty_value", |b| {
        b.iter(|| {
            black_box(producer.acquire());
        })
    });

    group.bench_function("filled_value", |b| {
        b.iter(|| {
            let mut spin = producer.acquire();
            spin.fill();
            black_box(&mut spin);
        })
    });

    group.finish();
}

/// Benchmark sharing a single instance across holders
fn bench_share_clone(c: &mut Criterion) {
    let producer: Producer<SpinResult> = Producer::new(SpinResult::default);

    let mut group = c.benchmark_group("share");
    group.throughput(Throughput::Elements(1));

    group.bench_function("share_and_drop", |b| {
        b.iter(|| {
            let spin = producer.acquire();
            black_box(spin.share());
        })
    });

    group.bench_function("clone_and_drop", |b| {
        let shared = producer.acquire().share();
        b.iter(|| {
            black_box(shared.clone());
        })
    });

    group.finish();
}

/// Benchmark the pool under parallel load
fn bench_concurrent(c: &mut Criterion) {
    let producer: Producer<SpinResult> = Producer::new(SpinResult::default);

    let mut group = c.benchmark_group("concurrent");
    for threads in [2usize, 4, 8] {
        group.throughput(Throughput::Elements(threads as u64));
        group.bench_function(format!("acquire_release_{}_threads", threads), |b| {
            b.iter_custom(|iters| {
                let start = Instant::now();
                std::thread::scope(|s| {
                    for _ in 0..threads {
                        let producer = producer.clone();
                        s.spawn(move || {
                            for _ in 0..iters {
                                let mut spin = producer.acquire();
                                spin.bet = 100;
                                black_box(&mut spin);
                            }
                        });
                    }
                });
                start.elapsed()
            })
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_acquire_release,
    bench_share_clone,
    bench_concurrent
);
criterion_main!(benches);
