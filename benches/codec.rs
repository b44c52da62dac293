use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};

use spinpool::{Encoder, Producer};

mod common;
use common::SpinResult;

fn encoded_spin() -> Vec<u8> {
    let producer: Producer<SpinResult> = Producer::new(SpinResult::default);
    let mut spin = producer.acquire();
    spin.fill();

    let mut enc = Encoder::new();
    enc.object(&*spin);
    enc.as_bytes().to_vec()
}

/// Benchmark encoding a representative spin result
fn bench_encode(c: &mut Criterion) {
    let producer: Producer<SpinResult> = Producer::new(SpinResult::default);
    let mut spin = producer.acquire();
    spin.fill();

    let mut group = c.benchmark_group("encode");
    group.throughput(Throughput::Elements(1));

    group.bench_function("spin_result", |b| {
        b.iter(|| {
            let mut enc = Encoder::new();
            enc.object(&*spin);
            black_box(enc.as_bytes().len());
        })
    });

    group.finish();
}

/// Benchmark decoding a spin result through the pool
fn bench_decode(c: &mut Criterion) {
    let producer: Producer<SpinResult> = Producer::new(SpinResult::default);
    let data = encoded_spin();

    let mut group = c.benchmark_group("decode");
    group.throughput(Throughput::Bytes(data.len() as u64));

    group.bench_function("acquire_from_json", |b| {
        b.iter(|| {
            black_box(producer.acquire_from_json(&data).unwrap());
        })
    });

    group.finish();
}

criterion_group!(benches, bench_encode, bench_decode);
criterion_main!(benches);
