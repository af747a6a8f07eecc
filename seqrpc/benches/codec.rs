//! Codec benchmarks for seqrpc
//!
//! Measures encode and decode cost for:
//! - Scalar values
//! - Byte payloads of increasing size
//! - Nested collections
//! - Whole call messages

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use seqrpc::codec::{decode, encode, Value};
use seqrpc::message::{CallMessage, Message};
use std::collections::BTreeMap;

fn nested(width: usize) -> Value {
    let row: Vec<Value> = (0..width as i32).map(Value::Int).collect();
    let mut map = BTreeMap::new();
    for n in 0..width {
        map.insert(format!("row-{n}"), Value::List(row.clone()));
    }
    Value::Map(map)
}

/// Benchmark encoding and decoding a single long
fn bench_scalar(c: &mut Criterion) {
    let mut group = c.benchmark_group("codec_scalar");
    let value = Value::Long(0x0123_4567_89AB_CDEF);
    let bytes = encode(&value).unwrap();

    group.bench_function("encode_long", |b| b.iter(|| encode(black_box(&value)).unwrap()));
    group.bench_function("decode_long", |b| b.iter(|| decode(black_box(&bytes)).unwrap()));
    group.finish();
}

/// Benchmark byte payloads from 100 bytes to 1 MB
fn bench_bytes(c: &mut Criterion) {
    let mut group = c.benchmark_group("codec_bytes");

    for size in [100usize, 1024, 10 * 1024, 1024 * 1024] {
        let value = Value::Bytes(vec![0x5A; size]);
        let bytes = encode(&value).unwrap();
        group.throughput(Throughput::Bytes(size as u64));

        group.bench_with_input(BenchmarkId::new("encode", size), &value, |b, value| {
            b.iter(|| encode(black_box(value)).unwrap());
        });
        group.bench_with_input(BenchmarkId::new("decode", size), &bytes, |b, bytes| {
            b.iter(|| decode(black_box(bytes)).unwrap());
        });
    }

    group.finish();
}

/// Benchmark square maps of lists
fn bench_nested(c: &mut Criterion) {
    let mut group = c.benchmark_group("codec_nested");

    for width in [4usize, 16, 64] {
        let value = nested(width);
        let bytes = encode(&value).unwrap();
        group.throughput(Throughput::Elements((width * width) as u64));

        group.bench_with_input(BenchmarkId::new("encode", width), &value, |b, value| {
            b.iter(|| encode(black_box(value)).unwrap());
        });
        group.bench_with_input(BenchmarkId::new("decode", width), &bytes, |b, bytes| {
            b.iter(|| decode(black_box(bytes)).unwrap());
        });
    }

    group.finish();
}

/// Benchmark framing a complete call message
fn bench_call_message(c: &mut Criterion) {
    let mut group = c.benchmark_group("codec_call_message");
    let message: Message = CallMessage::from_parts(
        42,
        1_700_000_000_000,
        "inventory",
        "lookup",
        vec![Value::from("A-100"), Value::Int(3), nested(4)],
    )
    .into();
    let bytes = message.encode().unwrap();
    group.throughput(Throughput::Bytes(bytes.len() as u64));

    group.bench_function("encode", |b| b.iter(|| black_box(&message).encode().unwrap()));
    group.bench_function("decode", |b| b.iter(|| Message::decode(black_box(&bytes)).unwrap()));
    group.finish();
}

criterion_group!(
    benches,
    bench_scalar,
    bench_bytes,
    bench_nested,
    bench_call_message
);
criterion_main!(benches);
