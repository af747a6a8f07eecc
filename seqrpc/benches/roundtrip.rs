//! Round-trip benchmarks for seqrpc
//!
//! Measures the time from pushing a call to collecting its result:
//! - Over a loopback memory transport
//! - Between two routers on a memory pair
//! - With several calls in flight at once

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use seqrpc::codec::Value;
use seqrpc::router::{Router, RouterConfig, TargetObject};
use seqrpc::transport::MemoryTransport;
use std::sync::Arc;
use std::time::Duration;

const WAIT: Option<Duration> = Some(Duration::from_secs(5));

fn echo() -> TargetObject {
    TargetObject::new().rpc_method("echo", |mut args: Vec<Value>| async move {
        Ok(args.pop().unwrap_or(Value::Null))
    })
}

/// Benchmark a single call against the router's own targets
fn bench_loopback(c: &mut Criterion) {
    let mut group = c.benchmark_group("roundtrip_loopback");
    group.throughput(Throughput::Elements(1));
    let rt = tokio::runtime::Runtime::new().unwrap();

    let router = rt.block_on(async {
        let router = Router::new(Arc::new(MemoryTransport::loopback()), RouterConfig::default());
        router.register_target_object("svc", echo());
        router.start(None);
        router
    });

    group.bench_function("echo_int", |b| {
        b.to_async(&rt).iter(|| async {
            let sequence = router.call("svc", "echo", vec![Value::Int(42)]);
            black_box(router.get_return_blocking(sequence, WAIT).await.unwrap());
        });
    });

    group.finish();
    rt.block_on(router.stop(true));
}

/// Benchmark calls between two routers, with increasing numbers in flight
fn bench_pair(c: &mut Criterion) {
    let mut group = c.benchmark_group("roundtrip_pair");
    let rt = tokio::runtime::Runtime::new().unwrap();

    let (client, server) = rt.block_on(async {
        let (left, right) = MemoryTransport::pair();
        let client = Router::new(Arc::new(left), RouterConfig::default());
        let server = Router::new(Arc::new(right), RouterConfig::default());
        server.register_target_object("svc", echo());
        client.start(None);
        server.start(None);
        (client, server)
    });

    for in_flight in [1u64, 10, 100] {
        group.throughput(Throughput::Elements(in_flight));
        group.bench_with_input(
            BenchmarkId::from_parameter(in_flight),
            &in_flight,
            |b, &in_flight| {
                b.to_async(&rt).iter(|| async {
                    let sequences: Vec<u64> = (0..in_flight)
                        .map(|n| client.call("svc", "echo", vec![Value::Long(n as i64)]))
                        .collect();
                    for sequence in sequences {
                        black_box(client.get_return_blocking(sequence, WAIT).await.unwrap());
                    }
                });
            },
        );
    }

    group.finish();
    rt.block_on(async {
        client.stop(true).await;
        server.stop(true).await;
    });
}

criterion_group!(benches, bench_loopback, bench_pair);
criterion_main!(benches);
