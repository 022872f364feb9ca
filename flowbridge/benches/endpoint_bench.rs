//! Benchmarks for the initialized fast path.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use flowbridge::config::EndpointConfiguration;
use flowbridge::context::InvocationContext;
use flowbridge::discovery::DiscoveryOptions;
use flowbridge::endpoint::FunctionEndpoint;
use flowbridge::testing::{CountingStartup, MockPipeline};
use std::sync::Arc;

fn fast_path_benchmark(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().expect("runtime");

    let pipeline = Arc::new(MockPipeline::new());
    let endpoint = FunctionEndpoint::new(
        Arc::new(CountingStartup::new(pipeline)),
        |_ctx| Ok(EndpointConfiguration::new("bench")),
        DiscoveryOptions::disabled(),
    );
    let ctx = InvocationContext::new(std::env::temp_dir());

    runtime
        .block_on(endpoint.ensure_started(&ctx))
        .expect("endpoint should start");

    c.bench_function("ensure_started_fast_path", |b| {
        b.iter(|| {
            let handle = runtime
                .block_on(endpoint.ensure_started(black_box(&ctx)))
                .expect("fast path should succeed");
            black_box(handle)
        })
    });
}

criterion_group!(benches, fast_path_benchmark);
criterion_main!(benches);
