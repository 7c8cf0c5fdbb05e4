use std::sync::Arc;

use criterion::{criterion_group, criterion_main, Criterion};
use reqorchestrator::{MemoryAdapter, OrchestratorConfig, Orchestrator, RequestInit, ScriptedResponse};
use std::num::NonZeroUsize;

fn bench_sequential_requests(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();

    c.bench_function("orchestrator_get_memory_adapter", |b| {
        b.to_async(&rt).iter(|| async {
            let adapter = Arc::new(MemoryAdapter::new());
            adapter.push("https://example.invalid/widgets", ScriptedResponse::ok(200, "{}"));
            let config = OrchestratorConfig::builder(adapter)
                .concurrent_requests(NonZeroUsize::new(50).unwrap())
                .enable_cache(false)
                .build()
                .unwrap();
            let orchestrator = Orchestrator::new(config);
            let response = orchestrator
                .request(RequestInit::new("GET", "https://example.invalid/widgets"))
                .await
                .unwrap();
            orchestrator.destroy();
            response
        });
    });
}

criterion_group!(benches, bench_sequential_requests);
criterion_main!(benches);
