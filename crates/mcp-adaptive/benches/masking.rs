//! Benchmarks for response masking.
//!
//! Measures the cost of applying a learned schema to responses of growing
//! width, which is paid on every call to a classified operation.

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use mcp_gateway_adaptive::{MaskingEngine, RegistryEntry, SchemaClassification};
use serde_json::{Map, Value, json};
use std::hint::black_box;

fn wide_response(fields: usize) -> Value {
    let mut map = Map::new();
    for i in 0..fields {
        map.insert(format!("Custom.Field{i}"), json!(format!("value {i}")));
    }
    json!({
        "id": 1,
        "_links": {"self": "https://example"},
        "fields": map,
    })
}

fn entry_for(fields: usize) -> RegistryEntry {
    let mut entry = RegistryEntry::classified(SchemaClassification {
        pinned: vec!["id".into(), "fields.Custom.Field0".into()],
        noise: vec!["_links".into()],
        ghosts: (1..fields).map(|i| format!("fields.Custom.Field{i}")).collect(),
    });
    let hot: Vec<String> = (1..fields.min(4)).map(|i| format!("fields.Custom.Field{i}")).collect();
    entry.record_access(&hot);
    entry
}

/// Benchmarks masking against response width
fn bench_apply(c: &mut Criterion) {
    let mut group = c.benchmark_group("mask_apply");
    let engine = MaskingEngine::default();

    for fields in [10, 100, 1000] {
        let raw = wide_response(fields);
        let entry = entry_for(fields);

        group.throughput(Throughput::Elements(fields as u64));
        group.bench_with_input(BenchmarkId::from_parameter(fields), &raw, |b, raw| {
            b.iter(|| engine.apply(black_box(raw), black_box(&entry), &[], "bench_op"));
        });
    }

    group.finish();
}

/// Benchmarks re-masking an already masked response
fn bench_idempotent_pass(c: &mut Criterion) {
    let engine = MaskingEngine::default();
    let entry = entry_for(100);
    let masked = engine.apply(&wide_response(100), &entry, &[], "bench_op");

    c.bench_function("mask_apply_masked", |b| {
        b.iter(|| engine.apply(black_box(&masked), black_box(&entry), &[], "bench_op"));
    });
}

criterion_group!(benches, bench_apply, bench_idempotent_pass);
criterion_main!(benches);
