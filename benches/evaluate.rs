//! Evaluation path benchmarks: the Merger's hot loop against snapshots of
//! varying layer/service fan-out.
//!
//! ## Running
//!
//! ```bash
//! cargo bench --bench evaluate
//! ```

use chrono::Utc;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use variantflow::{
    Eid, EvaluationRequest, EvaluationService, Experiment, FieldTypes, Layer, LayerId, Range, ServiceScope,
    StateManager, Variant, Vid,
};

fn build_service(num_layers: usize) -> EvaluationService {
    let slot_width = 10_000 / num_layers as u32;
    let mut layers = Vec::with_capacity(num_layers);
    let mut experiments = Vec::with_capacity(num_layers);

    for i in 0..num_layers {
        let vid = Vid(i as i64 + 1);
        let start = (i as u32) * slot_width;
        let end = if i + 1 == num_layers { 10_000 } else { start + slot_width };
        layers.push(
            Layer::new(
                LayerId::new(format!("layer-{i}")),
                "v1".to_string(),
                (num_layers - i) as i32,
                "user_id".to_string(),
                None,
                true,
                vec![Range { start, end, vid }],
                ServiceScope::Single("checkout".to_string()),
            )
            .unwrap(),
        );
        experiments.push(Experiment {
            eid: Eid(i as i64 + 1),
            service: "checkout".to_string(),
            rule: None,
            variants: vec![Variant { vid, params: json!({ (format!("param_{i}")): i }) }],
        });
    }

    let (manager, issues) = StateManager::bootstrap(layers, experiments, FieldTypes::new(), Utc::now());
    assert!(issues.is_empty());
    EvaluationService::new(Arc::new(manager))
}

fn bench_evaluate(c: &mut Criterion) {
    let mut group = c.benchmark_group("evaluate");
    group.throughput(Throughput::Elements(1));

    for &num_layers in &[1usize, 4, 16, 64] {
        let service = build_service(num_layers);
        let request = EvaluationRequest {
            services: vec!["checkout".to_string()],
            keys: HashMap::from([("user_id".to_string(), "bench-user".to_string())]),
            context: HashMap::new(),
        };

        group.bench_with_input(BenchmarkId::new("layers", num_layers), &num_layers, |b, _| {
            b.iter(|| {
                let resp = service.evaluate(black_box(&request)).unwrap();
                black_box(resp);
            });
        });
    }

    group.finish();
}

fn bench_evaluate_many_services(c: &mut Criterion) {
    let mut group = c.benchmark_group("evaluate_multi_service");

    for &num_services in &[1usize, 8, 32] {
        let service = build_service(16);
        let services: Vec<String> = (0..num_services).map(|i| format!("service-{i}")).collect();
        let request = EvaluationRequest {
            services,
            keys: HashMap::from([("user_id".to_string(), "bench-user".to_string())]),
            context: HashMap::new(),
        };

        group.bench_with_input(BenchmarkId::new("services", num_services), &num_services, |b, _| {
            b.iter(|| {
                let resp = service.evaluate(black_box(&request)).unwrap();
                black_box(resp);
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_evaluate, bench_evaluate_many_services);
criterion_main!(benches);
