// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Benchmark of a full analytics run over synthetic models.
//!
//! Compares parallel and sequential type aggregation.
//!
//! Run with: cargo bench -p ifc-lite-analytics --bench aggregation

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use ifc_lite_analytics::{AnalyticsConfig, ModelAnalyzer, ModelSnapshot};
use serde_json::json;

const TYPES: [&str; 8] = [
    "IfcWall",
    "IfcWallStandardCase",
    "IfcSlab",
    "IfcBeam",
    "IfcColumn",
    "IfcDoor",
    "IfcWindow",
    "IfcFlowSegment",
];

/// Generate a synthetic model with one storey holding every element.
fn generate_model(element_count: u32) -> ModelSnapshot {
    let mut objects = vec![
        json!({"id": 1, "type_name": "IfcProject", "name": "Bench"}),
        json!({"id": 2, "type_name": "IfcSite"}),
        json!({"id": 3, "type_name": "IfcBuilding"}),
        json!({"id": 4, "type_name": "IfcBuildingStorey"}),
    ];
    let mut contained = Vec::with_capacity(element_count as usize);

    for i in 0..element_count {
        let id = 1000 + i;
        objects.push(json!({
            "id": id,
            "type_name": TYPES[i as usize % TYPES.len()],
            "global_id": format!("bench-{}", i),
            "geometry": {
                "primitive_count": 12 + i % 500,
                "area": 2.0 + (i % 13) as f64,
                "volume": 0.25 + (i % 7) as f64,
                "bounds_mm": {"min": [0.0, 0.0, 0.0], "max": [2000.0, 300.0, 3000.0]}
            },
            "properties": {"psets": 1 + i % 5, "properties": 4 + i % 31, "relations": 2}
        }));
        contained.push(id);
    }

    let model = json!({
        "objects": objects,
        "decompositions": [
            {"relating": 1, "related_objects": [2]},
            {"relating": 2, "related_objects": [3]},
            {"relating": 3, "related_objects": [4]}
        ],
        "containments": [{"relating": 4, "related_objects": contained}],
        "materials": [{"id": 10, "name": "Concrete"}],
        "material_associations": [
            {"relating": {"kind": "material", "id": 10}, "related_objects": contained}
        ]
    });

    serde_json::from_value(model).expect("valid synthetic model")
}

fn bench_analyze(c: &mut Criterion) {
    let mut group = c.benchmark_group("analyze");

    for element_count in [1_000u32, 10_000, 50_000] {
        let snapshot = generate_model(element_count);
        group.throughput(Throughput::Elements(element_count as u64));

        for parallel in [true, false] {
            let analyzer = ModelAnalyzer::new(AnalyticsConfig {
                parallel,
                ..Default::default()
            });
            let label = if parallel { "parallel" } else { "sequential" };
            group.bench_with_input(
                BenchmarkId::new(label, element_count),
                &snapshot,
                |b, snapshot| b.iter(|| analyzer.analyze(black_box(&snapshot.input()))),
            );
        }
    }

    group.finish();
}

fn bench_snapshot_indexing(c: &mut Criterion) {
    let objects: Vec<_> = (0..10_000u32)
        .map(|i| json!({"id": i, "type_name": TYPES[i as usize % TYPES.len()]}))
        .collect();
    let json = serde_json::to_string(&json!({ "objects": objects })).expect("serializable");

    c.bench_function("snapshot_from_json_10k", |b| {
        b.iter(|| ModelSnapshot::from_json_str(black_box(&json)).expect("valid snapshot"))
    });
}

criterion_group!(benches, bench_analyze, bench_snapshot_indexing);
criterion_main!(benches);
