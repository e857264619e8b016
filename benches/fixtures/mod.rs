// Synthetic JSON payload generators for benchmarking
//
// Creates arrays of metric objects in the envelope layout
// {"name", "tags", "fields", "timestamp"} with configurable size.

use serde_json::{json, Value as JsonValue};

/// Workload size presets
#[derive(Debug, Clone, Copy)]
#[allow(dead_code)]
pub enum WorkloadSize {
    Small,  // 1k objects
    Medium, // 50k objects
    Large,  // 250k objects
}

impl WorkloadSize {
    pub fn record_count(&self) -> usize {
        match self {
            WorkloadSize::Small => 1_000,
            WorkloadSize::Medium => 50_000,
            WorkloadSize::Large => 250_000,
        }
    }
}

/// Generate a JSON array of metric objects
pub fn generate_payload(size: WorkloadSize) -> Vec<u8> {
    let objects: Vec<JsonValue> = (0..size.record_count()).map(metric_object).collect();
    serde_json::to_vec(&objects).expect("fixture serializes")
}

/// Generate the same objects, one per line
pub fn generate_lines(size: WorkloadSize) -> String {
    (0..size.record_count())
        .map(|idx| metric_object(idx).to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

fn metric_object(idx: usize) -> JsonValue {
    json!({
        "name": format!("bench_metric_{}", idx % 10),
        "tags": {
            "host": format!("host-{}", idx % 20),
            "region": "eu-west-1",
            "shard": idx % 4,
        },
        "fields": {
            "value": idx as f64 * 0.5,
            "count": idx,
            "healthy": idx % 3 != 0,
            "status": "ok",
            "nested": {"p50": 1.5, "p99": 9.25},
        },
        "timestamp": 1_705_327_800 + idx as u64,
    })
}
