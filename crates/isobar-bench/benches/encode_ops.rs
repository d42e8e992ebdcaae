//! Criterion micro-benchmarks for field encoding.

use std::hint::black_box;
use std::sync::Arc;

use criterion::{criterion_group, criterion_main, Criterion};
use isobar_bench::{smooth_field, ORCA1_POINTS};
use isobar_core::{GridSubtype, Message};
use isobar_encode::{FieldEncoder, GridCache, KeyValueCodecFactory, DEFAULT_TEMPLATE};
use isobar_test_utils::{field_metadata, grid_pair};

fn ready_encoder(size: usize) -> FieldEncoder {
    let grids = Arc::new(GridCache::new());
    let (lat, lon) = grid_pair(GridSubtype::T, size);
    grids.set_grid_info(&lat).unwrap();
    grids.set_grid_info(&lon).unwrap();
    FieldEncoder::new(
        Arc::new(KeyValueCodecFactory::new()),
        grids,
        DEFAULT_TEMPLATE,
        "ORCA1",
    )
}

/// Benchmark: encode an instantaneous ORCA1 field.
fn bench_encode_field(c: &mut Criterion) {
    let encoder = ready_encoder(ORCA1_POINTS);
    let msg = Message::field(
        field_metadata(GridSubtype::T, 20200101, ORCA1_POINTS),
        &smooth_field(ORCA1_POINTS, 0.0),
    );

    c.bench_function("encode_field_orca1", |b| {
        b.iter(|| {
            black_box(encoder.encode_field(&msg).unwrap());
        });
    });
}

/// Benchmark: encode an averaged field from a flat buffer.
fn bench_encode_statistics(c: &mut Criterion) {
    let encoder = ready_encoder(ORCA1_POINTS);
    let md = field_metadata(GridSubtype::T, 20200131, ORCA1_POINTS)
        .with("operation", "average")
        .with("stepRange", "0-720");
    let values = smooth_field(ORCA1_POINTS, 1.0);

    c.bench_function("encode_statistics_orca1", |b| {
        b.iter(|| {
            black_box(encoder.encode_field_values(&md, &values).unwrap());
        });
    });
}

criterion_group!(benches, bench_encode_field, bench_encode_statistics);
criterion_main!(benches);
