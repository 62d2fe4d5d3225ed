//! Performance benchmarks for cortex-surface
//!
//! # Running Benchmarks
//!
//! Run all benchmarks:
//! ```bash
//! cargo bench
//! ```
//!
//! Run specific benchmark group:
//! ```bash
//! cargo bench --bench performance decode
//! cargo bench --bench performance normals
//! cargo bench --bench performance pipeline
//! ```
//!
//! # Benchmark Groups
//!
//! - **decode**: new and legacy surface decoding of a flat grid
//! - **topology**: neighbor discovery
//! - **normals**: normal and area accumulation
//! - **pipeline**: decode, prepare and ellipsoid projection end to end
//!
//! # Scale Targets
//!
//! - 1K vertices: small test case
//! - 10K vertices: medium test case
//! - 150K vertices: a full-resolution hemisphere

use cortex_surface::diagnostics::VecSink;
use cortex_surface::io::{decode_surface, encode_surface, FormatKind};
use cortex_surface::mesh::{
    build_topology, compute_normals, prepare, project_onto_ellipsoid, EllipsoidAxes, PoleCriteria,
};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use synthetic_mesh::{calculate_ellipsoid_dimensions, generate_ellipsoid, generate_quad_grid};

const SCALES: [(&str, usize); 3] = [("1K", 1_000), ("10K", 10_000), ("150K", 150_000)];

/// Benchmark surface decoding in both layouts
fn benchmark_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode");

    for (name, target) in SCALES {
        // pole caps of the ellipsoid exceed the legacy per-vertex face limit
        let side = (target as f64).sqrt() as usize;
        let surface = generate_quad_grid(side, side, 1.0);

        for kind in [FormatKind::New, FormatKind::Legacy] {
            let bytes = encode_surface(&surface, kind).unwrap();

            group.throughput(Throughput::Elements(surface.num_vertices() as u64));
            group.bench_with_input(
                BenchmarkId::new(kind.to_string(), name),
                &bytes,
                |b, bytes| {
                    b.iter(|| {
                        let decoded = decode_surface(black_box(bytes)).unwrap();
                        black_box(decoded);
                    });
                },
            );
        }
    }

    group.finish();
}

/// Benchmark neighbor discovery
fn benchmark_topology(c: &mut Criterion) {
    let mut group = c.benchmark_group("topology");

    for (name, target) in SCALES {
        let (rings, segments) = calculate_ellipsoid_dimensions(target);
        let surface = generate_ellipsoid(rings, segments, 45.0, 130.0, 75.0);

        group.throughput(Throughput::Elements(surface.num_vertices() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(name), &surface, |b, surface| {
            b.iter(|| {
                let mut surface = surface.clone();
                let mismatches = build_topology(black_box(&mut surface), &mut VecSink::new());
                black_box(mismatches);
            });
        });
    }

    group.finish();
}

/// Benchmark normal and area accumulation
fn benchmark_normals(c: &mut Criterion) {
    let mut group = c.benchmark_group("normals");

    for (name, target) in SCALES {
        let (rings, segments) = calculate_ellipsoid_dimensions(target);
        let mut surface = generate_ellipsoid(rings, segments, 45.0, 130.0, 75.0);

        group.throughput(Throughput::Elements(surface.num_vertices() as u64));
        group.bench_function(BenchmarkId::from_parameter(name), |b| {
            b.iter(|| {
                compute_normals(black_box(&mut surface), &mut VecSink::new());
            });
        });
    }

    group.finish();
}

/// Benchmark the complete pipeline (decode + prepare + ellipsoid projection)
fn benchmark_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline");
    group.sample_size(10);

    for (name, target) in SCALES {
        let (rings, segments) = calculate_ellipsoid_dimensions(target);
        let surface = generate_ellipsoid(rings, segments, 40.0, 120.0, 70.0);
        let bytes = encode_surface(&surface, FormatKind::New).unwrap();
        let criteria = PoleCriteria::default();
        let axes = EllipsoidAxes::default();

        group.throughput(Throughput::Elements(surface.num_vertices() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(name), &bytes, |b, bytes| {
            b.iter(|| {
                let mut sink = VecSink::new();
                let mut surface = decode_surface(black_box(bytes)).unwrap();
                prepare(&mut surface, &criteria, &mut sink);
                let projected =
                    project_onto_ellipsoid(&surface, None, &axes, &mut sink).unwrap();
                black_box(projected);
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    benchmark_decode,
    benchmark_topology,
    benchmark_normals,
    benchmark_pipeline,
);

criterion_main!(benches);
