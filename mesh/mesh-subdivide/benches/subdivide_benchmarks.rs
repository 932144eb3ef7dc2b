//! Benchmarks for subdivision.
//!
//! Run with: cargo bench -p mesh-subdivide

#![allow(missing_docs, clippy::unwrap_used)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use mesh_subdivide::{crease_base_vertices, smooth, subdivide_edges, SubdivisionMode};
use mesh_types::{box_shape, ico_sphere, IndexedMesh, Vector3};

fn case_block() -> IndexedMesh {
    let mut block = box_shape(40.0, 20.0, 10.0);
    block.translate(Vector3::new(0.0, 0.0, 5.0));
    let mut mesh = block.into_mesh();
    crease_base_vertices(&mut mesh, (-1.0, 2.0));
    mesh
}

fn bench_smooth(c: &mut Criterion) {
    let mut group = c.benchmark_group("Smooth");
    let block = case_block();
    for levels in [1, 2, 3] {
        group.bench_with_input(BenchmarkId::new("catmull_clark", levels), &levels, |b, &levels| {
            b.iter(|| smooth(black_box(&block), levels, SubdivisionMode::PreserveTopology).unwrap());
        });
        group.bench_with_input(BenchmarkId::new("simple", levels), &levels, |b, &levels| {
            b.iter(|| smooth(black_box(&block), levels, SubdivisionMode::Simple).unwrap());
        });
    }
    group.finish();
}

fn bench_cuts(c: &mut Criterion) {
    let mut group = c.benchmark_group("EdgeCuts");
    let sphere = ico_sphere(10.0, 2).into_mesh();
    group.throughput(Throughput::Elements(sphere.faces.len() as u64));
    for cuts in [1, 3, 7] {
        group.bench_with_input(BenchmarkId::new("ico_sphere", cuts), &cuts, |b, &cuts| {
            b.iter(|| subdivide_edges(black_box(&sphere), cuts).unwrap());
        });
    }
    group.finish();
}

criterion_group!(benches, bench_smooth, bench_cuts);
criterion_main!(benches);
