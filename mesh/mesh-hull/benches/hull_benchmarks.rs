//! Benchmarks for hull construction.
//!
//! Run with: cargo bench -p mesh-hull

#![allow(missing_docs, clippy::unwrap_used)]

use criterion::{black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion, Throughput};
use mesh_hull::{bottom_hull, convex_hull, triangle_hulls};
use mesh_types::{box_shape, ico_sphere, Point3, Shape, Vector3};

fn sphere_points(subdivisions: u32) -> Vec<Point3<f64>> {
    ico_sphere(10.0, subdivisions).mesh().vertices.iter().map(|v| v.position).collect()
}

fn key_row(count: u32) -> Vec<Shape> {
    (0..count)
        .map(|i| {
            let mut key = box_shape(14.0, 14.0, 8.0);
            key.translate(Vector3::new(f64::from(i) * 19.05, f64::from(i % 3) * 2.0, 6.0));
            key
        })
        .collect()
}

fn bench_quickhull(c: &mut Criterion) {
    let mut group = c.benchmark_group("Quickhull");
    for subdivisions in [1, 2, 3] {
        let points = sphere_points(subdivisions);
        group.throughput(Throughput::Elements(points.len() as u64));
        group.bench_with_input(BenchmarkId::new("sphere", points.len()), &points, |b, points| {
            b.iter(|| convex_hull(black_box(points)).unwrap());
        });
    }
    group.finish();
}

fn bench_shape_hulls(c: &mut Criterion) {
    let mut group = c.benchmark_group("ShapeHulls");
    group.sample_size(10);
    group.bench_function("triangle_hulls_6", |b| {
        b.iter_batched(|| key_row(6), |keys| triangle_hulls(keys).unwrap(), BatchSize::SmallInput);
    });
    group.bench_function("bottom_hull_6", |b| {
        b.iter_batched(|| key_row(6), |keys| bottom_hull(keys, 10.0).unwrap(), BatchSize::SmallInput);
    });
    group.finish();
}

criterion_group!(benches, bench_quickhull, bench_shape_hulls);
criterion_main!(benches);
