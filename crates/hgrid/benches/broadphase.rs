//! Benchmarks for broad-phase collision enumeration.
//!
//! Run with: cargo bench -p hgrid
//!
//! To compare against baseline:
//! 1. First run: cargo bench -p hgrid -- --save-baseline main
//! 2. After changes: cargo bench -p hgrid -- --baseline main

#![allow(
    missing_docs,
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use hgrid::{Aabb, HGrid, Point3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const MAX_CELL: f64 = 256.0;

/// Random cubes spread through a fixed world volume. Extents mix three
/// size classes so the grid is populated across several levels.
fn random_bodies(count: usize, seed: u64) -> Vec<(Point3<f64>, f64)> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|_| {
            let corner = Point3::new(
                rng.gen_range(-2000.0..2000.0),
                rng.gen_range(-2000.0..2000.0),
                rng.gen_range(-2000.0..2000.0),
            );
            let size = match rng.gen_range(0..3) {
                0 => rng.gen_range(1.0..8.0),
                1 => rng.gen_range(8.0..60.0),
                _ => rng.gen_range(60.0..MAX_CELL),
            };
            (corner, size)
        })
        .collect()
}

fn populate(bodies: &[(Point3<f64>, f64)]) -> HGrid<u32> {
    let mut grid = HGrid::new(MAX_CELL).expect("valid cell size");
    for (i, (corner, size)) in bodies.iter().enumerate() {
        grid.add(i as u32, corner, *size);
    }
    grid
}

fn bench_find_all_collisions(c: &mut Criterion) {
    let mut group = c.benchmark_group("find_all_collisions");
    for count in [100, 1_000, 10_000] {
        let grid = populate(&random_bodies(count, 42));
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &grid, |b, grid| {
            b.iter(|| {
                let mut pairs = 0usize;
                grid.find_all_collisions(|a, b| {
                    black_box((a, b));
                    pairs += 1;
                });
                black_box(pairs)
            });
        });
    }
    group.finish();
}

fn bench_box_query(c: &mut Criterion) {
    let mut group = c.benchmark_group("find_collisions");
    let grid = populate(&random_bodies(10_000, 42));
    for extent in [50.0, 400.0] {
        let query = Aabb::from_corner_size(Point3::new(-200.0, -200.0, -200.0), extent);
        group.bench_with_input(
            BenchmarkId::from_parameter(extent as u64),
            &query,
            |b, query| {
                b.iter(|| {
                    let mut hits = 0usize;
                    grid.find_collisions(u32::MAX, query, |obj, _| {
                        black_box(obj);
                        hits += 1;
                    });
                    black_box(hits)
                });
            },
        );
    }
    group.finish();
}

fn bench_add_remove_churn(c: &mut Criterion) {
    let mut group = c.benchmark_group("churn");
    let bodies = random_bodies(1_000, 7);
    group.throughput(Throughput::Elements(bodies.len() as u64));
    group.bench_function("add_remove_1000", |b| {
        let mut grid = populate(&random_bodies(5_000, 42));
        b.iter(|| {
            let mut handles = Vec::with_capacity(bodies.len());
            for (i, (corner, size)) in bodies.iter().enumerate() {
                handles.push(grid.add(100_000 + i as u32, corner, *size));
            }
            for handle in handles {
                grid.remove_link(handle);
            }
        });
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_find_all_collisions,
    bench_box_query,
    bench_add_remove_churn
);
criterion_main!(benches);
