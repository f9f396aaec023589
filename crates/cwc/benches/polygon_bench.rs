//! Criterion benchmarks for polygon H→V conversion and clipping.
//! Focus sizes: m in {4, 10, 20, 50, 100} half-planes.
//! Results: by default under target/criterion.

use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use cwc::geom2::{compute_polygon_hull, intersect_polygons};
use nalgebra::{DMatrix, DVector, Vector2};
use rand::{rngs::StdRng, Rng, SeedableRng};

fn random_rows(m: usize, seed: u64, shift: f64) -> (DMatrix<f64>, DVector<f64>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut b = DMatrix::zeros(m, 2);
    let mut c = DVector::zeros(m);
    for i in 0..m {
        // evenly spread directions keep the polygon bounded
        let theta = std::f64::consts::TAU * (i as f64 + rng.gen::<f64>() * 0.5) / m as f64;
        b[(i, 0)] = theta.cos();
        b[(i, 1)] = theta.sin();
        c[i] = rng.gen_range(0.5..1.5) + shift * theta.cos();
    }
    (b, c)
}

fn bench_polygon(c: &mut Criterion) {
    let mut group = c.benchmark_group("polygon");
    for &m in &[4usize, 10, 20, 50, 100] {
        group.bench_with_input(BenchmarkId::new("hull_centered", m), &m, |b, &m| {
            b.iter_batched(
                || random_rows(m, 43, 0.0),
                |(bm, cv)| {
                    let _res = compute_polygon_hull(&bm, &cv);
                },
                BatchSize::SmallInput,
            )
        });

        group.bench_with_input(BenchmarkId::new("hull_shifted", m), &m, |b, &m| {
            b.iter_batched(
                || random_rows(m, 44, 2.0),
                |(bm, cv)| {
                    let _res = compute_polygon_hull(&bm, &cv);
                },
                BatchSize::SmallInput,
            )
        });

        group.bench_with_input(BenchmarkId::new("intersect", m), &m, |b, &m| {
            let ring = |r: f64, dx: f64| -> Vec<Vector2<f64>> {
                (0..m.max(3))
                    .map(|k| {
                        let t = std::f64::consts::TAU * k as f64 / m.max(3) as f64;
                        Vector2::new(dx + r * t.cos(), r * t.sin())
                    })
                    .collect()
            };
            let (p1, p2) = (ring(1.0, 0.0), ring(0.8, 0.5));
            b.iter(|| intersect_polygons(&p1, &p2));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_polygon);
criterion_main!(benches);
