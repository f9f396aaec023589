//! Criterion benchmarks for contact wrench cones and equilibrium polygons.
//! Focus sizes: 1 to 3 contacts (cone enumeration grows combinatorially).

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use cwc::rand::{draw_contact_set, StanceCfg};
use cwc::EquilibriumMethod;
use nalgebra::Vector3;
use rand::{rngs::StdRng, SeedableRng};

fn bench_cone(c: &mut Criterion) {
    let mut group = c.benchmark_group("cwc");
    group.sample_size(10);
    for &n in &[1usize, 2, 3] {
        let cfg = StanceCfg {
            nb_contacts: n,
            max_tilt: 0.15,
            ..StanceCfg::default()
        };
        let set = draw_contact_set(&mut StdRng::seed_from_u64(7), &cfg);
        group.bench_with_input(BenchmarkId::new("wrench_inequalities", n), &set, |b, set| {
            b.iter(|| set.compute_wrench_inequalities(&Vector3::zeros()))
        });
        group.bench_with_input(BenchmarkId::new("sep_hull", n), &set, |b, set| {
            b.iter(|| set.compute_static_equilibrium_polygon(EquilibriumMethod::Hull))
        });
        group.bench_with_input(BenchmarkId::new("sep_bretl", n), &set, |b, set| {
            b.iter(|| set.compute_static_equilibrium_polygon(EquilibriumMethod::Bretl))
        });
        group.bench_with_input(BenchmarkId::new("static_support", n), &set, |b, set| {
            let com = Vector3::new(0.0, 0.0, 0.8);
            b.iter(|| set.find_static_supporting_wrenches(&com, 40.0))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_cone);
criterion_main!(benches);
