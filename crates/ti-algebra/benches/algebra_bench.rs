//! Benchmarks for the per-point TI math, run at the scale of one
//! grey-matter mesh (spec §7: ex-search evaluates this per candidate per
//! element, so the per-point cost sets the search's wall-clock budget).

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use ti_algebra::superposition::superpose_channel;
use ti_algebra::ti_field::{ti_envelope_max, ti_normal, ti_tangential};
use ti_core::field::{Domain, FieldSample};
use ti_core::geometry::Point3;
use ti_core::simulation::VectorField;

fn make_row(seed: f64, len: usize) -> VectorField {
    let domain = Domain::Mesh { len };
    let gen = |phase: f64| -> Vec<f64> { (0..len).map(|i| ((i as f64 + seed + phase) * 0.01).sin()).collect() };
    VectorField {
        x: FieldSample::new_elemental(domain, gen(0.0)).unwrap(),
        y: FieldSample::new_elemental(domain, gen(1.0)).unwrap(),
        z: FieldSample::new_elemental(domain, gen(2.0)).unwrap(),
    }
}

fn bench_superpose_channel(c: &mut Criterion) {
    let a = make_row(1.0, 50_000);
    let b = make_row(2.0, 50_000);

    c.bench_function("superpose_channel (50k elements)", |bencher| {
        bencher.iter(|| superpose_channel(black_box(&[(&a, 2.0), (&b, -2.0)])).unwrap());
    });
}

fn bench_ti_envelope_max(c: &mut Criterion) {
    let e1 = Point3::new(1.3, -0.4, 0.2);
    let e2 = Point3::new(0.6, 0.5, -0.1);

    c.bench_function("ti_envelope_max (single point)", |bencher| {
        bencher.iter(|| ti_envelope_max(black_box(&e1), black_box(&e2)));
    });
}

fn bench_ti_directional(c: &mut Criterion) {
    let e1 = Point3::new(1.3, -0.4, 0.2);
    let e2 = Point3::new(0.6, 0.5, -0.1);
    let n = Point3::new(0.0, 0.0, 1.0);

    c.bench_function("ti_normal + ti_tangential (single point)", |bencher| {
        bencher.iter(|| {
            let _ = ti_normal(black_box(&e1), black_box(&e2), black_box(&n));
            let _ = ti_tangential(black_box(&e1), black_box(&e2), black_box(&n));
        });
    });
}

criterion_group!(benches, bench_superpose_channel, bench_ti_envelope_max, bench_ti_directional);
criterion_main!(benches);
