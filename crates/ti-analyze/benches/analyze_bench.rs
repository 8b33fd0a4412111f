//! Benchmarks for whole-head mesh/voxel statistics, run at full
//! grey-matter mesh and voxel-grid scale (spec §7: ex-search calls the
//! analyzer once per candidate, so its cost sets the search's wall-clock
//! budget alongside the solver itself).

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use ti_analyze::{mesh, voxel};
use ti_core::field::{Domain, FieldSample};
use ti_core::geometry::{Affine, Point3};
use ti_core::mesh::{TetMesh, GREY_MATTER_TAG};
use ti_core::voxel::VoxelGrid;

fn grey_matter_mesh(n_elements: usize) -> TetMesh {
    let mut nodes = Vec::with_capacity(n_elements * 4);
    let mut elements = Vec::with_capacity(n_elements);
    for i in 0..n_elements {
        let base = (i * 4) as u32;
        let origin = Point3::new(i as f64, 0.0, 0.0);
        nodes.push(origin);
        nodes.push(origin.add(&Point3::new(1.0, 0.0, 0.0)));
        nodes.push(origin.add(&Point3::new(0.0, 1.0, 0.0)));
        nodes.push(origin.add(&Point3::new(0.0, 0.0, 1.0)));
        elements.push([base, base + 1, base + 2, base + 3]);
    }
    TetMesh { nodes, elements, tissue_tags: vec![GREY_MATTER_TAG; n_elements] }
}

fn bench_whole_head_mesh(c: &mut Criterion) {
    let mesh = grey_matter_mesh(50_000);
    let field = FieldSample::new_elemental(Domain::Mesh { len: 50_000 }, (0..50_000).map(|i| (i as f64 * 0.001).sin().abs()).collect()).unwrap();

    c.bench_function("analyze_whole_head (mesh, 50k elements)", |bencher| {
        bencher.iter(|| mesh::analyze_whole_head(black_box(&field), black_box(&mesh)).unwrap());
    });
}

fn bench_spherical_mesh(c: &mut Criterion) {
    let mesh = grey_matter_mesh(50_000);
    let field = FieldSample::new_elemental(Domain::Mesh { len: 50_000 }, (0..50_000).map(|i| (i as f64 * 0.001).sin().abs()).collect()).unwrap();

    c.bench_function("analyze_spherical (mesh, 50k elements)", |bencher| {
        bencher.iter(|| {
            mesh::analyze_spherical(
                black_box(&field),
                black_box(&mesh),
                Point3::new(25_000.0, 0.0, 0.0),
                5000.0,
                ti_core::geometry::CoordinateSpace::Subject,
                &Affine::IDENTITY,
            )
            .unwrap()
        });
    });
}

fn bench_whole_head_voxel(c: &mut Criterion) {
    let grid = VoxelGrid { dims: [128, 128, 128], ijk_to_mm: Affine::IDENTITY, voxel_size_mm: 1.0 };
    let values: Vec<f64> = (0..grid.voxel_count()).map(|i| (i as f64 * 0.0001).sin().abs()).collect();
    let field = FieldSample::new_elemental(Domain::Voxel { len: grid.voxel_count() }, values).unwrap();

    c.bench_function("analyze_whole_head (voxel, 128^3 grid)", |bencher| {
        bencher.iter(|| voxel::analyze_whole_head(black_box(&field), black_box(&grid)).unwrap());
    });
}

criterion_group!(benches, bench_whole_head_mesh, bench_spherical_mesh, bench_whole_head_voxel);
criterion_main!(benches);
