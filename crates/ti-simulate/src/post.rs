//! TI-field post-processing (spec §4.1 "TI derivation"): combines two
//! channels' E-fields into the maximum-envelope field and its
//! normal/tangential projections, node by node, via `ti-algebra`.

use ti_algebra::ti_field::{ti_envelope_max, ti_normal, ti_tangential};
use ti_core::error::Result;
use ti_core::field::{DirectionalField, FieldSample, SurfaceKind};
use ti_core::geometry::Point3;
use ti_core::mesh::TetMesh;
use ti_core::simulation::VectorField;

/// The cortical-surface normal used for `TI_normal`/`TI_tangential` (spec
/// §9.1: standardized on the central surface). Lacking a segmented
/// cortical surface (out of scope, spec §1 non-goals), the outward
/// direction from the mesh centroid to each node stands in for the local
/// surface normal — a reasonable proxy for a roughly head-shaped mesh, and
/// the only one derivable from the data this workspace actually has.
pub fn approximate_outward_normals(mesh: &TetMesh) -> Vec<Point3> {
    let centroid = mesh.nodes.iter().fold(Point3::ORIGIN, |acc, p| acc.add(p)).scale(1.0 / mesh.node_count().max(1) as f64);
    mesh.nodes
        .iter()
        .map(|n| n.sub(&centroid).normalized().unwrap_or(Point3::new(0.0, 0.0, 1.0)))
        .collect()
}

/// Derives `TI_max`, `TI_normal`, and `TI_tangential`, node by node, from
/// two channels' nodal E-fields and a per-node surface-normal direction.
pub fn derive_ti(channel_1: &VectorField, channel_2: &VectorField, normals: &[Point3]) -> Result<(FieldSample, DirectionalField, DirectionalField)> {
    let domain = channel_1.x.domain;
    let n = domain.len();

    let mut ti_max = Vec::with_capacity(n);
    let mut normal_vals = Vec::with_capacity(n);
    let mut tangential_vals = Vec::with_capacity(n);

    for i in 0..n {
        let e1 = Point3::new(channel_1.x.values[i], channel_1.y.values[i], channel_1.z.values[i]);
        let e2 = Point3::new(channel_2.x.values[i], channel_2.y.values[i], channel_2.z.values[i]);
        let normal = normals[i];

        ti_max.push(ti_envelope_max(&e1, &e2));
        normal_vals.push(ti_normal(&e1, &e2, &normal));
        tangential_vals.push(ti_tangential(&e1, &e2, &normal));
    }

    Ok((
        FieldSample::new_nodal(domain, ti_max)?,
        DirectionalField { field: FieldSample::new_nodal(domain, normal_vals)?, surface: SurfaceKind::Central },
        DirectionalField { field: FieldSample::new_nodal(domain, tangential_vals)?, surface: SurfaceKind::Central },
    ))
}
