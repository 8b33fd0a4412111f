//! Mesh-space ROI analysis (spec §4.2 "Mesh-space algorithm"): statistics
//! are always computed per *element*, volume-weighted, even when the
//! source field is stored per node.

use std::collections::HashMap;

use ti_core::atlas::Atlas;
use ti_core::error::{Result, TiError};
use ti_core::field::FieldSample;
use ti_core::geometry::{Affine, CoordinateSpace, Point3};
use ti_core::mesh::TetMesh;
use ti_core::roi::Roi;

use ti_coords::resolve::{resolve_mesh, RoiMask};

use crate::stats::Stats;

/// Analyzes `field` over a sphere of `radius_mm` centered at `center`
/// (given in `space`), against mesh element barycenters.
pub fn analyze_spherical(field: &FieldSample, mesh: &TetMesh, center: Point3, radius_mm: f64, space: CoordinateSpace, subject_to_mni: &Affine) -> Result<Stats> {
    let roi = Roi::Sphere { center, radius_mm, space };
    let mask = resolve_mesh(&roi, mesh, subject_to_mni, &HashMap::new())?;
    stats_over_mask(field, mesh, &mask)
}

/// Analyzes `field` over the elements an atlas assigns to `region`.
pub fn analyze_atlas(field: &FieldSample, mesh: &TetMesh, atlas_name: &str, region: &str, atlases: &HashMap<String, Atlas>) -> Result<Stats> {
    let roi = Roi::Atlas { atlas_name: atlas_name.to_string(), region: region.to_string() };
    let mask = resolve_mesh(&roi, mesh, &Affine::IDENTITY, atlases)?;
    stats_over_mask(field, mesh, &mask)
}

/// Analyzes `field` over every element, no ROI restriction.
pub fn analyze_whole_head(field: &FieldSample, mesh: &TetMesh) -> Result<Stats> {
    let mask = RoiMask { indices: (0..mesh.element_count()).collect(), domain_len: mesh.element_count() };
    stats_over_mask(field, mesh, &mask)
}

fn stats_over_mask(field: &FieldSample, mesh: &TetMesh, mask: &RoiMask) -> Result<Stats> {
    let elemental = elemental_values(field, mesh)?;
    if mask.is_empty() {
        return Ok(Stats::empty());
    }
    let volumes = mesh.element_volumes();
    let values: Vec<f64> = mask.indices.iter().map(|&i| elemental[i]).collect();
    let weights: Vec<f64> = mask.indices.iter().map(|&i| volumes[i]).collect();
    Ok(crate::stats::weighted_stats(&values, &weights))
}

/// Resolves `field` onto per-element values, averaging nodal values onto
/// their four corner elements first (spec §4.2 mesh step 2).
fn elemental_values(field: &FieldSample, mesh: &TetMesh) -> Result<Vec<f64>> {
    if field.is_nodal {
        if field.values.len() != mesh.node_count() {
            return Err(TiError::ShapeMismatch { field_len: field.values.len(), domain_len: mesh.node_count() });
        }
        Ok(mesh.nodal_to_elemental(&field.values))
    } else {
        if field.values.len() != mesh.element_count() {
            return Err(TiError::ShapeMismatch { field_len: field.values.len(), domain_len: mesh.element_count() });
        }
        Ok(field.values.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ti_core::field::Domain;
    use ti_core::mesh::GREY_MATTER_TAG;

    fn two_tet_mesh() -> TetMesh {
        TetMesh {
            nodes: vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
                Point3::new(0.0, 0.0, 1.0),
                Point3::new(100.0, 100.0, 100.0),
                Point3::new(101.0, 100.0, 100.0),
                Point3::new(100.0, 101.0, 100.0),
                Point3::new(100.0, 100.0, 101.0),
            ],
            elements: vec![[0, 1, 2, 3], [4, 5, 6, 7]],
            tissue_tags: vec![GREY_MATTER_TAG, GREY_MATTER_TAG],
        }
    }

    #[test]
    fn whole_head_includes_every_element() {
        let mesh = two_tet_mesh();
        let field = FieldSample::new_elemental(Domain::Mesh { len: 2 }, vec![1.0, 3.0]).unwrap();
        let s = analyze_whole_head(&field, &mesh).unwrap();
        assert_eq!(s.count, 2);
        assert!((s.mean - 2.0).abs() < 1e-9);
    }

    #[test]
    fn spherical_roi_excludes_the_far_element() {
        let mesh = two_tet_mesh();
        let field = FieldSample::new_elemental(Domain::Mesh { len: 2 }, vec![1.0, 99.0]).unwrap();
        let s = analyze_spherical(&field, &mesh, Point3::new(0.25, 0.25, 0.25), 1.0, CoordinateSpace::Subject, &Affine::IDENTITY).unwrap();
        assert_eq!(s.count, 1);
        assert!((s.mean - 1.0).abs() < 1e-9);
    }

    #[test]
    fn empty_roi_is_a_sentinel_not_an_error() {
        let mesh = two_tet_mesh();
        let field = FieldSample::new_elemental(Domain::Mesh { len: 2 }, vec![1.0, 99.0]).unwrap();
        let s = analyze_spherical(&field, &mesh, Point3::new(1000.0, 1000.0, 1000.0), 1.0, CoordinateSpace::Subject, &Affine::IDENTITY).unwrap();
        assert_eq!(s.count, 0);
    }

    #[test]
    fn nodal_field_is_averaged_onto_elements() {
        let mesh = two_tet_mesh();
        let nodal = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0];
        let field = FieldSample::new_nodal(Domain::Mesh { len: 8 }, nodal).unwrap();
        let s = analyze_whole_head(&field, &mesh).unwrap();
        // element 0 averages to 2.5, element 1 averages to 6.5.
        assert!((s.mean - 4.5).abs() < 1e-9);
    }

    #[test]
    fn wrong_length_field_is_shape_mismatch() {
        let mesh = two_tet_mesh();
        let field = FieldSample::new_elemental(Domain::Mesh { len: 1 }, vec![1.0]).unwrap();
        let err = analyze_whole_head(&field, &mesh).unwrap_err();
        assert!(matches!(err, TiError::ShapeMismatch { .. }));
    }

    #[test]
    fn unknown_atlas_region_propagates() {
        let mesh = two_tet_mesh();
        let field = FieldSample::new_elemental(Domain::Mesh { len: 2 }, vec![1.0, 2.0]).unwrap();
        let err = analyze_atlas(&field, &mesh, "missing", "V1", &HashMap::new()).unwrap_err();
        assert!(matches!(err, TiError::UnknownRegion { .. }));
    }
}
