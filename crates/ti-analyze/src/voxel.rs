//! Voxel-space ROI analysis (spec §4.2 "Voxel-space algorithm"): every
//! voxel carries the same weight, so statistics reduce to the unweighted
//! case over the selected voxels.

use std::collections::HashMap;

use ti_core::atlas::Atlas;
use ti_core::error::{Result, TiError};
use ti_core::field::FieldSample;
use ti_core::geometry::{Affine, CoordinateSpace, Point3};
use ti_core::roi::Roi;
use ti_core::voxel::VoxelGrid;

use ti_coords::resolve::{resolve_voxel, RoiMask};

use crate::stats::Stats;

/// Analyzes `field`, rasterized into `grid` in `grid_space`, over a sphere
/// of `radius_mm` centered at `center` (given in `roi_space`). When
/// `roi_space != grid_space`, the center is converted via `subject_to_mni`
/// before the mask is built (spec §4.2 "Coordinate conversion"); the
/// radius itself is never rescaled.
pub fn analyze_spherical(
    field: &FieldSample,
    grid: &VoxelGrid,
    grid_space: CoordinateSpace,
    center: Point3,
    radius_mm: f64,
    roi_space: CoordinateSpace,
    subject_to_mni: &Affine,
) -> Result<Stats> {
    let roi = Roi::Sphere { center, radius_mm, space: roi_space };
    let mask = resolve_voxel(&roi, grid, grid_space, subject_to_mni, &HashMap::new())?;
    stats_over_mask(field, grid, &mask)
}

/// Analyzes `field` over the voxels an atlas assigns to `region`.
pub fn analyze_atlas(field: &FieldSample, grid: &VoxelGrid, grid_space: CoordinateSpace, atlas_name: &str, region: &str, atlases: &HashMap<String, Atlas>) -> Result<Stats> {
    let roi = Roi::Atlas { atlas_name: atlas_name.to_string(), region: region.to_string() };
    let mask = resolve_voxel(&roi, grid, grid_space, &Affine::IDENTITY, atlases)?;
    stats_over_mask(field, grid, &mask)
}

/// Analyzes `field` over every voxel, no ROI restriction.
pub fn analyze_whole_head(field: &FieldSample, grid: &VoxelGrid) -> Result<Stats> {
    let mask = RoiMask { indices: (0..grid.voxel_count()).collect(), domain_len: grid.voxel_count() };
    stats_over_mask(field, grid, &mask)
}

fn stats_over_mask(field: &FieldSample, grid: &VoxelGrid, mask: &RoiMask) -> Result<Stats> {
    if field.values.len() != grid.voxel_count() {
        return Err(TiError::ShapeMismatch { field_len: field.values.len(), domain_len: grid.voxel_count() });
    }
    if mask.is_empty() {
        return Ok(Stats::empty());
    }
    let weight = grid.voxel_volume_mm3();
    let values: Vec<f64> = mask.indices.iter().map(|&i| field.values[i]).collect();
    let weights = vec![weight; values.len()];
    Ok(crate::stats::weighted_stats(&values, &weights))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ti_core::field::Domain;

    fn grid() -> VoxelGrid {
        VoxelGrid { dims: [4, 4, 4], ijk_to_mm: Affine::IDENTITY, voxel_size_mm: 2.0 }
    }

    #[test]
    fn whole_head_covers_every_voxel_and_reports_total_volume() {
        let g = grid();
        let values = vec![1.0; g.voxel_count()];
        let field = FieldSample::new_elemental(Domain::Voxel { len: g.voxel_count() }, values).unwrap();
        let s = analyze_whole_head(&field, &g).unwrap();
        assert_eq!(s.count, 64);
        assert!((s.volume_mm3 - 64.0 * 8.0).abs() < 1e-9);
    }

    #[test]
    fn spherical_roi_near_origin_excludes_far_corner() {
        let g = grid();
        let mut values = vec![1.0; g.voxel_count()];
        let far = g.flat_index(3, 3, 3);
        values[far] = 1000.0;
        let field = FieldSample::new_elemental(Domain::Voxel { len: g.voxel_count() }, values).unwrap();
        let s = analyze_spherical(&field, &g, CoordinateSpace::Subject, Point3::ORIGIN, 1.0, CoordinateSpace::Subject, &Affine::IDENTITY).unwrap();
        assert_eq!(s.count, 1);
        assert!((s.mean - 1.0).abs() < 1e-9);
    }

    #[test]
    fn sphere_given_in_mni_space_converts_before_matching() {
        let g = grid();
        let affine = Affine::translation(Point3::new(10.0, 10.0, 10.0));
        let values = vec![1.0; g.voxel_count()];
        let field = FieldSample::new_elemental(Domain::Voxel { len: g.voxel_count() }, values).unwrap();
        // Grid is in subject space; ROI center given in MNI space lands on
        // the subject-space origin once the translation is undone.
        let s = analyze_spherical(&field, &g, CoordinateSpace::Subject, Point3::new(10.0, 10.0, 10.0), 1.0, CoordinateSpace::Mni, &affine).unwrap();
        assert_eq!(s.count, 1);
    }

    #[test]
    fn empty_roi_is_a_sentinel() {
        let g = grid();
        let values = vec![1.0; g.voxel_count()];
        let field = FieldSample::new_elemental(Domain::Voxel { len: g.voxel_count() }, values).unwrap();
        let s = analyze_spherical(&field, &g, CoordinateSpace::Subject, Point3::new(1000.0, 1000.0, 1000.0), 1.0, CoordinateSpace::Subject, &Affine::IDENTITY).unwrap();
        assert_eq!(s.count, 0);
    }

    #[test]
    fn mismatched_field_length_is_shape_mismatch() {
        let g = grid();
        let field = FieldSample::new_elemental(Domain::Voxel { len: 3 }, vec![1.0, 2.0, 3.0]).unwrap();
        let err = analyze_whole_head(&field, &g).unwrap_err();
        assert!(matches!(err, TiError::ShapeMismatch { .. }));
    }
}
