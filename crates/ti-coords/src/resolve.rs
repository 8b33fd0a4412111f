//! ROI resolution (spec §4.6): converts an abstract [`Roi`] into a concrete
//! index set over either a [`TetMesh`]'s elements or a [`VoxelGrid`]'s
//! voxels. All four cases (sphere/atlas x mesh/voxel) live here so callers
//! never branch on ROI kind themselves.

use ti_core::error::{Result, TiError};
use ti_core::geometry::CoordinateSpace;
use ti_core::mesh::TetMesh;
use ti_core::roi::Roi;
use ti_core::subject::HeadModel;
use ti_core::voxel::VoxelGrid;

use crate::convert::to_space;

/// A resolved ROI: the indices selected out of a domain of `domain_len`
/// entries (mesh elements or voxels). Mask membership is mutually
/// exclusive with the complement by construction (§8 invariant 4).
#[derive(Debug, Clone)]
pub struct RoiMask {
    pub indices: Vec<usize>,
    pub domain_len: usize,
}

impl RoiMask {
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    /// Indices *not* selected, in ascending order. Complements the
    /// selection exactly: `indices.len() + complement().len() == domain_len`,
    /// and the two sets never intersect.
    pub fn complement(&self) -> Vec<usize> {
        let selected: std::collections::HashSet<usize> = self.indices.iter().copied().collect();
        (0..self.domain_len).filter(|i| !selected.contains(i)).collect()
    }
}

/// Resolves an ROI over a tetrahedral mesh (spec §4.6 cases "sphere, mesh"
/// and "atlas, mesh"). Mesh nodes are always in subject space.
pub fn resolve_mesh(roi: &Roi, mesh: &TetMesh, subject_to_mni: &ti_core::geometry::Affine, atlases: &std::collections::HashMap<String, ti_core::atlas::Atlas>) -> Result<RoiMask> {
    let domain_len = mesh.element_count();
    match roi {
        Roi::Sphere { center, radius_mm, space } => {
            let center_subject = to_space(*center, *space, CoordinateSpace::Subject, subject_to_mni)?;
            let indices = (0..domain_len)
                .filter(|&i| mesh.element_barycenter(i).distance(&center_subject) <= *radius_mm)
                .collect();
            Ok(RoiMask { indices, domain_len })
        }
        Roi::Atlas { atlas_name, region } => {
            let atlas = atlases
                .get(atlas_name)
                .ok_or_else(|| TiError::UnknownRegion { atlas: atlas_name.clone(), region: region.clone() })?;
            let region_id = atlas
                .region_id(region)
                .ok_or_else(|| TiError::UnknownRegion { atlas: atlas_name.clone(), region: region.clone() })?;
            Ok(RoiMask { indices: atlas.elements_in_region(region_id), domain_len })
        }
    }
}

/// Resolves an ROI over a voxel grid (spec §4.6 cases "sphere, voxel" and
/// "atlas, voxel"). `grid_space` names the coordinate space the grid was
/// rasterized into, since a subject carries both a subject-space and an
/// MNI-space voxel grid.
pub fn resolve_voxel(
    roi: &Roi,
    grid: &VoxelGrid,
    grid_space: CoordinateSpace,
    subject_to_mni: &ti_core::geometry::Affine,
    atlases: &std::collections::HashMap<String, ti_core::atlas::Atlas>,
) -> Result<RoiMask> {
    let domain_len = grid.voxel_count();
    match roi {
        Roi::Sphere { center, radius_mm, space } => {
            let center_in_grid_space = to_space(*center, *space, grid_space, subject_to_mni)?;
            let indices = (0..domain_len)
                .filter(|&i| grid.voxel_center_mm(i).distance(&center_in_grid_space) <= *radius_mm)
                .collect();
            Ok(RoiMask { indices, domain_len })
        }
        Roi::Atlas { atlas_name, region } => {
            let atlas = atlases
                .get(atlas_name)
                .ok_or_else(|| TiError::UnknownRegion { atlas: atlas_name.clone(), region: region.clone() })?;
            let region_id = atlas
                .region_id(region)
                .ok_or_else(|| TiError::UnknownRegion { atlas: atlas_name.clone(), region: region.clone() })?;
            let indices = atlas.voxels_in_region(region_id).ok_or_else(|| TiError::SpaceMismatch {
                reason: format!("atlas '{atlas_name}' has no voxel-space rasterization"),
            })?;
            Ok(RoiMask { indices, domain_len })
        }
    }
}

/// Convenience wrapper dispatching on whichever of the head model's two
/// domains the caller wants (mesh, or one of the two voxel grids).
pub fn resolve(roi: &Roi, head: &HeadModel, target: ResolveTarget) -> Result<RoiMask> {
    match target {
        ResolveTarget::Mesh => resolve_mesh(roi, &head.mesh, &head.subject_to_mni, &head.atlases),
        ResolveTarget::SubjectVoxels => resolve_voxel(roi, &head.subject_voxels, CoordinateSpace::Subject, &head.subject_to_mni, &head.atlases),
        ResolveTarget::MniVoxels => resolve_voxel(roi, &head.mni_voxels, CoordinateSpace::Mni, &head.subject_to_mni, &head.atlases),
    }
}

/// Which of a [`HeadModel`]'s domains to resolve an ROI against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveTarget {
    Mesh,
    SubjectVoxels,
    MniVoxels,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use ti_core::geometry::{Affine, Point3};

    fn unit_tet_mesh() -> TetMesh {
        TetMesh {
            nodes: vec![Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0), Point3::new(0.0, 1.0, 0.0), Point3::new(0.0, 0.0, 1.0)],
            elements: vec![[0, 1, 2, 3]],
            tissue_tags: vec![ti_core::mesh::GREY_MATTER_TAG],
        }
    }

    #[test]
    fn sphere_mesh_contains_nearby_element() {
        let mesh = unit_tet_mesh();
        let roi = Roi::Sphere { center: Point3::new(0.25, 0.25, 0.25), radius_mm: 1.0, space: CoordinateSpace::Subject };
        let mask = resolve_mesh(&roi, &mesh, &Affine::IDENTITY, &HashMap::new()).unwrap();
        assert_eq!(mask.indices, vec![0]);
    }

    #[test]
    fn sphere_mesh_excludes_far_element() {
        let mesh = unit_tet_mesh();
        let roi = Roi::Sphere { center: Point3::new(1000.0, 1000.0, 1000.0), radius_mm: 1.0, space: CoordinateSpace::Subject };
        let mask = resolve_mesh(&roi, &mesh, &Affine::IDENTITY, &HashMap::new()).unwrap();
        assert!(mask.is_empty());
    }

    #[test]
    fn mask_and_complement_partition_the_domain() {
        let mesh = unit_tet_mesh();
        let roi = Roi::Sphere { center: Point3::new(0.25, 0.25, 0.25), radius_mm: 1.0, space: CoordinateSpace::Subject };
        let mask = resolve_mesh(&roi, &mesh, &Affine::IDENTITY, &HashMap::new()).unwrap();
        assert_eq!(mask.len() + mask.complement().len(), mask.domain_len);
    }

    #[test]
    fn unknown_atlas_is_unknown_region() {
        let mesh = unit_tet_mesh();
        let roi = Roi::Atlas { atlas_name: "missing".into(), region: "V1".into() };
        let err = resolve_mesh(&roi, &mesh, &Affine::IDENTITY, &HashMap::new()).unwrap_err();
        assert!(matches!(err, TiError::UnknownRegion { .. }));
    }

    #[test]
    fn sphere_in_mni_space_converts_before_matching() {
        let mesh = unit_tet_mesh();
        let affine = Affine::translation(Point3::new(10.0, 10.0, 10.0));
        // In MNI space this is far from the mesh; after converting to subject
        // space (subtracting the translation) it lands back on the element.
        let roi = Roi::Sphere { center: Point3::new(10.25, 10.25, 10.25), radius_mm: 1.0, space: CoordinateSpace::Mni };
        let mask = resolve_mesh(&roi, &mesh, &affine, &HashMap::new()).unwrap();
        assert_eq!(mask.indices, vec![0]);
    }
}
