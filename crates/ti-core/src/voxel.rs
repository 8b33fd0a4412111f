//! Voxel grid: the raster domain for NIfTI-space analysis and output.

use crate::geometry::{Affine, Point3};

/// A regular 3D voxel grid with a fixed voxel volume, plus the affine
/// mapping voxel-index space to millimeter space in whichever coordinate
/// space (subject or MNI) this grid was rasterized into.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VoxelGrid {
    pub dims: [usize; 3],
    /// Maps voxel index `(i, j, k)` to millimeter coordinates.
    pub ijk_to_mm: Affine,
    /// Edge length of a cubic voxel in millimeters (voxels are assumed
    /// isotropic, matching the spec's "isotropic millimeter convention").
    pub voxel_size_mm: f64,
}

impl VoxelGrid {
    pub fn voxel_count(&self) -> usize {
        self.dims[0] * self.dims[1] * self.dims[2]
    }

    pub fn voxel_volume_mm3(&self) -> f64 {
        self.voxel_size_mm.powi(3)
    }

    /// Flat index for voxel coordinate `(i, j, k)`, row-major with `k`
    /// fastest-varying (matches the NIfTI on-disk convention).
    pub fn flat_index(&self, i: usize, j: usize, k: usize) -> usize {
        (i * self.dims[1] + j) * self.dims[2] + k
    }

    /// Inverse of [`VoxelGrid::flat_index`].
    pub fn index_to_ijk(&self, flat: usize) -> (usize, usize, usize) {
        let k = flat % self.dims[2];
        let rest = flat / self.dims[2];
        let j = rest % self.dims[1];
        let i = rest / self.dims[1];
        (i, j, k)
    }

    /// Millimeter-space center of voxel `flat`.
    pub fn voxel_center_mm(&self, flat: usize) -> Point3 {
        let (i, j, k) = self.index_to_ijk(flat);
        self.ijk_to_mm.apply(&Point3::new(i as f64, j as f64, k as f64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> VoxelGrid {
        VoxelGrid { dims: [2, 3, 4], ijk_to_mm: Affine::IDENTITY, voxel_size_mm: 1.5 }
    }

    #[test]
    fn flat_index_roundtrips() {
        let g = grid();
        for i in 0..g.dims[0] {
            for j in 0..g.dims[1] {
                for k in 0..g.dims[2] {
                    let flat = g.flat_index(i, j, k);
                    assert_eq!(g.index_to_ijk(flat), (i, j, k));
                }
            }
        }
    }

    #[test]
    fn voxel_count_matches_dims_product() {
        let g = grid();
        assert_eq!(g.voxel_count(), 24);
    }

    #[test]
    fn voxel_volume_is_cube_of_size() {
        let g = grid();
        assert!((g.voxel_volume_mm3() - 3.375).abs() < 1e-12);
    }
}
