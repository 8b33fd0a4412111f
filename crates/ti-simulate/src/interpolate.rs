//! Resamples a nodal mesh field onto a voxel grid (spec §4.1 "Output
//! spaces": "interpolating the mesh fields onto... voxel grid"), by
//! nearest-neighbor lookup against the mesh's node positions. Grounded on
//! the brute-force nearest-neighbor search `volt-translate`'s decoder uses
//! to match a query vector against its vocabulary — same shape, applied to
//! spatial coordinates instead of embeddings.

use ti_core::geometry::Point3;
use ti_core::voxel::VoxelGrid;

/// Index of the closest point to `query` among `positions`, by squared
/// Euclidean distance. `positions` must be non-empty.
pub fn nearest_index(query: &Point3, positions: &[Point3]) -> usize {
    positions
        .iter()
        .enumerate()
        .map(|(i, p)| (i, query.distance(p)))
        .min_by(|(_, a), (_, b)| a.partial_cmp(b).expect("distances are never NaN"))
        .map(|(i, _)| i)
        .expect("positions must be non-empty")
}

/// Resamples `nodal_values` (aligned with `node_positions`) onto every
/// voxel center in `grid`, which must already be expressed in the same
/// coordinate space as `node_positions`.
pub fn resample_to_grid(node_positions: &[Point3], nodal_values: &[f64], grid: &VoxelGrid) -> Vec<f64> {
    (0..grid.voxel_count())
        .map(|flat| {
            let center = grid.voxel_center_mm(flat);
            let idx = nearest_index(&center, node_positions);
            nodal_values[idx]
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ti_core::geometry::Affine;

    #[test]
    fn nearest_index_picks_the_closest_point() {
        let positions = [Point3::new(0.0, 0.0, 0.0), Point3::new(10.0, 0.0, 0.0)];
        assert_eq!(nearest_index(&Point3::new(1.0, 0.0, 0.0), &positions), 0);
        assert_eq!(nearest_index(&Point3::new(9.0, 0.0, 0.0), &positions), 1);
    }

    #[test]
    fn resample_carries_nearest_nodal_value_into_every_voxel() {
        let positions = [Point3::new(0.0, 0.0, 0.0), Point3::new(100.0, 0.0, 0.0)];
        let values = [1.0, 2.0];
        let grid = VoxelGrid { dims: [2, 1, 1], ijk_to_mm: Affine::translation(Point3::new(0.0, 0.0, 0.0)), voxel_size_mm: 1.0 };
        let resampled = resample_to_grid(&positions, &values, &grid);
        assert_eq!(resampled.len(), 2);
        assert_eq!(resampled[0], 1.0);
    }
}
