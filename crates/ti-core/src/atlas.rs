//! Cortical atlas: region label lookup per mesh element and per voxel.

use std::collections::HashMap;

/// A single cortical atlas, keyed by name, with element-space and
/// voxel-space region labels plus a case-insensitive name table.
///
/// Region identifiers may be supplied as integer labels or as names; both
/// forms resolve through [`Atlas::region_id`].
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Atlas {
    pub name: String,
    /// Region label per mesh element, aligned with `TetMesh::elements`.
    pub element_labels: Vec<u32>,
    /// Region label per voxel, aligned with the subject's `VoxelGrid`
    /// (`None` if this atlas has no voxel-space rasterization).
    pub voxel_labels: Option<Vec<u32>>,
    /// Region id -> human-readable name. Lookups by name are
    /// case-insensitive (spec §4.6).
    pub region_names: HashMap<u32, String>,
}

impl Atlas {
    /// Resolves a region identifier (name or integer label, as text) to a
    /// concrete integer label, failing with `None` if the identifier is
    /// not present.
    pub fn region_id(&self, identifier: &str) -> Option<u32> {
        if let Ok(id) = identifier.parse::<u32>() {
            if self.region_names.contains_key(&id) {
                return Some(id);
            }
        }
        let lower = identifier.to_lowercase();
        self.region_names
            .iter()
            .find(|(_, name)| name.to_lowercase() == lower)
            .map(|(&id, _)| id)
    }

    /// Indices of mesh elements whose label equals `region_id`.
    pub fn elements_in_region(&self, region_id: u32) -> Vec<usize> {
        self.element_labels
            .iter()
            .enumerate()
            .filter(|&(_, &l)| l == region_id)
            .map(|(i, _)| i)
            .collect()
    }

    /// Indices of voxels whose label equals `region_id`, or `None` if this
    /// atlas carries no voxel rasterization.
    pub fn voxels_in_region(&self, region_id: u32) -> Option<Vec<usize>> {
        self.voxel_labels.as_ref().map(|labels| {
            labels
                .iter()
                .enumerate()
                .filter(|&(_, &l)| l == region_id)
                .map(|(i, _)| i)
                .collect()
        })
    }
}
