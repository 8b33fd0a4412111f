//! The subject head model: the immutable, read-only input bundle produced
//! by external pre-processing (spec §3 — out of scope here, consumed as
//! data).

use std::collections::HashMap;

use crate::atlas::Atlas;
use crate::geometry::Affine;
use crate::mesh::TetMesh;
use crate::net::NetTable;
use crate::voxel::VoxelGrid;

/// A subject-specific head model bundle: mesh, voxel grids in both
/// spaces, the subject<->MNI affine, atlases, and electrode nets.
///
/// Every field is read-only once constructed; nothing in this workspace
/// mutates a `HeadModel` after it is built.
#[derive(Debug, Clone)]
pub struct HeadModel {
    pub subject_id: String,
    pub mesh: TetMesh,
    pub subject_voxels: VoxelGrid,
    pub mni_voxels: VoxelGrid,
    /// Maps subject-space millimeter coordinates to MNI-space millimeter
    /// coordinates.
    pub subject_to_mni: Affine,
    pub atlases: HashMap<String, Atlas>,
    pub nets: NetTable,
}

impl HeadModel {
    pub fn atlas(&self, name: &str) -> Option<&Atlas> {
        self.atlases.get(name)
    }

    pub fn net(&self, name: &str) -> Option<&crate::net::ElectrodeNet> {
        self.nets.get(name)
    }
}
