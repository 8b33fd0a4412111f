//! The result of a single simulator run: per-channel E-fields and the
//! derived TI fields, in every space the simulator produces (spec §3, §4.1).

use crate::field::{DirectionalField, FieldSample};

/// The three components of one channel's vector E-field, stored as three
/// scalar [`FieldSample`]s (one per Cartesian axis) to reuse the scalar
/// field machinery and its shape checks.
#[derive(Debug, Clone)]
pub struct VectorField {
    pub x: FieldSample,
    pub y: FieldSample,
    pub z: FieldSample,
}

impl VectorField {
    /// Magnitude at every domain index, as a scalar field.
    pub fn magnitude(&self) -> Vec<f64> {
        self.x
            .values
            .iter()
            .zip(self.y.values.iter())
            .zip(self.z.values.iter())
            .map(|((&x, &y), &z)| (x * x + y * y + z * z).sqrt())
            .collect()
    }
}

/// All field outputs for one representation (mesh or voxel) in one
/// coordinate space.
#[derive(Debug, Clone)]
pub struct SimulationFields {
    pub channel_1: VectorField,
    pub channel_2: VectorField,
    pub ti_max: FieldSample,
    pub ti_normal: DirectionalField,
    pub ti_tangential: DirectionalField,
}

/// The full result of one simulator run: field outputs on the full mesh,
/// the grey-matter submesh, the subject voxel grid, and the MNI voxel
/// grid (spec §4.1 "Output spaces").
#[derive(Debug, Clone)]
pub struct SimulationResult {
    pub montage_name: String,
    pub full_mesh: SimulationFields,
    pub grey_matter_mesh: SimulationFields,
    pub subject_voxels: SimulationFields,
    pub mni_voxels: SimulationFields,
}
