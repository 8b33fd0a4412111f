//! Writes simulation output (spec §6.2, §6.3): one `.msh` per mesh
//! representation, one NIfTI per voxel representation. Path construction
//! itself is `ti-pipeline`'s job (spec §6.2: "constructed... as pure
//! functions of `RunContext` fields") — this module only ever writes to
//! the exact path it is given.

use std::fs;
use std::path::Path;

use ti_core::error::{Result, TiError};
use ti_core::formats::msh::{write_msh, NamedField};
use ti_core::formats::nifti::write_nifti;
use ti_core::mesh::TetMesh;
use ti_core::simulation::SimulationFields;
use ti_core::voxel::VoxelGrid;

/// Writes one `.msh` file carrying every field in `fields` (per-channel
/// magnitude, `TI_max`, `TI_normal`, `TI_tangential`), matching spec
/// §6.3's named-field list.
pub fn write_mesh_fields(mesh: &TetMesh, fields: &SimulationFields, path: &Path) -> Result<()> {
    let ch1_mag = fields.channel_1.magnitude();
    let ch2_mag = fields.channel_2.magnitude();

    let named = [
        NamedField { name: "magnE_channel_1", values: &ch1_mag, per_node: fields.channel_1.x.is_nodal },
        NamedField { name: "magnE_channel_2", values: &ch2_mag, per_node: fields.channel_2.x.is_nodal },
        NamedField { name: "TI_max", values: &fields.ti_max.values, per_node: fields.ti_max.is_nodal },
        NamedField { name: "TI_normal", values: &fields.ti_normal.field.values, per_node: fields.ti_normal.field.is_nodal },
        NamedField { name: "TI_tangential", values: &fields.ti_tangential.field.values, per_node: fields.ti_tangential.field.is_nodal },
    ];

    let text = write_msh(mesh, &named);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| TiError::io("creating mesh output directory", e))?;
    }
    fs::write(path, text).map_err(|e| TiError::io("writing mesh output file", e))
}

/// Writes one NIfTI volume per named scalar field into `out_dir`, named
/// `<prefix>_<field>.nii`.
pub fn write_voxel_fields(grid: &VoxelGrid, fields: &SimulationFields, out_dir: &Path, prefix: &str) -> Result<()> {
    fs::create_dir_all(out_dir).map_err(|e| TiError::io("creating voxel output directory", e))?;

    let named: [(&str, &[f64]); 3] = [
        ("TI_max", &fields.ti_max.values),
        ("TI_normal", &fields.ti_normal.field.values),
        ("TI_tangential", &fields.ti_tangential.field.values),
    ];
    for (name, values) in named {
        let bytes = write_nifti(grid, values)?;
        let path = out_dir.join(format!("{prefix}_{name}.nii"));
        fs::write(&path, bytes).map_err(|e| TiError::io("writing voxel output file", e))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ti_core::field::{Domain, DirectionalField, FieldSample, SurfaceKind};
    use ti_core::geometry::{Affine, Point3};
    use ti_core::simulation::VectorField;

    fn mesh() -> TetMesh {
        TetMesh {
            nodes: vec![Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0), Point3::new(0.0, 1.0, 0.0), Point3::new(0.0, 0.0, 1.0)],
            elements: vec![[0, 1, 2, 3]],
            tissue_tags: vec![1],
        }
    }

    fn fields_on(domain: Domain) -> SimulationFields {
        let len = domain.len();
        let vf = || VectorField {
            x: FieldSample::new_nodal(domain, vec![1.0; len]).unwrap(),
            y: FieldSample::new_nodal(domain, vec![0.0; len]).unwrap(),
            z: FieldSample::new_nodal(domain, vec![0.0; len]).unwrap(),
        };
        SimulationFields {
            channel_1: vf(),
            channel_2: vf(),
            ti_max: FieldSample::new_nodal(domain, vec![2.0; len]).unwrap(),
            ti_normal: DirectionalField { field: FieldSample::new_nodal(domain, vec![1.0; len]).unwrap(), surface: SurfaceKind::Central },
            ti_tangential: DirectionalField { field: FieldSample::new_nodal(domain, vec![0.5; len]).unwrap(), surface: SurfaceKind::Central },
        }
    }

    #[test]
    fn mesh_fields_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("TI.msh");
        let mesh = mesh();
        let fields = fields_on(Domain::Mesh { len: mesh.node_count() });
        write_mesh_fields(&mesh, &fields, &path).unwrap();
        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.contains("TI_max"));
        assert!(contents.contains("TI_normal"));
    }

    #[test]
    fn voxel_fields_write_one_nifti_per_field() {
        let dir = tempfile::tempdir().unwrap();
        let grid = VoxelGrid { dims: [2, 2, 2], ijk_to_mm: Affine::IDENTITY, voxel_size_mm: 1.0 };
        let fields = fields_on(Domain::Voxel { len: grid.voxel_count() });
        write_voxel_fields(&grid, &fields, dir.path(), "sub-01").unwrap();
        assert!(dir.path().join("sub-01_TI_max.nii").exists());
        assert!(dir.path().join("sub-01_TI_normal.nii").exists());
        assert!(dir.path().join("sub-01_TI_tangential.nii").exists());
    }
}
