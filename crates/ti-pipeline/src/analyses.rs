//! Writes the `Analyses/{Mesh,Voxel}/<roi_tag>/*.csv` tables (spec §6,
//! §4.2): one row per named field (`channel_1`, `channel_2`, `TI_max`,
//! `TI_normal`, `TI_tangential`) giving that field's `ti_analyze::Stats`
//! over one region. The CSV layout follows `ti_exsearch::rank::write_ledger`'s
//! plain `std::io::Write` style rather than pulling in the `csv` crate for
//! a five-row table.

use std::io::Write;

use ti_analyze::stats::Stats;
use ti_analyze::{mesh as analyze_mesh, voxel as analyze_voxel};
use ti_core::atlas::Atlas;
use ti_core::error::Result;
use ti_core::field::FieldSample;
use ti_core::geometry::{Affine, CoordinateSpace};
use ti_core::mesh::TetMesh;
use ti_core::roi::Roi;
use ti_core::simulation::SimulationFields;
use ti_core::voxel::VoxelGrid;
use std::collections::HashMap;

const HEADER: &str = "field,count,mean,std,min,max,median,p25,p75,p95,p99,volume_mm3,focality_50,focality_75";

fn write_row<W: Write>(writer: &mut W, field: &str, stats: &Stats) -> Result<()> {
    writeln!(
        writer,
        "{field},{},{},{},{},{},{},{},{},{},{},{},{},{}",
        stats.count,
        stats.mean,
        stats.std,
        stats.min,
        stats.max,
        stats.median,
        stats.p25,
        stats.p75,
        stats.p95,
        stats.p99,
        stats.volume_mm3,
        stats.focality_50,
        stats.focality_75,
    )
    .map_err(|e| ti_core::error::TiError::io("writing analysis CSV row", e))
}

/// The five named fields every analysis table reports on, pairing a
/// label with the magnitude/scalar sample to analyze.
fn named_mesh_fields(fields: &SimulationFields) -> [(&'static str, FieldSample); 5] {
    [
        ("channel_1", FieldSample::new_nodal(fields.channel_1.x.domain, fields.channel_1.magnitude()).expect("magnitude matches domain")),
        ("channel_2", FieldSample::new_nodal(fields.channel_2.x.domain, fields.channel_2.magnitude()).expect("magnitude matches domain")),
        ("TI_max", fields.ti_max.clone()),
        ("TI_normal", fields.ti_normal.field.clone()),
        ("TI_tangential", fields.ti_tangential.field.clone()),
    ]
}

/// Writes a sphere- or atlas-region-scoped mesh-space analysis table.
pub fn write_mesh_roi_analysis<W: Write>(
    writer: &mut W,
    mesh: &TetMesh,
    subject_to_mni: &Affine,
    atlases: &HashMap<String, Atlas>,
    roi: &Roi,
    fields: &SimulationFields,
) -> Result<()> {
    writeln!(writer, "{HEADER}").map_err(|e| ti_core::error::TiError::io("writing analysis CSV header", e))?;
    for (name, sample) in named_mesh_fields(fields) {
        let stats = match roi {
            Roi::Sphere { center, radius_mm, space } => analyze_mesh::analyze_spherical(&sample, mesh, *center, *radius_mm, *space, subject_to_mni)?,
            Roi::Atlas { atlas_name, region } => analyze_mesh::analyze_atlas(&sample, mesh, atlas_name, region, atlases)?,
        };
        write_row(writer, name, &stats)?;
    }
    Ok(())
}

/// Writes the whole-head mesh-space analysis table (spec §6's
/// `whole_head_<atlas>` tag: an atlas name documents which parcellation
/// was in scope for the run, but the statistics themselves cover the
/// entire mesh).
pub fn write_mesh_whole_head_analysis<W: Write>(writer: &mut W, mesh: &TetMesh, fields: &SimulationFields) -> Result<()> {
    writeln!(writer, "{HEADER}").map_err(|e| ti_core::error::TiError::io("writing analysis CSV header", e))?;
    for (name, sample) in named_mesh_fields(fields) {
        let stats = analyze_mesh::analyze_whole_head(&sample, mesh)?;
        write_row(writer, name, &stats)?;
    }
    Ok(())
}

fn named_voxel_fields(fields: &SimulationFields) -> [(&'static str, FieldSample); 3] {
    [("TI_max", fields.ti_max.clone()), ("TI_normal", fields.ti_normal.field.clone()), ("TI_tangential", fields.ti_tangential.field.clone())]
}

/// Writes a sphere- or atlas-region-scoped voxel-space analysis table.
/// Voxel-space outputs carry only the TI-derived fields (spec §6.3:
/// per-channel magnitude is a mesh-only diagnostic).
pub fn write_voxel_roi_analysis<W: Write>(
    writer: &mut W,
    grid: &VoxelGrid,
    grid_space: CoordinateSpace,
    subject_to_mni: &Affine,
    atlases: &HashMap<String, Atlas>,
    roi: &Roi,
    fields: &SimulationFields,
) -> Result<()> {
    writeln!(writer, "{HEADER}").map_err(|e| ti_core::error::TiError::io("writing analysis CSV header", e))?;
    for (name, sample) in named_voxel_fields(fields) {
        let stats = match roi {
            Roi::Sphere { center, radius_mm, space } => {
                analyze_voxel::analyze_spherical(&sample, grid, grid_space, *center, *radius_mm, *space, subject_to_mni)?
            }
            Roi::Atlas { atlas_name, region } => analyze_voxel::analyze_atlas(&sample, grid, grid_space, atlas_name, region, atlases)?,
        };
        write_row(writer, name, &stats)?;
    }
    Ok(())
}

/// Writes the whole-head voxel-space analysis table.
pub fn write_voxel_whole_head_analysis<W: Write>(writer: &mut W, grid: &VoxelGrid, fields: &SimulationFields) -> Result<()> {
    writeln!(writer, "{HEADER}").map_err(|e| ti_core::error::TiError::io("writing analysis CSV header", e))?;
    for (name, sample) in named_voxel_fields(fields) {
        let stats = analyze_voxel::analyze_whole_head(&sample, grid)?;
        write_row(writer, name, &stats)?;
    }
    Ok(())
}
