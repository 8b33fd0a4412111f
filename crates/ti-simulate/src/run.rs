//! The simulator's public entry point (spec §4.1): drives one montage
//! through the `idle -> validated -> submitted -> solved -> post-processed
//! -> written` state machine, producing field outputs on the full mesh,
//! the grey-matter submesh, and both voxel grids.

use std::collections::HashMap;
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use ti_core::config::ConductivityProfile;
use ti_core::electrode::{ElectrodeSpec, Montage};
use ti_core::error::{Result, TiError};
use ti_core::field::{DirectionalField, Domain, FieldSample};
use ti_core::geometry::Point3;
use ti_core::mesh::GREY_MATTER_TAG;
use ti_core::simulation::{SimulationFields, SimulationResult, VectorField};
use ti_core::subject::HeadModel;
use ti_core::voxel::VoxelGrid;
use ti_guard::cancel::CancelToken;

use crate::interpolate;
use crate::output;
use crate::post;
use crate::solver::{ForwardSolver, SolveRequest};
use crate::state::SimStateMachine;

/// Where a run's outputs are written, already resolved to concrete paths
/// (path construction itself is `ti-pipeline`'s responsibility, spec §6.2
/// — this struct only carries the result).
#[derive(Debug, Clone)]
pub struct OutputPaths {
    pub mesh_full: PathBuf,
    pub mesh_grey_matter: PathBuf,
    pub subject_voxel_dir: PathBuf,
    pub subject_voxel_prefix: String,
    pub mni_voxel_dir: PathBuf,
    pub mni_voxel_prefix: String,
}

impl OutputPaths {
    /// Whether either mesh output already exists — checked before
    /// invoking the solver so a run without `overwrite` fails cheaply
    /// (spec §4.1 "Idempotence & overwrite").
    fn any_exists(&self) -> bool {
        self.mesh_full.exists() || self.mesh_grey_matter.exists()
    }
}

/// Runs one montage end to end: validates, solves both channels (in
/// parallel), derives the TI fields, and writes every output
/// representation. See spec §4.1's public contract for the exact
/// preconditions and failure modes.
#[allow(clippy::too_many_arguments)]
pub fn run(
    head: &HeadModel,
    montage: &Montage,
    electrode_spec: &ElectrodeSpec,
    intensities_ma: [f64; 2],
    conductivity_profile: ConductivityProfile,
    solver: &dyn ForwardSolver,
    timeout: Option<Duration>,
    cancel: &CancelToken,
    outputs: &OutputPaths,
    overwrite: bool,
) -> Result<SimulationResult> {
    let mut machine = SimStateMachine::new();
    tracing::info!(subject = %head.subject_id, montage = %montage.name, "starting simulation run");

    electrode_spec.validate()?;
    let net = head.net(&montage.net_name).ok_or_else(|| TiError::InvalidMontage {
        reason: format!("net '{}' not found on subject '{}'", montage.net_name, head.subject_id),
    })?;
    montage.validate(&net.labels())?;
    let channel_1 = montage.channels[0].scaled_to(intensities_ma[0])?;
    let channel_2 = montage.channels[1].scaled_to(intensities_ma[1])?;

    let grey_elements = head.mesh.elements_with_tag(GREY_MATTER_TAG);
    if grey_elements.is_empty() {
        return Err(TiError::TissueOutOfRange { tag: GREY_MATTER_TAG });
    }

    machine.advance();
    tracing::info!(state = ?machine.state(), "montage and electrode spec validated");

    if !overwrite && outputs.any_exists() {
        return Err(TiError::OutputExists { path: outputs.mesh_full.display().to_string() });
    }
    if cancel.is_cancelled() {
        return Err(TiError::Cancelled { context: format!("submitting simulation for montage '{}'", montage.name) });
    }
    machine.advance();
    tracing::info!(state = ?machine.state(), "submitting both channels to the forward solver");

    let positions: HashMap<String, Point3> = net.electrodes.iter().cloned().collect();
    let request_1 = SolveRequest {
        mesh: &head.mesh,
        placements: &channel_1.placements,
        electrode_positions: &positions,
        electrode_spec,
        conductivity_profile: conductivity_profile.clone(),
    };
    let request_2 = SolveRequest {
        mesh: &head.mesh,
        placements: &channel_2.placements,
        electrode_positions: &positions,
        electrode_spec,
        conductivity_profile,
    };

    let (output_1, output_2) = thread::scope(|scope| {
        let h1 = scope.spawn(|| {
            tracing::info!(channel = 1, "invoking forward solver");
            solver.solve(&request_1, timeout)
        });
        let h2 = scope.spawn(|| {
            tracing::info!(channel = 2, "invoking forward solver");
            solver.solve(&request_2, timeout)
        });
        (h1.join().expect("channel 1 solver thread panicked"), h2.join().expect("channel 2 solver thread panicked"))
    });
    let output_1 = output_1?;
    let output_2 = output_2?;
    machine.advance();
    tracing::info!(state = ?machine.state(), "both channels solved");

    if cancel.is_cancelled() {
        return Err(TiError::Cancelled { context: format!("post-processing simulation for montage '{}'", montage.name) });
    }

    let normals = post::approximate_outward_normals(&head.mesh);
    let (ti_max, ti_normal, ti_tangential) = post::derive_ti(&output_1.field, &output_2.field, &normals)?;
    let full_mesh_fields = SimulationFields { channel_1: output_1.field, channel_2: output_2.field, ti_max, ti_normal, ti_tangential };

    let (grey_mesh, node_map) = head.mesh.submesh(&grey_elements);
    let grey_matter_fields = restrict_to_nodes(&full_mesh_fields, &node_map)?;

    let subject_voxel_fields = resample_fields(&head.mesh.nodes, &full_mesh_fields, &head.subject_voxels)?;
    let mni_node_positions: Vec<Point3> = head.mesh.nodes.iter().map(|n| head.subject_to_mni.apply(n)).collect();
    let mni_voxel_fields = resample_fields(&mni_node_positions, &full_mesh_fields, &head.mni_voxels)?;

    machine.advance();
    tracing::info!(state = ?machine.state(), "TI fields derived in every output space");

    output::write_mesh_fields(&head.mesh, &full_mesh_fields, &outputs.mesh_full)?;
    output::write_mesh_fields(&grey_mesh, &grey_matter_fields, &outputs.mesh_grey_matter)?;
    output::write_voxel_fields(&head.subject_voxels, &subject_voxel_fields, &outputs.subject_voxel_dir, &outputs.subject_voxel_prefix)?;
    output::write_voxel_fields(&head.mni_voxels, &mni_voxel_fields, &outputs.mni_voxel_dir, &outputs.mni_voxel_prefix)?;

    machine.advance();
    tracing::info!(state = ?machine.state(), subject = %head.subject_id, montage = %montage.name, "simulation outputs written");

    Ok(SimulationResult {
        montage_name: montage.name.clone(),
        full_mesh: full_mesh_fields,
        grey_matter_mesh: grey_matter_fields,
        subject_voxels: subject_voxel_fields,
        mni_voxels: mni_voxel_fields,
    })
}

/// Restricts every field in `fields` (all nodal, by construction in this
/// crate) onto the node subset named by `node_map[new_idx] == old_idx`.
fn restrict_to_nodes(fields: &SimulationFields, node_map: &[usize]) -> Result<SimulationFields> {
    let domain = Domain::Mesh { len: node_map.len() };
    let restrict = |sample: &FieldSample| -> Result<FieldSample> {
        let values = node_map.iter().map(|&old| sample.values[old]).collect();
        FieldSample::new_nodal(domain, values)
    };
    let restrict_vector = |v: &VectorField| -> Result<VectorField> {
        Ok(VectorField { x: restrict(&v.x)?, y: restrict(&v.y)?, z: restrict(&v.z)? })
    };
    let restrict_directional = |d: &DirectionalField| -> Result<DirectionalField> {
        Ok(DirectionalField { field: restrict(&d.field)?, surface: d.surface })
    };
    Ok(SimulationFields {
        channel_1: restrict_vector(&fields.channel_1)?,
        channel_2: restrict_vector(&fields.channel_2)?,
        ti_max: restrict(&fields.ti_max)?,
        ti_normal: restrict_directional(&fields.ti_normal)?,
        ti_tangential: restrict_directional(&fields.ti_tangential)?,
    })
}

/// Resamples every field in `fields` (nodal on `node_positions`) onto
/// `grid`'s voxel centers via nearest-node lookup (spec §4.1 "Output
/// spaces").
fn resample_fields(node_positions: &[Point3], fields: &SimulationFields, grid: &VoxelGrid) -> Result<SimulationFields> {
    let domain = Domain::Voxel { len: grid.voxel_count() };
    let resample = |sample: &FieldSample| -> Result<FieldSample> {
        FieldSample::new_nodal(domain, interpolate::resample_to_grid(node_positions, &sample.values, grid))
    };
    let resample_vector = |v: &VectorField| -> Result<VectorField> {
        Ok(VectorField { x: resample(&v.x)?, y: resample(&v.y)?, z: resample(&v.z)? })
    };
    let resample_directional = |d: &DirectionalField| -> Result<DirectionalField> {
        Ok(DirectionalField { field: resample(&d.field)?, surface: d.surface })
    };
    Ok(SimulationFields {
        channel_1: resample_vector(&fields.channel_1)?,
        channel_2: resample_vector(&fields.channel_2)?,
        ti_max: resample(&fields.ti_max)?,
        ti_normal: resample_directional(&fields.ti_normal)?,
        ti_tangential: resample_directional(&fields.ti_tangential)?,
    })
}
