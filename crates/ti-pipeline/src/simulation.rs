//! Top-level simulation entry point: resolves paths, runs `ti_simulate`,
//! and writes the requested `Analyses/` tables alongside the mesh/NIfTI
//! output (spec §4.1, §4.2, §6).

use std::fs::File;
use std::path::Path;

use ti_core::electrode::Montage;
use ti_core::error::{Result, TiError};
use ti_core::geometry::CoordinateSpace;
use ti_core::roi::Roi;
use ti_core::simulation::SimulationResult;
use ti_simulate::run::run as run_simulate;

use crate::analyses;
use crate::context::RunContext;
use crate::outdir::OutputDir;
use crate::paths;

/// Runs one montage end to end and writes every mesh/voxel output plus a
/// mesh- and voxel-space `Analyses/` table for each ROI in `rois`, and one
/// whole-head table tagged with `whole_head_atlas` (spec §6's
/// `whole_head_<atlas>` entry; any name documenting which parcellation
/// was current for the run is acceptable since the statistics themselves
/// are never atlas-restricted).
pub fn run_simulation(
    ctx: &RunContext,
    montage: &Montage,
    sim_name: &str,
    rois: &[Roi],
    whole_head_atlas: &str,
) -> Result<SimulationResult> {
    let subject_dir = paths::subject_dir(ctx.project_root, &ctx.head.subject_id);
    let outputs = paths::simulation_output_paths(&subject_dir, &ctx.head.subject_id, sim_name);
    let electrode_spec = ctx.config.electrode_spec();

    let result = run_simulate(
        ctx.head,
        montage,
        &electrode_spec,
        ctx.config.intensities_ma,
        ctx.config.conductivity_profile.clone(),
        ctx.solver,
        ctx.solver_timeout,
        ctx.cancel,
        &outputs,
        ctx.config.overwrite,
    )?;

    for roi in rois {
        write_roi_analyses(ctx, &subject_dir, sim_name, roi, &result)?;
    }
    write_whole_head_analyses(ctx, &subject_dir, sim_name, whole_head_atlas, &result)?;

    Ok(result)
}

fn create_file(path: &Path) -> Result<File> {
    File::create(path).map_err(|e| TiError::io("creating analysis csv file", e))
}

fn write_roi_analyses(ctx: &RunContext, subject_dir: &Path, sim_name: &str, roi: &Roi, result: &SimulationResult) -> Result<()> {
    let tag = paths::roi_tag(roi);
    let overwrite = ctx.config.overwrite;

    let mesh_path = paths::analysis_csv(subject_dir, sim_name, paths::AnalysisSpace::Mesh, &tag, "full_mesh");
    let mesh_dir = OutputDir::acquire(mesh_path.parent().expect("analysis csv always has a parent"), overwrite)?;
    let mut file = create_file(&mesh_path)?;
    analyses::write_mesh_roi_analysis(&mut file, &ctx.head.mesh, &ctx.head.subject_to_mni, &ctx.head.atlases, roi, &result.full_mesh)?;
    mesh_dir.complete()?;

    let voxel_dir_path = paths::analysis_csv(subject_dir, sim_name, paths::AnalysisSpace::Voxel, &tag, "subject_voxels").parent().unwrap().to_path_buf();
    let voxel_dir = OutputDir::acquire(&voxel_dir_path, overwrite)?;
    let subject_path = voxel_dir_path.join("subject_voxels.csv");
    let mut file = create_file(&subject_path)?;
    analyses::write_voxel_roi_analysis(
        &mut file,
        &ctx.head.subject_voxels,
        CoordinateSpace::Subject,
        &ctx.head.subject_to_mni,
        &ctx.head.atlases,
        roi,
        &result.subject_voxels,
    )?;
    let mni_path = voxel_dir_path.join("mni_voxels.csv");
    let mut file = create_file(&mni_path)?;
    analyses::write_voxel_roi_analysis(
        &mut file,
        &ctx.head.mni_voxels,
        CoordinateSpace::Mni,
        &ctx.head.subject_to_mni,
        &ctx.head.atlases,
        roi,
        &result.mni_voxels,
    )?;
    voxel_dir.complete()
}

fn write_whole_head_analyses(ctx: &RunContext, subject_dir: &Path, sim_name: &str, atlas: &str, result: &SimulationResult) -> Result<()> {
    let tag = paths::whole_head_tag(atlas);

    let mesh_path = paths::analysis_csv(subject_dir, sim_name, paths::AnalysisSpace::Mesh, &tag, "full_mesh");
    let mesh_dir = OutputDir::acquire(mesh_path.parent().expect("analysis csv always has a parent"), true)?;
    let mut file = create_file(&mesh_path)?;
    analyses::write_mesh_whole_head_analysis(&mut file, &ctx.head.mesh, &result.full_mesh)?;
    mesh_dir.complete()?;

    let voxel_path = paths::analysis_csv(subject_dir, sim_name, paths::AnalysisSpace::Voxel, &tag, "subject_voxels");
    let voxel_dir = OutputDir::acquire(voxel_path.parent().expect("analysis csv always has a parent"), true)?;
    let mut file = create_file(&voxel_path)?;
    analyses::write_voxel_whole_head_analysis(&mut file, &ctx.head.subject_voxels, &result.subject_voxels)?;
    voxel_dir.complete()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use ti_core::config::RunConfig;
    use ti_core::electrode::{Channel, ElectrodePlacement};
    use ti_core::geometry::{Affine, Point3};
    use ti_core::mesh::{TetMesh, GREY_MATTER_TAG};
    use ti_core::net::ElectrodeNet;
    use ti_core::subject::HeadModel;
    use ti_core::voxel::VoxelGrid;
    use ti_guard::cancel::CancelToken;
    use ti_simulate::solver::MockAnalyticalSolver;

    fn head() -> HeadModel {
        let mesh = TetMesh {
            nodes: vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(10.0, 0.0, 0.0),
                Point3::new(0.0, 10.0, 0.0),
                Point3::new(0.0, 0.0, 10.0),
                Point3::new(10.0, 10.0, 10.0),
            ],
            elements: vec![[0, 1, 2, 3], [1, 2, 3, 4]],
            tissue_tags: vec![GREY_MATTER_TAG, 9],
        };
        let net = ElectrodeNet {
            name: "net".into(),
            electrodes: vec![
                ("Fz".into(), Point3::new(-20.0, 0.0, 0.0)),
                ("Pz".into(), Point3::new(20.0, 0.0, 0.0)),
                ("C3".into(), Point3::new(0.0, -20.0, 0.0)),
                ("C4".into(), Point3::new(0.0, 20.0, 0.0)),
            ],
        };
        let mut nets = HashMap::new();
        nets.insert("net".to_string(), net);
        let grid = VoxelGrid { dims: [1, 1, 1], ijk_to_mm: Affine::IDENTITY, voxel_size_mm: 1.0 };
        HeadModel {
            subject_id: "01".into(),
            mesh,
            subject_voxels: grid.clone(),
            mni_voxels: grid,
            subject_to_mni: Affine::IDENTITY,
            atlases: HashMap::new(),
            nets,
        }
    }

    fn montage() -> Montage {
        Montage {
            name: "ti-sim".into(),
            net_name: "net".into(),
            channels: [
                Channel { placements: vec![ElectrodePlacement { label: "Fz".into(), current_ma: 1.0 }, ElectrodePlacement { label: "Pz".into(), current_ma: -1.0 }] },
                Channel { placements: vec![ElectrodePlacement { label: "C3".into(), current_ma: 1.0 }, ElectrodePlacement { label: "C4".into(), current_ma: -1.0 }] },
            ],
        }
    }

    #[test]
    fn run_simulation_writes_mesh_voxel_and_analysis_outputs() {
        let dir = tempfile::tempdir().unwrap();
        let head = head();
        let mut config = RunConfig::default();
        config.eeg_net = "net".into();
        let solver = MockAnalyticalSolver::new();
        let cancel = CancelToken::new();
        let ctx = RunContext {
            project_root: dir.path(),
            head: &head,
            config: &config,
            solver: &solver,
            solver_timeout: None,
            cancel: &cancel,
            reference_electrode: "Pz",
            solver_version: "mock-1",
            electrode_convention_version: "v1",
            ceiling: None,
            ceiling_confirmed: false,
            run_timestamp: "20260101T000000Z",
        };
        let roi = Roi::Sphere { center: Point3::new(3.0, 3.0, 3.0), radius_mm: 50.0, space: CoordinateSpace::Subject };

        let result = run_simulation(&ctx, &montage(), "ti-sim", &[roi], "none").unwrap();
        assert_eq!(result.montage_name, "ti-sim");

        let subject_dir = paths::subject_dir(dir.path(), "01");
        assert!(subject_dir.join("Simulations/ti-sim/TI/mesh/TI.msh").exists());
        assert!(subject_dir.join("Simulations/ti-sim/Analyses/Mesh/sphere_x3_y3_z3_r50/full_mesh.csv").exists());
        assert!(subject_dir.join("Simulations/ti-sim/Analyses/Voxel/sphere_x3_y3_z3_r50/subject_voxels.csv").exists());
        assert!(subject_dir.join("Simulations/ti-sim/Analyses/Mesh/whole_head_none/full_mesh.csv").exists());
    }
}
