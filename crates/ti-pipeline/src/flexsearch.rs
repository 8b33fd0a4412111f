//! Top-level flex-search entry point: runs the continuous-position
//! optimizer directly against the forward solver (no leadfield — flex-
//! search positions are never snapped to a net electrode until the final
//! mapping step) and writes the mapped-electrode and summary reports
//! (spec §4.5, §6).

use std::fs::File;
use std::io::Write;

use ti_core::error::{Result, TiError};
use ti_core::roi::Roi;
use ti_flexsearch::{search, FlexSearchRequest, FlexSearchResult};

use crate::context::RunContext;
use crate::outdir::OutputDir;
use crate::paths;

/// Runs one flex-search and writes `flex-search/<session>/mapping.csv`
/// (one row per optimized electrode, mapped onto the net) and
/// `summary.txt` (optimizer cost, generations run, solver failure tally).
pub fn run_flexsearch(ctx: &RunContext, roi: &Roi, session: &str) -> Result<FlexSearchResult> {
    let subject_dir = paths::subject_dir(ctx.project_root, &ctx.head.subject_id);
    let net = ctx
        .head
        .net(ctx.net_name())
        .ok_or_else(|| TiError::InvalidConfig { reason: format!("net '{}' not found on subject '{}'", ctx.net_name(), ctx.head.subject_id) })?;
    let electrode_spec = ctx.config.electrode_spec();

    let request = FlexSearchRequest {
        solver: ctx.solver,
        mesh: &ctx.head.mesh,
        subject_to_mni: &ctx.head.subject_to_mni,
        atlases: &ctx.head.atlases,
        roi,
        net,
        electrode_spec: &electrode_spec,
        conductivity_profile: ctx.config.conductivity_profile.clone(),
        intensities_ma: ctx.config.intensities_ma,
        goal: ctx.config.goal,
        optimizer_settings: ctx.config.optimizer_settings.clone(),
        solver_timeout: ctx.solver_timeout,
    };
    let result = search(&request, ctx.cancel)?;

    let run_dir = paths::flexsearch_dir(&subject_dir, session);
    let out = OutputDir::acquire(&run_dir, ctx.config.overwrite)?;
    write_mapping_csv(&run_dir, &result)?;
    write_summary(&run_dir, &result)?;
    out.complete()?;

    Ok(result)
}

fn write_mapping_csv(run_dir: &std::path::Path, result: &FlexSearchResult) -> Result<()> {
    let mut file = File::create(run_dir.join("mapping.csv")).map_err(|e| TiError::io("creating flex-search mapping csv", e))?;
    writeln!(file, "electrode_label,electrode_x,electrode_y,electrode_z,optimized_x,optimized_y,optimized_z,distance_mm")
        .map_err(|e| TiError::io("writing flex-search mapping csv", e))?;
    for m in &result.mapping.mapped {
        writeln!(
            file,
            "{},{},{},{},{},{},{},{}",
            m.electrode_label,
            m.electrode_position.x,
            m.electrode_position.y,
            m.electrode_position.z,
            m.optimized_position.x,
            m.optimized_position.y,
            m.optimized_position.z,
            m.distance_mm
        )
        .map_err(|e| TiError::io("writing flex-search mapping csv", e))?;
    }
    Ok(())
}

fn write_summary(run_dir: &std::path::Path, result: &FlexSearchResult) -> Result<()> {
    let mut file = File::create(run_dir.join("summary.txt")).map_err(|e| TiError::io("creating flex-search summary", e))?;
    writeln!(file, "best_cost={}", result.optimize.best_cost).map_err(|e| TiError::io("writing flex-search summary", e))?;
    writeln!(file, "generations_run={}", result.optimize.generations_run).map_err(|e| TiError::io("writing flex-search summary", e))?;
    writeln!(file, "cancelled={}", result.optimize.cancelled).map_err(|e| TiError::io("writing flex-search summary", e))?;
    writeln!(file, "solver_failures={}", result.solver_failures).map_err(|e| TiError::io("writing flex-search summary", e))?;
    writeln!(file, "unmapped_point_count={}", result.mapping.unmapped_point_indices.len()).map_err(|e| TiError::io("writing flex-search summary", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use ti_core::config::RunConfig;
    use ti_core::electrode::ElectrodeShape;
    use ti_core::geometry::{Affine, CoordinateSpace, Point3};
    use ti_core::mesh::{TetMesh, GREY_MATTER_TAG};
    use ti_core::net::ElectrodeNet;
    use ti_core::subject::HeadModel;
    use ti_core::voxel::VoxelGrid;
    use ti_guard::cancel::CancelToken;
    use ti_simulate::solver::MockAnalyticalSolver;

    fn mesh() -> TetMesh {
        let mut nodes = Vec::new();
        let mut elements = Vec::new();
        for i in 0..20 {
            let base = nodes.len() as u32;
            let f = i as f64;
            nodes.push(Point3::new(f, 0.0, 0.0));
            nodes.push(Point3::new(f, 10.0, 0.0));
            nodes.push(Point3::new(f, 0.0, 10.0));
            nodes.push(Point3::new(f, 0.0, -10.0));
            elements.push([base, base + 1, base + 2, base + 3]);
        }
        TetMesh { tissue_tags: vec![GREY_MATTER_TAG; elements.len()], nodes, elements }
    }

    fn head() -> HeadModel {
        let net = ElectrodeNet {
            name: "net".into(),
            electrodes: vec![
                ("Fz".into(), Point3::new(0.0, 80.0, 0.0)),
                ("Pz".into(), Point3::new(0.0, -80.0, 0.0)),
                ("C3".into(), Point3::new(-80.0, 0.0, 0.0)),
                ("C4".into(), Point3::new(80.0, 0.0, 0.0)),
            ],
        };
        let mut nets = HashMap::new();
        nets.insert("net".to_string(), net);
        let grid = VoxelGrid { dims: [1, 1, 1], ijk_to_mm: Affine::IDENTITY, voxel_size_mm: 1.0 };
        HeadModel {
            subject_id: "01".into(),
            mesh: mesh(),
            subject_voxels: grid.clone(),
            mni_voxels: grid,
            subject_to_mni: Affine::IDENTITY,
            atlases: HashMap::new(),
            nets,
        }
    }

    #[test]
    fn run_flexsearch_writes_mapping_and_summary() {
        let dir = tempfile::tempdir().unwrap();
        let head = head();
        let mut config = RunConfig::default();
        config.eeg_net = "net".into();
        config.electrode_shape = ElectrodeShape::Rectangular;
        config.optimizer_settings.population_size = 8;
        config.optimizer_settings.max_iterations = 3;
        config.optimizer_settings.seed = Some(7);
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
        let roi = Roi::Sphere { center: Point3::new(9.0, 0.0, 0.0), radius_mm: 50.0, space: CoordinateSpace::Subject };

        let result = run_flexsearch(&ctx, &roi, "2026-01-01").unwrap();
        assert_eq!(result.mapping.mapped.len(), 4);

        let subject_dir = paths::subject_dir(dir.path(), "01");
        assert!(subject_dir.join("flex-search/2026-01-01/mapping.csv").exists());
        assert!(subject_dir.join("flex-search/2026-01-01/summary.txt").exists());
    }
}
