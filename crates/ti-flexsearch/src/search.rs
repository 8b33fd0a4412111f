//! The flex-search entry point: fits a scalp mask, runs differential
//! evolution with rayon-parallel per-generation evaluation, and maps the
//! optimized electrode positions onto the nearest net electrodes
//! (spec §4.5 "Net mapping (post-step)").

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use rayon::prelude::*;

use ti_core::atlas::Atlas;
use ti_core::config::{ConductivityProfile, Goal, OptimizerSettings};
use ti_core::electrode::ElectrodeSpec;
use ti_core::error::Result;
use ti_core::geometry::Affine;
use ti_core::mesh::TetMesh;
use ti_core::net::ElectrodeNet;
use ti_core::roi::Roi;
use ti_guard::cancel::CancelToken;
use ti_simulate::solver::ForwardSolver;

use ti_coords::assignment::{assign_to_net, NetMapping};

use crate::candidate::{bounds, decode, ELECTRODE_COUNT};
use crate::evaluate::{evaluate, EvaluationContext};
use crate::optimize::{differential_evolution, OptimizeResult};
use crate::roi::roi_node_indices;
use crate::scalp::ScalpMask;

/// Everything one flex-search call needs.
pub struct FlexSearchRequest<'a> {
    pub solver: &'a dyn ForwardSolver,
    pub mesh: &'a TetMesh,
    pub subject_to_mni: &'a Affine,
    pub atlases: &'a HashMap<String, Atlas>,
    pub roi: &'a Roi,
    pub net: &'a ElectrodeNet,
    pub electrode_spec: &'a ElectrodeSpec,
    pub conductivity_profile: ConductivityProfile,
    pub intensities_ma: [f64; 2],
    pub goal: Goal,
    pub optimizer_settings: OptimizerSettings,
    pub solver_timeout: Option<Duration>,
}

/// The full flex-search result: the optimizer's raw output plus the
/// post-step net mapping of its 4 optimized positions.
#[derive(Debug, Clone)]
pub struct FlexSearchResult {
    pub optimize: OptimizeResult,
    pub mapping: NetMapping,
    /// Count of evaluations across the whole run that hit a
    /// `SolverFailure` and were scored as worst-possible rather than
    /// aborting (spec §7's "quality metric").
    pub solver_failures: usize,
}

pub fn search(request: &FlexSearchRequest, cancel: &CancelToken) -> Result<FlexSearchResult> {
    let roi_nodes = roi_node_indices(request.roi, request.mesh, request.subject_to_mni, request.atlases)?;
    let net_positions: Vec<_> = request.net.electrodes.iter().map(|(_, p)| *p).collect();
    let scalp = ScalpMask::fit(&net_positions);
    let bounds = bounds(ELECTRODE_COUNT);
    let dim = bounds.len();
    let solver_failures = AtomicUsize::new(0);

    let eval_one = |params: &[f64]| -> Result<f64> {
        let ctx = EvaluationContext {
            solver: request.solver,
            mesh: request.mesh,
            electrode_spec: request.electrode_spec,
            conductivity_profile: request.conductivity_profile.clone(),
            scalp: &scalp,
            intensities_ma: request.intensities_ma,
            roi_nodes: &roi_nodes,
            goal: request.goal,
            timeout: request.solver_timeout,
            solver_failures: &solver_failures,
        };
        evaluate(&ctx, params)
    };

    let optimize = differential_evolution(&request.optimizer_settings, &bounds, cancel, |flat| {
        flat.par_chunks(dim).map(eval_one).collect::<Result<Vec<f64>>>()
    })?;

    let positions: Vec<_> = decode(&optimize.best_params).iter().map(|&(lambda, phi)| scalp.to_point(lambda, phi)).collect();
    let mapping = assign_to_net(&positions, request.net);

    Ok(FlexSearchResult { optimize, mapping, solver_failures: solver_failures.load(Ordering::Relaxed) })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ti_core::electrode::ElectrodeShape;
    use ti_core::geometry::{CoordinateSpace, Point3};
    use ti_core::mesh::GREY_MATTER_TAG;
    use ti_simulate::solver::MockAnalyticalSolver;

    fn mesh() -> TetMesh {
        let mut nodes = Vec::new();
        let mut elements = Vec::new();
        for i in 0..20 {
            let base = nodes.len() as u32;
            nodes.push(Point3::new(i as f64, 0.0, 0.0));
            nodes.push(Point3::new(i as f64, 10.0, 0.0));
            nodes.push(Point3::new(i as f64, 0.0, 10.0));
            nodes.push(Point3::new(i as f64, 0.0, -10.0));
            elements.push([base, base + 1, base + 2, base + 3]);
        }
        TetMesh { tissue_tags: vec![GREY_MATTER_TAG; elements.len()], nodes, elements }
    }

    fn net() -> ElectrodeNet {
        ElectrodeNet {
            name: "test-net".into(),
            electrodes: vec![
                ("Fz".into(), Point3::new(0.0, 80.0, 0.0)),
                ("Pz".into(), Point3::new(0.0, -80.0, 0.0)),
                ("C3".into(), Point3::new(-80.0, 0.0, 0.0)),
                ("C4".into(), Point3::new(80.0, 0.0, 0.0)),
            ],
        }
    }

    #[test]
    fn search_returns_four_mapped_electrodes() {
        let mesh = mesh();
        let net = net();
        let solver = MockAnalyticalSolver::new();
        let spec = ElectrodeSpec { shape: ElectrodeShape::Rectangular, dimensions_mm: (2.0, 2.0), thickness_mm: 4.0, conductivity: 0.3 };
        let atlases = HashMap::new();
        let roi = Roi::Sphere { center: Point3::new(9.0, 0.0, 0.0), radius_mm: 50.0, space: CoordinateSpace::Subject };
        let settings = OptimizerSettings { population_size: 8, max_iterations: 3, recombination_rate: 0.8, mutation_range: (0.4, 0.9), convergence_tolerance: 1e-9, seed: Some(3) };

        let request = FlexSearchRequest {
            solver: &solver,
            mesh: &mesh,
            subject_to_mni: &Affine::IDENTITY,
            atlases: &atlases,
            roi: &roi,
            net: &net,
            electrode_spec: &spec,
            conductivity_profile: ConductivityProfile::Scalar,
            intensities_ma: [2.0, 2.0],
            goal: Goal::Mean,
            optimizer_settings: settings,
            solver_timeout: None,
        };

        let result = search(&request, &CancelToken::new()).unwrap();
        assert_eq!(result.mapping.mapped.len(), 4);
        assert!(result.mapping.unmapped_point_indices.is_empty());
    }

    #[test]
    fn cancelled_before_start_still_produces_a_mapping() {
        let mesh = mesh();
        let net = net();
        let solver = MockAnalyticalSolver::new();
        let spec = ElectrodeSpec { shape: ElectrodeShape::Rectangular, dimensions_mm: (2.0, 2.0), thickness_mm: 4.0, conductivity: 0.3 };
        let atlases = HashMap::new();
        let roi = Roi::Sphere { center: Point3::new(9.0, 0.0, 0.0), radius_mm: 50.0, space: CoordinateSpace::Subject };
        let settings = OptimizerSettings::default();

        let request = FlexSearchRequest {
            solver: &solver,
            mesh: &mesh,
            subject_to_mni: &Affine::IDENTITY,
            atlases: &atlases,
            roi: &roi,
            net: &net,
            electrode_spec: &spec,
            conductivity_profile: ConductivityProfile::Scalar,
            intensities_ma: [2.0, 2.0],
            goal: Goal::Mean,
            optimizer_settings: settings,
            solver_timeout: None,
        };

        let cancel = CancelToken::new();
        cancel.cancel();
        let result = search(&request, &cancel).unwrap();
        assert!(result.optimize.cancelled);
        assert_eq!(result.mapping.mapped.len(), 4);
    }
}
