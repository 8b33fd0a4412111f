//! Per-evaluation cost function (spec §4.5 "Evaluation"): decode a
//! decision vector to electrode positions, invoke the FE solver for each
//! channel directly (not a leadfield lookup — positions are continuous),
//! combine into a TI envelope, and reduce to a minimized cost.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use ti_algebra::ti_field::ti_envelope_max;
use ti_analyze::stats::weighted_stats;
use ti_core::config::{ConductivityProfile, Goal};
use ti_core::electrode::{ElectrodePlacement, ElectrodeSpec};
use ti_core::error::{Result, TiError};
use ti_core::geometry::Point3;
use ti_core::mesh::TetMesh;
use ti_simulate::solver::{ForwardSolver, SolveRequest};

use crate::candidate::decode;
use crate::scalp::ScalpMask;

const CHANNEL_1_LABELS: [&str; 2] = ["flex-ch1-a", "flex-ch1-b"];
const CHANNEL_2_LABELS: [&str; 2] = ["flex-ch2-a", "flex-ch2-b"];

/// Everything one candidate evaluation needs, shared across the whole
/// optimizer run.
pub struct EvaluationContext<'a> {
    pub solver: &'a dyn ForwardSolver,
    pub mesh: &'a TetMesh,
    pub electrode_spec: &'a ElectrodeSpec,
    pub conductivity_profile: ConductivityProfile,
    pub scalp: &'a ScalpMask,
    /// One current amplitude per channel, in mA (spec §4.5 does not make
    /// current a decision variable — only electrode position is
    /// optimized).
    pub intensities_ma: [f64; 2],
    pub roi_nodes: &'a [usize],
    pub goal: Goal,
    pub timeout: Option<Duration>,
    /// Tally of evaluations that hit a `SolverFailure` and were scored as
    /// the worst possible cost instead of aborting the run (spec §7's
    /// "quality metric", surfaced by the caller once the run completes).
    pub solver_failures: &'a AtomicUsize,
}

/// Evaluates one flattened `2k`-length decision vector, returning the cost
/// the optimizer minimizes (the negated goal value, since every `Goal`
/// variant here is maximized). A `SolverFailure` from either channel is
/// not propagated: it is treated as the worst possible cost for this
/// evaluation and the search continues (spec §4.5 "Cancellation &
/// timeout").
pub fn evaluate(ctx: &EvaluationContext, params: &[f64]) -> Result<f64> {
    if ctx.roi_nodes.is_empty() {
        return Ok(f64::INFINITY);
    }

    let centers = decode(params);
    let positions: Vec<Point3> = centers.iter().map(|&(lambda, phi)| ctx.scalp.to_point(lambda, phi)).collect();
    if positions.len() < 4 {
        return Err(TiError::InvalidConfig { reason: format!("flex-search decision vector decodes to {} electrodes, need 4", positions.len()) });
    }

    let mut electrode_positions = HashMap::new();
    for (label, pos) in CHANNEL_1_LABELS.iter().zip(&positions[0..2]) {
        electrode_positions.insert(label.to_string(), *pos);
    }
    for (label, pos) in CHANNEL_2_LABELS.iter().zip(&positions[2..4]) {
        electrode_positions.insert(label.to_string(), *pos);
    }

    let ch1 = [
        ElectrodePlacement { label: CHANNEL_1_LABELS[0].to_string(), current_ma: ctx.intensities_ma[0] },
        ElectrodePlacement { label: CHANNEL_1_LABELS[1].to_string(), current_ma: -ctx.intensities_ma[0] },
    ];
    let ch2 = [
        ElectrodePlacement { label: CHANNEL_2_LABELS[0].to_string(), current_ma: ctx.intensities_ma[1] },
        ElectrodePlacement { label: CHANNEL_2_LABELS[1].to_string(), current_ma: -ctx.intensities_ma[1] },
    ];

    let req1 = SolveRequest { mesh: ctx.mesh, placements: &ch1, electrode_positions: &electrode_positions, electrode_spec: ctx.electrode_spec, conductivity_profile: ctx.conductivity_profile.clone() };
    let req2 = SolveRequest { mesh: ctx.mesh, placements: &ch2, electrode_positions: &electrode_positions, electrode_spec: ctx.electrode_spec, conductivity_profile: ctx.conductivity_profile.clone() };

    let out1 = match ctx.solver.solve(&req1, ctx.timeout) {
        Ok(out) => out,
        Err(TiError::SolverFailure { .. }) => {
            ctx.solver_failures.fetch_add(1, Ordering::Relaxed);
            return Ok(f64::INFINITY);
        }
        Err(e) => return Err(e),
    };
    let out2 = match ctx.solver.solve(&req2, ctx.timeout) {
        Ok(out) => out,
        Err(TiError::SolverFailure { .. }) => {
            ctx.solver_failures.fetch_add(1, Ordering::Relaxed);
            return Ok(f64::INFINITY);
        }
        Err(e) => return Err(e),
    };

    let len = out1.field.x.domain.len();
    let ti_values: Vec<f64> = (0..len)
        .map(|i| {
            let v1 = Point3::new(out1.field.x.values[i], out1.field.y.values[i], out1.field.z.values[i]);
            let v2 = Point3::new(out2.field.x.values[i], out2.field.y.values[i], out2.field.z.values[i]);
            ti_envelope_max(&v1, &v2)
        })
        .collect();

    let goal_value = if ctx.goal == Goal::RatioInVsOut {
        ratio_in_vs_out(&ti_values, ctx.roi_nodes)
    } else {
        let roi_values: Vec<f64> = ctx.roi_nodes.iter().map(|&i| ti_values[i]).collect();
        let weights = vec![1.0; roi_values.len()];
        let stats = weighted_stats(&roi_values, &weights);
        match ctx.goal {
            Goal::Mean => stats.mean,
            Goal::Median => stats.median,
            Goal::P99 => stats.p99,
            Goal::Focality => stats.focality_50,
            Goal::RatioInVsOut => unreachable!(),
        }
    };
    Ok(-goal_value)
}

fn ratio_in_vs_out(ti_values: &[f64], roi_nodes: &[usize]) -> f64 {
    let roi_set: std::collections::HashSet<usize> = roi_nodes.iter().copied().collect();
    let in_mean = roi_nodes.iter().map(|&i| ti_values[i]).sum::<f64>() / roi_nodes.len() as f64;
    let out_values: Vec<f64> = (0..ti_values.len()).filter(|i| !roi_set.contains(i)).map(|i| ti_values[i]).collect();
    if out_values.is_empty() {
        return f64::INFINITY;
    }
    let out_mean = out_values.iter().sum::<f64>() / out_values.len() as f64;
    if out_mean.abs() < 1e-12 {
        return f64::INFINITY;
    }
    in_mean / out_mean
}
