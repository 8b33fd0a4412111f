//! Per-candidate evaluation (spec §4.4 "Evaluation"): leadfield
//! superposition into a TI envelope field, then an ROI goal scalar.

use ti_algebra::ti_field::ti_envelope_max;
use ti_analyze::stats::{weighted_stats, Stats};
use ti_cache::Leadfield;
use ti_core::config::Goal;
use ti_core::error::Result;
use ti_core::field::FieldSample;
use ti_core::geometry::Point3;

use crate::candidate::Candidate;

/// The full per-node TI envelope magnitude field for `candidate` (spec
/// §4.4 steps 1-2): `E1 = (L[a]-L[b])*i1`, `E2 = (L[c]-L[d])*i2`, then the
/// closed-form envelope from `ti-algebra` at every node.
pub fn ti_field_for_candidate(leadfield: &Leadfield, candidate: &Candidate) -> Result<FieldSample> {
    let e1 = leadfield.channel_field(&candidate.a, candidate.current_1_ma, &candidate.b, -candidate.current_1_ma)?;
    let e2 = leadfield.channel_field(&candidate.c, candidate.current_2_ma, &candidate.d, -candidate.current_2_ma)?;

    let len = e1.x.domain.len();
    let values = (0..len)
        .map(|i| {
            let v1 = Point3::new(e1.x.values[i], e1.y.values[i], e1.z.values[i]);
            let v2 = Point3::new(e2.x.values[i], e2.y.values[i], e2.z.values[i]);
            ti_envelope_max(&v1, &v2)
        })
        .collect();
    FieldSample::new_nodal(e1.x.domain, values)
}

/// ROI statistics over `ti_field`, restricted to `roi_nodes`, uniformly
/// weighted (ex-search's ROI is a node set, not a volume-weighted element
/// set — see `roi_nodes`). An empty ROI is `Stats::empty`, matching the
/// analyzer's own empty-ROI sentinel convention.
pub fn roi_stats(ti_field: &FieldSample, roi_nodes: &[usize]) -> Stats {
    if roi_nodes.is_empty() {
        return Stats::empty();
    }
    let values: Vec<f64> = roi_nodes.iter().map(|&i| ti_field.values[i]).collect();
    let weights = vec![1.0; values.len()];
    weighted_stats(&values, &weights)
}

/// The scalar goal value ex-search ranks candidates by (spec §4.4 step 4).
/// An empty ROI ranks last regardless of goal, via `f64::NEG_INFINITY`.
pub fn goal_value(ti_field: &FieldSample, roi_nodes: &[usize], goal: Goal) -> f64 {
    if roi_nodes.is_empty() {
        return f64::NEG_INFINITY;
    }
    match goal {
        Goal::Mean => roi_stats(ti_field, roi_nodes).mean,
        Goal::Median => roi_stats(ti_field, roi_nodes).median,
        Goal::P99 => roi_stats(ti_field, roi_nodes).p99,
        // Focality as a maximization goal: the volume concentrated at or
        // above 50% of the ROI's 99.9th percentile, same threshold the
        // analyzer reports as `Stats::focality_50`.
        Goal::Focality => roi_stats(ti_field, roi_nodes).focality_50,
        Goal::RatioInVsOut => ratio_in_vs_out(ti_field, roi_nodes),
    }
}

fn ratio_in_vs_out(ti_field: &FieldSample, roi_nodes: &[usize]) -> f64 {
    let roi_set: std::collections::HashSet<usize> = roi_nodes.iter().copied().collect();
    let in_sum: f64 = roi_nodes.iter().map(|&i| ti_field.values[i]).sum();
    let in_mean = in_sum / roi_nodes.len() as f64;

    let out_values: Vec<f64> = (0..ti_field.values.len()).filter(|i| !roi_set.contains(i)).map(|i| ti_field.values[i]).collect();
    if out_values.is_empty() {
        return f64::INFINITY;
    }
    let out_mean = out_values.iter().sum::<f64>() / out_values.len() as f64;
    if out_mean.abs() < 1e-12 {
        return f64::INFINITY;
    }
    in_mean / out_mean
}
