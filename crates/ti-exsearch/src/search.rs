//! The ex-search entry point (spec §4.4 "Complexity & guardrails",
//! "Ranking & output"): sizes the search space, enforces the
//! configured ceiling, evaluates every candidate (in parallel — each
//! worker only reads the shared leadfield and writes its own stack-local
//! result, so no output buffer is shared across candidates), and returns
//! the top-K ranked.

use std::collections::HashMap;

use rayon::prelude::*;

use ti_cache::Leadfield;
use ti_core::atlas::Atlas;
use ti_core::config::Goal;
use ti_core::error::Result;
use ti_core::field::FieldSample;
use ti_core::geometry::Affine;
use ti_core::mesh::TetMesh;
use ti_core::roi::Roi;
use ti_guard::cancel::CancelToken;
use ti_guard::combinatorial::{candidate_count, enforce_ceiling};

use crate::candidate::{current_ratio_grid, enumerate_candidates, Candidate, CandidateSpace};
use crate::evaluate::{goal_value, roi_stats, ti_field_for_candidate};
use crate::rank::{rank_candidates, RankedCandidate};
use crate::roi_nodes::roi_node_indices;

/// Everything one ex-search call needs: the montage search space, where
/// to look for signal (ROI), how to score a candidate (goal), how many to
/// keep (top_k), and the guardrail ceiling on combinatorial size.
pub struct SearchRequest<'a> {
    pub leadfield: &'a Leadfield,
    pub mesh: &'a TetMesh,
    pub subject_to_mni: &'a Affine,
    pub atlases: &'a HashMap<String, Atlas>,
    pub roi: &'a Roi,
    pub space: CandidateSpace,
    pub goal: Goal,
    pub top_k: usize,
    /// `None` means no ceiling (spec §4.4 "the core surfaces the count;
    /// enforcement is at the boundary" — a caller that wants no
    /// enforcement passes `None` here explicitly).
    pub ceiling: Option<u64>,
    pub ceiling_confirmed: bool,
}

/// The search's ranked output plus the quality metric spec §7's
/// propagation policy asks every search to surface: how many candidates
/// hit a per-evaluation error (an unknown electrode label, most likely)
/// and were dropped rather than aborting the whole search.
#[derive(Debug, Clone)]
pub struct SearchReport {
    pub ranked: Vec<RankedCandidate>,
    pub failed_evaluations: usize,
}

/// Runs the full search: enumerate, size-check, evaluate every candidate
/// (skipping any still unevaluated once `cancel` fires — spec §5
/// "checked ... between ex-search candidates"), rank, and truncate to
/// `request.top_k`.
pub fn search(request: &SearchRequest, cancel: &CancelToken) -> Result<SearchReport> {
    let roi_nodes = roi_node_indices(request.roi, request.mesh, request.subject_to_mni, request.atlases)?;

    let ratio_count = current_ratio_grid(request.space.current_total_ma, request.space.current_step_ma).len();
    let actual_count = candidate_count(
        request.space.list_1a.len(),
        request.space.list_1b.len(),
        request.space.list_2a.len(),
        request.space.list_2b.len(),
        ratio_count,
    );
    enforce_ceiling(actual_count, request.ceiling, request.ceiling_confirmed)?;

    let candidates = enumerate_candidates(&request.space);

    let evaluated: Vec<Result<(Candidate, f64, FieldSample, ti_analyze::stats::Stats)>> = candidates
        .into_par_iter()
        .filter(|_| !cancel.is_cancelled())
        .map(|candidate| {
            let field = ti_field_for_candidate(request.leadfield, &candidate)?;
            let goal = goal_value(&field, &roi_nodes, request.goal);
            let stats = roi_stats(&field, &roi_nodes);
            Ok((candidate, goal, field, stats))
        })
        .collect();

    let failed_evaluations = evaluated.iter().filter(|r| r.is_err()).count();
    let ok: Vec<_> = evaluated.into_iter().filter_map(std::result::Result::ok).collect();

    let mut ranked = rank_candidates(ok);
    ranked.truncate(request.top_k);
    Ok(SearchReport { ranked, failed_evaluations })
}
