//! Top-level ex-search entry point: resolves or builds the leadfield
//! cache entry, enumerates the discrete candidate grid, ranks the results,
//! and writes the ledger CSV (spec §4.3, §4.4, §6).

use std::fs::File;

use ti_cache::{Fingerprint, LeadfieldCache};
use ti_core::error::{Result, TiError};
use ti_core::roi::Roi;
use ti_exsearch::{search, CandidateSpace, SearchReport, SearchRequest};

use crate::context::RunContext;
use crate::leadfield::build_leadfield;
use crate::outdir::OutputDir;
use crate::paths;

/// Runs one ex-search: builds (or reuses) the leadfield for
/// `ctx.net_name()`, evaluates every candidate in `space` against `roi`,
/// and writes the ranked ledger under `ex-search/<session>/...`.
pub fn run_exsearch(ctx: &RunContext, roi: &Roi, space: CandidateSpace, session: &str) -> Result<SearchReport> {
    let subject_dir = paths::subject_dir(ctx.project_root, &ctx.head.subject_id);
    let net = ctx
        .head
        .net(ctx.net_name())
        .ok_or_else(|| TiError::InvalidConfig { reason: format!("net '{}' not found on subject '{}'", ctx.net_name(), ctx.head.subject_id) })?;

    let fingerprint = Fingerprint {
        subject_id: ctx.head.subject_id.clone(),
        net_name: ctx.net_name().to_string(),
        solver_version: ctx.solver_version.to_string(),
        electrode_convention_version: ctx.electrode_convention_version.to_string(),
        reference_electrode: ctx.reference_electrode.to_string(),
    };
    let electrode_spec = ctx.config.electrode_spec();
    let cache = LeadfieldCache::new(paths::leadfield_cache_dir(&subject_dir, ctx.net_name()));
    let leadfield = cache.get(&fingerprint, || {
        build_leadfield(&ctx.head.mesh, net, &electrode_spec, ctx.config.conductivity_profile.clone(), ctx.solver, ctx.reference_electrode, ctx.solver_timeout)
    })?;

    let request = SearchRequest {
        leadfield: &leadfield,
        mesh: &ctx.head.mesh,
        subject_to_mni: &ctx.head.subject_to_mni,
        atlases: &ctx.head.atlases,
        roi,
        space,
        goal: ctx.config.goal,
        top_k: ctx.config.top_k,
        ceiling: ctx.ceiling,
        ceiling_confirmed: ctx.ceiling_confirmed,
    };
    let report = search(&request, ctx.cancel)?;

    let run_dir = paths::exsearch_dir(&subject_dir, session, roi);
    let out = OutputDir::acquire(&run_dir, ctx.config.overwrite)?;
    let mut file = File::create(run_dir.join("ledger.csv")).map_err(|e| TiError::io("creating ex-search ledger file", e))?;
    ti_exsearch::write_ledger(&mut file, &report.ranked)?;
    out.complete()?;

    Ok(report)
}
