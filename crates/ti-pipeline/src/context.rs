//! The per-run context threaded through every entry point (spec §9's
//! re-architecture note: no environment-variable global state). Grounded
//! on `volt-server::state::AppState`, which plays the same role for the
//! Axum handlers — one struct bundling everything a request needs,
//! passed by reference instead of read from ambient state.

use std::time::Duration;

use ti_core::config::RunConfig;
use ti_core::subject::HeadModel;
use ti_guard::cancel::CancelToken;
use ti_simulate::solver::ForwardSolver;

/// Everything one pipeline call needs, gathered in one place so no
/// operation reaches for a global, a clock, or an environment variable.
pub struct RunContext<'a> {
    /// Root of the BIDS-flavored project tree (spec §6): paths are built
    /// under `<project_root>/derivatives/SimNIBS/...`.
    pub project_root: &'a std::path::Path,
    pub head: &'a HeadModel,
    pub config: &'a RunConfig,
    pub solver: &'a dyn ForwardSolver,
    pub solver_timeout: Option<Duration>,
    pub cancel: &'a CancelToken,
    /// Electrode used as the leadfield reference row (spec §4.3): its
    /// solved field is all zero by construction and every other row is
    /// reported relative to it.
    pub reference_electrode: &'a str,
    /// Tag distinguishing leadfields built with a different solver
    /// version or electrode convention (spec §4.3 fingerprint fields).
    pub solver_version: &'a str,
    pub electrode_convention_version: &'a str,
    /// Upper bound on the number of candidates an ex-search may enumerate
    /// before it must be explicitly confirmed (spec §4.4 "Combinatorial
    /// ceiling"). `None` means no ceiling is enforced.
    pub ceiling: Option<u64>,
    pub ceiling_confirmed: bool,
    /// Timestamp used for log/documentation file names (spec §4.1.1: core
    /// logic never reads the system clock itself, so the caller supplies
    /// one string used everywhere a run needs to be timestamped).
    pub run_timestamp: &'a str,
}

impl RunContext<'_> {
    /// The net name as used both for file/directory naming and as the key
    /// into `head.nets` — `ti-core::net` and `ti-simulate::run` key nets
    /// by this same string, so no separate "file stem" ever has to be
    /// derived from it.
    pub fn net_name(&self) -> &str {
        &self.config.eeg_net
    }
}
