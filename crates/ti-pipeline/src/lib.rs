//! # ti-pipeline
//!
//! The orchestration layer (spec §6): wires `ti-simulate`, `ti-exsearch`,
//! and `ti-flexsearch` to the BIDS-flavored derivatives tree. Every
//! public entry point takes a [`context::RunContext`] explicitly — there
//! is no environment-variable global state anywhere in this crate (spec
//! §9), and no CLI: wiring a command-line front end onto these entry
//! points is out of scope.
//!
//! - [`context::RunContext`] — the per-run bundle threaded through every
//!   entry point.
//! - [`paths`] — pure path construction for the derivatives tree.
//! - [`outdir::OutputDir`] — scoped output-directory acquisition with a
//!   crash-recovery sentinel.
//! - [`leadfield::build_leadfield`] — assembles a full leadfield tensor
//!   from a [`ti_simulate::solver::ForwardSolver`].
//! - [`simulation::run_simulation`], [`exsearch::run_exsearch`],
//!   [`flexsearch::run_flexsearch`] — the three top-level operations.

pub mod analyses;
pub mod context;
pub mod exsearch;
pub mod flexsearch;
pub mod leadfield;
pub mod outdir;
pub mod paths;
pub mod simulation;

pub use context::RunContext;
pub use exsearch::run_exsearch;
pub use flexsearch::run_flexsearch;
pub use outdir::OutputDir;
pub use simulation::run_simulation;
