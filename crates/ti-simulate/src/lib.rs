//! # ti-simulate
//!
//! The TI forward simulator (spec §4.1): drives one montage through a
//! state machine from input validation to written output, delegating the
//! actual field solve to a pluggable [`solver::ForwardSolver`].
//!
//! - [`run::run`] — the public entry point.
//! - [`state`] — the per-run state machine.
//! - [`solver`] — the forward-solver trait, timeout enforcement, and the
//!   mock analytical solver used in the absence of a real FE backend.
//! - [`post`] — TI-envelope derivation from two channels' E-fields.
//! - [`interpolate`] — nodal-field-to-voxel-grid resampling.
//! - [`output`] — `.msh`/NIfTI output writing.

pub mod interpolate;
pub mod output;
pub mod post;
pub mod run;
pub mod solver;
pub mod state;

pub use run::{run, OutputPaths};
pub use solver::{ForwardSolver, MockAnalyticalSolver, SolveOutput, SolveRequest};
