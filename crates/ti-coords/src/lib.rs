//! # ti-coords
//!
//! Cross-cutting coordinate-space plumbing (spec §4.6): ROI resolution to
//! a concrete index set, subject<->MNI coordinate conversion, and the
//! balanced linear assignment used by flex-search's net-mapping post-step.

pub mod assignment;
pub mod convert;
pub mod resolve;

pub use resolve::{resolve, resolve_mesh, resolve_voxel, ResolveTarget, RoiMask};
