//! # ti-analyze
//!
//! The field analyzer (spec §4.2): fixed, reproducible ROI statistics over
//! a scalar field, for both the sphere/atlas ROI kinds and the mesh/voxel
//! domains. ROI resolution itself lives in `ti-coords`; this crate only
//! aggregates values once a mask is known.
//!
//! - [`mesh`] — `analyze_spherical`/`analyze_atlas`/`analyze_whole_head`
//!   over a [`ti_core::mesh::TetMesh`], volume-weighted.
//! - [`voxel`] — the same three operations over a
//!   [`ti_core::voxel::VoxelGrid`], uniformly weighted.
//! - [`stats`] — the [`stats::Stats`] schema and its weighted aggregation.
//!
//! A [`ti_core::field::DirectionalField`]'s surface tag must be checked
//! with [`ti_core::field::DirectionalField::assert_same_surface`] by any
//! caller that pools statistics across two directional outputs (e.g. a
//! report comparing `TI_normal` across two montages) — that check lives on
//! the type itself, not duplicated here.

pub mod mesh;
pub mod stats;
pub mod voxel;

pub use stats::Stats;
