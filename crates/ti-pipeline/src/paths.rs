//! Deterministic construction of the BIDS-flavored derivatives tree
//! (spec §6), as pure functions of a subject id, a simulation/session
//! name, and whatever tag identifies the thing being written. None of
//! these functions touch the filesystem; [`crate::outdir`] owns creating
//! directories.
//!
//! ```text
//! <project>/derivatives/SimNIBS/sub-<id>/
//!   m2m_<id>/eeg_positions/<net>.csv
//!   Simulations/<sim_name>/TI/mesh/*.msh
//!   Simulations/<sim_name>/TI/niftis/{subject,mni}/*.nii
//!   Simulations/<sim_name>/Analyses/{Mesh,Voxel}/<roi_tag>/*.csv
//!   leadfields/leadfield_vol_<net>/
//!   ex-search/<session>/xyz_<x>_<y>_<z>/
//!   flex-search/<session>/
//! ```

use std::path::PathBuf;

use ti_core::geometry::Point3;
use ti_core::roi::Roi;
use ti_simulate::OutputPaths;

/// `derivatives/SimNIBS/sub-<id>` under the project root.
pub fn subject_dir(project_root: &std::path::Path, subject_id: &str) -> PathBuf {
    project_root.join("derivatives").join("SimNIBS").join(format!("sub-{subject_id}"))
}

/// `m2m_<id>/eeg_positions/<net>.csv` — the net's electrode coordinate
/// table (spec §6's m2m folder, read by `ti_core::net::ElectrodeNet::from_csv`).
pub fn eeg_positions_csv(subject_dir: &std::path::Path, subject_id: &str, net: &str) -> PathBuf {
    subject_dir.join(format!("m2m_{subject_id}")).join("eeg_positions").join(format!("{net}.csv"))
}

fn simulation_dir(subject_dir: &std::path::Path, sim_name: &str) -> PathBuf {
    subject_dir.join("Simulations").join(sim_name)
}

/// Every path `ti_simulate::run::run` writes to, for one montage run
/// named `sim_name`.
pub fn simulation_output_paths(subject_dir: &std::path::Path, subject_id: &str, sim_name: &str) -> OutputPaths {
    let sim_dir = simulation_dir(subject_dir, sim_name);
    let mesh_dir = sim_dir.join("TI").join("mesh");
    let niftis_dir = sim_dir.join("TI").join("niftis");
    OutputPaths {
        mesh_full: mesh_dir.join("TI.msh"),
        mesh_grey_matter: mesh_dir.join("TI_grey.msh"),
        subject_voxel_dir: niftis_dir.join("subject"),
        subject_voxel_prefix: format!("sub-{subject_id}"),
        mni_voxel_dir: niftis_dir.join("mni"),
        mni_voxel_prefix: format!("sub-{subject_id}"),
    }
}

/// `Simulations/<sim_name>/Analyses/{Mesh,Voxel}/<roi_tag>/<file>.csv`.
pub fn analysis_csv(subject_dir: &std::path::Path, sim_name: &str, space: AnalysisSpace, roi_tag: &str, file_stem: &str) -> PathBuf {
    let kind = match space {
        AnalysisSpace::Mesh => "Mesh",
        AnalysisSpace::Voxel => "Voxel",
    };
    simulation_dir(subject_dir, sim_name).join("Analyses").join(kind).join(roi_tag).join(format!("{file_stem}.csv"))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisSpace {
    Mesh,
    Voxel,
}

/// `leadfields/leadfield_vol_<net>/` — the base directory handed to
/// `ti_cache::LeadfieldCache::new`.
pub fn leadfield_cache_dir(subject_dir: &std::path::Path, net: &str) -> PathBuf {
    subject_dir.join("leadfields").join(format!("leadfield_vol_{net}"))
}

/// `ex-search/<session>/xyz_<x>_<y>_<z>/` — the ledger location for one
/// ex-search run, keyed by the rounded-integer ROI center per spec §6.
/// An atlas-region ROI has no center, so it falls back to the same
/// `region_<name>` tag used under `Analyses/`.
pub fn exsearch_dir(subject_dir: &std::path::Path, session: &str, roi: &Roi) -> PathBuf {
    let tag = match roi {
        Roi::Sphere { center, .. } => format!("xyz_{}_{}_{}", center.x.round() as i64, center.y.round() as i64, center.z.round() as i64),
        Roi::Atlas { region, .. } => format!("region_{region}"),
    };
    subject_dir.join("ex-search").join(session).join(tag)
}

/// `flex-search/<session>/`.
pub fn flexsearch_dir(subject_dir: &std::path::Path, session: &str) -> PathBuf {
    subject_dir.join("flex-search").join(session)
}

/// Encodes a [`Roi`] into the directory tag used under `Analyses/`
/// (spec §6: `sphere_x<X>_y<Y>_z<Z>_r<R>`, `region_<name>`,
/// `whole_head_<atlas>`). Sphere coordinates are rounded to the nearest
/// integer millimeter; `region` is not an atlas-wide selector, so an
/// atlas ROI never produces the `whole_head_` form on its own — callers
/// needing a whole-head tag use [`whole_head_tag`] directly.
pub fn roi_tag(roi: &Roi) -> String {
    match roi {
        Roi::Sphere { center, radius_mm, .. } => format!(
            "sphere_x{}_y{}_z{}_r{}",
            center.x.round() as i64,
            center.y.round() as i64,
            center.z.round() as i64,
            radius_mm.round() as i64
        ),
        Roi::Atlas { region, .. } => format!("region_{region}"),
    }
}

/// The whole-head analysis tag (spec §6: `whole_head_<atlas>`), for the
/// one analysis kind that is not ROI-scoped.
pub fn whole_head_tag(atlas: &str) -> String {
    format!("whole_head_{atlas}")
}
