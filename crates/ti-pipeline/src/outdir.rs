//! Scoped output-directory acquisition with a `.building` sentinel file,
//! mirroring `ti_cache::LeadfieldCache`'s single-writer coalescing
//! protocol but for the ex-search and flex-search run directories, which
//! are never shared across fingerprints the way a leadfield cache entry
//! is — one writer, one directory, crash-recoverable rather than
//! coalescing.
//!
//! A directory left with a `.building` sentinel and no completion marker
//! is the on-disk signature of a run that crashed mid-write; the next
//! caller sees it via [`OutputDir::acquire`]'s `overwrite` path rather
//! than silently treating stale partial output as done.

use std::fs;
use std::path::{Path, PathBuf};

use ti_core::error::{Result, TiError};

const SENTINEL_NAME: &str = ".building";
const DONE_NAME: &str = ".done";

/// A claimed output directory. Call [`OutputDir::complete`] once every
/// file has been written; if this value is dropped without completing,
/// the `.building` sentinel is left behind as a crash marker.
#[derive(Debug)]
pub struct OutputDir {
    path: PathBuf,
    completed: bool,
}

impl OutputDir {
    /// Creates `path` (and its parents) and claims it with a `.building`
    /// sentinel. If `path` already holds a `.done` marker from a prior
    /// run, this fails with `OutputExists` unless `overwrite` is set, in
    /// which case the prior contents are cleared before re-claiming.
    pub fn acquire(path: &Path, overwrite: bool) -> Result<Self> {
        let done_marker = path.join(DONE_NAME);
        if done_marker.exists() {
            if !overwrite {
                return Err(TiError::OutputExists { path: path.display().to_string() });
            }
            fs::remove_dir_all(path).map_err(|e| TiError::io("clearing existing output directory", e))?;
        }
        fs::create_dir_all(path).map_err(|e| TiError::io("creating output directory", e))?;
        fs::write(path.join(SENTINEL_NAME), b"").map_err(|e| TiError::io("writing output directory sentinel", e))?;
        Ok(OutputDir { path: path.to_path_buf(), completed: false })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Marks this directory's contents as complete: removes the
    /// `.building` sentinel and writes a `.done` marker so a later
    /// `acquire` call can tell this run actually finished.
    pub fn complete(mut self) -> Result<()> {
        fs::write(self.path.join(DONE_NAME), b"").map_err(|e| TiError::io("writing output directory completion marker", e))?;
        let _ = fs::remove_file(self.path.join(SENTINEL_NAME));
        self.completed = true;
        Ok(())
    }
}

impl Drop for OutputDir {
    fn drop(&mut self) {
        if !self.completed {
            tracing::warn!(path = %self.path.display(), "output directory dropped without completing; .building sentinel left for crash recovery");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn acquire_creates_directory_and_sentinel() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("run-1");
        let out = OutputDir::acquire(&target, false).unwrap();
        assert!(target.join(SENTINEL_NAME).exists());
        out.complete().unwrap();
        assert!(target.join(DONE_NAME).exists());
        assert!(!target.join(SENTINEL_NAME).exists());
    }

    #[test]
    fn acquire_without_overwrite_rejects_a_completed_directory() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("run-1");
        OutputDir::acquire(&target, false).unwrap().complete().unwrap();

        let err = OutputDir::acquire(&target, false).unwrap_err();
        assert!(matches!(err, TiError::OutputExists { .. }));
    }

    #[test]
    fn acquire_with_overwrite_clears_a_completed_directory() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("run-1");
        OutputDir::acquire(&target, false).unwrap().complete().unwrap();
        fs::write(target.join("stale.csv"), b"x").unwrap();

        let out = OutputDir::acquire(&target, true).unwrap();
        assert!(!target.join("stale.csv").exists());
        out.complete().unwrap();
    }

    #[test]
    fn dropping_without_completing_leaves_the_sentinel() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("run-1");
        {
            let _out = OutputDir::acquire(&target, false).unwrap();
        }
        assert!(target.join(SENTINEL_NAME).exists());
        assert!(!target.join(DONE_NAME).exists());
    }
}
