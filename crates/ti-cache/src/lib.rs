//! # ti-cache
//!
//! The leadfield cache (spec §4.3): on-disk, content-addressed storage for
//! the per-subject-per-net leadfield tensor, with single-builder-per-
//! fingerprint coalescing implemented as a filesystem advisory lock plus a
//! `.building` sentinel file, adapting the teacher's `volt-db` WAL framing
//! (embedded CRC32 header) to a single atomic artifact rather than a
//! stream of appended entries.

pub mod fingerprint;
pub mod format;
pub mod leadfield;

use std::fs;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

pub use fingerprint::Fingerprint;
pub use leadfield::Leadfield;

use ti_core::error::{Result, TiError};

const POLL_INTERVAL: Duration = Duration::from_millis(20);
const MAX_POLL_ATTEMPTS: u32 = 250; // ~5s ceiling while another process builds

/// Manages leadfield cache files under one base directory. One instance
/// per process is sufficient; the coalescing protocol is filesystem-level
/// so it works across processes too.
pub struct LeadfieldCache {
    base_dir: PathBuf,
}

impl LeadfieldCache {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        LeadfieldCache { base_dir: base_dir.into() }
    }

    /// Returns the cached leadfield for `fingerprint`, building it with
    /// `build` if absent. Concurrent callers (same process or not) with
    /// the same fingerprint coalesce onto a single build: the first to
    /// create the `.building` sentinel builds and writes the cache file;
    /// the rest poll until the file appears (or the sentinel vanishes
    /// without one appearing, in which case the poller retries becoming
    /// the builder).
    pub fn get<F>(&self, fingerprint: &Fingerprint, build: F) -> Result<Leadfield>
    where
        F: FnOnce() -> Result<Leadfield>,
    {
        fs::create_dir_all(&self.base_dir).map_err(|e| TiError::io("creating leadfield cache directory", e))?;

        let cache_path = self.cache_path(fingerprint);
        if let Some(lf) = self.try_read(fingerprint, &cache_path)? {
            return Ok(lf);
        }

        let sentinel_path = self.sentinel_path(fingerprint);
        let mut attempts = 0u32;

        loop {
            match fs::OpenOptions::new().write(true).create_new(true).open(&sentinel_path) {
                Ok(_handle) => {
                    return self.build_and_publish(fingerprint, &cache_path, &sentinel_path, build);
                }
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                    if let Some(lf) = self.try_read(fingerprint, &cache_path)? {
                        return Ok(lf);
                    }
                    attempts += 1;
                    if attempts > MAX_POLL_ATTEMPTS {
                        return Err(TiError::CacheBuildTimeout { fingerprint: fingerprint.file_name() });
                    }
                    thread::sleep(POLL_INTERVAL);
                }
                Err(e) => return Err(TiError::io("creating leadfield build sentinel", e)),
            }
        }
    }

    fn build_and_publish<F>(
        &self,
        fingerprint: &Fingerprint,
        cache_path: &Path,
        sentinel_path: &Path,
        build: F,
    ) -> Result<Leadfield>
    where
        F: FnOnce() -> Result<Leadfield>,
    {
        let outcome = build();
        let result = match outcome {
            Ok(leadfield) => {
                let bytes = format::write_cache_file(fingerprint, &leadfield);
                fs::write(cache_path, &bytes)
                    .map(|()| leadfield)
                    .map_err(|e| TiError::io("writing leadfield cache file", e))
            }
            Err(e) => Err(e),
        };
        let _ = fs::remove_file(sentinel_path);
        result
    }

    /// Reads a cache file via a read-only memory map rather than copying
    /// the whole tensor into a heap buffer first — leadfields are dense
    /// `electrode_count * node_count * 3` arrays of `f64` and can reach
    /// hundreds of megabytes for a high-density net on a fine mesh.
    fn try_read(&self, fingerprint: &Fingerprint, path: &Path) -> Result<Option<Leadfield>> {
        let file = match fs::File::open(path) {
            Ok(f) => f,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(TiError::io("opening leadfield cache file", e)),
        };
        // SAFETY: the cache directory is private to this process/host and
        // nothing else truncates a published cache file; read-only maps
        // cannot be a write-race source even if that assumption slips.
        let mmap = unsafe { memmap2::Mmap::map(&file) }.map_err(|e| TiError::io("memory-mapping leadfield cache file", e))?;
        Ok(Some(format::read_cache_file(fingerprint, &mmap[..])?))
    }

    fn cache_path(&self, fingerprint: &Fingerprint) -> PathBuf {
        self.base_dir.join(fingerprint.file_name())
    }

    fn sentinel_path(&self, fingerprint: &Fingerprint) -> PathBuf {
        self.base_dir.join(format!("{}.building", fingerprint.file_name()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use ti_core::field::{Domain, FieldSample};
    use ti_core::simulation::VectorField;

    fn fingerprint() -> Fingerprint {
        Fingerprint {
            subject_id: "sub-01".into(),
            net_name: "net".into(),
            solver_version: "mock-1".into(),
            electrode_convention_version: "v1".into(),
            reference_electrode: "Pz".into(),
        }
    }

    fn fake_leadfield() -> Leadfield {
        let domain = Domain::Mesh { len: 2 };
        let row = || VectorField {
            x: FieldSample::new_nodal(domain, vec![1.0, 2.0]).unwrap(),
            y: FieldSample::new_nodal(domain, vec![0.0, 0.0]).unwrap(),
            z: FieldSample::new_nodal(domain, vec![0.0, 0.0]).unwrap(),
        };
        Leadfield { electrode_labels: vec!["Fz".into(), "Pz".into()], rows: vec![row(), row()], domain }
    }

    #[test]
    fn first_get_builds_and_caches() {
        let dir = tempfile::tempdir().unwrap();
        let cache = LeadfieldCache::new(dir.path());
        let fp = fingerprint();
        let build_count = Arc::new(AtomicUsize::new(0));

        let bc = build_count.clone();
        let lf = cache
            .get(&fp, || {
                bc.fetch_add(1, Ordering::SeqCst);
                Ok(fake_leadfield())
            })
            .unwrap();
        assert_eq!(lf.electrode_labels.len(), 2);
        assert_eq!(build_count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn second_get_reads_cache_without_rebuilding() {
        let dir = tempfile::tempdir().unwrap();
        let cache = LeadfieldCache::new(dir.path());
        let fp = fingerprint();
        let build_count = Arc::new(AtomicUsize::new(0));

        for _ in 0..2 {
            let bc = build_count.clone();
            cache
                .get(&fp, || {
                    bc.fetch_add(1, Ordering::SeqCst);
                    Ok(fake_leadfield())
                })
                .unwrap();
        }
        assert_eq!(build_count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn build_failure_removes_sentinel_so_retry_can_proceed() {
        let dir = tempfile::tempdir().unwrap();
        let cache = LeadfieldCache::new(dir.path());
        let fp = fingerprint();

        let first = cache.get(&fp, || Err(TiError::SolverFailure { fingerprint: "x".into(), reason: "boom".into() }));
        assert!(first.is_err());

        let second = cache.get(&fp, || Ok(fake_leadfield()));
        assert!(second.is_ok());
    }

    #[test]
    fn concurrent_gets_coalesce_onto_one_builder() {
        let dir = tempfile::tempdir().unwrap();
        let cache = Arc::new(LeadfieldCache::new(dir.path()));
        let fp = Arc::new(fingerprint());
        let build_count = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let cache = cache.clone();
                let fp = fp.clone();
                let bc = build_count.clone();
                thread::spawn(move || {
                    cache.get(&fp, || {
                        bc.fetch_add(1, Ordering::SeqCst);
                        thread::sleep(Duration::from_millis(50));
                        Ok(fake_leadfield())
                    })
                })
            })
            .collect();

        for h in handles {
            assert!(h.join().unwrap().is_ok());
        }
        assert_eq!(build_count.load(Ordering::SeqCst), 1);
    }
}
