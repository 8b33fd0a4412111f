//! Unified error type for the TI-orchestrator workspace.
//!
//! All crates re-export [`TiError`] for consistent error handling, following
//! the same rule the teacher's workspace used for its own error enum: one
//! type, one place it is defined, everyone else re-exports it.
//!
//! # Example
//!
//! ```
//! use ti_core::TiError;
//!
//! fn example() -> Result<(), TiError> {
//!     Err(TiError::InvalidMontage { reason: "expected 2 channels, got 1".into() })
//! }
//!
//! let err = example().unwrap_err();
//! assert!(err.to_string().contains("2 channels"));
//! ```
#[derive(Debug, Clone, thiserror::Error)]
pub enum TiError {
    /// A configuration record contained an unknown or malformed option.
    #[error("invalid config: {reason}")]
    InvalidConfig {
        /// What was wrong with the configuration.
        reason: String,
    },

    /// A montage failed a structural check (channel count, unknown
    /// electrode, non-zero-sum currents).
    #[error("invalid montage: {reason}")]
    InvalidMontage {
        /// What was wrong with the montage.
        reason: String,
    },

    /// A requested conductivity tissue tag is not present in the subject
    /// model's segmentation.
    #[error("tissue tag {tag} not present in subject model")]
    TissueOutOfRange {
        /// The tissue tag that was requested.
        tag: u16,
    },

    /// An atlas region id or name was not present in the subject's atlas.
    #[error("unknown region '{region}' in atlas '{atlas}'")]
    UnknownRegion {
        /// The atlas that was queried.
        atlas: String,
        /// The region identifier that was not found.
        region: String,
    },

    /// A field and an ROI (or two fields being compared) were defined in
    /// incompatible coordinate spaces or against incompatible surfaces.
    #[error("space mismatch: {reason}")]
    SpaceMismatch {
        /// What was incompatible.
        reason: String,
    },

    /// A field array and the domain it is meant to be defined over have
    /// different lengths.
    #[error("shape mismatch: field has {field_len} entries, domain has {domain_len}")]
    ShapeMismatch {
        /// Length of the field array.
        field_len: usize,
        /// Length of the domain's primary array (nodes, elements, voxels).
        domain_len: usize,
    },

    /// The underlying forward solver failed, timed out, or produced no
    /// output.
    #[error("solver failure for {fingerprint}: {reason}")]
    SolverFailure {
        /// Identifies which solve failed (subject/net/candidate/channel).
        fingerprint: String,
        /// Free-text context from the solver.
        reason: String,
    },

    /// A leadfield build did not complete within the timeout window while
    /// another worker held the build lock.
    #[error("cache build timeout for fingerprint {fingerprint}")]
    CacheBuildTimeout {
        /// The fingerprint whose build timed out.
        fingerprint: String,
    },

    /// The on-disk cache file's embedded header does not match the
    /// fingerprint it was looked up under.
    #[error("cache header mismatch for fingerprint {fingerprint}: {reason}")]
    CacheCorrupt {
        /// The fingerprint that was requested.
        fingerprint: String,
        /// What was wrong with the stored header or payload.
        reason: String,
    },

    /// The output directory for a run already contains output and
    /// `overwrite` was not requested.
    #[error("output already exists at {path}")]
    OutputExists {
        /// The path that was not empty.
        path: String,
    },

    /// A cooperative cancel signal was delivered; carries the best partial
    /// result's fingerprint for logging, not the result itself (callers get
    /// the partial result through the normal return value).
    #[error("operation cancelled: {context}")]
    Cancelled {
        /// Free-text context describing what was in progress.
        context: String,
    },

    /// Malformed input file (CSV net table, `.msh` mesh, NIfTI volume).
    #[error("malformed {format} file: {reason}")]
    MalformedFile {
        /// The format that failed to parse (`"csv"`, `"msh"`, `"nifti"`).
        format: String,
        /// What was wrong with it.
        reason: String,
    },

    /// Wraps a lower-level I/O error with operation context.
    #[error("I/O error during {context}: {source_msg}")]
    Io {
        /// What was being attempted when the I/O error occurred.
        context: String,
        /// The underlying error, stringified (kept `Clone` by not storing
        /// [`std::io::Error`] directly).
        source_msg: String,
    },
}

impl TiError {
    /// Wraps a [`std::io::Error`] with a context string.
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        TiError::Io {
            context: context.into(),
            source_msg: source.to_string(),
        }
    }
}

/// Workspace-wide result alias.
pub type Result<T> = std::result::Result<T, TiError>;
