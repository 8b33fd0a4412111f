//! The configuration record accepted by a pipeline run (spec §6).
//!
//! `RunConfig` is plain data: validation beyond what `serde` itself
//! enforces (unknown fields) lives in `ti-guard`, which can see across
//! fields and knows about the search ceilings that are policy, not shape.

use crate::electrode::{ElectrodeShape, ElectrodeSpec};
use crate::geometry::CoordinateSpace;

/// Conductivity assignment strategy passed to the forward solver.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ConductivityProfile {
    /// Isotropic conductivity per tissue tag.
    Scalar,
    /// Anisotropic conductivity, as supported by the underlying FE
    /// library; the tensor data itself is opaque to the core and passed
    /// through to the solver.
    Anisotropic,
}

/// The search objective shared by ex-search and flex-search (spec §4.4,
/// §4.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Goal {
    Mean,
    Median,
    P99,
    Focality,
    RatioInVsOut,
}

/// Control set for the flex-search global optimizer (spec §4.5).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OptimizerSettings {
    pub population_size: usize,
    pub max_iterations: usize,
    pub recombination_rate: f64,
    /// Mutation range (differential-evolution scale factor lower/upper
    /// bound); a single value means a fixed mutation scalar.
    pub mutation_range: (f64, f64),
    pub convergence_tolerance: f64,
    /// Random seed; `None` means nondeterministic.
    pub seed: Option<u64>,
}

impl Default for OptimizerSettings {
    fn default() -> Self {
        OptimizerSettings {
            population_size: 32,
            max_iterations: 100,
            recombination_rate: 0.7,
            mutation_range: (0.5, 1.0),
            convergence_tolerance: 1e-6,
            seed: None,
        }
    }
}

/// The full per-run configuration record (spec §6 table). Deserializing
/// this with `serde_json`/similar and `#[serde(deny_unknown_fields)]`
/// rejects unrecognized options at parse time, matching §6's
/// "unknown options cause `InvalidConfig`".
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(deny_unknown_fields))]
pub struct RunConfig {
    pub conductivity_profile: ConductivityProfile,
    /// Amplitude of each channel's current, in mA.
    pub intensities_ma: [f64; 2],
    pub electrode_shape: ElectrodeShape,
    pub electrode_dimensions_mm: (f64, f64),
    pub electrode_thickness_mm: f64,
    pub eeg_net: String,
    pub goal: Goal,
    pub top_k: usize,
    pub current_step_ma: f64,
    pub current_total_ma: f64,
    pub optimizer_settings: OptimizerSettings,
    pub coordinate_space: CoordinateSpace,
    pub overwrite: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        RunConfig {
            conductivity_profile: ConductivityProfile::Scalar,
            intensities_ma: [2.0, 2.0],
            electrode_shape: ElectrodeShape::Rectangular,
            electrode_dimensions_mm: (2.0, 2.0),
            electrode_thickness_mm: 4.0,
            eeg_net: "EEG10-20_Okamoto_2004.csv".to_string(),
            goal: Goal::Mean,
            top_k: 10,
            current_step_ma: 0.5,
            current_total_ma: 2.0,
            optimizer_settings: OptimizerSettings::default(),
            coordinate_space: CoordinateSpace::Subject,
            overwrite: false,
        }
    }
}

impl RunConfig {
    pub fn electrode_spec(&self) -> ElectrodeSpec {
        ElectrodeSpec {
            shape: self.electrode_shape,
            dimensions_mm: self.electrode_dimensions_mm,
            thickness_mm: self.electrode_thickness_mm,
            conductivity: 0.3, // S/m, typical scalp-gel conductivity
        }
    }
}
