//! # ti-flexsearch
//!
//! Continuous electrode-position optimization: map a `(lambda, phi)`
//! scalp parameterization through the FE solver, drive differential
//! evolution to maximize an ROI goal, then snap the optimum onto a
//! net's discrete electrodes. Grounded on `volt-learn`'s
//! population/iteration-loop shape, repurposed from policy-gradient
//! training to derivative-free search.

pub mod candidate;
pub mod evaluate;
pub mod optimize;
pub mod roi;
pub mod scalp;
pub mod search;

pub use candidate::ELECTRODE_COUNT;
pub use optimize::{differential_evolution, OptimizeResult};
pub use scalp::ScalpMask;
pub use search::{search, FlexSearchRequest, FlexSearchResult};
