//! # ti-exsearch
//!
//! Exhaustive montage search over a discrete four-electrode, current-ratio
//! grid: enumerate every candidate, evaluate its TI envelope field against
//! an ROI goal, and rank the results. Grounded in spirit on `volt-ledger`'s
//! framing of itself as the append-only record of what was tried and
//! decided — this crate builds the ledger `volt-ledger` only sketched.

pub mod candidate;
pub mod evaluate;
pub mod rank;
pub mod roi_nodes;
pub mod search;

pub use candidate::{current_ratio_grid, enumerate_candidates, Candidate, CandidateSpace};
pub use rank::{rank_candidates, write_ledger, RankedCandidate};
pub use roi_nodes::roi_node_indices;
pub use search::{search, SearchReport, SearchRequest};
