//! Ex-search candidate enumeration (spec §4.4 "Input parameterization"):
//! the four-electrode quadruple and current-ratio grid that together
//! define the montage search space.

use std::collections::HashSet;

/// One candidate montage: which electrode plays each of the four roles,
/// and how the total current is split between the two channels.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub a: String,
    pub b: String,
    pub c: String,
    pub d: String,
    pub current_1_ma: f64,
    pub current_2_ma: f64,
}

/// The four electrode lists (possibly equal to one another) and
/// current-ratio grid parameters defining a search space (spec §4.4).
#[derive(Debug, Clone)]
pub struct CandidateSpace {
    pub list_1a: Vec<String>,
    pub list_1b: Vec<String>,
    pub list_2a: Vec<String>,
    pub list_2b: Vec<String>,
    pub current_total_ma: f64,
    pub current_step_ma: f64,
    /// Drop candidates that are a permutation-equivalent duplicate of one
    /// already enumerated (spec §4.4 "Optional symmetry breaking").
    pub break_symmetry: bool,
}

/// Generates the `(i1, i2)` current-ratio grid: `i1` ranges over
/// `current_step_ma ..= current_total_ma - current_step_ma` in steps of
/// `current_step_ma`, with `i2 = current_total_ma - i1`. Empty when no
/// step lands strictly between the two endpoints.
pub fn current_ratio_grid(current_total_ma: f64, current_step_ma: f64) -> Vec<(f64, f64)> {
    if current_step_ma <= 0.0 || current_total_ma <= 0.0 || !current_step_ma.is_finite() || !current_total_ma.is_finite() {
        return Vec::new();
    }
    let steps = (current_total_ma / current_step_ma).floor() as i64;
    let mut grid = Vec::new();
    for n in 1..steps {
        let i1 = current_step_ma * n as f64;
        let i2 = current_total_ma - i1;
        if i1 >= current_step_ma - 1e-9 && i2 >= current_step_ma - 1e-9 {
            grid.push((i1, i2));
        }
    }
    grid
}

/// Enumerates every `(a, b, c, d, i1, i2)` candidate over `space`'s four
/// lists and current-ratio grid, skipping any quadruple that does not name
/// 4 pairwise-distinct electrodes (spec §3: electrode indices within a
/// candidate are pairwise distinct) and, if `space.break_symmetry`,
/// candidates that are a channel-swapped duplicate of one already
/// produced. The four lists are allowed to overlap or be identical (spec
/// §4.4), so this check is not just the within-channel `a == b` / `c == d`
/// case — it also rejects `a == c`, `a == d`, `b == c`, and `b == d`,
/// which would reuse one electrode across both channels. Enumeration
/// order is deterministic (nested iteration over the input lists and
/// ratio grid in order), which is what makes downstream tie-breaking on
/// "already seen" deterministic too.
pub fn enumerate_candidates(space: &CandidateSpace) -> Vec<Candidate> {
    let ratios = current_ratio_grid(space.current_total_ma, space.current_step_ma);
    let mut seen = HashSet::new();
    let mut out = Vec::new();

    for a in &space.list_1a {
        for b in &space.list_1b {
            for c in &space.list_2a {
                for d in &space.list_2b {
                    if !all_distinct(a, b, c, d) {
                        continue;
                    }
                    for &(i1, i2) in &ratios {
                        let candidate =
                            Candidate { a: a.clone(), b: b.clone(), c: c.clone(), d: d.clone(), current_1_ma: i1, current_2_ma: i2 };
                        if space.break_symmetry && !seen.insert(canonical_key(&candidate)) {
                            continue;
                        }
                        out.push(candidate);
                    }
                }
            }
        }
    }
    out
}

/// True iff `a`, `b`, `c`, `d` are all pairwise distinct.
fn all_distinct(a: &str, b: &str, c: &str, d: &str) -> bool {
    a != b && a != c && a != d && b != c && b != d && c != d
}

/// A key that is identical for a candidate and its channel-swapped twin
/// (`(a,b,c,d,i1,i2)` vs `(c,d,a,b,i2,i1)`), used to drop the second one
/// seen. `f64::to_bits` gives `Eq`/`Hash` for the currents without
/// pretending NaN ordering is meaningful — ratio-grid values are never
/// NaN.
fn canonical_key(c: &Candidate) -> ((String, String, u64), (String, String, u64)) {
    let ch1 = (c.a.clone(), c.b.clone(), c.current_1_ma.to_bits());
    let ch2 = (c.c.clone(), c.d.clone(), c.current_2_ma.to_bits());
    if ch1 <= ch2 {
        (ch1, ch2)
    } else {
        (ch2, ch1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ratio_grid_excludes_the_endpoints() {
        let grid = current_ratio_grid(4.0, 1.0);
        assert_eq!(grid, vec![(1.0, 3.0), (2.0, 2.0), (3.0, 1.0)]);
    }

    #[test]
    fn ratio_grid_is_empty_when_step_exceeds_half_total() {
        assert!(current_ratio_grid(1.0, 0.6).is_empty());
    }

    #[test]
    fn ratio_grid_rejects_non_positive_inputs() {
        assert!(current_ratio_grid(0.0, 1.0).is_empty());
        assert!(current_ratio_grid(4.0, 0.0).is_empty());
    }

    fn space() -> CandidateSpace {
        let net = vec!["Fz".to_string(), "Pz".to_string(), "C3".to_string(), "C4".to_string()];
        CandidateSpace {
            list_1a: net.clone(),
            list_1b: net.clone(),
            list_2a: net.clone(),
            list_2b: net,
            current_total_ma: 4.0,
            current_step_ma: 2.0,
            break_symmetry: false,
        }
    }

    #[test]
    fn every_candidate_names_4_distinct_electrodes() {
        for candidate in enumerate_candidates(&space()) {
            assert!(all_distinct(&candidate.a, &candidate.b, &candidate.c, &candidate.d), "{candidate:?} reuses an electrode across channels");
        }
    }

    #[test]
    fn symmetry_breaking_drops_channel_swapped_duplicates() {
        let mut sym = space();
        sym.break_symmetry = true;
        let without = enumerate_candidates(&space()).len();
        let with = enumerate_candidates(&sym).len();
        assert!(with < without);

        let mut seen = HashSet::new();
        for candidate in enumerate_candidates(&sym) {
            assert!(seen.insert(canonical_key(&candidate)), "duplicate canonical key survived symmetry breaking");
        }
    }

    #[test]
    fn enumeration_order_is_deterministic_across_runs() {
        assert_eq!(enumerate_candidates(&space()), enumerate_candidates(&space()));
    }
}
