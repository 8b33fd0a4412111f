//! Ranking and the append-only CSV ledger of evaluated candidates (spec
//! §4.4 "Ranking & output"), grounded on `volt-ledger`'s own framing of
//! itself as "the append-only audit log" it never got around to building.

use std::io::Write;

use ti_analyze::stats::Stats;
use ti_core::error::{Result, TiError};
use ti_core::field::FieldSample;

use crate::candidate::Candidate;

/// One evaluated, ranked candidate: its montage, goal value, the full TI
/// envelope field on the mesh, and ROI statistics from the analyzer.
#[derive(Debug, Clone)]
pub struct RankedCandidate {
    /// 1-based rank, best goal value first.
    pub rank: usize,
    pub candidate: Candidate,
    pub goal_value: f64,
    pub ti_field: FieldSample,
    pub roi_stats: Stats,
}

/// Sorts evaluated candidates by goal value descending, assigning
/// 1-based ranks. Ties are broken deterministically by the input's own
/// order (a stable sort never reorders equal elements), which is
/// whatever order `candidate::enumerate_candidates` produced them in.
pub fn rank_candidates(mut evaluated: Vec<(Candidate, f64, FieldSample, Stats)>) -> Vec<RankedCandidate> {
    evaluated.sort_by(|a, b| b.1.total_cmp(&a.1));
    evaluated
        .into_iter()
        .enumerate()
        .map(|(i, (candidate, goal_value, ti_field, roi_stats))| RankedCandidate { rank: i + 1, candidate, goal_value, ti_field, roi_stats })
        .collect()
}

/// Writes the ranked-candidate ledger as CSV: one row per candidate with
/// its electrode labels, currents, goal value, and ROI statistics summary.
/// The full per-node TI field is not written here — mesh/voxel output
/// persistence is `ti-pipeline`'s job, the same split `ti-simulate`'s
/// `output` module already draws between computing a result and writing
/// it to a caller-chosen path.
pub fn write_ledger<W: Write>(writer: W, ranked: &[RankedCandidate]) -> Result<()> {
    let mut w = csv::Writer::from_writer(writer);
    let header = [
        "rank",
        "electrode_a",
        "electrode_b",
        "electrode_c",
        "electrode_d",
        "current_1_ma",
        "current_2_ma",
        "goal_value",
        "roi_count",
        "roi_mean",
        "roi_std",
        "roi_p99",
        "roi_focality_50",
        "roi_focality_75",
    ];
    w.write_record(header).map_err(|e| ledger_io_error("writing ex-search ledger header", e))?;

    for r in ranked {
        w.write_record([
            r.rank.to_string(),
            r.candidate.a.clone(),
            r.candidate.b.clone(),
            r.candidate.c.clone(),
            r.candidate.d.clone(),
            r.candidate.current_1_ma.to_string(),
            r.candidate.current_2_ma.to_string(),
            r.goal_value.to_string(),
            r.roi_stats.count.to_string(),
            r.roi_stats.mean.to_string(),
            r.roi_stats.std.to_string(),
            r.roi_stats.p99.to_string(),
            r.roi_stats.focality_50.to_string(),
            r.roi_stats.focality_75.to_string(),
        ])
        .map_err(|e| ledger_io_error("writing ex-search ledger row", e))?;
    }
    w.flush().map_err(|e| TiError::io("flushing ex-search ledger", e))?;
    Ok(())
}

fn ledger_io_error(context: &str, e: csv::Error) -> TiError {
    TiError::Io { context: context.to_string(), source_msg: e.to_string() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ti_core::field::Domain;

    fn field() -> FieldSample {
        FieldSample::new_nodal(Domain::Mesh { len: 1 }, vec![1.0]).unwrap()
    }

    fn candidate(label: &str) -> Candidate {
        Candidate { a: label.into(), b: "Pz".into(), c: "C3".into(), d: "C4".into(), current_1_ma: 2.0, current_2_ma: 2.0 }
    }

    #[test]
    fn ranking_sorts_descending_by_goal_value() {
        let evaluated = vec![
            (candidate("Fz"), 0.5, field(), Stats::empty()),
            (candidate("Oz"), 0.9, field(), Stats::empty()),
            (candidate("Cz"), 0.1, field(), Stats::empty()),
        ];
        let ranked = rank_candidates(evaluated);
        assert_eq!(ranked[0].candidate.a, "Oz");
        assert_eq!(ranked[1].candidate.a, "Fz");
        assert_eq!(ranked[2].candidate.a, "Cz");
        assert_eq!(ranked.iter().map(|r| r.rank).collect::<Vec<_>>(), vec![1, 2, 3]);
    }

    #[test]
    fn ties_preserve_input_order() {
        let evaluated = vec![(candidate("First"), 1.0, field(), Stats::empty()), (candidate("Second"), 1.0, field(), Stats::empty())];
        let ranked = rank_candidates(evaluated);
        assert_eq!(ranked[0].candidate.a, "First");
        assert_eq!(ranked[1].candidate.a, "Second");
    }

    #[test]
    fn ledger_round_trips_through_csv() {
        let evaluated = vec![(candidate("Fz"), 0.75, field(), Stats::empty())];
        let ranked = rank_candidates(evaluated);
        let mut buf = Vec::new();
        write_ledger(&mut buf, &ranked).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("Fz"));
        assert!(text.contains("0.75"));
        assert!(text.lines().count() == 2); // header + one row
    }
}
