//! ROI statistics schema and the weighted aggregation shared by the mesh
//! and voxel analyzers (spec §4.2 "Stats schema").

/// Fixed statistics returned by every analyzer operation, mesh or voxel.
///
/// An empty ROI (spec §4.2 "Failure semantics") is not an error: it
/// returns [`Stats::empty`], a sentinel with `count = 0` and every other
/// field at a documented null value.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Stats {
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub max: f64,
    pub median: f64,
    pub p25: f64,
    pub p75: f64,
    pub p95: f64,
    pub p99: f64,
    pub volume_mm3: f64,
    /// Volume (mesh) or count·voxel-volume (voxel) where the field is at
    /// least 50% of the ROI's 99.9th percentile value.
    pub focality_50: f64,
    /// Same as [`Stats::focality_50`] at the 75% threshold.
    pub focality_75: f64,
}

impl Stats {
    /// Sentinel for an empty ROI: `count = 0`, every statistic `0.0`.
    pub fn empty() -> Self {
        Stats {
            count: 0,
            mean: 0.0,
            std: 0.0,
            min: 0.0,
            max: 0.0,
            median: 0.0,
            p25: 0.0,
            p75: 0.0,
            p95: 0.0,
            p99: 0.0,
            volume_mm3: 0.0,
            focality_50: 0.0,
            focality_75: 0.0,
        }
    }
}

/// Computes weight-aggregated statistics over `values`, one weight per
/// entry (element volume for mesh ROIs, voxel volume for voxel ROIs).
/// `values` and `weights` must have the same, non-zero length — callers
/// are expected to have already handled the empty-ROI case via
/// [`Stats::empty`].
pub fn weighted_stats(values: &[f64], weights: &[f64]) -> Stats {
    debug_assert_eq!(values.len(), weights.len());
    let total_weight: f64 = weights.iter().sum();
    let mean = weighted_percentile_mean(values, weights, total_weight);
    let variance = values
        .iter()
        .zip(weights)
        .map(|(&v, &w)| w * (v - mean).powi(2))
        .sum::<f64>()
        / total_weight;

    let mut pairs: Vec<(f64, f64)> = values.iter().copied().zip(weights.iter().copied()).collect();
    pairs.sort_by(|a, b| a.0.total_cmp(&b.0));

    let p999 = weighted_percentile(&pairs, total_weight, 0.999);
    let threshold_50 = 0.5 * p999;
    let threshold_75 = 0.75 * p999;
    let focality_50: f64 = pairs.iter().filter(|&&(v, _)| v >= threshold_50).map(|&(_, w)| w).sum();
    let focality_75: f64 = pairs.iter().filter(|&&(v, _)| v >= threshold_75).map(|&(_, w)| w).sum();

    Stats {
        count: values.len(),
        mean,
        std: variance.max(0.0).sqrt(),
        min: pairs.first().map(|&(v, _)| v).unwrap_or(0.0),
        max: pairs.last().map(|&(v, _)| v).unwrap_or(0.0),
        median: weighted_percentile(&pairs, total_weight, 0.5),
        p25: weighted_percentile(&pairs, total_weight, 0.25),
        p75: weighted_percentile(&pairs, total_weight, 0.75),
        p95: weighted_percentile(&pairs, total_weight, 0.95),
        p99: weighted_percentile(&pairs, total_weight, 0.99),
        volume_mm3: total_weight,
        focality_50,
        focality_75,
    }
}

fn weighted_percentile_mean(values: &[f64], weights: &[f64], total_weight: f64) -> f64 {
    if total_weight <= 0.0 {
        return 0.0;
    }
    values.iter().zip(weights).map(|(&v, &w)| v * w).sum::<f64>() / total_weight
}

/// Value at weighted fraction `frac` (0.0..=1.0) of the cumulative weight,
/// `sorted` ascending by value. The last entry whose cumulative weight
/// reaches `frac * total_weight` is returned, matching the usual
/// "smallest value at or above the target mass" percentile definition.
fn weighted_percentile(sorted: &[(f64, f64)], total_weight: f64, frac: f64) -> f64 {
    if total_weight <= 0.0 || sorted.is_empty() {
        return 0.0;
    }
    let target = frac * total_weight;
    let mut cum = 0.0;
    for &(v, w) in sorted {
        cum += w;
        if cum >= target {
            return v;
        }
    }
    sorted.last().unwrap().0
}
