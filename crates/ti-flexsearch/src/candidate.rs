//! The optimizer's decision vector: `k` electrode centers, each a
//! `(lambda, phi)` pair, flattened to `2k` reals (spec §4.5
//! "Parameterization": "the 2k real parameters are the decision variables
//! of the optimizer").

/// Standard TI uses two independent channels of two electrodes each.
pub const ELECTRODE_COUNT: usize = 4;

/// Decision-variable bounds for one electrode center: longitude in
/// `[-pi, pi]`, latitude in `[-pi/2, pi/2]`.
pub fn bounds(k: usize) -> Vec<(f64, f64)> {
    let mut b = Vec::with_capacity(2 * k);
    for _ in 0..k {
        b.push((-std::f64::consts::PI, std::f64::consts::PI));
        b.push((-std::f64::consts::FRAC_PI_2, std::f64::consts::FRAC_PI_2));
    }
    b
}

/// Splits a flat `2k`-length decision vector into `k` `(lambda, phi)`
/// pairs.
pub fn decode(params: &[f64]) -> Vec<(f64, f64)> {
    params.chunks_exact(2).map(|pair| (pair[0], pair[1])).collect()
}

/// Clamps `value` into `[lo, hi]`, used to keep a mutated decision
/// variable inside its box after differential-evolution perturbation.
pub fn clamp(value: f64, lo: f64, hi: f64) -> f64 {
    value.max(lo).min(hi)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_has_two_entries_per_electrode() {
        assert_eq!(bounds(ELECTRODE_COUNT).len(), 2 * ELECTRODE_COUNT);
    }

    #[test]
    fn decode_pairs_consecutive_values() {
        let params = vec![0.1, 0.2, 0.3, 0.4];
        assert_eq!(decode(&params), vec![(0.1, 0.2), (0.3, 0.4)]);
    }

    #[test]
    fn clamp_keeps_value_inside_box() {
        assert_eq!(clamp(5.0, 0.0, 1.0), 1.0);
        assert_eq!(clamp(-5.0, 0.0, 1.0), 0.0);
        assert_eq!(clamp(0.5, 0.0, 1.0), 0.5);
    }
}
