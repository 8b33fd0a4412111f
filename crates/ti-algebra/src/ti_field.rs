//! The TI-envelope closed form (spec §4.1) and its directional
//! projections onto a cortical surface normal and tangent plane.
//!
//! The maximum-over-direction envelope magnitude for two vector fields
//! `E1`, `E2` oscillating at close frequencies is the standard
//! Grossman/Mirzakhalili closed form: letting `big`/`small` be the larger-
//! and smaller-magnitude of the two vectors and `alpha` the angle between
//! them,
//!
//! ```text
//! TI_max = 2 * |small|                                  if |small| <= |big| * cos(alpha)
//!        = 2 * |small x (big - small)| / |big - small|   otherwise
//! ```

use ti_core::geometry::Point3;

/// Maximum-over-direction TI envelope magnitude at a point, given the two
/// channels' E-field vectors there (spec §4.1, §8 invariant 1: the result
/// is always in `[0, 2*min(|E1|, |E2|)]`).
///
/// # Example
///
/// ```
/// use ti_algebra::ti_field::ti_envelope_max;
/// use ti_core::geometry::Point3;
///
/// // Parallel vectors: envelope collapses to 2 * the smaller magnitude.
/// let e1 = Point3::new(3.0, 0.0, 0.0);
/// let e2 = Point3::new(1.0, 0.0, 0.0);
/// assert!((ti_envelope_max(&e1, &e2) - 2.0).abs() < 1e-9);
/// ```
pub fn ti_envelope_max(e1: &Point3, e2: &Point3) -> f64 {
    let norm1 = e1.norm();
    let norm2 = e2.norm();
    let (big, small, norm_big, norm_small) =
        if norm1 >= norm2 { (e1, e2, norm1, norm2) } else { (e2, e1, norm2, norm1) };

    if norm_big < 1e-12 {
        return 0.0;
    }
    if norm_small < 1e-12 {
        return 0.0;
    }

    let cos_alpha = big.dot(small) / (norm_big * norm_small);

    if norm_small <= norm_big * cos_alpha {
        2.0 * norm_small
    } else {
        let diff = big.sub(small);
        let diff_norm = diff.norm();
        if diff_norm < 1e-12 {
            2.0 * norm_small
        } else {
            2.0 * small.cross(&diff).norm() / diff_norm
        }
    }
}

/// Envelope magnitude of the 1D projections of `e1`, `e2` onto a single
/// axis: `2 * min(|e1|, |e2|)` when the projections point the same way
/// (or either is ~zero), `0` when they point opposite ways and so cancel
/// along that axis. This is [`ti_envelope_max`] specialized to two
/// colinear vectors.
fn directional_envelope(e1_component: f64, e2_component: f64) -> f64 {
    if e1_component.abs() < 1e-12 || e2_component.abs() < 1e-12 {
        return 2.0 * e1_component.abs().min(e2_component.abs());
    }
    if e1_component.signum() == e2_component.signum() {
        2.0 * e1_component.abs().min(e2_component.abs())
    } else {
        0.0
    }
}

/// TI envelope projected along the cortical surface normal `n` (must be
/// unit length).
///
/// # Example
///
/// ```
/// use ti_algebra::ti_field::ti_normal;
/// use ti_core::geometry::Point3;
///
/// let n = Point3::new(0.0, 0.0, 1.0);
/// let e1 = Point3::new(0.0, 0.0, 2.0);
/// let e2 = Point3::new(0.0, 0.0, 1.0);
/// assert!((ti_normal(&e1, &e2, &n) - 2.0).abs() < 1e-9);
/// ```
pub fn ti_normal(e1: &Point3, e2: &Point3, n: &Point3) -> f64 {
    directional_envelope(e1.dot(n), e2.dot(n))
}

/// TI envelope magnitude within the plane tangential to `n`: the
/// components of `e1`, `e2` with their normal projection removed, fed
/// back through [`ti_envelope_max`].
///
/// # Example
///
/// ```
/// use ti_algebra::ti_field::ti_tangential;
/// use ti_core::geometry::Point3;
///
/// let n = Point3::new(0.0, 0.0, 1.0);
/// let e1 = Point3::new(2.0, 0.0, 5.0);
/// let e2 = Point3::new(1.0, 0.0, -3.0);
/// // Normal component is stripped out; only the x-component survives.
/// assert!((ti_tangential(&e1, &e2, &n) - 2.0).abs() < 1e-9);
/// ```
pub fn ti_tangential(e1: &Point3, e2: &Point3, n: &Point3) -> f64 {
    let strip_normal = |v: &Point3| -> Point3 {
        let comp = v.dot(n);
        v.sub(&n.scale(comp))
    };
    ti_envelope_max(&strip_normal(e1), &strip_normal(e2))
}
