//! The (λ, φ) scalp parameterization (spec §4.5 "Parameterization"): a
//! radial projection of an ellipsoid fit onto the upper-head surface, so
//! the optimizer's decision variables stay a flat, bounded 2k-dimensional
//! box instead of an irregular mesh surface.

use ti_core::geometry::Point3;

/// An axis-aligned ellipsoid fit to a subject's scalp electrode positions,
/// used as the radial projection surface for continuous electrode search.
#[derive(Debug, Clone, Copy)]
pub struct ScalpMask {
    pub center: Point3,
    pub radii: Point3,
}

impl ScalpMask {
    /// Fits an ellipsoid to `points` (typically an `ElectrodeNet`'s
    /// positions): center at the centroid, radii at half the per-axis
    /// extent. Falls back to a unit sphere at the origin for fewer than
    /// two points, which carries no meaningful scalp shape to fit.
    pub fn fit(points: &[Point3]) -> Self {
        if points.len() < 2 {
            return ScalpMask { center: Point3::ORIGIN, radii: Point3::new(1.0, 1.0, 1.0) };
        }
        let n = points.len() as f64;
        let sum = points.iter().fold(Point3::ORIGIN, |acc, p| acc.add(p));
        let center = sum.scale(1.0 / n);

        let (mut min, mut max) = (center, center);
        for p in points {
            min = Point3::new(min.x.min(p.x), min.y.min(p.y), min.z.min(p.z));
            max = Point3::new(max.x.max(p.x), max.y.max(p.y), max.z.max(p.z));
        }
        let radii = Point3::new(((max.x - min.x) / 2.0).max(1.0), ((max.y - min.y) / 2.0).max(1.0), ((max.z - min.z) / 2.0).max(1.0));
        ScalpMask { center, radii }
    }

    /// Maps `(lambda, phi)` — longitude in `[-pi, pi]`, latitude in
    /// `[-pi/2, pi/2]` — onto a 3D point on the ellipsoid surface.
    /// Latitude is measured from the equator (z = 0 plane) toward the
    /// vertex (z axis), matching an "upper-head" convention where larger
    /// `phi` is higher on the scalp.
    pub fn to_point(&self, lambda: f64, phi: f64) -> Point3 {
        let x = self.center.x + self.radii.x * phi.cos() * lambda.cos();
        let y = self.center.y + self.radii.y * phi.cos() * lambda.sin();
        let z = self.center.z + self.radii.z * phi.sin();
        Point3::new(x, y, z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fit_centers_on_the_point_centroid() {
        let points = [Point3::new(-10.0, 0.0, 0.0), Point3::new(10.0, 0.0, 0.0), Point3::new(0.0, 10.0, 10.0), Point3::new(0.0, -10.0, -10.0)];
        let mask = ScalpMask::fit(&points);
        assert!(mask.center.distance(&Point3::ORIGIN) < 1e-9);
    }

    #[test]
    fn north_pole_latitude_moves_toward_positive_z() {
        let mask = ScalpMask { center: Point3::ORIGIN, radii: Point3::new(80.0, 80.0, 80.0) };
        let pole = mask.to_point(0.0, std::f64::consts::FRAC_PI_2);
        assert!((pole.z - 80.0).abs() < 1e-6);
        assert!(pole.x.abs() < 1e-6 && pole.y.abs() < 1e-6);
    }

    #[test]
    fn equator_point_lies_in_the_z_zero_plane() {
        let mask = ScalpMask { center: Point3::ORIGIN, radii: Point3::new(80.0, 80.0, 80.0) };
        let p = mask.to_point(std::f64::consts::FRAC_PI_4, 0.0);
        assert!(p.z.abs() < 1e-9);
        assert!((p.distance(&Point3::ORIGIN) - 80.0).abs() < 1e-6);
    }

    #[test]
    fn too_few_points_falls_back_to_unit_sphere() {
        let mask = ScalpMask::fit(&[Point3::new(5.0, 5.0, 5.0)]);
        assert_eq!(mask.center, Point3::ORIGIN);
        assert_eq!(mask.radii, Point3::new(1.0, 1.0, 1.0));
    }
}
