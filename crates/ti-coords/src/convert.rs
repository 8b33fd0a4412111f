//! Subject<->MNI coordinate conversion via the subject's affine (spec
//! §4.2 "Coordinate conversion"): radius is never rescaled, only the
//! center point moves between spaces.

use ti_core::error::{Result, TiError};
use ti_core::geometry::{CoordinateSpace, Point3};

/// Converts `point`, given in `from`, into `to`, using `subject_to_mni` as
/// the subject->MNI affine. A no-op when `from == to`.
///
/// # Example
///
/// ```
/// use ti_coords::convert::to_space;
/// use ti_core::geometry::{Affine, CoordinateSpace, Point3};
///
/// let affine = Affine::translation(Point3::new(1.0, 0.0, 0.0));
/// let mni = to_space(Point3::ORIGIN, CoordinateSpace::Subject, CoordinateSpace::Mni, &affine).unwrap();
/// assert_eq!(mni, Point3::new(1.0, 0.0, 0.0));
/// ```
pub fn to_space(
    point: Point3,
    from: CoordinateSpace,
    to: CoordinateSpace,
    subject_to_mni: &ti_core::geometry::Affine,
) -> Result<Point3> {
    match (from, to) {
        (CoordinateSpace::Subject, CoordinateSpace::Subject) | (CoordinateSpace::Mni, CoordinateSpace::Mni) => Ok(point),
        (CoordinateSpace::Subject, CoordinateSpace::Mni) => Ok(subject_to_mni.apply(&point)),
        (CoordinateSpace::Mni, CoordinateSpace::Subject) => subject_to_mni
            .inverse()
            .map(|inv| inv.apply(&point))
            .ok_or_else(|| TiError::SpaceMismatch { reason: "subject<->MNI affine is not invertible".into() }),
    }
}
