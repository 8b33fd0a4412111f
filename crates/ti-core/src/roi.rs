//! Region-of-interest specification: a tagged variant with exactly two
//! cases, per the re-architecture note in the spec (§9) that replaces the
//! original mixture of integer ids and string names with one clear type.

use crate::geometry::{CoordinateSpace, Point3};

/// An abstract ROI specification. Resolution to a concrete index set
/// happens exclusively in `ti-coords::resolve` — this type carries no
/// resolution logic of its own.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Roi {
    /// A sphere of the given radius (mm) centered at `center`, interpreted
    /// in `space`.
    Sphere { center: Point3, radius_mm: f64, space: CoordinateSpace },
    /// A named or numbered region in a named atlas. `region` is either an
    /// integer label or a region name (case-insensitive); both are
    /// accepted as plain text and resolved by `ti-coords`.
    Atlas { atlas_name: String, region: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sphere_and_atlas_are_distinguishable() {
        let sphere = Roi::Sphere { center: Point3::ORIGIN, radius_mm: 5.0, space: CoordinateSpace::Mni };
        let atlas = Roi::Atlas { atlas_name: "a".into(), region: "V1".into() };
        assert_ne!(sphere, atlas);
    }
}
