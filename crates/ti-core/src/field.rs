//! Scalar/vector field samples aligned with a mesh or voxel domain.

use crate::error::{Result, TiError};

/// Which domain a field sample is defined over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Domain {
    /// One value per mesh element (or node, see [`FieldSample::is_nodal`]).
    Mesh { len: usize },
    /// One value per voxel.
    Voxel { len: usize },
}

impl Domain {
    pub fn len(&self) -> usize {
        match self {
            Domain::Mesh { len } | Domain::Voxel { len } => *len,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Which cortical surface a directional (normal/tangential) field was
/// computed against. The analyzer refuses to compare or pool fields
/// carrying different tags (spec §9 open question, resolved in
/// `SPEC_FULL.md`: the workspace standardizes on `Central`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SurfaceKind {
    Pial,
    Central,
    White,
}

/// A scalar field sample aligned with a [`Domain`].
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FieldSample {
    pub domain: Domain,
    pub values: Vec<f64>,
    /// `true` if `values` is indexed by mesh *node* rather than mesh
    /// *element* (meaningless for `Domain::Voxel`); the analyzer averages
    /// nodal values onto elements before building ROI statistics (spec
    /// §4.2 step 2).
    pub is_nodal: bool,
}

impl FieldSample {
    pub fn new_elemental(domain: Domain, values: Vec<f64>) -> Result<Self> {
        Self::check_len(&domain, &values)?;
        Ok(FieldSample { domain, values, is_nodal: false })
    }

    pub fn new_nodal(domain: Domain, values: Vec<f64>) -> Result<Self> {
        Self::check_len(&domain, &values)?;
        Ok(FieldSample { domain, values, is_nodal: true })
    }

    fn check_len(domain: &Domain, values: &[f64]) -> Result<()> {
        if values.len() != domain.len() {
            return Err(TiError::ShapeMismatch { field_len: values.len(), domain_len: domain.len() });
        }
        Ok(())
    }
}

/// A field with an associated cortical-surface tag, used for
/// `TI_normal`/`TI_tangential` outputs.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DirectionalField {
    pub field: FieldSample,
    pub surface: SurfaceKind,
}

impl DirectionalField {
    /// Fails with `SpaceMismatch` if `self` and `other` were computed
    /// against different cortical surfaces.
    pub fn assert_same_surface(&self, other: &DirectionalField) -> Result<()> {
        if self.surface != other.surface {
            return Err(TiError::SpaceMismatch {
                reason: format!(
                    "directional fields computed against different surfaces ({:?} vs {:?})",
                    self.surface, other.surface
                ),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mismatched_length_is_shape_mismatch() {
        let err = FieldSample::new_elemental(Domain::Mesh { len: 3 }, vec![1.0, 2.0]).unwrap_err();
        assert!(matches!(err, TiError::ShapeMismatch { field_len: 2, domain_len: 3 }));
    }

    #[test]
    fn matching_length_constructs_ok() {
        let f = FieldSample::new_elemental(Domain::Mesh { len: 2 }, vec![1.0, 2.0]).unwrap();
        assert!(!f.is_nodal);
    }

    #[test]
    fn directional_field_rejects_mixed_surfaces() {
        let a = DirectionalField {
            field: FieldSample::new_elemental(Domain::Mesh { len: 1 }, vec![1.0]).unwrap(),
            surface: SurfaceKind::Central,
        };
        let b = DirectionalField {
            field: FieldSample::new_elemental(Domain::Mesh { len: 1 }, vec![1.0]).unwrap(),
            surface: SurfaceKind::Pial,
        };
        assert!(a.assert_same_surface(&b).is_err());
    }
}
