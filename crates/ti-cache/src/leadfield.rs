//! The dense leadfield tensor `L[e, n, 3]` (spec §4.3 Data Model,
//! Invariants): one vector field per electrode, row order matching the
//! net's stable electrode order, reference row all zero.

use ti_algebra::superposition::superpose_channel;
use ti_core::error::{Result, TiError};
use ti_core::field::{Domain, FieldSample};
use ti_core::simulation::VectorField;

/// Tolerance for the "reference row is all zeros" invariant check, in
/// V/m per ampere.
pub const REFERENCE_ROW_TOLERANCE: f64 = 1e-9;

/// A built leadfield: one [`VectorField`] per electrode, in net order,
/// all sharing one [`Domain`] (always nodal on the full mesh per spec
/// §4.3).
#[derive(Debug, Clone)]
pub struct Leadfield {
    pub electrode_labels: Vec<String>,
    pub rows: Vec<VectorField>,
    pub domain: Domain,
}

impl Leadfield {
    /// Looks up a row by electrode label.
    pub fn row(&self, label: &str) -> Option<&VectorField> {
        self.electrode_labels.iter().position(|l| l == label).map(|i| &self.rows[i])
    }

    /// Checks the reference-row invariant: the named reference electrode's
    /// row is (numerically) all zeros.
    pub fn check_reference_row(&self, reference_electrode: &str) -> Result<()> {
        let row = self.row(reference_electrode).ok_or_else(|| TiError::UnknownRegion {
            atlas: "electrode net".to_string(),
            region: reference_electrode.to_string(),
        })?;
        let max_abs = row
            .x
            .values
            .iter()
            .chain(row.y.values.iter())
            .chain(row.z.values.iter())
            .fold(0.0_f64, |acc, &v| acc.max(v.abs()));
        if max_abs > REFERENCE_ROW_TOLERANCE {
            return Err(TiError::CacheCorrupt {
                fingerprint: reference_electrode.to_string(),
                reason: format!("reference electrode row is not zero (max abs = {max_abs})"),
            });
        }
        Ok(())
    }

    /// Superposes two electrodes' rows scaled by a signed current, the
    /// leadfield-linearity step at the heart of ex-search evaluation
    /// (spec §4.4 step 1): `E(x) = (L[a] - L[b]) * i`.
    pub fn channel_field(&self, label_a: &str, current_a_ma: f64, label_b: &str, current_b_ma: f64) -> Result<VectorField> {
        let row_a = self
            .row(label_a)
            .ok_or_else(|| TiError::UnknownRegion { atlas: "electrode net".to_string(), region: label_a.to_string() })?;
        let row_b = self
            .row(label_b)
            .ok_or_else(|| TiError::UnknownRegion { atlas: "electrode net".to_string(), region: label_b.to_string() })?;
        superpose_channel(&[(row_a, current_a_ma), (row_b, current_b_ma)])
    }
}

pub(crate) fn zero_row(domain: Domain) -> VectorField {
    let len = domain.len();
    VectorField {
        x: FieldSample::new_nodal(domain, vec![0.0; len]).expect("len matches domain"),
        y: FieldSample::new_nodal(domain, vec![0.0; len]).expect("len matches domain"),
        z: FieldSample::new_nodal(domain, vec![0.0; len]).expect("len matches domain"),
    }
}
