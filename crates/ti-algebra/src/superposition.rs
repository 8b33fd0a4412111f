//! Linear superposition of per-electrode leadfield rows into a channel's
//! E-field (spec §4.4 step 1): `E_c(x) = Σ_k i_k · L[k](x)`, which for the
//! canonical two-electrode channel reduces to `(L[a] - L[b]) · i`.

use ti_core::error::{Result, TiError};
use ti_core::field::{Domain, FieldSample};
use ti_core::simulation::VectorField;

fn check_same_domain(a: &Domain, b: &Domain) -> Result<()> {
    if a.len() != b.len() {
        return Err(TiError::ShapeMismatch { field_len: b.len(), domain_len: a.len() });
    }
    Ok(())
}

/// Scales and sums a set of per-electrode leadfield rows into one channel
/// vector field. `rows` pairs each electrode's unit-current field with its
/// signed current in milliamps; all rows must share one [`Domain`].
///
/// # Example
///
/// ```
/// use ti_algebra::superposition::superpose_channel;
/// use ti_core::field::{Domain, FieldSample};
/// use ti_core::simulation::VectorField;
///
/// let domain = Domain::Mesh { len: 1 };
/// let row_a = VectorField {
///     x: FieldSample::new_elemental(domain, vec![1.0]).unwrap(),
///     y: FieldSample::new_elemental(domain, vec![0.0]).unwrap(),
///     z: FieldSample::new_elemental(domain, vec![0.0]).unwrap(),
/// };
/// let row_b = VectorField {
///     x: FieldSample::new_elemental(domain, vec![0.3]).unwrap(),
///     y: FieldSample::new_elemental(domain, vec![0.0]).unwrap(),
///     z: FieldSample::new_elemental(domain, vec![0.0]).unwrap(),
/// };
/// // Source at 2 mA, sink at -2 mA: E = 2*L[a] - 2*L[b].
/// let combined = superpose_channel(&[(&row_a, 2.0), (&row_b, -2.0)]).unwrap();
/// assert!((combined.x.values[0] - 1.4).abs() < 1e-9);
/// ```
pub fn superpose_channel(rows: &[(&VectorField, f64)]) -> Result<VectorField> {
    let Some((first, _)) = rows.first() else {
        return Err(TiError::InvalidMontage { reason: "channel has no electrode rows to superpose".into() });
    };
    let domain = first.x.domain;
    let len = domain.len();

    let mut x = vec![0.0; len];
    let mut y = vec![0.0; len];
    let mut z = vec![0.0; len];

    for (row, current_ma) in rows {
        check_same_domain(&domain, &row.x.domain)?;
        for i in 0..len {
            x[i] += row.x.values[i] * current_ma;
            y[i] += row.y.values[i] * current_ma;
            z[i] += row.z.values[i] * current_ma;
        }
    }

    Ok(VectorField {
        x: FieldSample::new_elemental(domain, x)?,
        y: FieldSample::new_elemental(domain, y)?,
        z: FieldSample::new_elemental(domain, z)?,
    })
}
