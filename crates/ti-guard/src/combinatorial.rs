//! Ex-search combinatorial sizing (spec §4.4 "Complexity & guardrails"):
//! the core computes the candidate count and, if it exceeds a configured
//! ceiling, refuses to proceed unless the caller explicitly confirms.
//! Enforcement lives at the boundary (here); the core never silently
//! truncates a search space.

use ti_core::error::{Result, TiError};

/// Upper bound on the number of ex-search candidates that would be
/// enumerated for four electrode-label pools of the given sizes and a
/// current-ratio grid of `ratio_count` entries (spec §4.4 "the core
/// surfaces the count"): the product of all five. The four pools may
/// overlap or be identical (spec §4.4 "possibly equal"), so this is a
/// bound, not the exact post-filtering count — a quadruple that reuses an
/// electrode across channels is dropped during enumeration itself, not
/// here, and the ceiling check enforced against this bound is
/// deliberately conservative rather than requiring the caller to know the
/// pools' overlap structure up front. Saturates rather than overflowing
/// for absurdly large inputs.
///
/// # Example
///
/// ```
/// use ti_guard::combinatorial::candidate_count;
///
/// // 4 pools of 10, 3 ratios: 10*10*10*10 * 3 = 30_000.
/// assert_eq!(candidate_count(10, 10, 10, 10, 3), 30_000);
/// ```
pub fn candidate_count(list_1a_len: usize, list_1b_len: usize, list_2a_len: usize, list_2b_len: usize, ratio_count: usize) -> u64 {
    (list_1a_len as u64)
        .saturating_mul(list_1b_len as u64)
        .saturating_mul(list_2a_len as u64)
        .saturating_mul(list_2b_len as u64)
        .saturating_mul(ratio_count as u64)
}

/// Enforces a configured ceiling on the combinatorial search size. `None`
/// means no ceiling. When the count exceeds the ceiling, the caller must
/// pass `confirmed = true` (an explicit opt-in, e.g. a CLI flag or API
/// parameter) or this returns `TiError::InvalidConfig`.
///
/// # Example
///
/// ```
/// use ti_guard::combinatorial::enforce_ceiling;
///
/// assert!(enforce_ceiling(1_000_000, Some(1_000), false).is_err());
/// assert!(enforce_ceiling(1_000_000, Some(1_000), true).is_ok());
/// assert!(enforce_ceiling(500, Some(1_000), false).is_ok());
/// ```
pub fn enforce_ceiling(count: u64, ceiling: Option<u64>, confirmed: bool) -> Result<()> {
    let Some(ceiling) = ceiling else { return Ok(()) };
    if count > ceiling && !confirmed {
        return Err(TiError::InvalidConfig {
            reason: format!(
                "ex-search candidate count {count} exceeds configured ceiling {ceiling}; re-run with explicit confirmation to proceed"
            ),
        });
    }
    Ok(())
}
