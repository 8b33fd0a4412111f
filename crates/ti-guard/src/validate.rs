//! Cross-field `RunConfig` checks `serde` cannot express on its own (spec
//! §6: "unknown options cause `InvalidConfig`" covers structure;
//! [`validate_config`] covers the invariants between fields).

use ti_core::config::RunConfig;
use ti_core::error::{Result, TiError};

fn invalid(reason: impl Into<String>) -> TiError {
    TiError::InvalidConfig { reason: reason.into() }
}

/// Validates a [`RunConfig`] beyond what deserialization already
/// guarantees: positive finite intensities, a current step that evenly
/// divides the ex-search grid's total, and sane optimizer/search
/// settings.
///
/// # Example
///
/// ```
/// use ti_core::config::RunConfig;
/// use ti_guard::validate::validate_config;
///
/// assert!(validate_config(&RunConfig::default()).is_ok());
/// ```
pub fn validate_config(cfg: &RunConfig) -> Result<()> {
    for (label, v) in [("intensities_ma[0]", cfg.intensities_ma[0]), ("intensities_ma[1]", cfg.intensities_ma[1])] {
        if v <= 0.0 || !v.is_finite() {
            return Err(invalid(format!("{label} must be positive and finite, got {v}")));
        }
    }

    if cfg.top_k == 0 {
        return Err(invalid("top_k must be at least 1"));
    }

    if cfg.current_total_ma <= 0.0 || !cfg.current_total_ma.is_finite() {
        return Err(invalid(format!("current_total_ma must be positive and finite, got {}", cfg.current_total_ma)));
    }
    if cfg.current_step_ma <= 0.0 || !cfg.current_step_ma.is_finite() {
        return Err(invalid(format!("current_step_ma must be positive and finite, got {}", cfg.current_step_ma)));
    }
    if cfg.current_step_ma > cfg.current_total_ma {
        return Err(invalid(format!(
            "current_step_ma ({}) must not exceed current_total_ma ({})",
            cfg.current_step_ma, cfg.current_total_ma
        )));
    }

    let opt = &cfg.optimizer_settings;
    if opt.population_size == 0 {
        return Err(invalid("optimizer_settings.population_size must be at least 1"));
    }
    if opt.max_iterations == 0 {
        return Err(invalid("optimizer_settings.max_iterations must be at least 1"));
    }
    if !(0.0..=1.0).contains(&opt.recombination_rate) {
        return Err(invalid(format!(
            "optimizer_settings.recombination_rate must be in [0, 1], got {}",
            opt.recombination_rate
        )));
    }
    let (lo, hi) = opt.mutation_range;
    if lo < 0.0 || hi < lo || !lo.is_finite() || !hi.is_finite() {
        return Err(invalid(format!("optimizer_settings.mutation_range must be a non-decreasing finite pair, got ({lo}, {hi})")));
    }
    if opt.convergence_tolerance < 0.0 || !opt.convergence_tolerance.is_finite() {
        return Err(invalid(format!(
            "optimizer_settings.convergence_tolerance must be non-negative and finite, got {}",
            opt.convergence_tolerance
        )));
    }

    cfg.electrode_spec().validate()?;

    Ok(())
}
