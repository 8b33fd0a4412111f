//! Electrode patch specification and current-carrying channels/montages.

use crate::error::{Result, TiError};

/// Planar shape of a scalp electrode patch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ElectrodeShape {
    Rectangular,
    Elliptical,
}

/// A reusable electrode patch specification: shape, two planar dimensions,
/// thickness, and conductivity. One `ElectrodeSpec` is shared by every
/// electrode placement in a run.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ElectrodeSpec {
    pub shape: ElectrodeShape,
    /// Planar dimensions in millimeters, e.g. `(width, height)` for a
    /// rectangle or `(major, minor)` axis lengths for an ellipse.
    pub dimensions_mm: (f64, f64),
    pub thickness_mm: f64,
    /// Conductivity in S/m.
    pub conductivity: f64,
}

impl ElectrodeSpec {
    pub fn validate(&self) -> Result<()> {
        let (a, b) = self.dimensions_mm;
        if a <= 0.0 || b <= 0.0 || !a.is_finite() || !b.is_finite() {
            return Err(TiError::InvalidConfig {
                reason: format!("electrode dimensions must be positive and finite, got ({a}, {b})"),
            });
        }
        if self.thickness_mm <= 0.0 || !self.thickness_mm.is_finite() {
            return Err(TiError::InvalidConfig {
                reason: format!("electrode thickness must be positive, got {}", self.thickness_mm),
            });
        }
        if self.conductivity <= 0.0 || !self.conductivity.is_finite() {
            return Err(TiError::InvalidConfig {
                reason: format!("electrode conductivity must be positive, got {}", self.conductivity),
            });
        }
        Ok(())
    }
}

/// One electrode placement within a channel: a label (resolved against a
/// net) and a signed current in milliamps.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ElectrodePlacement {
    pub label: String,
    pub current_ma: f64,
}

/// An independent current-source pair: one or more electrode placements
/// whose signed currents sum to zero (electroneutrality).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Channel {
    pub placements: Vec<ElectrodePlacement>,
}

/// Tolerance for the "currents sum to zero" check, in milliamps — currents
/// are physical floating-point quantities, not integers, so an exact-zero
/// check would reject valid input.
pub const CURRENT_SUM_TOLERANCE_MA: f64 = 1e-9;

impl Channel {
    pub fn validate(&self) -> Result<()> {
        if self.placements.len() < 2 {
            return Err(TiError::InvalidMontage {
                reason: format!("channel needs at least 2 electrodes, got {}", self.placements.len()),
            });
        }
        let sum: f64 = self.placements.iter().map(|p| p.current_ma).sum();
        if sum.abs() > CURRENT_SUM_TOLERANCE_MA {
            return Err(TiError::InvalidMontage {
                reason: format!("channel currents must sum to zero, got {sum}"),
            });
        }
        Ok(())
    }

    /// Labels of electrodes carrying positive current (sources) — for the
    /// common two-electrode case there is exactly one.
    pub fn sources(&self) -> Vec<&str> {
        self.placements.iter().filter(|p| p.current_ma > 0.0).map(|p| p.label.as_str()).collect()
    }

    /// Labels of electrodes carrying negative current (sinks).
    pub fn sinks(&self) -> Vec<&str> {
        self.placements.iter().filter(|p| p.current_ma < 0.0).map(|p| p.label.as_str()).collect()
    }

    /// Rescales every placement so the channel's total positive (source)
    /// current equals `target_ma`, preserving the zero-sum relationship
    /// between sources and sinks. This is how a run's per-channel
    /// `intensities` separate "which electrodes, in what proportion" (the
    /// montage) from "how many mA" (the run config).
    pub fn scaled_to(&self, target_ma: f64) -> Result<Channel> {
        if target_ma <= 0.0 || !target_ma.is_finite() {
            return Err(TiError::InvalidConfig { reason: format!("channel intensity must be positive and finite, got {target_ma}") });
        }
        let positive_sum: f64 = self.placements.iter().map(|p| p.current_ma).filter(|&c| c > 0.0).sum();
        if positive_sum <= 0.0 {
            return Err(TiError::InvalidMontage { reason: "channel has no source (positive-current) electrode to scale against".into() });
        }
        let factor = target_ma / positive_sum;
        Ok(Channel {
            placements: self
                .placements
                .iter()
                .map(|p| ElectrodePlacement { label: p.label.clone(), current_ma: p.current_ma * factor })
                .collect(),
        })
    }
}

/// A named two-channel TI montage. Temporal interference requires exactly
/// two independent high-frequency channels (spec §3).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Montage {
    pub name: String,
    pub net_name: String,
    pub channels: [Channel; 2],
}

impl Montage {
    /// Structural validation against spec §4.1: exactly two channels
    /// (enforced by the type itself), each electroneutral, and every
    /// referenced label present in `known_labels`.
    pub fn validate(&self, known_labels: &[String]) -> Result<()> {
        for channel in &self.channels {
            channel.validate()?;
            for placement in &channel.placements {
                if !known_labels.iter().any(|l| l == &placement.label) {
                    return Err(TiError::InvalidMontage {
                        reason: format!(
                            "electrode '{}' not found in net '{}'",
                            placement.label, self.net_name
                        ),
                    });
                }
            }
        }
        Ok(())
    }
}
