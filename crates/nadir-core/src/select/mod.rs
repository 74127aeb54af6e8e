//! Orientation-gated frame selection.
//!
//! The selection walks the full orientation stream once to choose a target
//! direction (explicit or auto-detected between the body Z poles), measures
//! every sample's angle to it, and keeps frames under one of two criteria.

pub mod axis;
pub mod policy;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::consts::DEFAULT_MAX_ANGLE_DEGREES;
use crate::error::{NadirError, Result};
use crate::geometry::{normalize, Vec3};

pub use axis::{detect_target_axis, AxisChoice, AxisPole};
pub use policy::{apply_criterion, compute_angles};

/// Which frames survive selection. Exactly one mode is active per run.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum SelectionCriterion {
    /// Keep every frame whose angle to the target is `<= max_degrees`.
    AbsoluteAngle { max_degrees: f64 },
    /// Keep the `fraction` (0, 1] of frames closest to the target.
    TopPercentile { fraction: f64 },
}

impl Default for SelectionCriterion {
    fn default() -> Self {
        Self::AbsoluteAngle {
            max_degrees: DEFAULT_MAX_ANGLE_DEGREES,
        }
    }
}

impl SelectionCriterion {
    pub fn validate(&self) -> Result<()> {
        match *self {
            Self::AbsoluteAngle { max_degrees } if max_degrees.is_nan() => Err(
                NadirError::InvalidConfig("max_degrees must be a number".into()),
            ),
            Self::TopPercentile { fraction } if !(fraction > 0.0 && fraction <= 1.0) => {
                Err(NadirError::InvalidConfig(format!(
                    "fraction must be in (0, 1], got {fraction}"
                )))
            }
            _ => Ok(()),
        }
    }
}

impl std::fmt::Display for SelectionCriterion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AbsoluteAngle { max_degrees } => write!(f, "Angle <= {max_degrees}\u{b0}"),
            Self::TopPercentile { fraction } => write!(f, "Top {:.1}%", fraction * 100.0),
        }
    }
}

/// How the target direction is chosen.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum TargetConfig {
    /// Choose between +Z and -Z from the mean sample direction.
    #[default]
    Auto,
    Explicit { direction: Vec3 },
}

impl std::fmt::Display for TargetConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Auto => write!(f, "Auto (\u{b1}Z)"),
            Self::Explicit { direction } => write!(f, "{direction}"),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SelectionConfig {
    #[serde(default)]
    pub target: TargetConfig,
    #[serde(default)]
    pub criterion: SelectionCriterion,
}

/// Per-run selection result. Serializable so reporting tools can consume it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SelectionReport {
    /// Unit target direction actually used.
    pub target: Vec3,
    /// Present when the target was auto-detected.
    pub axis: Option<AxisChoice>,
    pub criterion: SelectionCriterion,
    /// Number of samples considered.
    pub total: usize,
    /// Surviving indices in temporal order.
    pub kept: Vec<usize>,
}

impl SelectionReport {
    pub fn kept_count(&self) -> usize {
        self.kept.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kept.is_empty()
    }
}

/// Resolve the target direction for `samples` under `target`.
pub fn resolve_target(samples: &[Vec3], target: &TargetConfig) -> Result<(Vec3, Option<AxisChoice>)> {
    match target {
        TargetConfig::Auto => {
            let choice = detect_target_axis(samples);
            info!(
                axis = %choice.pole,
                mean_pos_z = choice.mean_pos_z,
                mean_neg_z = choice.mean_neg_z,
                "Auto-selected target direction"
            );
            Ok((choice.pole.direction(), Some(choice)))
        }
        TargetConfig::Explicit { direction } => {
            let (unit, n) = normalize(*direction);
            if n == 0.0 || !n.is_finite() {
                return Err(NadirError::InvalidConfig(format!(
                    "target direction {direction} has no direction"
                )));
            }
            Ok((unit, None))
        }
    }
}

/// Decide which frames point close enough to the target.
///
/// An empty `kept` list is a valid outcome; callers treat it as
/// "no frames selected" rather than a failure.
pub fn select_frames(samples: &[Vec3], config: &SelectionConfig) -> Result<SelectionReport> {
    config.criterion.validate()?;
    let (target, axis) = resolve_target(samples, &config.target)?;

    let angles = compute_angles(samples, target);
    let kept = apply_criterion(&angles, &config.criterion);

    info!(
        criterion = %config.criterion,
        kept = kept.len(),
        total = samples.len(),
        "Frame selection complete"
    );

    Ok(SelectionReport {
        target,
        axis,
        criterion: config.criterion,
        total: samples.len(),
        kept,
    })
}
