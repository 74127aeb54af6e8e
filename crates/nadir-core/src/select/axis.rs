use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::geometry::{normalize, Vec3};

/// One of the two body-Z candidate directions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AxisPole {
    PosZ,
    NegZ,
}

impl AxisPole {
    pub fn direction(&self) -> Vec3 {
        match self {
            Self::PosZ => Vec3::POS_Z,
            Self::NegZ => Vec3::NEG_Z,
        }
    }
}

impl std::fmt::Display for AxisPole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PosZ => write!(f, "+Z"),
            Self::NegZ => write!(f, "-Z"),
        }
    }
}

/// Outcome of auto target-axis detection.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AxisChoice {
    pub pole: AxisPole,
    /// Mean dot product of the normalized samples against +Z.
    pub mean_pos_z: f64,
    /// Mean dot product of the normalized samples against -Z.
    pub mean_neg_z: f64,
}

/// Incremental mean, stable for long sequences.
#[derive(Clone, Copy, Debug, Default)]
struct RunningMean {
    mean: f64,
    count: usize,
}

impl RunningMean {
    fn push(&mut self, value: f64) {
        self.count += 1;
        self.mean += (value - self.mean) / self.count as f64;
    }
}

/// Pick the Z pole the camera points toward on average.
///
/// Degenerate samples (zero length or non-finite components) count as the
/// zero vector and contribute a dot of 0 to both means. An exact tie
/// (including an empty sequence) selects -Z.
pub fn detect_target_axis(samples: &[Vec3]) -> AxisChoice {
    let mut pos = RunningMean::default();
    let mut neg = RunningMean::default();
    let mut non_finite = 0usize;

    for sample in samples {
        let (unit, n) = normalize(*sample);
        let unit = if n.is_finite() {
            unit
        } else {
            non_finite += 1;
            Vec3::ZERO
        };
        pos.push(unit.dot(&Vec3::POS_Z));
        neg.push(unit.dot(&Vec3::NEG_Z));
    }
    if non_finite > 0 {
        warn!(non_finite, "Non-finite orientation samples ignored for axis detection");
    }

    let pole = if neg.mean >= pos.mean {
        AxisPole::NegZ
    } else {
        AxisPole::PosZ
    };
    debug!(
        mean_pos_z = pos.mean,
        mean_neg_z = neg.mean,
        %pole,
        "Target axis detected"
    );

    AxisChoice {
        pole,
        mean_pos_z: pos.mean,
        mean_neg_z: neg.mean,
    }
}
