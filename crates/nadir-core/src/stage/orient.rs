use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{NadirError, Result};
use crate::filters::rotate::{rotate_color, RotationDirection};
use crate::frame::{FrameRecord, OrientationSample};
use crate::geometry::{roll_degrees, wrap_degrees, ProjectionPlane};

use super::{ErrorPolicy, Stage};

/// Where roll angle zero is taken from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RollReference {
    /// Roll of the first frame entering the pipeline.
    #[default]
    FirstFrame,
    /// The fixed calibration angle in `OrientConfig::calibration_degrees`.
    AbsoluteZero,
}

impl std::fmt::Display for RollReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FirstFrame => write!(f, "First frame"),
            Self::AbsoluteZero => write!(f, "Absolute zero"),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct OrientConfig {
    #[serde(default)]
    pub reference: RollReference,
    /// Sense in which the correction angle is applied to the image.
    #[serde(default)]
    pub direction: RotationDirection,
    /// Body plane the sample is projected onto to read its roll.
    #[serde(default)]
    pub plane: ProjectionPlane,
    /// Roll treated as zero under `RollReference::AbsoluteZero`.
    #[serde(default)]
    pub calibration_degrees: f64,
    #[serde(default)]
    pub on_error: ErrorPolicy,
}

/// Rotates each frame so its roll matches a fixed zero.
///
/// The correction is `wrap360(roll - zero)` degrees, applied in the
/// configured direction. Frames whose roll is undefined pass through.
#[derive(Debug)]
pub struct OrientStage {
    config: OrientConfig,
    zero_degrees: Option<f64>,
    opened: bool,
}

impl OrientStage {
    /// Stage anchored on an explicit zero roll (degrees).
    pub fn new(config: OrientConfig, zero_degrees: f64) -> Self {
        Self {
            config,
            zero_degrees: Some(wrap_degrees(zero_degrees)),
            opened: false,
        }
    }

    /// Resolve the zero from the configured reference.
    ///
    /// Under `FirstFrame` the zero is the roll of `first_sample`; if that
    /// roll is undefined the zero falls back to 0 degrees.
    pub fn for_run(config: OrientConfig, first_sample: OrientationSample) -> Self {
        let zero = match config.reference {
            RollReference::AbsoluteZero => config.calibration_degrees,
            RollReference::FirstFrame => {
                roll_degrees(first_sample, config.plane).unwrap_or_else(|| {
                    debug!("First frame has no roll, using 0 as reference");
                    0.0
                })
            }
        };
        Self::new(config, zero)
    }

    pub fn zero_degrees(&self) -> f64 {
        self.zero_degrees.unwrap_or(0.0)
    }

    /// Correction angle (degrees, in the configured direction) for `sample`.
    pub fn correction_degrees(&self, sample: OrientationSample) -> Option<f64> {
        let roll = roll_degrees(sample, self.config.plane)?;
        Some(wrap_degrees(roll - self.zero_degrees()))
    }
}

impl Stage for OrientStage {
    fn name(&self) -> &str {
        "orient"
    }

    fn open(&mut self) -> Result<()> {
        if !self.zero_degrees().is_finite() {
            return Err(NadirError::InvalidConfig(
                "roll reference is not a finite angle".into(),
            ));
        }
        self.opened = true;
        Ok(())
    }

    fn process(&mut self, mut record: FrameRecord) -> Result<FrameRecord> {
        if !self.opened {
            return Err(NadirError::StageNotOpen(self.name().into()));
        }
        match self.correction_degrees(record.sample) {
            Some(correction) => {
                let ccw = self.config.direction.to_ccw(correction);
                record.image = rotate_color(&record.image, ccw);
            }
            None => debug!(frame = record.index, "Roll undefined, frame left unrotated"),
        }
        Ok(record)
    }

    fn close(&mut self) -> Result<()> {
        self.opened = false;
        Ok(())
    }
}
