use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_CHANNEL_CAPACITY, DEFAULT_OUTPUT_FPS};
use crate::error::{NadirError, Result};
use crate::io::sink::FrameFormat;
use crate::select::SelectionConfig;
use crate::stage::{CleanConfig, OrientConfig};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RunConfig {
    /// Directory of decoded video frames.
    pub frames: PathBuf,
    /// Orientation telemetry CSV, one row per frame.
    pub orientation: PathBuf,
    /// Directory receiving the selected, processed frames.
    pub output: PathBuf,
    /// Encoding of the written frames.
    #[serde(default)]
    pub output_format: FrameFormat,
    #[serde(default)]
    pub selection: SelectionConfig,
    #[serde(default)]
    pub executor: ExecutorConfig,
    /// Roll correction; omitted means no rotation.
    pub orient: Option<OrientConfig>,
    /// Blur cleanup; omitted means no cleanup.
    pub clean: Option<CleanConfig>,
}

impl RunConfig {
    pub fn new(
        frames: impl Into<PathBuf>,
        orientation: impl Into<PathBuf>,
        output: impl Into<PathBuf>,
    ) -> Self {
        Self {
            frames: frames.into(),
            orientation: orientation.into(),
            output: output.into(),
            output_format: FrameFormat::default(),
            selection: SelectionConfig::default(),
            executor: ExecutorConfig::default(),
            orient: None,
            clean: None,
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.selection.criterion.validate()?;
        self.executor.validate()?;
        if let Some(ref clean) = self.clean {
            clean.validate()?;
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutorConfig {
    /// Frames the input channel holds before `feed` blocks.
    pub channel_capacity: usize,
    /// Frame rate handed to the sink.
    pub fps: f64,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
            fps: DEFAULT_OUTPUT_FPS,
        }
    }
}

impl ExecutorConfig {
    pub fn validate(&self) -> Result<()> {
        if self.channel_capacity == 0 {
            return Err(NadirError::InvalidConfig(
                "channel_capacity must be at least 1".into(),
            ));
        }
        if !(self.fps.is_finite() && self.fps > 0.0) {
            return Err(NadirError::InvalidConfig(format!(
                "fps must be positive, got {}",
                self.fps
            )));
        }
        Ok(())
    }
}
