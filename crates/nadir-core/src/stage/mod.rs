//! Per-frame transform stages.
//!
//! A stage is opened once before its first frame, processes frames one at a
//! time on the pipeline worker, and is closed once when the run ends,
//! whatever the reason. The set of concrete stages is closed: chains are
//! built from [`crate::pipeline::config::RunConfig`] by [`build_stages`].

pub mod clean;
pub mod orient;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::frame::{FrameRecord, OrientationSample};
use crate::pipeline::config::RunConfig;

pub use clean::{CleanConfig, CleanStage};
pub use orient::{OrientConfig, OrientStage, RollReference};

pub trait Stage: Send {
    /// Short name used in logs and errors.
    fn name(&self) -> &str;

    /// Acquire resources. Called exactly once, before the first `process`.
    fn open(&mut self) -> Result<()>;

    /// Transform one frame.
    fn process(&mut self, record: FrameRecord) -> Result<FrameRecord>;

    /// Release resources. Called exactly once, also after failures.
    fn close(&mut self) -> Result<()>;
}

/// What the pipeline does when a stage fails on a frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorPolicy {
    /// End the whole run with the stage error.
    #[default]
    Abort,
    /// Drop the offending frame and keep going.
    SkipFrame,
}

impl std::fmt::Display for ErrorPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Abort => write!(f, "Abort"),
            Self::SkipFrame => write!(f, "Skip frame"),
        }
    }
}

/// A stage plus its failure policy, one link of the chain.
pub struct StageSlot {
    pub stage: Box<dyn Stage>,
    pub on_error: ErrorPolicy,
}

impl StageSlot {
    pub fn new(stage: impl Stage + 'static) -> Self {
        Self {
            stage: Box::new(stage),
            on_error: ErrorPolicy::default(),
        }
    }

    pub fn with_policy(mut self, on_error: ErrorPolicy) -> Self {
        self.on_error = on_error;
        self
    }
}

impl std::fmt::Debug for StageSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StageSlot")
            .field("stage", &self.stage.name())
            .field("on_error", &self.on_error)
            .finish()
    }
}

/// Identity stage.
#[derive(Debug, Default)]
pub struct PassThrough;

impl Stage for PassThrough {
    fn name(&self) -> &str {
        "pass-through"
    }

    fn open(&mut self) -> Result<()> {
        Ok(())
    }

    fn process(&mut self, record: FrameRecord) -> Result<FrameRecord> {
        Ok(record)
    }

    fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Build the stage chain for a run: orientation correction, then cleanup.
///
/// `first_sample` is the orientation of the first frame that will enter the
/// pipeline; it anchors `RollReference::FirstFrame`. An empty chain gets a
/// single pass-through stage.
pub fn build_stages(
    config: &RunConfig,
    first_sample: OrientationSample,
) -> Result<Vec<StageSlot>> {
    let mut chain = Vec::new();

    if let Some(ref orient) = config.orient {
        chain.push(
            StageSlot::new(OrientStage::for_run(orient.clone(), first_sample))
                .with_policy(orient.on_error),
        );
    }
    if let Some(ref clean) = config.clean {
        chain.push(StageSlot::new(CleanStage::new(clean.clone())?).with_policy(clean.on_error));
    }
    if chain.is_empty() {
        chain.push(StageSlot::new(PassThrough));
    }

    Ok(chain)
}
