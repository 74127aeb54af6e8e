use ndarray::Array2;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::consts::DEFAULT_MEDIAN_WINDOW;
use crate::error::{NadirError, Result};
use crate::filters::edge::{edge_strength, percentile_value};
use crate::filters::median::median_filter_masked;
use crate::frame::{luminance, ColorFrame, Frame, FrameRecord};

use super::{ErrorPolicy, Stage};

fn default_median_window() -> usize {
    DEFAULT_MEDIAN_WINDOW
}

/// Blur cleanup settings.
///
/// `blur_percentile` has no default: the fraction of pixels treated as
/// blurred must be chosen per footage.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CleanConfig {
    /// Percent (0..=100) of lowest edge-strength pixels flagged as blurred.
    pub blur_percentile: f32,
    /// Side of the square median neighborhood, odd.
    #[serde(default = "default_median_window")]
    pub median_window: usize,
    #[serde(default)]
    pub on_error: ErrorPolicy,
}

impl CleanConfig {
    pub fn new(blur_percentile: f32) -> Self {
        Self {
            blur_percentile,
            median_window: DEFAULT_MEDIAN_WINDOW,
            on_error: ErrorPolicy::default(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=100.0).contains(&self.blur_percentile) {
            return Err(NadirError::InvalidConfig(format!(
                "blur_percentile must be within 0..=100, got {}",
                self.blur_percentile
            )));
        }
        if self.median_window == 0 || self.median_window % 2 == 0 {
            return Err(NadirError::InvalidConfig(format!(
                "median_window must be odd, got {}",
                self.median_window
            )));
        }
        Ok(())
    }
}

/// Replaces low-detail (blurred) pixels with a per-channel median.
///
/// Blur is judged on luminance edge strength; pixels below the configured
/// percentile are replaced, each channel filtered on its own.
#[derive(Debug)]
pub struct CleanStage {
    config: CleanConfig,
    scratch: Option<Vec<f32>>,
}

impl CleanStage {
    pub fn new(config: CleanConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            scratch: None,
        })
    }

    /// Pixels considered blurred in `image`.
    ///
    /// A pixel is flagged when its edge strength is strictly below the
    /// percentile value, so at most `floor(n * p / 100)` pixels are flagged
    /// and ties at the threshold are never included.
    pub fn blur_mask(&self, image: &ColorFrame) -> Array2<bool> {
        let edges = edge_strength(&luminance(image).data);
        if self.config.blur_percentile <= 0.0 {
            return edges.mapv(|_| false);
        }
        let mut values: Vec<f32> = edges.iter().copied().collect();
        match percentile_value(&mut values, self.config.blur_percentile) {
            Some(threshold) => edges.mapv(|e| e < threshold),
            None => edges.mapv(|_| false),
        }
    }
}

impl Stage for CleanStage {
    fn name(&self) -> &str {
        "clean"
    }

    fn open(&mut self) -> Result<()> {
        let window = self.config.median_window;
        self.scratch = Some(Vec::with_capacity(window * window));
        Ok(())
    }

    fn process(&mut self, mut record: FrameRecord) -> Result<FrameRecord> {
        if self.scratch.is_none() {
            return Err(NadirError::StageNotOpen(self.name().into()));
        }
        let mask = self.blur_mask(&record.image);
        let window = self.config.median_window;
        let scratch = self
            .scratch
            .as_mut()
            .ok_or_else(|| NadirError::StageNotOpen("clean".into()))?;

        let flagged = mask.iter().filter(|&&m| m).count();
        trace!(frame = record.index, flagged, "Blur mask computed");

        // Green and blue get their own buffers so the channels run in parallel.
        let image = &record.image;
        let (red, (green, blue)) = rayon::join(
            || clean_channel(&image.red, &mask, window, scratch),
            || {
                rayon::join(
                    || clean_channel(&image.green, &mask, window, &mut Vec::new()),
                    || clean_channel(&image.blue, &mask, window, &mut Vec::new()),
                )
            },
        );
        record.image = ColorFrame { red, green, blue };
        Ok(record)
    }

    fn close(&mut self) -> Result<()> {
        self.scratch = None;
        Ok(())
    }
}

fn clean_channel(
    channel: &Frame,
    mask: &Array2<bool>,
    window: usize,
    scratch: &mut Vec<f32>,
) -> Frame {
    Frame::new(
        median_filter_masked(&channel.data, mask, window, scratch),
        channel.original_bit_depth,
    )
}
