use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::error::{NadirError, Result};
use crate::frame::ColorFrame;

use super::image_io::{list_frame_files, load_color_image};

/// Ordered frames addressable by sequence index.
pub trait FrameSource {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Produce an owned copy of frame `index`.
    fn load(&self, index: usize) -> Result<ColorFrame>;
}

/// In-memory frames keyed by sequence index.
#[derive(Clone, Debug, Default)]
pub struct FrameStore {
    frames: Vec<ColorFrame>,
}

impl FrameStore {
    pub fn new(frames: Vec<ColorFrame>) -> Self {
        Self { frames }
    }

    pub fn push(&mut self, frame: ColorFrame) -> usize {
        self.frames.push(frame);
        self.frames.len() - 1
    }

    pub fn get(&self, index: usize) -> Option<&ColorFrame> {
        self.frames.get(index)
    }
}

impl FrameSource for FrameStore {
    fn len(&self) -> usize {
        self.frames.len()
    }

    fn load(&self, index: usize) -> Result<ColorFrame> {
        self.frames
            .get(index)
            .cloned()
            .ok_or(NadirError::FrameIndexOutOfRange {
                index,
                total: self.frames.len(),
            })
    }
}

/// Frames stored as numbered image files in one directory, decoded on demand.
#[derive(Clone, Debug)]
pub struct ImageDirSource {
    paths: Vec<PathBuf>,
}

impl ImageDirSource {
    pub fn open(dir: &Path) -> Result<Self> {
        let paths = list_frame_files(dir)?;
        info!(dir = %dir.display(), frames = paths.len(), "Frame directory indexed");
        Ok(Self { paths })
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }
}

impl FrameSource for ImageDirSource {
    fn len(&self) -> usize {
        self.paths.len()
    }

    fn load(&self, index: usize) -> Result<ColorFrame> {
        let path = self
            .paths
            .get(index)
            .ok_or(NadirError::FrameIndexOutOfRange {
                index,
                total: self.paths.len(),
            })?;
        load_color_image(path)
    }
}

/// Common length of the frame and orientation streams.
///
/// Anything past the shorter stream is dropped; a mismatch is always
/// reported.
pub fn align_lengths(frame_count: usize, sample_count: usize) -> usize {
    let common = frame_count.min(sample_count);
    if frame_count != sample_count {
        warn!(
            frames = frame_count,
            samples = sample_count,
            truncated_to = common,
            "Frame and orientation counts differ, truncating"
        );
    }
    common
}
