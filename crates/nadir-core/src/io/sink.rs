//! Output collaborators for the pipeline.
//!
//! A sink receives surviving frames in arrival order together with the
//! frame rate the output sequence should play at. Container encoding is left
//! to whatever consumes the sink's result.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::consts::SEQUENCE_MANIFEST_NAME;
use crate::error::{NadirError, Result};
use crate::frame::FrameRecord;

use super::image_io::save_color_image;

pub trait FrameSink: Send {
    /// Prepare to receive frames. Failure here aborts the run before any
    /// frame is read.
    fn open(&mut self, fps: f64) -> Result<()>;

    fn write(&mut self, record: FrameRecord) -> Result<()>;

    /// Flush whatever was buffered.
    fn finish(&mut self) -> Result<()>;
}

/// Frames buffered for a downstream encoder.
#[derive(Clone, Debug, Default)]
pub struct BufferedSequence {
    pub fps: f64,
    pub frames: Vec<FrameRecord>,
    pub finished: bool,
}

/// Keeps every frame in memory. The buffer stays reachable through
/// [`MemorySink::buffer`] after the sink moves into the pipeline.
#[derive(Clone, Debug, Default)]
pub struct MemorySink {
    buffer: Arc<Mutex<BufferedSequence>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn buffer(&self) -> Arc<Mutex<BufferedSequence>> {
        Arc::clone(&self.buffer)
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, BufferedSequence>> {
        self.buffer
            .lock()
            .map_err(|_| NadirError::Sink("memory buffer poisoned".into()))
    }
}

impl FrameSink for MemorySink {
    fn open(&mut self, fps: f64) -> Result<()> {
        let mut buffer = self.lock()?;
        buffer.fps = fps;
        buffer.frames.clear();
        buffer.finished = false;
        Ok(())
    }

    fn write(&mut self, record: FrameRecord) -> Result<()> {
        self.lock()?.frames.push(record);
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.lock()?.finished = true;
        Ok(())
    }
}

/// Counts frames and drops them.
#[derive(Clone, Debug, Default)]
pub struct DiscardSink {
    count: Arc<AtomicUsize>,
}

impl DiscardSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.count)
    }
}

impl FrameSink for DiscardSink {
    fn open(&mut self, _fps: f64) -> Result<()> {
        Ok(())
    }

    fn write(&mut self, _record: FrameRecord) -> Result<()> {
        self.count.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        Ok(())
    }
}

/// One persisted frame in a [`SequenceManifest`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub file: String,
    pub source_index: usize,
}

/// Written next to the frame files so an encoder knows rate and origin.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SequenceManifest {
    pub fps: f64,
    pub frames: Vec<ManifestEntry>,
}

/// Still-image encoding used by [`ImageDirSink`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FrameFormat {
    /// 8-bit RGB PNG.
    #[default]
    Png,
    /// 16-bit RGB TIFF, keeping the precision of deep sources.
    Tiff,
}

impl FrameFormat {
    pub fn extension(self) -> &'static str {
        match self {
            FrameFormat::Png => "png",
            FrameFormat::Tiff => "tif",
        }
    }
}

impl fmt::Display for FrameFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameFormat::Png => write!(f, "PNG"),
            FrameFormat::Tiff => write!(f, "TIFF"),
        }
    }
}

/// Persists frames as `frame_00000.png`, `frame_00001.png`, ... numbered in
/// output order, plus a `sequence.toml` manifest on finish. The extension
/// follows the sink's [`FrameFormat`].
#[derive(Debug)]
pub struct ImageDirSink {
    dir: PathBuf,
    format: FrameFormat,
    manifest: SequenceManifest,
    opened: bool,
}

impl ImageDirSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            format: FrameFormat::default(),
            manifest: SequenceManifest::default(),
            opened: false,
        }
    }

    pub fn with_format(mut self, format: FrameFormat) -> Self {
        self.format = format;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn format(&self) -> FrameFormat {
        self.format
    }

    /// File name of the frame written at output `position`.
    pub fn frame_file_name(&self, position: usize) -> String {
        format!("frame_{position:05}.{}", self.format.extension())
    }
}

impl FrameSink for ImageDirSink {
    fn open(&mut self, fps: f64) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        if !self.dir.is_dir() {
            return Err(NadirError::SinkUnavailable(format!(
                "{} is not a directory",
                self.dir.display()
            )));
        }
        self.manifest = SequenceManifest {
            fps,
            frames: Vec::new(),
        };
        self.opened = true;
        debug!(
            dir = %self.dir.display(),
            format = %self.format,
            fps,
            "Frame directory sink opened"
        );
        Ok(())
    }

    fn write(&mut self, record: FrameRecord) -> Result<()> {
        if !self.opened {
            return Err(NadirError::Sink("frame directory sink not opened".into()));
        }
        let file = self.frame_file_name(self.manifest.frames.len());
        save_color_image(&record.image, &self.dir.join(&file))?;
        self.manifest.frames.push(ManifestEntry {
            file,
            source_index: record.index,
        });
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        if !self.opened {
            return Ok(());
        }
        let text = toml::to_string_pretty(&self.manifest)
            .map_err(|e| NadirError::Sink(format!("manifest encoding failed: {e}")))?;
        std::fs::write(self.dir.join(SEQUENCE_MANIFEST_NAME), text)?;
        info!(
            frames = self.manifest.frames.len(),
            fps = self.manifest.fps,
            dir = %self.dir.display(),
            "Frame sequence written"
        );
        self.opened = false;
        Ok(())
    }
}
