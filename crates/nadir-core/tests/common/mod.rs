use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use ndarray::Array2;

use nadir_core::error::{NadirError, Result};
use nadir_core::frame::{ColorFrame, Frame, FrameRecord};
use nadir_core::geometry::Vec3;
use nadir_core::io::sink::FrameSink;
use nadir_core::io::source::{FrameSource, FrameStore};
use nadir_core::stage::Stage;

/// Uniform gray color frame.
pub fn gray_frame(height: usize, width: usize, value: f32) -> ColorFrame {
    ColorFrame::from_gray(Frame::new(Array2::from_elem((height, width), value), 8))
}

/// Small frame whose pixel value encodes `index`, so order can be checked.
pub fn tagged_frame(index: usize) -> ColorFrame {
    gray_frame(2, 2, index as f32 / 1000.0)
}

pub fn record(index: usize) -> FrameRecord {
    FrameRecord::new(index, tagged_frame(index), Vec3::NEG_Z)
}

/// Sample at `degrees` away from -Z, tilted toward +X.
pub fn sample_at_angle_from_neg_z(degrees: f64) -> Vec3 {
    let r = degrees.to_radians();
    Vec3::new(r.sin(), 0.0, -r.cos())
}

/// Samples with angles 0, 10, ..., 10*(n-1) degrees from -Z.
pub fn increasing_angle_samples(n: usize) -> Vec<Vec3> {
    (0..n)
        .map(|i| sample_at_angle_from_neg_z(i as f64 * 10.0))
        .collect()
}

pub fn frame_store(n: usize) -> FrameStore {
    FrameStore::new((0..n).map(tagged_frame).collect())
}

/// Call counters shared between a test and its stage.
#[derive(Default)]
pub struct CallLog {
    pub opens: AtomicUsize,
    pub processes: AtomicUsize,
    pub closes: AtomicUsize,
}

impl CallLog {
    pub fn opens(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }

    pub fn processes(&self) -> usize {
        self.processes.load(Ordering::SeqCst)
    }

    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }
}

/// Identity stage that records calls and can be told to misbehave.
pub struct TrackedStage {
    pub log: Arc<CallLog>,
    pub fail_on_frame: Option<usize>,
    pub fail_open: bool,
    pub fail_close: bool,
    pub delay: Option<Duration>,
}

impl TrackedStage {
    pub fn new(log: Arc<CallLog>) -> Self {
        Self {
            log,
            fail_on_frame: None,
            fail_open: false,
            fail_close: false,
            delay: None,
        }
    }
}

impl Stage for TrackedStage {
    fn name(&self) -> &str {
        "tracked"
    }

    fn open(&mut self) -> Result<()> {
        self.log.opens.fetch_add(1, Ordering::SeqCst);
        if self.fail_open {
            return Err(NadirError::InvalidConfig("tracked open failure".into()));
        }
        Ok(())
    }

    fn process(&mut self, record: FrameRecord) -> Result<FrameRecord> {
        self.log.processes.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            thread::sleep(delay);
        }
        if self.fail_on_frame == Some(record.index) {
            return Err(NadirError::InvalidConfig("tracked process failure".into()));
        }
        Ok(record)
    }

    fn close(&mut self) -> Result<()> {
        self.log.closes.fetch_add(1, Ordering::SeqCst);
        if self.fail_close {
            return Err(NadirError::InvalidConfig("tracked close failure".into()));
        }
        Ok(())
    }
}

/// Stage adding a constant to the red channel.
pub struct AddRed(pub f32);

impl Stage for AddRed {
    fn name(&self) -> &str {
        "add-red"
    }

    fn open(&mut self) -> Result<()> {
        Ok(())
    }

    fn process(&mut self, mut record: FrameRecord) -> Result<FrameRecord> {
        record.image.red.data.mapv_inplace(|v| v + self.0);
        Ok(record)
    }

    fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Stage multiplying the red channel by a constant.
pub struct ScaleRed(pub f32);

impl Stage for ScaleRed {
    fn name(&self) -> &str {
        "scale-red"
    }

    fn open(&mut self) -> Result<()> {
        Ok(())
    }

    fn process(&mut self, mut record: FrameRecord) -> Result<FrameRecord> {
        record.image.red.data.mapv_inplace(|v| v * self.0);
        Ok(record)
    }

    fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Frame source counting how many frames were loaded.
pub struct CountingSource {
    pub store: FrameStore,
    pub loads: Arc<AtomicUsize>,
    pub fail_on: Option<usize>,
}

impl CountingSource {
    pub fn new(n: usize) -> Self {
        Self {
            store: frame_store(n),
            loads: Arc::new(AtomicUsize::new(0)),
            fail_on: None,
        }
    }
}

impl FrameSource for CountingSource {
    fn len(&self) -> usize {
        self.store.len()
    }

    fn load(&self, index: usize) -> Result<ColorFrame> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        if self.fail_on == Some(index) {
            return Err(NadirError::FrameIndexOutOfRange { index, total: 0 });
        }
        self.store.load(index)
    }
}

/// Sink that records its lifecycle and can refuse to open, either with a
/// plain sink error or as already unavailable.
pub struct RecordingSink {
    pub opened: Arc<AtomicBool>,
    pub finished: Arc<AtomicBool>,
    pub written: Arc<AtomicUsize>,
    pub refuse_open: bool,
    pub unavailable: bool,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self {
            opened: Arc::new(AtomicBool::new(false)),
            finished: Arc::new(AtomicBool::new(false)),
            written: Arc::new(AtomicUsize::new(0)),
            refuse_open: false,
            unavailable: false,
        }
    }
}

impl FrameSink for RecordingSink {
    fn open(&mut self, _fps: f64) -> Result<()> {
        if self.unavailable {
            return Err(NadirError::SinkUnavailable("no encoder".into()));
        }
        if self.refuse_open {
            return Err(NadirError::Sink("encoder missing".into()));
        }
        self.opened.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn write(&mut self, _record: FrameRecord) -> Result<()> {
        self.written.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.finished.store(true, Ordering::SeqCst);
        Ok(())
    }
}
