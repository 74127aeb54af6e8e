//! Single-worker staged pipeline.
//!
//! The feeding side pushes frames into a bounded channel; one worker thread
//! pulls them, runs the stage chain and forwards the result. Shutdown is
//! cooperative: `stop` raises a flag and enqueues an end-of-stream marker, so
//! a worker parked on an empty channel still wakes up.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender, SyncSender};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::JoinHandle;

use tracing::{debug, error, info, warn};

use crate::error::{NadirError, Result};
use crate::frame::FrameRecord;
use crate::io::sink::FrameSink;
use crate::stage::{ErrorPolicy, StageSlot};

use super::types::{PipelineReport, PipelineState};

/// Where processed frames go.
pub enum PipelineOutput {
    Channel(Sender<FrameRecord>),
    Sink(Box<dyn FrameSink>),
}

enum Message {
    Frame(FrameRecord),
    EndOfStream,
}

struct Shared {
    state: Mutex<PipelineState>,
    /// Worker must stop at the next dequeue.
    cancel: AtomicBool,
    /// No more frames are accepted.
    closed: AtomicBool,
}

impl Shared {
    fn new(state: PipelineState) -> Self {
        Self {
            state: Mutex::new(state),
            cancel: AtomicBool::new(false),
            closed: AtomicBool::new(false),
        }
    }

    fn state(&self) -> PipelineState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_state(&self, state: PipelineState) {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = state;
        debug!(%state, "Pipeline state changed");
    }
}

/// Ordered stages with close-exactly-once bookkeeping.
///
/// Dropping an unclosed chain closes it, which covers worker panics and
/// spawn failures.
struct StageChain {
    slots: Vec<StageSlot>,
    /// Number of leading slots whose `open` was attempted.
    opened: usize,
    closed: bool,
}

impl StageChain {
    fn new(slots: Vec<StageSlot>) -> Self {
        Self {
            slots,
            opened: 0,
            closed: false,
        }
    }

    fn open_all(&mut self) -> Result<()> {
        for slot in self.slots.iter_mut() {
            self.opened += 1;
            if let Err(e) = slot.stage.open() {
                let stage = slot.stage.name().to_string();
                error!(%stage, error = %e, "Stage failed to open");
                return Err(NadirError::StageOpen {
                    stage,
                    reason: e.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Run one frame through every stage. `Ok(None)` means a `SkipFrame`
    /// stage dropped it.
    fn run(&mut self, mut record: FrameRecord) -> Result<Option<FrameRecord>> {
        for slot in self.slots.iter_mut() {
            let index = record.index;
            match slot.stage.process(record) {
                Ok(next) => record = next,
                Err(e) => {
                    let stage = slot.stage.name().to_string();
                    return match slot.on_error {
                        ErrorPolicy::SkipFrame => {
                            warn!(%stage, frame = index, error = %e, "Stage failed, frame skipped");
                            Ok(None)
                        }
                        ErrorPolicy::Abort => {
                            error!(%stage, frame = index, error = %e, "Stage failed, aborting run");
                            Err(NadirError::StageFailed {
                                stage,
                                frame: index,
                                reason: e.to_string(),
                            })
                        }
                    };
                }
            }
        }
        Ok(Some(record))
    }

    /// Close every opened stage in chain order. Failures are only logged.
    fn close_all(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        for slot in self.slots.iter_mut().take(self.opened) {
            if let Err(e) = slot.stage.close() {
                warn!(stage = slot.stage.name(), error = %e, "Stage failed to close");
            }
        }
    }
}

impl Drop for StageChain {
    fn drop(&mut self) {
        self.close_all();
    }
}

/// An idle pipeline: a fixed stage chain plus channel settings.
///
/// [`StagedPipeline::start`] consumes it, so a pipeline runs at most once.
pub struct StagedPipeline {
    stages: Vec<StageSlot>,
    output: Option<PipelineOutput>,
    capacity: usize,
}

impl StagedPipeline {
    /// `capacity` bounds the input channel; 0 is raised to 1.
    pub fn new(stages: Vec<StageSlot>, capacity: usize) -> Self {
        Self {
            stages,
            output: None,
            capacity: capacity.max(1),
        }
    }

    pub fn with_output(mut self, output: PipelineOutput) -> Self {
        self.output = Some(output);
        self
    }

    pub fn state(&self) -> PipelineState {
        PipelineState::Idle
    }

    /// Open every stage in order and spawn the worker.
    ///
    /// If a stage fails to open, the stages opened so far (and the failing
    /// one) are closed and no worker is started.
    pub fn start(self) -> Result<PipelineHandle> {
        let StagedPipeline {
            stages,
            mut output,
            capacity,
        } = self;
        let shared = Arc::new(Shared::new(PipelineState::Running));
        let mut chain = StageChain::new(stages);
        info!(stages = chain.slots.len(), capacity, "Starting pipeline");

        if let Err(e) = chain.open_all() {
            shared.set_state(PipelineState::Stopping);
            chain.close_all();
            if let Err(finish_err) = finish_output(&mut output) {
                warn!(error = %finish_err, "Sink failed to finish after a stage failed to open");
            }
            shared.set_state(PipelineState::Stopped);
            return Err(e);
        }

        let (tx, rx) = mpsc::sync_channel(capacity);
        let worker_shared = Arc::clone(&shared);
        let spawned = std::thread::Builder::new()
            .name("nadir-pipeline".into())
            .spawn(move || worker_loop(rx, chain, output, &worker_shared));

        match spawned {
            Ok(worker) => Ok(PipelineHandle {
                tx,
                shared,
                worker: Some(worker),
            }),
            Err(e) => {
                // The chain was dropped with the closure, which closed it.
                shared.set_state(PipelineState::Stopped);
                Err(NadirError::Io(e))
            }
        }
    }
}

/// A running pipeline.
///
/// Dropping the handle without `finish`/`join` stops the worker and waits
/// for it.
pub struct PipelineHandle {
    tx: SyncSender<Message>,
    shared: Arc<Shared>,
    worker: Option<JoinHandle<Result<PipelineReport>>>,
}

impl PipelineHandle {
    /// Enqueue a frame, blocking while the input channel is full.
    pub fn feed(&self, record: FrameRecord) -> Result<()> {
        send_frame(&self.tx, &self.shared, record)
    }

    /// A cloneable feeding endpoint for another thread.
    pub fn feeder(&self) -> Feeder {
        Feeder {
            tx: self.tx.clone(),
            shared: Arc::clone(&self.shared),
        }
    }

    pub fn state(&self) -> PipelineState {
        self.shared.state()
    }

    /// Request cooperative shutdown. Frames still queued are discarded.
    ///
    /// Safe to call repeatedly and from any state. May wait for one free
    /// channel slot, which the worker frees on its next dequeue.
    pub fn stop(&self) {
        if self.shared.cancel.swap(true, Ordering::SeqCst) {
            return;
        }
        self.shared.closed.store(true, Ordering::SeqCst);
        info!("Pipeline stop requested");
        // Fails only when the worker is already gone, which is fine.
        let _ = self.tx.send(Message::EndOfStream);
    }

    /// End the stream, let the worker drain every queued frame, and wait.
    pub fn finish(mut self) -> Result<PipelineReport> {
        self.end_stream();
        self.join_worker()
    }

    /// Wait for the worker to reach `Stopped`.
    ///
    /// Without a prior `stop`, the stream is ended as by `finish`.
    pub fn join(mut self) -> Result<PipelineReport> {
        self.end_stream();
        self.join_worker()
    }

    fn end_stream(&self) {
        if !self.shared.closed.swap(true, Ordering::SeqCst) {
            let _ = self.tx.send(Message::EndOfStream);
        }
    }

    fn join_worker(&mut self) -> Result<PipelineReport> {
        let worker = self.worker.take().ok_or(NadirError::PipelineClosed)?;
        match worker.join() {
            Ok(result) => result,
            Err(_) => {
                error!("Pipeline worker panicked");
                self.shared.set_state(PipelineState::Stopped);
                Err(NadirError::WorkerPanicked)
            }
        }
    }
}

impl Drop for PipelineHandle {
    fn drop(&mut self) {
        if self.worker.is_some() {
            self.stop();
            if let Err(e) = self.join_worker() {
                warn!(error = %e, "Pipeline ended with an error during drop");
            }
        }
    }
}

/// Feeding endpoint that can move to another thread.
#[derive(Clone)]
pub struct Feeder {
    tx: SyncSender<Message>,
    shared: Arc<Shared>,
}

impl Feeder {
    /// Enqueue a frame, blocking while the input channel is full.
    pub fn feed(&self, record: FrameRecord) -> Result<()> {
        send_frame(&self.tx, &self.shared, record)
    }
}

fn send_frame(tx: &SyncSender<Message>, shared: &Shared, record: FrameRecord) -> Result<()> {
    if shared.closed.load(Ordering::SeqCst) {
        return Err(NadirError::PipelineClosed);
    }
    tx.send(Message::Frame(record))
        .map_err(|_| NadirError::PipelineClosed)
}

fn forward(output: &mut Option<PipelineOutput>, record: FrameRecord) -> Result<()> {
    match output {
        Some(PipelineOutput::Channel(tx)) => tx
            .send(record)
            .map_err(|_| NadirError::Sink("output channel disconnected".into())),
        Some(PipelineOutput::Sink(sink)) => sink.write(record),
        None => Ok(()),
    }
}

/// Let a sink output flush and release what it holds. Channel outputs
/// need nothing.
fn finish_output(output: &mut Option<PipelineOutput>) -> Result<()> {
    match output {
        Some(PipelineOutput::Sink(sink)) => sink.finish(),
        _ => Ok(()),
    }
}

fn worker_loop(
    rx: Receiver<Message>,
    mut chain: StageChain,
    mut output: Option<PipelineOutput>,
    shared: &Shared,
) -> Result<PipelineReport> {
    let mut report = PipelineReport::default();
    let mut outcome: Result<()> = Ok(());

    loop {
        let record = match rx.recv() {
            Ok(Message::Frame(record)) => record,
            Ok(Message::EndOfStream) => {
                debug!("End of stream received");
                break;
            }
            Err(_) => {
                debug!("All feeders disconnected");
                break;
            }
        };
        if shared.cancel.load(Ordering::SeqCst) {
            report.discarded += 1;
            break;
        }

        report.received += 1;
        match chain.run(record) {
            Ok(Some(done)) => {
                if let Err(e) = forward(&mut output, done) {
                    error!(error = %e, "Forwarding frame failed, aborting run");
                    outcome = Err(e);
                    break;
                }
                report.forwarded += 1;
            }
            Ok(None) => report.skipped += 1,
            Err(e) => {
                outcome = Err(e);
                break;
            }
        }
    }

    shared.set_state(PipelineState::Stopping);
    shared.closed.store(true, Ordering::SeqCst);
    report.discarded += rx
        .try_iter()
        .filter(|m| matches!(m, Message::Frame(_)))
        .count();
    drop(rx);

    chain.close_all();
    if let Err(e) = finish_output(&mut output) {
        if outcome.is_ok() {
            outcome = Err(e);
        } else {
            warn!(error = %e, "Sink failed to finish after an earlier error");
        }
    }

    shared.set_state(PipelineState::Stopped);
    info!(
        received = report.received,
        forwarded = report.forwarded,
        skipped = report.skipped,
        discarded = report.discarded,
        "Pipeline stopped"
    );
    outcome.map(|_| report)
}
