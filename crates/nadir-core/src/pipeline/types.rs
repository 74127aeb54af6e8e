use serde::Serialize;

use crate::select::SelectionReport;

/// Lifecycle of a [`super::StagedPipeline`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum PipelineState {
    Idle,
    Running,
    Stopping,
    Stopped,
}

impl std::fmt::Display for PipelineState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "Idle"),
            Self::Running => write!(f, "Running"),
            Self::Stopping => write!(f, "Stopping"),
            Self::Stopped => write!(f, "Stopped"),
        }
    }
}

/// Frame accounting for one pipeline run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct PipelineReport {
    /// Frames taken off the input channel and run through the chain.
    pub received: usize,
    /// Frames handed to the output.
    pub forwarded: usize,
    /// Frames dropped by a `SkipFrame` stage failure.
    pub skipped: usize,
    /// Frames still queued (or dequeued) when cancellation was observed.
    pub discarded: usize,
}

/// Result of a complete selection + processing run.
#[derive(Clone, Debug)]
pub enum RunOutcome {
    Completed {
        selection: SelectionReport,
        pipeline: PipelineReport,
    },
    /// Nothing met the selection criterion; the pipeline never started.
    NoFramesSelected { selection: SelectionReport },
}

impl RunOutcome {
    pub fn selection(&self) -> &SelectionReport {
        match self {
            Self::Completed { selection, .. } | Self::NoFramesSelected { selection } => selection,
        }
    }
}

/// Phase of a run, used for progress reporting.
#[derive(Clone, Copy, Debug)]
pub enum RunPhase {
    Loading,
    Selection,
    Processing,
}

impl std::fmt::Display for RunPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Loading => write!(f, "Loading inputs"),
            Self::Selection => write!(f, "Selecting frames"),
            Self::Processing => write!(f, "Processing frames"),
        }
    }
}

/// Thread-safe progress reporting for a run.
///
/// Implementors can use this to drive progress bars, logging, or any other
/// UI feedback. All methods have default no-op implementations.
pub trait ProgressReporter: Send + Sync {
    /// A new phase has started. `total_items` is the number of work items
    /// in this phase, if known.
    fn begin_phase(&self, _phase: RunPhase, _total_items: Option<usize>) {}

    /// Work items completed so far within the current phase.
    fn advance(&self, _items_done: usize) {}

    /// The current phase is finished.
    fn finish_phase(&self) {}
}

/// Progress reporter that ignores every event.
pub struct NoOpReporter;
impl ProgressReporter for NoOpReporter {}
