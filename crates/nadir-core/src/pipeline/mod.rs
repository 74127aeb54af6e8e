pub mod config;
mod executor;
mod orchestrator;
mod types;

pub use executor::{Feeder, PipelineHandle, PipelineOutput, StagedPipeline};
pub use orchestrator::{
    process_frames, process_frames_reported, run_pipeline, run_pipeline_reported,
    run_pipeline_with_sink,
};
pub use types::{
    NoOpReporter, PipelineReport, PipelineState, ProgressReporter, RunOutcome, RunPhase,
};
