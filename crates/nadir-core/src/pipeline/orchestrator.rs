use std::sync::Arc;

use tracing::{info, warn};

use crate::error::{NadirError, Result};
use crate::frame::{FrameRecord, OrientationSample};
use crate::io::orientation::load_orientation_csv;
use crate::io::sink::{FrameSink, ImageDirSink};
use crate::io::source::{align_lengths, FrameSource, ImageDirSource};
use crate::select::select_frames;
use crate::stage::build_stages;

use super::config::RunConfig;
use super::executor::{PipelineOutput, StagedPipeline};
use super::types::{NoOpReporter, ProgressReporter, RunOutcome, RunPhase};

/// Select and process frames supplied by external collaborators.
///
/// Frames and samples are truncated to their common length, selection runs
/// over the whole orientation stream, and only the kept frames are loaded
/// and fed to the pipeline, in temporal order. The sink is opened before
/// any frame is loaded; if it cannot be opened the run fails with
/// `SinkUnavailable`. Stage configuration errors are reported before the
/// sink is touched.
pub fn process_frames_reported(
    source: &dyn FrameSource,
    samples: &[OrientationSample],
    config: &RunConfig,
    mut sink: Box<dyn FrameSink>,
    reporter: Arc<dyn ProgressReporter>,
) -> Result<RunOutcome> {
    config.validate()?;

    let total = align_lengths(source.len(), samples.len());
    if total == 0 {
        return Err(NadirError::EmptySequence);
    }
    let samples = &samples[..total];

    reporter.begin_phase(RunPhase::Selection, Some(total));
    let selection = select_frames(samples, &config.selection)?;
    reporter.finish_phase();

    let first = match selection.kept.first() {
        Some(&index) => samples[index],
        None => {
            warn!(
                criterion = %selection.criterion,
                total,
                "No frames met the selection criterion"
            );
            return Ok(RunOutcome::NoFramesSelected { selection });
        }
    };

    let stages = build_stages(config, first)?;
    sink.open(config.executor.fps).map_err(|e| match e {
        NadirError::SinkUnavailable(_) => e,
        other => NadirError::SinkUnavailable(other.to_string()),
    })?;

    let handle = StagedPipeline::new(stages, config.executor.channel_capacity)
        .with_output(PipelineOutput::Sink(sink))
        .start()?;

    let kept_count = selection.kept_count();
    reporter.begin_phase(RunPhase::Processing, Some(kept_count));
    for (done, &index) in selection.kept.iter().enumerate() {
        let image = match source.load(index) {
            Ok(image) => image,
            Err(e) => {
                handle.stop();
                if let Err(worker_err) = handle.join() {
                    warn!(error = %worker_err, "Pipeline also failed while stopping");
                }
                return Err(e);
            }
        };
        if handle
            .feed(FrameRecord::new(index, image, samples[index]))
            .is_err()
        {
            // The worker ended early; joining surfaces its error.
            warn!(frame = index, "Pipeline closed before all frames were fed");
            break;
        }
        reporter.advance(done + 1);
    }
    let report = handle.finish()?;
    reporter.finish_phase();

    info!(
        kept = kept_count,
        written = report.forwarded,
        total,
        "Run complete"
    );
    Ok(RunOutcome::Completed {
        selection,
        pipeline: report,
    })
}

/// [`process_frames_reported`] without progress reporting.
pub fn process_frames(
    source: &dyn FrameSource,
    samples: &[OrientationSample],
    config: &RunConfig,
    sink: Box<dyn FrameSink>,
) -> Result<RunOutcome> {
    process_frames_reported(source, samples, config, sink, Arc::new(NoOpReporter))
}

/// Run the whole job described by `config`: read the frame directory and
/// orientation CSV, select, process, and hand the kept frames to `sink`.
pub fn run_pipeline_with_sink(
    config: &RunConfig,
    sink: Box<dyn FrameSink>,
    reporter: Arc<dyn ProgressReporter>,
) -> Result<RunOutcome> {
    reporter.begin_phase(RunPhase::Loading, None);
    let samples = load_orientation_csv(&config.orientation)?;
    let source = ImageDirSource::open(&config.frames)?;
    reporter.finish_phase();
    info!(
        frames = source.len(),
        samples = samples.len(),
        "Inputs loaded"
    );

    process_frames_reported(&source, &samples, config, sink, reporter)
}

/// [`run_pipeline_with_sink`] writing to the configured output directory.
pub fn run_pipeline_reported(
    config: &RunConfig,
    reporter: Arc<dyn ProgressReporter>,
) -> Result<RunOutcome> {
    let sink = ImageDirSink::new(&config.output).with_format(config.output_format);
    run_pipeline_with_sink(config, Box::new(sink), reporter)
}

/// Run the whole job described by `config`.
pub fn run_pipeline(config: &RunConfig) -> Result<RunOutcome> {
    run_pipeline_reported(config, Arc::new(NoOpReporter))
}
