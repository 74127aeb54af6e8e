use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Args, ValueEnum};
use nadir_core::filters::rotate::RotationDirection;
use nadir_core::geometry::ProjectionPlane;
use nadir_core::io::sink::{DiscardSink, FrameFormat};
use nadir_core::pipeline::config::{ExecutorConfig, RunConfig};
use nadir_core::pipeline::{run_pipeline_reported, run_pipeline_with_sink, RunOutcome};
use nadir_core::stage::{CleanConfig, ErrorPolicy, OrientConfig, RollReference};

use super::select::{write_report, SelectionArgs};
use crate::progress::BarReporter;
use crate::summary::{print_run_summary, print_selection_report};

#[derive(Clone, ValueEnum)]
pub enum ReferenceArg {
    FirstFrame,
    AbsoluteZero,
}

#[derive(Clone, ValueEnum)]
pub enum DirectionArg {
    Clockwise,
    CounterClockwise,
}

#[derive(Clone, ValueEnum)]
pub enum PlaneArg {
    Xy,
    Xz,
    Yz,
}

#[derive(Clone, ValueEnum)]
pub enum FormatArg {
    Png,
    Tiff,
}

#[derive(Args)]
pub struct RunArgs {
    /// Directory of decoded video frames
    #[arg(required_unless_present = "config")]
    pub frames: Option<PathBuf>,

    /// Orientation CSV (header row, then x,y,z per frame)
    #[arg(required_unless_present = "config")]
    pub orientation: Option<PathBuf>,

    /// Run config file (TOML); other run options are ignored when given
    #[arg(long)]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub selection: SelectionArgs,

    /// Rotate frames so their roll matches a common zero
    #[arg(long)]
    pub orient: bool,

    /// Roll zero used by --orient
    #[arg(long, value_enum, default_value = "first-frame")]
    pub reference: ReferenceArg,

    /// Sense in which --orient applies its correction
    #[arg(long, value_enum, default_value = "clockwise")]
    pub direction: DirectionArg,

    /// Body plane the roll angle is read in
    #[arg(long, value_enum, default_value = "xy")]
    pub plane: PlaneArg,

    /// Calibration roll (degrees) for --reference absolute-zero
    #[arg(long, default_value = "0.0")]
    pub calibration: f64,

    /// Replace blurred pixels with a local median
    #[arg(long)]
    pub clean: bool,

    /// Percent of lowest edge-strength pixels treated as blurred (required with --clean)
    #[arg(long)]
    pub blur_percentile: Option<f32>,

    /// Median neighborhood size for --clean (odd)
    #[arg(long, default_value = "3")]
    pub median_window: usize,

    /// Skip frames a stage fails on instead of aborting
    #[arg(long)]
    pub skip_failed_frames: bool,

    /// Frames buffered between reader and worker
    #[arg(long, default_value = "8")]
    pub capacity: usize,

    /// Frame rate of the output sequence
    #[arg(long, default_value = "30.0")]
    pub fps: f64,

    /// Process frames but write nothing
    #[arg(long)]
    pub dry_run: bool,

    /// Write the selection report as JSON
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Output directory for the selected frames
    #[arg(short, long, default_value = "selected")]
    pub output: PathBuf,

    /// Image format of the written frames (tiff keeps 16 bits per channel)
    #[arg(long, value_enum, default_value = "png")]
    pub format: FormatArg,
}

pub fn run(args: &RunArgs) -> Result<()> {
    let config: RunConfig = if let Some(ref config_path) = args.config {
        let contents = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config {}", config_path.display()))?;
        toml::from_str(&contents).context("Invalid run config")?
    } else {
        build_config_from_args(args)?
    };

    print_run_summary(&config, args.dry_run);

    let reporter = Arc::new(BarReporter::new()?);
    let outcome = if args.dry_run {
        run_pipeline_with_sink(&config, Box::new(DiscardSink::new()), reporter.clone())
    } else {
        run_pipeline_reported(&config, reporter.clone())
    };
    reporter.finish();
    let outcome = outcome.context("Run failed")?;

    print_selection_report(outcome.selection());
    if let Some(ref path) = args.report {
        write_report(outcome.selection(), path)?;
    }

    match outcome {
        RunOutcome::Completed { pipeline, .. } => {
            println!(
                "\nProcessed {} frame(s), wrote {}, skipped {}.",
                pipeline.received, pipeline.forwarded, pipeline.skipped
            );
            if !args.dry_run {
                println!("Output saved to {}", config.output.display());
            }
        }
        RunOutcome::NoFramesSelected { .. } => {
            println!(
                "\nNo frames met the criterion. Try a larger --max-angle or use --top-percent."
            );
        }
    }

    Ok(())
}

fn build_config_from_args(args: &RunArgs) -> Result<RunConfig> {
    let on_error = if args.skip_failed_frames {
        ErrorPolicy::SkipFrame
    } else {
        ErrorPolicy::Abort
    };

    let orient = args.orient.then(|| OrientConfig {
        reference: match args.reference {
            ReferenceArg::FirstFrame => RollReference::FirstFrame,
            ReferenceArg::AbsoluteZero => RollReference::AbsoluteZero,
        },
        direction: match args.direction {
            DirectionArg::Clockwise => RotationDirection::Clockwise,
            DirectionArg::CounterClockwise => RotationDirection::CounterClockwise,
        },
        plane: match args.plane {
            PlaneArg::Xy => ProjectionPlane::XY,
            PlaneArg::Xz => ProjectionPlane::XZ,
            PlaneArg::Yz => ProjectionPlane::YZ,
        },
        calibration_degrees: args.calibration,
        on_error,
    });

    let clean = if args.clean {
        let Some(blur_percentile) = args.blur_percentile else {
            bail!("--clean needs an explicit --blur-percentile");
        };
        Some(CleanConfig {
            blur_percentile,
            median_window: args.median_window,
            on_error,
        })
    } else {
        None
    };

    let frames = args
        .frames
        .as_ref()
        .context("Missing frames directory")?;
    let orientation = args
        .orientation
        .as_ref()
        .context("Missing orientation CSV")?;

    let mut config = RunConfig::new(frames, orientation, &args.output);
    config.output_format = match args.format {
        FormatArg::Png => FrameFormat::Png,
        FormatArg::Tiff => FrameFormat::Tiff,
    };
    config.selection = args.selection.to_config()?;
    config.executor = ExecutorConfig {
        channel_capacity: args.capacity,
        fps: args.fps,
    };
    config.orient = orient;
    config.clean = clean;
    Ok(config)
}
