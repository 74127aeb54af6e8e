use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Args;
use nadir_core::geometry::Vec3;
use nadir_core::io::orientation::load_orientation_csv;
use nadir_core::select::{
    compute_angles, select_frames, SelectionConfig, SelectionCriterion, SelectionReport,
    TargetConfig,
};

use crate::summary::print_selection_report;

/// Selection options shared by `select` and `run`.
#[derive(Args)]
pub struct SelectionArgs {
    /// Keep frames within this angle (degrees) of the target
    #[arg(long, default_value = "5.0", conflicts_with = "top_percent")]
    pub max_angle: f64,

    /// Keep this percentage (0-100] of frames closest to the target instead
    #[arg(long)]
    pub top_percent: Option<f64>,

    /// Explicit target direction "x,y,z" (default: auto-detect +Z / -Z)
    #[arg(long)]
    pub target: Option<String>,
}

impl SelectionArgs {
    pub fn to_config(&self) -> Result<SelectionConfig> {
        let criterion = match self.top_percent {
            Some(percent) => SelectionCriterion::TopPercentile {
                fraction: percent / 100.0,
            },
            None => SelectionCriterion::AbsoluteAngle {
                max_degrees: self.max_angle,
            },
        };
        let target = match self.target {
            Some(ref text) => TargetConfig::Explicit {
                direction: parse_vector(text)?,
            },
            None => TargetConfig::Auto,
        };
        Ok(SelectionConfig { target, criterion })
    }
}

#[derive(Args)]
pub struct SelectArgs {
    /// Orientation CSV (header row, then x,y,z per frame)
    pub orientation: PathBuf,

    #[command(flatten)]
    pub selection: SelectionArgs,

    /// Show at most N kept frames
    #[arg(long, default_value = "20")]
    pub top: usize,

    /// Write the selection report as JSON
    #[arg(long)]
    pub report: Option<PathBuf>,
}

pub fn run(args: &SelectArgs) -> Result<()> {
    let samples = load_orientation_csv(&args.orientation)?;
    let config = args.selection.to_config()?;
    let report = select_frames(&samples, &config)?;

    print_selection_report(&report);

    if report.is_empty() {
        println!(
            "\nNo frames met the criterion. Try a larger --max-angle or use --top-percent."
        );
    } else {
        let angles = compute_angles(&samples, report.target);
        println!(
            "\nKept frames (first {} of {}):",
            args.top.min(report.kept_count()),
            report.kept_count()
        );
        println!("{:>8}  {:>10}", "Frame #", "Angle");
        println!("{}", "-".repeat(20));
        for &idx in report.kept.iter().take(args.top) {
            println!("{:>8}  {:>9.3}\u{b0}", idx, angles[idx]);
        }
    }

    if let Some(ref path) = args.report {
        write_report(&report, path)?;
        println!("\nReport saved to {}", path.display());
    }

    Ok(())
}

pub fn write_report(report: &SelectionReport, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write report {}", path.display()))?;
    Ok(())
}

fn parse_vector(text: &str) -> Result<Vec3> {
    let parts: Vec<f64> = text
        .split(',')
        .map(|s| s.trim().parse::<f64>())
        .collect::<std::result::Result<_, _>>()
        .with_context(|| format!("Invalid vector '{text}'"))?;
    match parts.as_slice() {
        [x, y, z] => Ok(Vec3::new(*x, *y, *z)),
        _ => bail!("Expected three comma-separated components, got '{text}'"),
    }
}
