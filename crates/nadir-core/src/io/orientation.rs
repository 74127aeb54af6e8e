//! Orientation telemetry ingestion.
//!
//! The telemetry CSV carries a header row followed by one row per video
//! frame; the first three columns are the look vector components. Fields may
//! be wrapped in double quotes; a quoted field containing a comma is not
//! supported. Rows that do not hold three numbers are skipped.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tracing::{debug, warn};

use crate::error::{NadirError, Result};
use crate::frame::OrientationSample;
use crate::geometry::Vec3;

/// Parse orientation rows from CSV text.
pub fn parse_orientation<R: BufRead>(reader: R) -> Result<Vec<OrientationSample>> {
    let mut samples = Vec::new();
    let mut skipped = 0usize;

    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        if line_no == 0 || line.trim().is_empty() {
            continue;
        }
        match parse_row(&line) {
            Some(sample) => samples.push(sample),
            None => {
                debug!(line = line_no + 1, "Skipping malformed orientation row");
                skipped += 1;
            }
        }
    }

    if skipped > 0 {
        warn!(skipped, kept = samples.len(), "Malformed orientation rows skipped");
    }
    Ok(samples)
}

/// Load and parse an orientation CSV file.
pub fn load_orientation_csv(path: &Path) -> Result<Vec<OrientationSample>> {
    let file = File::open(path).map_err(|e| {
        NadirError::InvalidOrientation(format!("cannot open {}: {e}", path.display()))
    })?;
    let samples = parse_orientation(BufReader::new(file))?;
    debug!(path = %path.display(), samples = samples.len(), "Orientation data loaded");
    Ok(samples)
}

fn parse_row(line: &str) -> Option<Vec3> {
    let mut fields = line.split(',').map(|f| unquote(f.trim()).parse::<f64>());
    let x = fields.next()?.ok()?;
    let y = fields.next()?.ok()?;
    let z = fields.next()?.ok()?;
    Some(Vec3::new(x, y, z))
}

fn unquote(field: &str) -> &str {
    field
        .strip_prefix('"')
        .and_then(|f| f.strip_suffix('"'))
        .map(str::trim)
        .unwrap_or(field)
}
