use ndarray::Array2;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::consts::PARALLEL_PIXEL_THRESHOLD;
use crate::frame::{ColorFrame, Frame};

/// Visual sense in which an image is turned.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RotationDirection {
    #[default]
    Clockwise,
    CounterClockwise,
}

impl RotationDirection {
    /// Convert an angle in this sense to a counter-clockwise angle.
    pub fn to_ccw(&self, degrees: f64) -> f64 {
        match self {
            Self::Clockwise => -degrees,
            Self::CounterClockwise => degrees,
        }
    }
}

impl std::fmt::Display for RotationDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Clockwise => write!(f, "Clockwise"),
            Self::CounterClockwise => write!(f, "Counter-clockwise"),
        }
    }
}

/// Rotate a plane about its center by `ccw_degrees` (as seen on screen,
/// rows growing downward).
///
/// Output has the same shape. Uses bilinear sampling; pixels that map
/// outside the source are black.
pub fn rotate_array(data: &Array2<f32>, ccw_degrees: f64) -> Array2<f32> {
    if ccw_degrees.rem_euclid(360.0) == 0.0 {
        return data.clone();
    }

    let (h, w) = data.dim();
    let theta = ccw_degrees.to_radians();
    let (sin, cos) = theta.sin_cos();
    let cx = (w as f64 - 1.0) / 2.0;
    let cy = (h as f64 - 1.0) / 2.0;

    // Inverse mapping: destination pixel -> source coordinate.
    let sample_row = |row: usize| -> Vec<f32> {
        let dy = row as f64 - cy;
        (0..w)
            .map(|col| {
                let dx = col as f64 - cx;
                let sx = cos * dx - sin * dy + cx;
                let sy = sin * dx + cos * dy + cy;
                bilinear(data, sx, sy)
            })
            .collect()
    };

    let rows: Vec<Vec<f32>> = if h * w >= PARALLEL_PIXEL_THRESHOLD {
        (0..h).into_par_iter().map(sample_row).collect()
    } else {
        (0..h).map(sample_row).collect()
    };

    let mut result = Array2::<f32>::zeros((h, w));
    for (row, row_data) in rows.into_iter().enumerate() {
        for (col, val) in row_data.into_iter().enumerate() {
            result[[row, col]] = val;
        }
    }
    result
}

pub fn rotate_frame(frame: &Frame, ccw_degrees: f64) -> Frame {
    Frame::new(
        rotate_array(&frame.data, ccw_degrees),
        frame.original_bit_depth,
    )
}

/// Rotate all three channels, one rayon task per channel.
pub fn rotate_color(color: &ColorFrame, ccw_degrees: f64) -> ColorFrame {
    let (red, (green, blue)) = rayon::join(
        || rotate_frame(&color.red, ccw_degrees),
        || {
            rayon::join(
                || rotate_frame(&color.green, ccw_degrees),
                || rotate_frame(&color.blue, ccw_degrees),
            )
        },
    );
    ColorFrame { red, green, blue }
}

fn bilinear(data: &Array2<f32>, x: f64, y: f64) -> f32 {
    let (h, w) = data.dim();
    let x0 = x.floor();
    let y0 = y.floor();
    let fx = (x - x0) as f32;
    let fy = (y - y0) as f32;
    let x0 = x0 as isize;
    let y0 = y0 as isize;

    let pixel = |r: isize, c: isize| -> f32 {
        if r < 0 || c < 0 || r >= h as isize || c >= w as isize {
            0.0
        } else {
            data[[r as usize, c as usize]]
        }
    };

    let top = pixel(y0, x0) * (1.0 - fx) + pixel(y0, x0 + 1) * fx;
    let bottom = pixel(y0 + 1, x0) * (1.0 - fx) + pixel(y0 + 1, x0 + 1) * fx;
    top * (1.0 - fy) + bottom * fy
}
