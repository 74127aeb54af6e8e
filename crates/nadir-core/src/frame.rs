use ndarray::Array2;

use crate::consts::{LUMINANCE_B, LUMINANCE_G, LUMINANCE_R};
use crate::geometry::Vec3;

/// A single image plane.
/// Pixel values are f32 in [0.0, 1.0].
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    /// Pixel data, row-major, shape = (height, width)
    pub data: Array2<f32>,
    /// Original bit depth before conversion (8 or 16)
    pub original_bit_depth: u8,
}

impl Frame {
    pub fn new(data: Array2<f32>, bit_depth: u8) -> Self {
        Self {
            data,
            original_bit_depth: bit_depth,
        }
    }

    pub fn width(&self) -> usize {
        self.data.ncols()
    }

    pub fn height(&self) -> usize {
        self.data.nrows()
    }
}

/// Color image composed of separate channel planes.
#[derive(Clone, Debug, PartialEq)]
pub struct ColorFrame {
    pub red: Frame,
    pub green: Frame,
    pub blue: Frame,
}

impl ColorFrame {
    /// Build a color frame whose three channels are copies of `plane`.
    pub fn from_gray(plane: Frame) -> Self {
        Self {
            red: plane.clone(),
            green: plane.clone(),
            blue: plane,
        }
    }

    pub fn width(&self) -> usize {
        self.red.width()
    }

    pub fn height(&self) -> usize {
        self.red.height()
    }

    pub fn channels(&self) -> [&Frame; 3] {
        [&self.red, &self.green, &self.blue]
    }
}

/// Convert a color frame to luminance (ITU-R BT.601).
pub fn luminance(color: &ColorFrame) -> Frame {
    let (h, w) = color.red.data.dim();
    let mut data = Array2::<f32>::zeros((h, w));

    for row in 0..h {
        for col in 0..w {
            data[[row, col]] = LUMINANCE_R * color.red.data[[row, col]]
                + LUMINANCE_G * color.green.data[[row, col]]
                + LUMINANCE_B * color.blue.data[[row, col]];
        }
    }

    Frame::new(data, color.red.original_bit_depth)
}

/// Orientation sample: look/gravity direction in the body frame.
pub type OrientationSample = Vec3;

/// One video frame travelling through the pipeline, tagged with its
/// source sequence index and the orientation captured with it.
#[derive(Clone, Debug)]
pub struct FrameRecord {
    pub index: usize,
    pub image: ColorFrame,
    pub sample: OrientationSample,
}

impl FrameRecord {
    pub fn new(index: usize, image: ColorFrame, sample: OrientationSample) -> Self {
        Self {
            index,
            image,
            sample,
        }
    }
}
