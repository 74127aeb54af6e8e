use std::path::{Path, PathBuf};

use image::{DynamicImage, ImageFormat, Rgb};
use ndarray::Array2;

use crate::error::{NadirError, Result};
use crate::frame::{ColorFrame, Frame};

/// File extensions recognised as still frames.
const FRAME_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "tif", "tiff", "bmp"];

/// Save a ColorFrame as 16-bit RGB TIFF.
pub fn save_color_tiff(color: &ColorFrame, path: &Path) -> Result<()> {
    let h = color.height();
    let w = color.width();

    let mut pixels: Vec<u16> = Vec::with_capacity(h * w * 3);
    for row in 0..h {
        for col in 0..w {
            for channel in color.channels() {
                pixels.push((channel.data[[row, col]].clamp(0.0, 1.0) * 65535.0) as u16);
            }
        }
    }

    let img = image::ImageBuffer::<Rgb<u16>, Vec<u16>>::from_raw(w as u32, h as u32, pixels)
        .ok_or(NadirError::InvalidDimensions {
            width: w as u32,
            height: h as u32,
        })?;
    img.save(path)?;
    Ok(())
}

/// Save a ColorFrame as 8-bit RGB PNG.
pub fn save_color_png(color: &ColorFrame, path: &Path) -> Result<()> {
    let h = color.height();
    let w = color.width();

    let mut img = image::RgbImage::new(w as u32, h as u32);
    for row in 0..h {
        for col in 0..w {
            let r = (color.red.data[[row, col]].clamp(0.0, 1.0) * 255.0) as u8;
            let g = (color.green.data[[row, col]].clamp(0.0, 1.0) * 255.0) as u8;
            let b = (color.blue.data[[row, col]].clamp(0.0, 1.0) * 255.0) as u8;
            img.put_pixel(col as u32, row as u32, Rgb([r, g, b]));
        }
    }

    img.save_with_format(path, ImageFormat::Png)?;
    Ok(())
}

/// Save a ColorFrame, choosing format from file extension.
pub fn save_color_image(color: &ColorFrame, path: &Path) -> Result<()> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("tiff" | "tif") => save_color_tiff(color, path),
        _ => save_color_png(color, path),
    }
}

/// Load any supported image file into a ColorFrame.
pub fn load_color_image(path: &Path) -> Result<ColorFrame> {
    let img = image::open(path)?;
    Ok(color_frame_from_image(&img))
}

/// Convert a decoded image into normalized RGB planes.
pub fn color_frame_from_image(img: &DynamicImage) -> ColorFrame {
    let color_type = img.color();
    let bit_depth = (color_type.bits_per_pixel() / color_type.channel_count() as u16) as u8;
    let rgb = img.to_rgb16();
    let (w, h) = rgb.dimensions();

    let mut planes = [
        Array2::<f32>::zeros((h as usize, w as usize)),
        Array2::<f32>::zeros((h as usize, w as usize)),
        Array2::<f32>::zeros((h as usize, w as usize)),
    ];
    for (col, row, pixel) in rgb.enumerate_pixels() {
        for (plane, &value) in planes.iter_mut().zip(pixel.0.iter()) {
            plane[[row as usize, col as usize]] = value as f32 / 65535.0;
        }
    }

    let [red, green, blue] = planes;
    ColorFrame {
        red: Frame::new(red, bit_depth),
        green: Frame::new(green, bit_depth),
        blue: Frame::new(blue, bit_depth),
    }
}

/// Image files directly inside `dir`, sorted by file name.
pub fn list_frame_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file() && is_frame_file(path))
        .collect();
    paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(paths)
}

fn is_frame_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| FRAME_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}
