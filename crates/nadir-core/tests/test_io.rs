#[allow(dead_code)]
mod common;

use std::io::Cursor;

use ndarray::Array2;
use tempfile::TempDir;

use common::{gray_frame, record};

use nadir_core::consts::SEQUENCE_MANIFEST_NAME;
use nadir_core::error::NadirError;
use nadir_core::frame::{ColorFrame, Frame};
use nadir_core::io::image_io::{
    list_frame_files, load_color_image, save_color_image, save_color_png,
};
use nadir_core::io::orientation::{load_orientation_csv, parse_orientation};
use nadir_core::io::sink::{
    DiscardSink, FrameFormat, FrameSink, ImageDirSink, SequenceManifest,
};
use nadir_core::io::source::{align_lengths, FrameSource, FrameStore, ImageDirSource};

fn gradient_frame() -> ColorFrame {
    let red = Array2::from_shape_fn((4, 6), |(r, c)| (r * 6 + c) as f32 / 23.0);
    let green = Array2::from_elem((4, 6), 0.4f32);
    let blue = Array2::from_shape_fn((4, 6), |(r, _)| r as f32 / 3.0);
    ColorFrame {
        red: Frame::new(red, 8),
        green: Frame::new(green, 8),
        blue: Frame::new(blue, 8),
    }
}

#[test]
fn test_parse_orientation_skips_header() {
    let csv = "x,y,z\n0.0,0.0,-1.0\n0.1,0.2,0.97\n";
    let samples = parse_orientation(Cursor::new(csv)).unwrap();
    assert_eq!(samples.len(), 2);
    assert_eq!(samples[0].z, -1.0);
    assert_eq!(samples[1].y, 0.2);
}

#[test]
fn test_parse_orientation_skips_malformed_rows() {
    let csv = "look_x,look_y,look_z,extra\n\
               1,2,3,ignored\n\
               \n\
               oops,2,3\n\
               4,5\n\
               7, 8 ,9\n";
    let samples = parse_orientation(Cursor::new(csv)).unwrap();
    let xs: Vec<f64> = samples.iter().map(|s| s.x).collect();
    assert_eq!(xs, vec![1.0, 7.0]);
    assert_eq!(samples[1].y, 8.0);
}

#[test]
fn test_parse_orientation_accepts_quoted_fields() {
    let csv = "\"x\",\"y\",\"z\"\n\
               \"0.1\",\"0.2\",\"-0.97\"\n\
               \" 0.5 \",0,\"1\"\n\
               \"1,5\",0,1\n";
    let samples = parse_orientation(Cursor::new(csv)).unwrap();
    assert_eq!(samples.len(), 2);
    assert_eq!(samples[0].x, 0.1);
    assert_eq!(samples[0].z, -0.97);
    assert_eq!(samples[1].x, 0.5);
    assert_eq!(samples[1].z, 1.0);
}

#[test]
fn test_parse_orientation_header_only() {
    let samples = parse_orientation(Cursor::new("x,y,z\n")).unwrap();
    assert!(samples.is_empty());
}

#[test]
fn test_missing_orientation_file() {
    let dir = TempDir::new().unwrap();
    let result = load_orientation_csv(&dir.path().join("missing.csv"));
    assert!(matches!(result, Err(NadirError::InvalidOrientation(_))));
}

#[test]
fn test_load_orientation_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("orientation.csv");
    std::fs::write(&path, "x,y,z\n0,0,-1\n0,0,1\n").unwrap();
    let samples = load_orientation_csv(&path).unwrap();
    assert_eq!(samples.len(), 2);
}

#[test]
fn test_png_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("frame.png");
    let frame = gradient_frame();
    save_color_png(&frame, &path).unwrap();

    let loaded = load_color_image(&path).unwrap();
    assert_eq!(loaded.width(), 6);
    assert_eq!(loaded.height(), 4);
    assert_eq!(loaded.red.original_bit_depth, 8);
    for (a, b) in frame.channels().iter().zip(loaded.channels().iter()) {
        for (x, y) in a.data.iter().zip(b.data.iter()) {
            assert!((x - y).abs() <= 1.0 / 255.0 + 1e-6);
        }
    }
}

#[test]
fn test_tiff_round_trip_keeps_sixteen_bits() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("frame.tif");
    let frame = gradient_frame();
    save_color_image(&frame, &path).unwrap();

    let loaded = load_color_image(&path).unwrap();
    assert_eq!(loaded.red.original_bit_depth, 16);
    for (x, y) in frame.red.data.iter().zip(loaded.red.data.iter()) {
        assert!((x - y).abs() <= 1.0 / 65535.0 + 1e-6);
    }
}

#[test]
fn test_list_frame_files_sorted_and_filtered() {
    let dir = TempDir::new().unwrap();
    for name in ["frame_002.png", "frame_000.png", "frame_001.PNG"] {
        save_color_png(&gray_frame(2, 2, 0.5), &dir.path().join(name)).unwrap();
    }
    std::fs::write(dir.path().join("notes.txt"), "not a frame").unwrap();
    std::fs::create_dir(dir.path().join("sub.png")).unwrap();

    let files = list_frame_files(dir.path()).unwrap();
    let names: Vec<String> = files
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["frame_000.png", "frame_001.PNG", "frame_002.png"]);
}

#[test]
fn test_image_dir_source_loads_by_index() {
    let dir = TempDir::new().unwrap();
    save_color_png(&gray_frame(3, 3, 0.0), &dir.path().join("a.png")).unwrap();
    save_color_png(&gray_frame(3, 3, 1.0), &dir.path().join("b.png")).unwrap();

    let source = ImageDirSource::open(dir.path()).unwrap();
    assert_eq!(source.len(), 2);
    assert_eq!(source.load(1).unwrap().red.data[[0, 0]], 1.0);
    assert!(matches!(
        source.load(2),
        Err(NadirError::FrameIndexOutOfRange { index: 2, total: 2 })
    ));
}

#[test]
fn test_frame_store() {
    let mut store = FrameStore::default();
    assert!(store.is_empty());
    assert_eq!(store.push(gray_frame(2, 2, 0.1)), 0);
    assert_eq!(store.push(gray_frame(2, 2, 0.9)), 1);
    assert_eq!(store.len(), 2);
    assert_eq!(store.load(1).unwrap(), gray_frame(2, 2, 0.9));
    assert!(store.get(5).is_none());
    assert!(store.load(5).is_err());
}

#[test]
fn test_align_lengths_takes_shorter_stream() {
    assert_eq!(align_lengths(12, 10), 10);
    assert_eq!(align_lengths(3, 8), 3);
    assert_eq!(align_lengths(5, 5), 5);
    assert_eq!(align_lengths(0, 5), 0);
}

#[test]
fn test_image_dir_sink_writes_sequence_and_manifest() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("nested").join("out");
    let mut sink = ImageDirSink::new(&out);
    sink.open(25.0).unwrap();
    for index in [4, 9, 11] {
        sink.write(record(index)).unwrap();
    }
    sink.finish().unwrap();

    for position in 0..3 {
        assert!(out.join(sink.frame_file_name(position)).is_file());
    }
    let text = std::fs::read_to_string(out.join(SEQUENCE_MANIFEST_NAME)).unwrap();
    let manifest: SequenceManifest = toml::from_str(&text).unwrap();
    assert_eq!(manifest.fps, 25.0);
    let sources: Vec<usize> = manifest.frames.iter().map(|e| e.source_index).collect();
    assert_eq!(sources, vec![4, 9, 11]);
    assert_eq!(manifest.frames[0].file, "frame_00000.png");
}

#[test]
fn test_image_dir_sink_writes_sixteen_bit_tiff() {
    let dir = TempDir::new().unwrap();
    let mut sink = ImageDirSink::new(dir.path()).with_format(FrameFormat::Tiff);
    assert_eq!(sink.frame_file_name(3), "frame_00003.tif");
    sink.open(30.0).unwrap();
    sink.write(record(7)).unwrap();
    sink.write(record(250)).unwrap();
    sink.finish().unwrap();

    let text = std::fs::read_to_string(dir.path().join(SEQUENCE_MANIFEST_NAME)).unwrap();
    let manifest: SequenceManifest = toml::from_str(&text).unwrap();
    assert_eq!(manifest.frames[1].file, "frame_00001.tif");

    let source = ImageDirSource::open(dir.path()).unwrap();
    assert_eq!(source.len(), 2);
    let first = source.load(0).unwrap();
    assert_eq!(first.red.original_bit_depth, 16);
    assert!((first.red.data[[0, 0]] - 0.007).abs() <= 1.0 / 65535.0 + 1e-6);
}

#[test]
fn test_image_dir_sink_rejects_file_path() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("taken");
    std::fs::write(&path, "occupied").unwrap();
    let mut sink = ImageDirSink::new(&path);
    assert!(sink.open(30.0).is_err());
}

#[test]
fn test_image_dir_sink_write_before_open() {
    let dir = TempDir::new().unwrap();
    let mut sink = ImageDirSink::new(dir.path());
    assert!(matches!(sink.write(record(0)), Err(NadirError::Sink(_))));
}

#[test]
fn test_discard_sink_counts() {
    let mut sink = DiscardSink::new();
    let counter = sink.counter();
    sink.open(30.0).unwrap();
    for i in 0..4 {
        sink.write(record(i)).unwrap();
    }
    sink.finish().unwrap();
    assert_eq!(counter.load(std::sync::atomic::Ordering::Relaxed), 4);
}
