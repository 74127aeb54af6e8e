/// Minimum pixel count (h*w) to use row-level Rayon parallelism.
pub const PARALLEL_PIXEL_THRESHOLD: usize = 65_536;

/// ITU-R BT.601 luminance coefficient for the red channel.
pub const LUMINANCE_R: f32 = 0.299;

/// ITU-R BT.601 luminance coefficient for the green channel.
pub const LUMINANCE_G: f32 = 0.587;

/// ITU-R BT.601 luminance coefficient for the blue channel.
pub const LUMINANCE_B: f32 = 0.114;

/// Angle reported for a degenerate (zero-length) look or target vector.
pub const MAX_MISALIGNMENT_DEGREES: f64 = 180.0;

/// Projections shorter than this have no meaningful roll angle.
pub const ROLL_PROJECTION_EPSILON: f64 = 1e-9;

/// Default maximum angle (degrees) for absolute-angle frame selection.
pub const DEFAULT_MAX_ANGLE_DEGREES: f64 = 5.0;

/// Default bounded capacity of the pipeline input channel.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 8;

/// Default output frame rate handed to the sink.
pub const DEFAULT_OUTPUT_FPS: f64 = 30.0;

/// Default neighborhood size (pixels per side) for the cleanup median filter.
pub const DEFAULT_MEDIAN_WINDOW: usize = 3;

/// File name of the manifest written next to persisted frames.
pub const SEQUENCE_MANIFEST_NAME: &str = "sequence.toml";
