use thiserror::Error;

#[derive(Error, Debug)]
pub enum NadirError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image format error: {0}")]
    ImageError(#[from] image::ImageError),

    #[error("Invalid orientation data: {0}")]
    InvalidOrientation(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid image dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("Frame index {index} out of range (total: {total})")]
    FrameIndexOutOfRange { index: usize, total: usize },

    #[error("Empty frame sequence")]
    EmptySequence,

    #[error("Sink unavailable: {0}")]
    SinkUnavailable(String),

    #[error("Sink error: {0}")]
    Sink(String),

    #[error("Stage '{stage}' failed to open: {reason}")]
    StageOpen { stage: String, reason: String },

    #[error("Stage '{stage}' failed on frame {frame}: {reason}")]
    StageFailed {
        stage: String,
        frame: usize,
        reason: String,
    },

    #[error("Stage '{0}' used before open")]
    StageNotOpen(String),

    #[error("Pipeline is closed")]
    PipelineClosed,

    #[error("Pipeline worker panicked")]
    WorkerPanicked,
}

pub type Result<T> = std::result::Result<T, NadirError>;
