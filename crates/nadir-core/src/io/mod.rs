pub mod image_io;
pub mod orientation;
pub mod sink;
pub mod source;
