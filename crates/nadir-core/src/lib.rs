pub mod consts;
pub mod error;
pub mod filters;
pub mod frame;
pub mod geometry;
pub mod io;
pub mod pipeline;
pub mod select;
pub mod stage;
