pub mod edge;
pub mod median;
pub mod rotate;
