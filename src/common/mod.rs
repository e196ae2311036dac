pub mod color;
pub mod error;
pub mod matrix;
