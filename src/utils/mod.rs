pub mod fps;
pub mod matrix;
