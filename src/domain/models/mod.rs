pub mod image;
pub mod product;

pub use image::*;
pub use product::*;
