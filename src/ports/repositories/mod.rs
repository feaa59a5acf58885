mod catalog_repository;
mod image_repository;

pub use catalog_repository::{CategoryRepository, DraftRepository, ProductRepository};
pub use image_repository::ImageRepository;
