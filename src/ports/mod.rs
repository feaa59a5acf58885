pub mod repositories;
pub mod services;
pub mod storage;

// Re-export all port traits for convenience
pub use repositories::{CategoryRepository, DraftRepository, ImageRepository, ProductRepository};
pub use services::{ImageAttachmentService, PromotionService, SkuGenerator};
pub use storage::BlobStore;
