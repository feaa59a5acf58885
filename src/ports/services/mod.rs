mod image_attachment_service;
mod promotion_service;
mod sku_generator;

pub use image_attachment_service::ImageAttachmentService;
pub use promotion_service::PromotionService;
pub use sku_generator::SkuGenerator;
