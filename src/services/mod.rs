mod image_attachment_service_impl;
mod promotion_service_impl;
mod sku_generator_impl;

pub use image_attachment_service_impl::{ImageAttachmentServiceBuilder, ImageAttachmentServiceImpl};
pub use promotion_service_impl::PromotionServiceImpl;
pub use sku_generator_impl::SequentialSkuGenerator;
