pub mod errors;
pub mod models;
pub mod value_objects;

// Re-export commonly used types
pub use errors::{
    AttachmentError, FieldError, PromotionError, SkuError, StorageError, ValidationError,
    WriteStage,
};
pub use models::*;
pub use value_objects::*;
