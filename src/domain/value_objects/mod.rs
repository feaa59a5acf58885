mod owner;
mod sku;
mod slug;
mod storage_path;

pub use owner::{OwnerId, OwnerKind, OwnerScope};
pub use sku::{Sku, SkuPrefix, SkuScope, GENERIC_SKU_PREFIX};
pub use slug::Slug;
pub use storage_path::StoragePath;
