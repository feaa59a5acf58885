use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{errors::SkuError, value_objects::Sku};

/// Port for issuing product SKUs
#[async_trait]
pub trait SkuGenerator: Send + Sync + 'static {
    /// Issue the next `PFX-NNNN` SKU for a product in the given subcategory
    async fn generate(&self, subcategory_id: Uuid) -> Result<Sku, SkuError>;
}
