use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{
    errors::StorageResult,
    models::{DraftProduct, NewProduct, Product, PromotionState},
    value_objects::{Sku, SkuPrefix},
};

/// Persistence for product drafts
#[async_trait]
pub trait DraftRepository: Send + Sync + 'static {
    async fn insert_draft(&self, draft: &DraftProduct) -> StorageResult<()>;

    async fn get_draft(&self, id: Uuid) -> StorageResult<Option<DraftProduct>>;

    /// Record the promotion checkpoint on the draft
    async fn set_promotion_state(&self, id: Uuid, state: PromotionState) -> StorageResult<()>;

    /// Returns false when the draft was already gone
    async fn delete_draft(&self, id: Uuid) -> StorageResult<bool>;
}

/// Persistence for finalized products and the SKU counter
#[async_trait]
pub trait ProductRepository: Send + Sync + 'static {
    /// Insert a product. A duplicate SKU fails with `AlreadyExists`.
    async fn insert_product(&self, product: NewProduct) -> StorageResult<Product>;

    async fn get_product(&self, id: Uuid) -> StorageResult<Option<Product>>;

    /// SKU of the most recently created product, optionally restricted to a prefix
    async fn latest_sku(&self, prefix: Option<&SkuPrefix>) -> StorageResult<Option<Sku>>;

    /// Atomically advance the counter named `scope` and return the new value.
    /// The counter first catches up to `floor` so it never falls behind
    /// SKUs that were created without it.
    async fn next_sequence(&self, scope: &str, floor: u64) -> StorageResult<u64>;
}

/// Read access to the category tree
#[async_trait]
pub trait CategoryRepository: Send + Sync + 'static {
    async fn subcategory_name(&self, id: Uuid) -> StorageResult<Option<String>>;
}
