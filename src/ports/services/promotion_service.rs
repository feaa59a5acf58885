use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{
    errors::PromotionResult,
    models::{DraftProduct, PromotionReceipt},
};

/// Port for turning a draft into a finalized product
#[async_trait]
pub trait PromotionService: Send + Sync + 'static {
    /// Create the product, move the draft's images to it and retire the draft.
    ///
    /// Field values come from `draft`, but the promotion state is read from
    /// the stored draft row: a draft whose product was already created
    /// resumes at the image move, and a draft with no stored row fails with
    /// `DraftNotFound`.
    async fn finalize(&self, draft: &DraftProduct) -> PromotionResult<PromotionReceipt>;

    /// Load a draft by id, then [`finalize`](Self::finalize) it
    async fn promote_by_id(&self, draft_id: Uuid) -> PromotionResult<PromotionReceipt>;

    /// Re-run only the image move from draft to product. Idempotent.
    async fn resume_image_migration(&self, draft_id: Uuid, product_id: Uuid)
        -> PromotionResult<u64>;
}
