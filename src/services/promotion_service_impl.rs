use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::{
    domain::{
        errors::{PromotionError, PromotionResult, StorageError},
        models::{DraftProduct, NewProduct, Product, PromotionReceipt, PromotionState},
        value_objects::OwnerScope,
    },
    ports::{
        repositories::{DraftRepository, ImageRepository, ProductRepository},
        services::{PromotionService, SkuGenerator},
    },
};

/// Promotes drafts to products as a resumable sequence of steps.
///
/// There is no enclosing transaction. After the product row is written the
/// draft is checkpointed as `product_created`, so a later `finalize` of the
/// same draft skips straight to moving its images.
#[derive(Clone)]
pub struct PromotionServiceImpl {
    drafts: Arc<dyn DraftRepository>,
    products: Arc<dyn ProductRepository>,
    images: Arc<dyn ImageRepository>,
    skus: Arc<dyn SkuGenerator>,
}

impl PromotionServiceImpl {
    pub fn new(
        drafts: Arc<dyn DraftRepository>,
        products: Arc<dyn ProductRepository>,
        images: Arc<dyn ImageRepository>,
        skus: Arc<dyn SkuGenerator>,
    ) -> Self {
        Self {
            drafts,
            products,
            images,
            skus,
        }
    }

    async fn load_recorded_product(
        &self,
        draft_id: Uuid,
        product_id: Uuid,
    ) -> PromotionResult<Product> {
        let lookup_failed = |source| PromotionError::ResumeLookup {
            draft_id,
            product_id,
            source,
        };

        self.products
            .get_product(product_id)
            .await
            .map_err(lookup_failed)?
            .ok_or_else(|| {
                lookup_failed(StorageError::NotFound {
                    resource: format!("product {}", product_id),
                })
            })
    }

    async fn migrate_images(&self, draft_id: Uuid, product: &Product) -> PromotionResult<u64> {
        self.images
            .reassign_owner(&OwnerScope::draft(draft_id), &product.scope())
            .await
            .map_err(|source| PromotionError::ImageMigration {
                draft_id,
                product_id: product.id,
                product: Box::new(product.clone()),
                source,
            })
    }

    async fn load_draft(&self, draft_id: Uuid) -> PromotionResult<DraftProduct> {
        self.drafts
            .get_draft(draft_id)
            .await
            .map_err(|source| PromotionError::DraftLookup { draft_id, source })?
            .ok_or(PromotionError::DraftNotFound { draft_id })
    }

    /// Field values come from `draft`; `state` is the persisted checkpoint
    async fn run(
        &self,
        draft: &DraftProduct,
        state: PromotionState,
    ) -> PromotionResult<PromotionReceipt> {
        if let PromotionState::ProductCreated { product_id } = state {
            tracing::Span::current().record("product_id", tracing::field::display(product_id));
            info!("Resuming promotion after product creation");
            let product = self.load_recorded_product(draft.id, product_id).await?;
            return self.complete(draft.id, product).await;
        }

        let promotable = draft.promotable().map_err(PromotionError::Validation)?;

        let sku = match promotable.entered_sku.clone() {
            Some(sku) => sku,
            None => self.skus.generate(promotable.subcategory_id).await?,
        };

        let payload = NewProduct::from_draft(draft, &promotable, sku);
        let product = self
            .products
            .insert_product(payload)
            .await
            .map_err(|source| PromotionError::ProductInsert { source })?;
        tracing::Span::current().record("product_id", tracing::field::display(product.id));
        info!(sku = %product.sku, "Product created from draft");

        let checkpoint = PromotionState::ProductCreated {
            product_id: product.id,
        };
        if let Err(error) = self.drafts.set_promotion_state(draft.id, checkpoint).await {
            warn!(error = %error, "Could not record promotion checkpoint on draft");
        }

        self.complete(draft.id, product).await
    }

    /// Steps after the product exists: move images, then retire the draft
    async fn complete(&self, draft_id: Uuid, product: Product) -> PromotionResult<PromotionReceipt> {
        let images_migrated = self.migrate_images(draft_id, &product).await?;
        info!(images_migrated, "Draft images moved to product");

        let draft_retired = match self.drafts.delete_draft(draft_id).await {
            Ok(existed) => {
                if !existed {
                    debug!("Draft row was already gone");
                }
                true
            }
            Err(error) => {
                warn!(error = %error, "Product created but draft row could not be deleted");
                false
            }
        };

        Ok(PromotionReceipt {
            product,
            images_migrated,
            draft_retired,
        })
    }
}

#[async_trait]
impl PromotionService for PromotionServiceImpl {
    #[instrument(skip_all, fields(draft_id = %draft.id, product_id = tracing::field::Empty))]
    async fn finalize(&self, draft: &DraftProduct) -> PromotionResult<PromotionReceipt> {
        // The stored checkpoint wins over the caller's copy
        let stored = self.load_draft(draft.id).await?;
        self.run(draft, stored.promotion_state).await
    }

    #[instrument(skip_all, fields(draft_id = %draft_id, product_id = tracing::field::Empty))]
    async fn promote_by_id(&self, draft_id: Uuid) -> PromotionResult<PromotionReceipt> {
        let draft = self.load_draft(draft_id).await?;
        self.run(&draft, draft.promotion_state).await
    }

    #[instrument(skip_all, fields(draft_id = %draft_id, product_id = %product_id))]
    async fn resume_image_migration(
        &self,
        draft_id: Uuid,
        product_id: Uuid,
    ) -> PromotionResult<u64> {
        let product = self.load_recorded_product(draft_id, product_id).await?;
        let migrated = self.migrate_images(draft_id, &product).await?;
        info!(images_migrated = migrated, "Image migration re-run");
        Ok(migrated)
    }
}
