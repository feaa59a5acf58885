mod common;

use catalog_media::{
    DraftProduct, DraftRepository, ImageAttachmentService, OwnerScope, PromotionError,
    PromotionService, PromotionState, SkuError, SkuGenerator, UploadOptions,
};
use common::{jpeg, Harness};
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use serde_json::json;
use uuid::Uuid;

/// Draft with a primary image at order 0 and a gallery image at order 1
async fn draft_with_images(harness: &Harness) -> DraftProduct {
    let draft = harness.complete_draft("Chaises").await;
    let attachments = &harness.services.attachments;

    attachments
        .upload(
            &draft.scope(),
            jpeg("face.jpg"),
            UploadOptions::builder().is_primary(true).build(),
        )
        .await
        .unwrap();
    attachments
        .upload(&draft.scope(), jpeg("dos.jpg"), UploadOptions::default())
        .await
        .unwrap();

    draft
}

#[tokio::test]
async fn promotion_moves_images_and_retires_draft() {
    let harness = Harness::new();
    let draft = draft_with_images(&harness).await;
    let before = harness.services.attachments.fetch(&draft.scope()).await.unwrap();

    let receipt = harness.services.promotion.finalize(&draft).await.unwrap();
    let product = &receipt.product;

    assert_eq!(receipt.images_migrated, 2);
    assert!(receipt.draft_retired);
    assert_eq!(product.sku.as_str(), "CHA-0001");
    assert_eq!(product.slug.as_str(), "fauteuil-milo");
    assert_eq!(product.price_ht, Decimal::new(25000, 2));
    assert_eq!(product.cost_price, Some(Decimal::new(25000, 2)));
    assert_eq!(product.tax_rate, Decimal::new(20, 2));
    assert_eq!(
        product.variant_attributes,
        json!({"color": "ocre", "material": "velours"})
    );

    let after = harness.services.attachments.fetch(&product.scope()).await.unwrap();
    let summary = |images: &[catalog_media::AttachedImage]| {
        images
            .iter()
            .map(|i| (i.id, i.display_order, i.is_primary, i.storage_path.clone()))
            .collect::<Vec<_>>()
    };
    assert_eq!(summary(&after), summary(&before));

    assert!(harness
        .services
        .attachments
        .fetch(&draft.scope())
        .await
        .unwrap()
        .is_empty());
    assert_eq!(harness.catalog.inner.get_draft(draft.id).await.unwrap(), None);
}

#[tokio::test]
async fn incomplete_draft_writes_nothing() {
    let harness = Harness::new();
    let chairs = harness.catalog.inner.add_subcategory("Chaises").await;
    let draft = DraftProduct::builder()
        .subcategory_id(chairs)
        .supplier_price(Decimal::ZERO)
        .build();
    harness.catalog.inner.insert_draft(&draft).await.unwrap();
    harness
        .services
        .attachments
        .upload(&draft.scope(), jpeg("a.jpg"), UploadOptions::default())
        .await
        .unwrap();

    let result = harness.services.promotion.finalize(&draft).await;

    let Err(PromotionError::Validation(errors)) = result else {
        panic!("expected validation failure, got {:?}", result);
    };
    let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
    assert_eq!(fields, vec!["name", "supplier_id", "cost_price"]);

    assert!(harness.catalog.inner.products().await.is_empty());
    assert_eq!(
        harness.services.attachments.fetch(&draft.scope()).await.unwrap().len(),
        1
    );
    assert_eq!(harness.catalog.inner.draft_count().await, 1);

    let next = harness.services.sku_generator.generate(chairs).await.unwrap();
    assert_eq!(next.as_str(), "CHA-0001");
}

#[tokio::test]
async fn entered_sku_is_kept() {
    let harness = Harness::new();
    let draft = DraftProduct {
        sku: Some(" REF-MILO-2 ".to_string()),
        ..harness.complete_draft("Fauteuils").await
    };

    let receipt = harness.services.promotion.finalize(&draft).await.unwrap();

    assert_eq!(receipt.product.sku.as_str(), "REF-MILO-2");
    assert_eq!(receipt.images_migrated, 0);
}

#[tokio::test]
async fn duplicate_sku_fails_before_any_change() {
    let harness = Harness::new();
    let first = DraftProduct {
        sku: Some("CHA-0007".to_string()),
        ..harness.complete_draft("Chaises").await
    };
    harness.services.promotion.finalize(&first).await.unwrap();

    let second = DraftProduct {
        sku: Some("CHA-0007".to_string()),
        ..draft_with_images(&harness).await
    };
    let result = harness.services.promotion.finalize(&second).await;

    assert!(matches!(result, Err(PromotionError::ProductInsert { .. })));
    assert_eq!(harness.catalog.inner.products().await.len(), 1);
    assert_eq!(
        harness.services.attachments.fetch(&second.scope()).await.unwrap().len(),
        2
    );
}

#[tokio::test]
async fn product_insert_failure_leaves_draft_pending() {
    let harness = Harness::new();
    let draft = draft_with_images(&harness).await;

    harness.catalog.failures.fail("insert_product");
    let result = harness.services.promotion.finalize(&draft).await;

    assert!(matches!(result, Err(PromotionError::ProductInsert { .. })));
    assert!(harness.catalog.inner.products().await.is_empty());

    let stored = harness.catalog.inner.get_draft(draft.id).await.unwrap().unwrap();
    assert_eq!(stored.promotion_state, PromotionState::Pending);
    assert_eq!(
        harness.services.attachments.fetch(&draft.scope()).await.unwrap().len(),
        2
    );
}

#[tokio::test]
async fn sku_counter_failure_aborts_promotion() {
    let harness = Harness::new();
    let draft = harness.complete_draft("Chaises").await;

    harness.catalog.failures.fail("next_sequence");
    let result = harness.services.promotion.finalize(&draft).await;

    assert!(matches!(
        result,
        Err(PromotionError::Sku(SkuError::SequenceUnavailable { .. }))
    ));
    assert!(harness.catalog.inner.products().await.is_empty());
}

#[tokio::test]
async fn migration_failure_reports_product_and_resumes() {
    let harness = Harness::new();
    let draft = draft_with_images(&harness).await;

    harness.images.failures.fail("reassign_owner");
    let result = harness.services.promotion.finalize(&draft).await;

    let Err(PromotionError::ImageMigration {
        draft_id,
        product_id,
        product,
        ..
    }) = result
    else {
        panic!("expected image migration failure, got {:?}", result);
    };
    assert_eq!(draft_id, draft.id);
    assert_eq!(product.id, product_id);

    let stored = harness.catalog.inner.get_draft(draft.id).await.unwrap().unwrap();
    assert_eq!(
        stored.promotion_state,
        PromotionState::ProductCreated { product_id }
    );

    harness.images.failures.heal("reassign_owner");
    let receipt = harness.services.promotion.promote_by_id(draft.id).await.unwrap();

    assert_eq!(receipt.product.id, product_id);
    assert_eq!(receipt.images_migrated, 2);
    assert!(receipt.draft_retired);
    assert_eq!(harness.catalog.inner.products().await.len(), 1);
    assert_eq!(
        harness
            .services
            .attachments
            .fetch(&OwnerScope::product(product_id))
            .await
            .unwrap()
            .len(),
        2
    );
}

#[tokio::test]
async fn retrying_finalize_with_stale_copy_creates_one_product() {
    let harness = Harness::new();
    let draft = draft_with_images(&harness).await;

    harness.images.failures.fail("reassign_owner");
    let Err(PromotionError::ImageMigration { product_id, .. }) =
        harness.services.promotion.finalize(&draft).await
    else {
        panic!("expected image migration failure");
    };
    harness.images.failures.heal("reassign_owner");

    assert_eq!(draft.promotion_state, PromotionState::Pending);
    let receipt = harness.services.promotion.finalize(&draft).await.unwrap();

    assert_eq!(receipt.product.id, product_id);
    assert_eq!(receipt.images_migrated, 2);
    let products = harness.catalog.inner.products().await;
    assert_eq!(products.len(), 1);
    assert_eq!(products[0].sku.as_str(), "CHA-0001");
}

#[tokio::test]
async fn finalize_after_completion_creates_nothing() {
    let harness = Harness::new();
    let draft = draft_with_images(&harness).await;

    harness.services.promotion.finalize(&draft).await.unwrap();
    let again = harness.services.promotion.finalize(&draft).await;

    assert!(matches!(
        again,
        Err(PromotionError::DraftNotFound { draft_id }) if draft_id == draft.id
    ));
    assert_eq!(harness.catalog.inner.products().await.len(), 1);
}

#[tokio::test]
async fn finalize_requires_a_stored_draft() {
    let harness = Harness::new();
    let chairs = harness.catalog.inner.add_subcategory("Chaises").await;
    let unsaved = DraftProduct::builder()
        .name("Chaise Nora")
        .supplier_id(Uuid::new_v4())
        .subcategory_id(chairs)
        .cost_price(Decimal::new(4500, 2))
        .build();

    let result = harness.services.promotion.finalize(&unsaved).await;

    assert!(matches!(result, Err(PromotionError::DraftNotFound { .. })));
    assert!(harness.catalog.inner.products().await.is_empty());

    harness.catalog.failures.fail("get_draft");
    assert!(matches!(
        harness.services.promotion.finalize(&unsaved).await,
        Err(PromotionError::DraftLookup { .. })
    ));
}

#[tokio::test]
async fn image_migration_rerun_is_idempotent() {
    let harness = Harness::new();
    let draft = draft_with_images(&harness).await;

    harness.images.failures.fail("reassign_owner");
    let Err(PromotionError::ImageMigration { product_id, .. }) =
        harness.services.promotion.finalize(&draft).await
    else {
        panic!("expected image migration failure");
    };
    harness.images.failures.heal("reassign_owner");

    let promotion = &harness.services.promotion;
    assert_eq!(promotion.resume_image_migration(draft.id, product_id).await.unwrap(), 2);
    assert_eq!(promotion.resume_image_migration(draft.id, product_id).await.unwrap(), 0);

    let unknown = Uuid::new_v4();
    assert!(matches!(
        promotion.resume_image_migration(draft.id, unknown).await,
        Err(PromotionError::ResumeLookup { product_id, .. }) if product_id == unknown
    ));
}

#[tokio::test]
async fn draft_delete_failure_still_returns_product() {
    let harness = Harness::new();
    let draft = draft_with_images(&harness).await;

    harness.catalog.failures.fail("delete_draft");
    let receipt = harness.services.promotion.finalize(&draft).await.unwrap();

    assert!(!receipt.draft_retired);
    assert_eq!(receipt.images_migrated, 2);
    assert_eq!(harness.catalog.inner.draft_count().await, 1);
}

#[tokio::test]
async fn checkpoint_failure_does_not_block_promotion() {
    let harness = Harness::new();
    let draft = draft_with_images(&harness).await;

    harness.catalog.failures.fail("set_promotion_state");
    let receipt = harness.services.promotion.finalize(&draft).await.unwrap();

    assert_eq!(receipt.images_migrated, 2);
    assert!(receipt.draft_retired);
}

#[tokio::test]
async fn promote_by_id_reports_missing_and_unreadable_drafts() {
    let harness = Harness::new();
    let missing = Uuid::new_v4();

    assert!(matches!(
        harness.services.promotion.promote_by_id(missing).await,
        Err(PromotionError::DraftNotFound { draft_id }) if draft_id == missing
    ));

    harness.catalog.failures.fail("get_draft");
    assert!(matches!(
        harness.services.promotion.promote_by_id(missing).await,
        Err(PromotionError::DraftLookup { .. })
    ));
}
