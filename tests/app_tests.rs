mod common;

use catalog_media::{
    app::DEFAULT_PUBLIC_BASE_URL, create_in_memory_app, AppBuilder, AppServices, DraftProduct,
    DraftRepository, ImageAttachmentService, OwnerScope, PromotionService, StorageBackend,
    UploadOptions, UploadPolicy,
};
use common::{init_test_tracing, jpeg};
use rust_decimal::Decimal;
use uuid::Uuid;

#[tokio::test]
async fn in_memory_app_attaches_and_promotes() {
    init_test_tracing();
    let deps = AppBuilder::new().build_dependencies().await.unwrap();
    let services =
        AppServices::from_dependencies(&deps, UploadPolicy::default(), Default::default());

    let draft = DraftProduct::builder()
        .name("Table basse Oslo")
        .supplier_id(Uuid::new_v4())
        .subcategory_id(Uuid::new_v4())
        .supplier_price(Decimal::new(8900, 2))
        .estimated_selling_price(Decimal::new(19900, 2))
        .build();
    deps.draft_repository.insert_draft(&draft).await.unwrap();

    let image = services
        .attachments
        .upload(
            &draft.scope(),
            jpeg("oslo.jpg"),
            UploadOptions::builder().is_primary(true).build(),
        )
        .await
        .unwrap();
    assert!(image.public_url.starts_with(DEFAULT_PUBLIC_BASE_URL));

    let receipt = services.promotion.promote_by_id(draft.id).await.unwrap();

    assert_eq!(receipt.product.sku.as_str(), "GEN-0001");
    assert_eq!(receipt.product.price_ht, Decimal::new(19900, 2));
    assert_eq!(receipt.product.cost_price, Some(Decimal::new(8900, 2)));

    let images = services
        .attachments
        .fetch(&receipt.product.scope())
        .await
        .unwrap();
    assert_eq!(images.len(), 1);
    assert_eq!(images[0].id, image.id);
    assert_eq!(
        services.attachments.primary(&images).map(|i| i.id),
        Some(image.id)
    );
}

#[tokio::test]
async fn in_memory_app_rejects_unsaved_owner() {
    let services = create_in_memory_app().await.unwrap();
    let owner = OwnerScope::new("", catalog_media::OwnerKind::Draft);

    assert!(services.attachments.fetch(&owner).await.unwrap().is_empty());
    assert!(matches!(
        services
            .attachments
            .upload(&owner, jpeg("a.jpg"), UploadOptions::default())
            .await,
        Err(catalog_media::AttachmentError::OwnerNotProvisioned)
    ));
}

#[tokio::test]
async fn local_filesystem_backend_writes_files() {
    init_test_tracing();
    let root = std::env::temp_dir().join(format!("catalog-media-{}", Uuid::new_v4()));

    let services = AppBuilder::new()
        .with_storage_backend(StorageBackend::LocalFileSystem {
            root: root.to_string_lossy().into_owned(),
        })
        .with_public_url("https://images.example.com/", "catalog")
        .build()
        .await
        .unwrap();

    let owner = OwnerScope::product(Uuid::new_v4());
    let image = services
        .attachments
        .upload(&owner, jpeg("pied.jpg"), UploadOptions::default())
        .await
        .unwrap();

    let on_disk = root.join(image.storage_path.as_str());
    assert_eq!(std::fs::read(&on_disk).unwrap(), vec![0xFF, 0xD8, 0xFF, 0xE0]);
    assert_eq!(
        image.public_url,
        format!("https://images.example.com/catalog/{}", image.storage_path)
    );

    services.attachments.delete(image.id).await.unwrap();
    assert!(!on_disk.exists());

    std::fs::remove_dir_all(&root).ok();
}
