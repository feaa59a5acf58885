#![allow(dead_code)]

use async_trait::async_trait;
use bytes::Bytes;
use catalog_media::{
    domain::{
        errors::{StorageError, StorageResult},
        models::{ImageAsset, ImageMetadataUpdate, NewImageAsset, NewProduct},
    },
    ApacheBlobStoreAdapter, AppDependencies, AppServices, BlobStore, CategoryRepository,
    DraftProduct, DraftRepository, ImageFile, ImageRepository, InMemoryCatalogRepository,
    InMemoryImageRepository, OwnerId, OwnerScope, Product, ProductRepository, PromotionState,
    Sku, SkuPrefix, SkuScope, StoragePath, UploadPolicy,
};
use std::collections::HashSet;
use std::sync::{Arc, Mutex, Once};
use uuid::Uuid;

pub const BASE_URL: &str = "https://cdn.example.com";
pub const BUCKET: &str = "product-images";

static TRACING: Once = Once::new();

pub fn init_test_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

pub fn jpeg(name: &str) -> ImageFile {
    ImageFile::new(name, "image/jpeg", Bytes::from_static(&[0xFF, 0xD8, 0xFF, 0xE0]))
}

fn injected(operation: &str) -> StorageError {
    StorageError::infrastructure(format!("injected {} failure", operation), "test")
}

/// Named operations that should fail on the next calls
#[derive(Default)]
pub struct Failures(Mutex<HashSet<&'static str>>);

impl Failures {
    pub fn fail(&self, operation: &'static str) {
        self.0.lock().unwrap().insert(operation);
    }

    pub fn heal(&self, operation: &'static str) {
        self.0.lock().unwrap().remove(operation);
    }

    fn check(&self, operation: &'static str) -> StorageResult<()> {
        if self.0.lock().unwrap().contains(operation) {
            Err(injected(operation))
        } else {
            Ok(())
        }
    }
}

/// Blob store that records removals and can be told to fail
pub struct FlakyBlobStore {
    inner: ApacheBlobStoreAdapter,
    pub failures: Failures,
    puts: Mutex<Vec<StoragePath>>,
    removals: Mutex<Vec<StoragePath>>,
}

impl FlakyBlobStore {
    pub fn new() -> Self {
        Self {
            inner: ApacheBlobStoreAdapter::in_memory(BASE_URL, BUCKET).unwrap(),
            failures: Failures::default(),
            puts: Mutex::new(Vec::new()),
            removals: Mutex::new(Vec::new()),
        }
    }

    /// Paths successfully written
    pub fn puts(&self) -> Vec<StoragePath> {
        self.puts.lock().unwrap().clone()
    }

    /// Every path a removal was attempted for, failed or not
    pub fn removals(&self) -> Vec<StoragePath> {
        self.removals.lock().unwrap().clone()
    }

    pub async fn exists(&self, path: &StoragePath) -> bool {
        self.inner
            .inner()
            .head(&object_store::path::Path::from(path.as_str()))
            .await
            .is_ok()
    }
}

#[async_trait]
impl BlobStore for FlakyBlobStore {
    async fn put(
        &self,
        path: &StoragePath,
        data: Bytes,
        content_type: &str,
    ) -> StorageResult<StoragePath> {
        self.failures.check("put")?;
        let stored = self.inner.put(path, data, content_type).await?;
        self.puts.lock().unwrap().push(stored.clone());
        Ok(stored)
    }

    fn public_url(&self, path: &StoragePath) -> String {
        self.inner.public_url(path)
    }

    async fn remove(&self, paths: &[StoragePath]) -> StorageResult<()> {
        self.removals.lock().unwrap().extend_from_slice(paths);
        self.failures.check("remove")?;
        self.inner.remove(paths).await
    }
}

/// Image repository with injectable failures
pub struct FlakyImageRepository {
    pub inner: InMemoryImageRepository,
    pub failures: Failures,
}

impl FlakyImageRepository {
    pub fn new() -> Self {
        Self {
            inner: InMemoryImageRepository::new(),
            failures: Failures::default(),
        }
    }
}

#[async_trait]
impl ImageRepository for FlakyImageRepository {
    async fn list_by_owner(&self, scope: &OwnerScope) -> StorageResult<Vec<ImageAsset>> {
        self.failures.check("list")?;
        self.inner.list_by_owner(scope).await
    }

    async fn list_by_owner_id(&self, owner_id: &OwnerId) -> StorageResult<Vec<ImageAsset>> {
        self.failures.check("list")?;
        self.inner.list_by_owner_id(owner_id).await
    }

    async fn get(&self, id: Uuid) -> StorageResult<Option<ImageAsset>> {
        self.failures.check("get")?;
        self.inner.get(id).await
    }

    async fn max_display_order(&self, scope: &OwnerScope) -> StorageResult<Option<u32>> {
        self.failures.check("max_display_order")?;
        self.inner.max_display_order(scope).await
    }

    async fn insert(&self, image: NewImageAsset) -> StorageResult<ImageAsset> {
        self.failures.check("insert")?;
        self.inner.insert(image).await
    }

    async fn clear_primary(&self, scope: &OwnerScope) -> StorageResult<()> {
        self.failures.check("clear_primary")?;
        self.inner.clear_primary(scope).await
    }

    async fn mark_primary(&self, id: Uuid, scope: &OwnerScope) -> StorageResult<bool> {
        self.failures.check("mark_primary")?;
        self.inner.mark_primary(id, scope).await
    }

    async fn set_display_order(
        &self,
        id: Uuid,
        owner_id: &OwnerId,
        display_order: u32,
    ) -> StorageResult<bool> {
        self.failures.check("set_display_order")?;
        self.inner.set_display_order(id, owner_id, display_order).await
    }

    async fn update_metadata(
        &self,
        id: Uuid,
        update: &ImageMetadataUpdate,
    ) -> StorageResult<Option<ImageAsset>> {
        self.failures.check("update_metadata")?;
        self.inner.update_metadata(id, update).await
    }

    async fn delete(&self, id: Uuid) -> StorageResult<bool> {
        self.failures.check("delete")?;
        self.inner.delete(id).await
    }

    async fn reassign_owner(&self, from: &OwnerScope, to: &OwnerScope) -> StorageResult<u64> {
        self.failures.check("reassign_owner")?;
        self.inner.reassign_owner(from, to).await
    }
}

/// Catalog repository with injectable failures
pub struct FlakyCatalogRepository {
    pub inner: InMemoryCatalogRepository,
    pub failures: Failures,
}

impl FlakyCatalogRepository {
    pub fn new() -> Self {
        Self {
            inner: InMemoryCatalogRepository::new(),
            failures: Failures::default(),
        }
    }
}

#[async_trait]
impl DraftRepository for FlakyCatalogRepository {
    async fn insert_draft(&self, draft: &DraftProduct) -> StorageResult<()> {
        self.failures.check("insert_draft")?;
        self.inner.insert_draft(draft).await
    }

    async fn get_draft(&self, id: Uuid) -> StorageResult<Option<DraftProduct>> {
        self.failures.check("get_draft")?;
        self.inner.get_draft(id).await
    }

    async fn set_promotion_state(&self, id: Uuid, state: PromotionState) -> StorageResult<()> {
        self.failures.check("set_promotion_state")?;
        self.inner.set_promotion_state(id, state).await
    }

    async fn delete_draft(&self, id: Uuid) -> StorageResult<bool> {
        self.failures.check("delete_draft")?;
        self.inner.delete_draft(id).await
    }
}

#[async_trait]
impl ProductRepository for FlakyCatalogRepository {
    async fn insert_product(&self, product: NewProduct) -> StorageResult<Product> {
        self.failures.check("insert_product")?;
        self.inner.insert_product(product).await
    }

    async fn get_product(&self, id: Uuid) -> StorageResult<Option<Product>> {
        self.failures.check("get_product")?;
        self.inner.get_product(id).await
    }

    async fn latest_sku(&self, prefix: Option<&SkuPrefix>) -> StorageResult<Option<Sku>> {
        self.failures.check("latest_sku")?;
        self.inner.latest_sku(prefix).await
    }

    async fn next_sequence(&self, scope: &str, floor: u64) -> StorageResult<u64> {
        self.failures.check("next_sequence")?;
        self.inner.next_sequence(scope, floor).await
    }
}

#[async_trait]
impl CategoryRepository for FlakyCatalogRepository {
    async fn subcategory_name(&self, id: Uuid) -> StorageResult<Option<String>> {
        self.failures.check("subcategory_name")?;
        self.inner.subcategory_name(id).await
    }
}

/// Services wired over the flaky in-memory backends
pub struct Harness {
    pub blobs: Arc<FlakyBlobStore>,
    pub images: Arc<FlakyImageRepository>,
    pub catalog: Arc<FlakyCatalogRepository>,
    pub services: AppServices,
}

impl Harness {
    pub fn new() -> Self {
        Self::with(UploadPolicy::default(), SkuScope::Global)
    }

    pub fn with(policy: UploadPolicy, scope: SkuScope) -> Self {
        init_test_tracing();

        let blobs = Arc::new(FlakyBlobStore::new());
        let images = Arc::new(FlakyImageRepository::new());
        let catalog = Arc::new(FlakyCatalogRepository::new());

        let deps = AppDependencies {
            blob_store: blobs.clone(),
            image_repository: images.clone(),
            draft_repository: catalog.clone(),
            product_repository: catalog.clone(),
            category_repository: catalog.clone(),
        };

        Self {
            blobs,
            images,
            catalog,
            services: AppServices::from_dependencies(&deps, policy, scope),
        }
    }

    /// Insert a draft that passes every promotion precondition
    pub async fn complete_draft(&self, subcategory: &str) -> DraftProduct {
        let subcategory_id = self.catalog.inner.add_subcategory(subcategory).await;
        let draft = DraftProduct::builder()
            .name("Fauteuil Milo")
            .supplier_id(Uuid::new_v4())
            .subcategory_id(subcategory_id)
            .cost_price(rust_decimal::Decimal::new(25000, 2))
            .color("ocre")
            .material("velours")
            .build();

        self.catalog.inner.insert_draft(&draft).await.unwrap();
        draft
    }
}
