use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    domain::{
        errors::StorageResult,
        models::{ImageAsset, ImageMetadataUpdate, NewImageAsset},
        value_objects::{OwnerId, OwnerScope},
    },
    ports::repositories::ImageRepository,
};

/// In-memory implementation of ImageRepository for testing and development
#[derive(Clone, Default)]
pub struct InMemoryImageRepository {
    images: Arc<RwLock<Vec<ImageAsset>>>,
}

impl InMemoryImageRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every stored row regardless of owner
    pub async fn all(&self) -> Vec<ImageAsset> {
        self.images.read().await.clone()
    }
}

#[async_trait]
impl ImageRepository for InMemoryImageRepository {
    async fn list_by_owner(&self, scope: &OwnerScope) -> StorageResult<Vec<ImageAsset>> {
        let images = self.images.read().await;

        let mut owned: Vec<ImageAsset> = images
            .iter()
            .filter(|image| image.belongs_to(scope))
            .cloned()
            .collect();
        owned.sort_by_key(|image| image.display_order);

        Ok(owned)
    }

    async fn list_by_owner_id(&self, owner_id: &OwnerId) -> StorageResult<Vec<ImageAsset>> {
        let images = self.images.read().await;

        let mut owned: Vec<ImageAsset> = images
            .iter()
            .filter(|image| &image.owner_id == owner_id)
            .cloned()
            .collect();
        owned.sort_by_key(|image| image.display_order);

        Ok(owned)
    }

    async fn get(&self, id: Uuid) -> StorageResult<Option<ImageAsset>> {
        let images = self.images.read().await;
        Ok(images.iter().find(|image| image.id == id).cloned())
    }

    async fn max_display_order(&self, scope: &OwnerScope) -> StorageResult<Option<u32>> {
        let images = self.images.read().await;
        Ok(images
            .iter()
            .filter(|image| image.belongs_to(scope))
            .map(|image| image.display_order)
            .max())
    }

    async fn insert(&self, image: NewImageAsset) -> StorageResult<ImageAsset> {
        let now = Utc::now();
        let asset = ImageAsset {
            id: Uuid::new_v4(),
            owner_id: image.owner.owner_id,
            owner_kind: image.owner.kind,
            storage_path: image.storage_path,
            display_order: image.display_order,
            is_primary: image.is_primary,
            image_type: image.image_type,
            alt_text: image.alt_text,
            file_size: image.file_size,
            format: image.format,
            created_at: now,
            updated_at: now,
        };

        self.images.write().await.push(asset.clone());
        Ok(asset)
    }

    async fn clear_primary(&self, scope: &OwnerScope) -> StorageResult<()> {
        let mut images = self.images.write().await;
        let now = Utc::now();

        for image in images
            .iter_mut()
            .filter(|image| image.belongs_to(scope) && image.is_primary)
        {
            image.is_primary = false;
            image.updated_at = now;
        }

        Ok(())
    }

    async fn mark_primary(&self, id: Uuid, scope: &OwnerScope) -> StorageResult<bool> {
        let mut images = self.images.write().await;

        match images
            .iter_mut()
            .find(|image| image.id == id && image.belongs_to(scope))
        {
            Some(image) => {
                image.is_primary = true;
                image.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn set_display_order(
        &self,
        id: Uuid,
        owner_id: &OwnerId,
        display_order: u32,
    ) -> StorageResult<bool> {
        let mut images = self.images.write().await;

        match images
            .iter_mut()
            .find(|image| image.id == id && &image.owner_id == owner_id)
        {
            Some(image) => {
                image.display_order = display_order;
                image.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn update_metadata(
        &self,
        id: Uuid,
        update: &ImageMetadataUpdate,
    ) -> StorageResult<Option<ImageAsset>> {
        let mut images = self.images.write().await;

        Ok(images.iter_mut().find(|image| image.id == id).map(|image| {
            update.apply(image);
            image.updated_at = Utc::now();
            image.clone()
        }))
    }

    async fn delete(&self, id: Uuid) -> StorageResult<bool> {
        let mut images = self.images.write().await;

        match images.iter().position(|image| image.id == id) {
            Some(index) => {
                images.remove(index);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn reassign_owner(&self, from: &OwnerScope, to: &OwnerScope) -> StorageResult<u64> {
        let mut images = self.images.write().await;
        let now = Utc::now();
        let mut moved = 0;

        for image in images.iter_mut().filter(|image| image.belongs_to(from)) {
            image.owner_id = to.owner_id.clone();
            image.owner_kind = to.kind;
            image.updated_at = now;
            moved += 1;
        }

        Ok(moved)
    }
}
