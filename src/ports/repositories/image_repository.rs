use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{
    errors::StorageResult,
    models::{ImageAsset, ImageMetadataUpdate, NewImageAsset},
    value_objects::{OwnerId, OwnerScope},
};

/// Repository for image metadata rows
#[async_trait]
pub trait ImageRepository: Send + Sync + 'static {
    /// All images of an owner, ascending by display order
    async fn list_by_owner(&self, scope: &OwnerScope) -> StorageResult<Vec<ImageAsset>>;

    /// All images carrying this owner id whatever the owner kind, ascending by display order
    async fn list_by_owner_id(&self, owner_id: &OwnerId) -> StorageResult<Vec<ImageAsset>>;

    async fn get(&self, id: Uuid) -> StorageResult<Option<ImageAsset>>;

    /// Highest display order in use, `None` when the owner has no images
    async fn max_display_order(&self, scope: &OwnerScope) -> StorageResult<Option<u32>>;

    async fn insert(&self, image: NewImageAsset) -> StorageResult<ImageAsset>;

    /// Clear the primary flag on every image of the owner
    async fn clear_primary(&self, scope: &OwnerScope) -> StorageResult<()>;

    /// Flag one image as primary. Returns false when it is not in the scope.
    async fn mark_primary(&self, id: Uuid, scope: &OwnerScope) -> StorageResult<bool>;

    /// Returns false when no image with that id belongs to the owner
    async fn set_display_order(
        &self,
        id: Uuid,
        owner_id: &OwnerId,
        display_order: u32,
    ) -> StorageResult<bool>;

    async fn update_metadata(
        &self,
        id: Uuid,
        update: &ImageMetadataUpdate,
    ) -> StorageResult<Option<ImageAsset>>;

    /// Returns false when the row did not exist
    async fn delete(&self, id: Uuid) -> StorageResult<bool>;

    /// Re-point every image of `from` to `to`, returning how many moved
    async fn reassign_owner(&self, from: &OwnerScope, to: &OwnerScope) -> StorageResult<u64>;
}
