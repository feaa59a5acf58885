use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{
    errors::AttachmentResult,
    models::{
        select_primary, AttachedImage, BatchUploadOptions, BatchUploadReport, ImageFile,
        ImageMetadataUpdate, UploadOptions,
    },
    value_objects::{OwnerId, OwnerScope},
};

/// Port for managing the images attached to a draft or product.
///
/// Every image lives in two stores: the blob in the [`BlobStore`] and its
/// metadata row in the [`ImageRepository`]. The metadata row is the source
/// of truth; blobs are written first and removed best-effort.
///
/// [`BlobStore`]: crate::ports::storage::BlobStore
/// [`ImageRepository`]: crate::ports::repositories::ImageRepository
#[async_trait]
pub trait ImageAttachmentService: Send + Sync + 'static {
    /// Images of an owner in display order, with public URLs.
    /// An unprovisioned owner yields an empty list.
    async fn fetch(&self, owner: &OwnerScope) -> AttachmentResult<Vec<AttachedImage>>;

    /// Store one file and attach it to the owner
    async fn upload(
        &self,
        owner: &OwnerScope,
        file: ImageFile,
        options: UploadOptions,
    ) -> AttachmentResult<AttachedImage>;

    /// Upload files one by one in input order; the first becomes primary.
    /// Individual failures are collected in the report, never aborting the batch.
    /// An unprovisioned owner fails the whole call with `OwnerNotProvisioned`
    /// before any file is attempted.
    async fn upload_many(
        &self,
        owner: &OwnerScope,
        files: Vec<ImageFile>,
        options: BatchUploadOptions,
    ) -> AttachmentResult<BatchUploadReport>;

    /// Remove an image. Blob removal is best-effort, the metadata delete is not.
    async fn delete(&self, asset_id: Uuid) -> AttachmentResult<()>;

    /// Set display order to each id's position in `ordered_ids`.
    /// Repeated and foreign ids are skipped; the owner's unlisted images
    /// follow in their current relative order.
    async fn reorder(&self, owner_id: &OwnerId, ordered_ids: &[Uuid]) -> AttachmentResult<()>;

    /// Make `asset_id` the owner's only primary image
    async fn set_primary(&self, owner: &OwnerScope, asset_id: Uuid) -> AttachmentResult<()>;

    async fn update_metadata(
        &self,
        asset_id: Uuid,
        update: ImageMetadataUpdate,
    ) -> AttachmentResult<AttachedImage>;

    /// Primary image to display for a fetched list
    fn primary<'a>(&self, images: &'a [AttachedImage]) -> Option<&'a AttachedImage> {
        select_primary(images)
    }
}
