use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::{
    domain::{
        errors::{AttachmentError, AttachmentResult, WriteStage},
        models::{
            normalized_alt_text, AttachedImage, BatchUploadFailure, BatchUploadOptions,
            BatchUploadReport, ImageAsset, ImageFile, ImageMetadataUpdate, ImageType,
            NewImageAsset, UploadOptions, UploadPolicy,
        },
        value_objects::{OwnerId, OwnerScope, StoragePath},
    },
    ports::{repositories::ImageRepository, services::ImageAttachmentService, storage::BlobStore},
};

/// Implementation of ImageAttachmentService over a blob store and an image repository
#[derive(Clone)]
pub struct ImageAttachmentServiceImpl {
    blobs: Arc<dyn BlobStore>,
    images: Arc<dyn ImageRepository>,
    policy: UploadPolicy,
}

impl ImageAttachmentServiceImpl {
    pub fn new(blobs: Arc<dyn BlobStore>, images: Arc<dyn ImageRepository>) -> Self {
        Self {
            blobs,
            images,
            policy: UploadPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: UploadPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> &UploadPolicy {
        &self.policy
    }

    fn attached(&self, asset: ImageAsset) -> AttachedImage {
        AttachedImage {
            public_url: self.blobs.public_url(&asset.storage_path),
            asset,
        }
    }

    /// Metadata half of an upload: order lookup, optional primary clear, insert
    async fn record_metadata(
        &self,
        owner: &OwnerScope,
        path: StoragePath,
        file: &ImageFile,
        options: UploadOptions,
    ) -> AttachmentResult<ImageAsset> {
        let display_order = self
            .images
            .max_display_order(owner)
            .await
            .map_err(|source| AttachmentError::MetadataReadFailed { source })?
            .map_or(0, |max| max + 1);

        if options.is_primary {
            self.images.clear_primary(owner).await.map_err(|source| {
                AttachmentError::MetadataWriteFailed {
                    stage: WriteStage::ClearPrimary,
                    source,
                }
            })?;
        }

        let image_type = options.image_type.unwrap_or(if options.is_primary {
            ImageType::Primary
        } else {
            ImageType::Gallery
        });

        let row = NewImageAsset {
            owner: owner.clone(),
            storage_path: path,
            display_order,
            is_primary: options.is_primary,
            image_type,
            alt_text: options.alt_text.as_deref().and_then(normalized_alt_text),
            file_size: file.size(),
            format: file.extension(),
        };

        self.images
            .insert(row)
            .await
            .map_err(|source| AttachmentError::MetadataWriteFailed {
                stage: WriteStage::Insert,
                source,
            })
    }

    /// Best-effort blob removal; failures are only logged
    async fn discard_blobs(&self, paths: &[StoragePath]) {
        if let Err(source) = self.blobs.remove(paths).await {
            let error = AttachmentError::StorageDeleteFailed {
                paths: paths.iter().map(ToString::to_string).collect(),
                source,
            };
            warn!(error = %error, "Image blob left behind in storage");
        }
    }
}

#[async_trait]
impl ImageAttachmentService for ImageAttachmentServiceImpl {
    #[instrument(skip_all, fields(owner = %owner))]
    async fn fetch(&self, owner: &OwnerScope) -> AttachmentResult<Vec<AttachedImage>> {
        if !owner.is_provisioned() {
            return Ok(Vec::new());
        }

        let assets = self
            .images
            .list_by_owner(owner)
            .await
            .map_err(|source| AttachmentError::MetadataReadFailed { source })?;

        Ok(assets.into_iter().map(|asset| self.attached(asset)).collect())
    }

    #[instrument(
        skip_all,
        fields(owner = %owner, file_name = %file.file_name, storage_path = tracing::field::Empty)
    )]
    async fn upload(
        &self,
        owner: &OwnerScope,
        file: ImageFile,
        options: UploadOptions,
    ) -> AttachmentResult<AttachedImage> {
        if !owner.is_provisioned() {
            return Err(AttachmentError::OwnerNotProvisioned);
        }

        let invalid = |reason| AttachmentError::InvalidFile {
            file_name: file.file_name.clone(),
            reason,
        };
        self.policy.validate(&file).map_err(invalid)?;
        let path = StoragePath::generate(owner, &file.extension()).map_err(invalid)?;
        tracing::Span::current().record("storage_path", path.as_str());

        let stored = self
            .blobs
            .put(&path, file.data.clone(), &file.content_type)
            .await
            .map_err(|source| AttachmentError::StorageWriteFailed {
                path: path.to_string(),
                source,
            })?;

        match self
            .record_metadata(owner, stored.clone(), &file, options)
            .await
        {
            Ok(asset) => {
                debug!(asset_id = %asset.id, display_order = asset.display_order, "Image attached");
                Ok(self.attached(asset))
            }
            Err(error) => {
                warn!(error = %error, "Image metadata not recorded, removing uploaded blob");
                self.discard_blobs(std::slice::from_ref(&stored)).await;
                Err(error)
            }
        }
    }

    #[instrument(skip_all, fields(owner = %owner, files = files.len()))]
    async fn upload_many(
        &self,
        owner: &OwnerScope,
        files: Vec<ImageFile>,
        options: BatchUploadOptions,
    ) -> AttachmentResult<BatchUploadReport> {
        if !owner.is_provisioned() {
            return Err(AttachmentError::OwnerNotProvisioned);
        }

        let mut report = BatchUploadReport::default();

        for (index, file) in files.into_iter().enumerate() {
            let alt_text = match &options.alt_text_prefix {
                Some(prefix) => format!("{} {}", prefix, index + 1),
                None => file.file_name.clone(),
            };
            let file_options = UploadOptions {
                is_primary: index == 0,
                image_type: options.image_type,
                alt_text: Some(alt_text),
            };
            let file_name = file.file_name.clone();

            match self.upload(owner, file, file_options).await {
                Ok(image) => report.uploaded.push(image),
                Err(error) => {
                    warn!(file_name = %file_name, error = %error, "Batch upload: file skipped");
                    report.failures.push(BatchUploadFailure { file_name, error });
                }
            }
        }

        info!(
            uploaded = report.uploaded.len(),
            failed = report.failures.len(),
            "Batch upload finished"
        );
        Ok(report)
    }

    #[instrument(skip_all, fields(asset_id = %asset_id))]
    async fn delete(&self, asset_id: Uuid) -> AttachmentResult<()> {
        let asset = self
            .images
            .get(asset_id)
            .await
            .map_err(|source| AttachmentError::MetadataReadFailed { source })?
            .ok_or(AttachmentError::AssetNotFound { asset_id })?;

        self.discard_blobs(std::slice::from_ref(&asset.storage_path))
            .await;

        let existed = self
            .images
            .delete(asset_id)
            .await
            .map_err(|source| AttachmentError::MetadataDeleteFailed { asset_id, source })?;
        if !existed {
            debug!("Image row already deleted");
        }

        Ok(())
    }

    #[instrument(skip_all, fields(owner_id = %owner_id, count = ordered_ids.len()))]
    async fn reorder(&self, owner_id: &OwnerId, ordered_ids: &[Uuid]) -> AttachmentResult<()> {
        let current = self
            .images
            .list_by_owner_id(owner_id)
            .await
            .map_err(|source| AttachmentError::MetadataReadFailed { source })?;

        let owned: HashSet<Uuid> = current.iter().map(|image| image.id).collect();
        let mut placed = HashSet::new();
        let mut sequence = Vec::with_capacity(current.len());

        for id in ordered_ids {
            if !owned.contains(id) {
                debug!(asset_id = %id, "Reorder skipped image not owned by this owner");
            } else if placed.insert(*id) {
                sequence.push(*id);
            }
        }
        // Unlisted images follow, keeping their relative order
        sequence.extend(
            current
                .iter()
                .map(|image| image.id)
                .filter(|id| !placed.contains(id)),
        );

        let orders: HashMap<Uuid, u32> = current
            .iter()
            .map(|image| (image.id, image.display_order))
            .collect();

        for (index, id) in sequence.into_iter().enumerate() {
            let display_order = index as u32;
            if orders.get(&id) == Some(&display_order) {
                continue;
            }

            let updated = self
                .images
                .set_display_order(id, owner_id, display_order)
                .await
                .map_err(|source| AttachmentError::MetadataWriteFailed {
                    stage: WriteStage::Reorder,
                    source,
                })?;

            if !updated {
                debug!(asset_id = %id, "Image removed while reordering");
            }
        }

        Ok(())
    }

    #[instrument(skip_all, fields(owner = %owner, asset_id = %asset_id))]
    async fn set_primary(&self, owner: &OwnerScope, asset_id: Uuid) -> AttachmentResult<()> {
        if !owner.is_provisioned() {
            return Err(AttachmentError::OwnerNotProvisioned);
        }

        // Clear before set: an interruption leaves no primary rather than two.
        self.images
            .clear_primary(owner)
            .await
            .map_err(|source| AttachmentError::MetadataWriteFailed {
                stage: WriteStage::ClearPrimary,
                source,
            })?;

        let marked = self
            .images
            .mark_primary(asset_id, owner)
            .await
            .map_err(|source| AttachmentError::MetadataWriteFailed {
                stage: WriteStage::SetPrimary,
                source,
            })?;

        if !marked {
            return Err(AttachmentError::AssetNotFound { asset_id });
        }

        Ok(())
    }

    #[instrument(skip_all, fields(asset_id = %asset_id))]
    async fn update_metadata(
        &self,
        asset_id: Uuid,
        update: ImageMetadataUpdate,
    ) -> AttachmentResult<AttachedImage> {
        let asset = self
            .images
            .update_metadata(asset_id, &update)
            .await
            .map_err(|source| AttachmentError::MetadataWriteFailed {
                stage: WriteStage::Update,
                source,
            })?
            .ok_or(AttachmentError::AssetNotFound { asset_id })?;

        Ok(self.attached(asset))
    }
}

/// Builder for ImageAttachmentServiceImpl
#[derive(Default)]
pub struct ImageAttachmentServiceBuilder {
    blobs: Option<Arc<dyn BlobStore>>,
    images: Option<Arc<dyn ImageRepository>>,
    policy: Option<UploadPolicy>,
}

impl ImageAttachmentServiceBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn blob_store(mut self, blobs: Arc<dyn BlobStore>) -> Self {
        self.blobs = Some(blobs);
        self
    }

    pub fn image_repository(mut self, images: Arc<dyn ImageRepository>) -> Self {
        self.images = Some(images);
        self
    }

    pub fn upload_policy(mut self, policy: UploadPolicy) -> Self {
        self.policy = Some(policy);
        self
    }

    pub fn build(self) -> Result<ImageAttachmentServiceImpl, &'static str> {
        let blobs = self.blobs.ok_or("Blob store is required")?;
        let images = self.images.ok_or("Image repository is required")?;

        let service = ImageAttachmentServiceImpl::new(blobs, images);
        Ok(match self.policy {
            Some(policy) => service.with_policy(policy),
            None => service,
        })
    }
}
