use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use crate::domain::{
    errors::{AttachmentError, ValidationError},
    value_objects::{OwnerId, OwnerKind, OwnerScope, StoragePath},
};

/// Role of an image on its owner's page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageType {
    Primary,
    #[default]
    Gallery,
    Technical,
    Lifestyle,
    Thumbnail,
}

impl ImageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageType::Primary => "primary",
            ImageType::Gallery => "gallery",
            ImageType::Technical => "technical",
            ImageType::Lifestyle => "lifestyle",
            ImageType::Thumbnail => "thumbnail",
        }
    }
}

impl std::fmt::Display for ImageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ImageType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "primary" => Ok(ImageType::Primary),
            "gallery" => Ok(ImageType::Gallery),
            "technical" => Ok(ImageType::Technical),
            "lifestyle" => Ok(ImageType::Lifestyle),
            "thumbnail" => Ok(ImageType::Thumbnail),
            other => Err(ValidationError::InvalidField {
                field: "image_type".to_string(),
                value: other.to_string(),
                expected: "primary | gallery | technical | lifestyle | thumbnail".to_string(),
            }),
        }
    }
}

/// Metadata row for one stored image
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageAsset {
    pub id: Uuid,
    pub owner_id: OwnerId,
    pub owner_kind: OwnerKind,
    pub storage_path: StoragePath,
    pub display_order: u32,
    pub is_primary: bool,
    pub image_type: ImageType,
    pub alt_text: Option<String>,
    pub file_size: u64,
    pub format: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ImageAsset {
    pub fn scope(&self) -> OwnerScope {
        OwnerScope::new(self.owner_id.clone(), self.owner_kind)
    }

    pub fn belongs_to(&self, scope: &OwnerScope) -> bool {
        self.owner_id == scope.owner_id && self.owner_kind == scope.kind
    }
}

/// Row to insert; the repository assigns id and timestamps
#[derive(Debug, Clone, PartialEq)]
pub struct NewImageAsset {
    pub owner: OwnerScope,
    pub storage_path: StoragePath,
    pub display_order: u32,
    pub is_primary: bool,
    pub image_type: ImageType,
    pub alt_text: Option<String>,
    pub file_size: u64,
    pub format: String,
}

/// An image together with the URL it is served from
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttachedImage {
    #[serde(flatten)]
    pub asset: ImageAsset,
    pub public_url: String,
}

impl std::ops::Deref for AttachedImage {
    type Target = ImageAsset;

    fn deref(&self) -> &Self::Target {
        &self.asset
    }
}

/// The flagged primary image, else the lowest display order, else none.
///
/// View-time fallback only: it never writes a primary flag.
pub fn select_primary(images: &[AttachedImage]) -> Option<&AttachedImage> {
    images
        .iter()
        .find(|image| image.is_primary)
        .or_else(|| images.iter().min_by_key(|image| image.display_order))
}

/// An uploaded image file as received from the caller
#[derive(Debug, Clone)]
pub struct ImageFile {
    pub file_name: String,
    pub content_type: String,
    pub data: Bytes,
}

impl ImageFile {
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        data: impl Into<Bytes>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            data: data.into(),
        }
    }

    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }

    /// Lowercase extension from the file name, falling back to the content type
    pub fn extension(&self) -> String {
        let from_name = self
            .file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .filter(|ext| {
                !ext.is_empty() && ext.len() <= 5 && ext.chars().all(|c| c.is_ascii_alphanumeric())
            });

        from_name.unwrap_or_else(|| {
            match self.content_type.as_str() {
                "image/jpeg" | "image/jpg" => "jpg",
                "image/png" => "png",
                "image/webp" => "webp",
                "image/heic" => "heic",
                "image/gif" => "gif",
                "image/avif" => "avif",
                _ => "bin",
            }
            .to_string()
        })
    }
}

/// Limits checked before any upload I/O
#[derive(Debug, Clone, PartialEq)]
pub struct UploadPolicy {
    pub max_file_size: u64,
    pub allowed_content_types: Vec<String>,
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self {
            max_file_size: 10 * 1024 * 1024,
            allowed_content_types: [
                "image/jpeg",
                "image/png",
                "image/webp",
                "image/heic",
                "image/gif",
                "image/avif",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
        }
    }
}

impl UploadPolicy {
    pub fn validate(&self, file: &ImageFile) -> Result<(), ValidationError> {
        if file.data.is_empty() {
            return Err(ValidationError::EmptyFile);
        }

        if file.size() > self.max_file_size {
            return Err(ValidationError::FileTooLarge {
                actual: file.size(),
                max: self.max_file_size,
            });
        }

        let content_type = file.content_type.to_ascii_lowercase();
        if !self
            .allowed_content_types
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(&content_type))
        {
            return Err(ValidationError::UnsupportedContentType(
                file.content_type.clone(),
            ));
        }

        Ok(())
    }
}

/// Options for a single upload
#[derive(Debug, Clone, Default, bon::Builder)]
pub struct UploadOptions {
    #[builder(default)]
    pub is_primary: bool,
    pub image_type: Option<ImageType>,
    #[builder(into)]
    pub alt_text: Option<String>,
}

/// Options for a batch upload
#[derive(Debug, Clone, Default, bon::Builder)]
pub struct BatchUploadOptions {
    pub image_type: Option<ImageType>,
    #[builder(into)]
    pub alt_text_prefix: Option<String>,
}

/// Changes to an existing image's descriptive fields.
/// `None` leaves a field as is; an empty alt text clears it.
#[derive(Debug, Clone, Default, PartialEq, bon::Builder)]
pub struct ImageMetadataUpdate {
    #[builder(into)]
    pub alt_text: Option<String>,
    pub image_type: Option<ImageType>,
}

impl ImageMetadataUpdate {
    pub fn apply(&self, asset: &mut ImageAsset) {
        if let Some(alt_text) = &self.alt_text {
            asset.alt_text = normalized_alt_text(alt_text);
        }
        if let Some(image_type) = self.image_type {
            asset.image_type = image_type;
        }
    }
}

pub(crate) fn normalized_alt_text(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// One file of a batch that could not be attached
#[derive(Debug, Clone)]
pub struct BatchUploadFailure {
    pub file_name: String,
    pub error: AttachmentError,
}

/// Outcome of a batch upload: successes in input order plus per-file failures
#[derive(Debug, Clone, Default)]
pub struct BatchUploadReport {
    pub uploaded: Vec<AttachedImage>,
    pub failures: Vec<BatchUploadFailure>,
}

impl BatchUploadReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}
