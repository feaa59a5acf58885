use uuid::Uuid;

use crate::domain::errors::{StorageError, ValidationError};

/// Metadata write stage that failed during an attachment operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteStage {
    ClearPrimary,
    Insert,
    SetPrimary,
    Reorder,
    Update,
}

impl WriteStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            WriteStage::ClearPrimary => "clear_primary",
            WriteStage::Insert => "insert",
            WriteStage::SetPrimary => "set_primary",
            WriteStage::Reorder => "reorder",
            WriteStage::Update => "update",
        }
    }
}

impl std::fmt::Display for WriteStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors produced by the image attachment manager
#[derive(Debug, Clone, thiserror::Error)]
pub enum AttachmentError {
    /// The owning draft or product has no id yet. Raised before any I/O.
    #[error("Image owner has not been saved yet; save it before attaching images")]
    OwnerNotProvisioned,

    #[error("Invalid image file '{file_name}': {reason}")]
    InvalidFile {
        file_name: String,
        reason: ValidationError,
    },

    #[error("Image not found: {asset_id}")]
    AssetNotFound { asset_id: Uuid },

    #[error("Failed to write image blob '{path}': {source}")]
    StorageWriteFailed { path: String, source: StorageError },

    #[error("Image metadata write failed at stage '{stage}': {source}")]
    MetadataWriteFailed {
        stage: WriteStage,
        source: StorageError,
    },

    /// Never returned to callers; logged as a warning where blob removal is best-effort.
    #[error("Failed to remove image blob(s) {paths:?}: {source}")]
    StorageDeleteFailed {
        paths: Vec<String>,
        source: StorageError,
    },

    #[error("Failed to delete image metadata {asset_id}: {source}")]
    MetadataDeleteFailed {
        asset_id: Uuid,
        source: StorageError,
    },

    #[error("Failed to read image metadata: {source}")]
    MetadataReadFailed { source: StorageError },
}

/// Result type for attachment operations
pub type AttachmentResult<T> = Result<T, AttachmentError>;
