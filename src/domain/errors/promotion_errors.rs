use serde::Serialize;
use uuid::Uuid;

use crate::domain::{errors::StorageError, models::Product};

/// A single field-level reason a draft cannot be promoted
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

fn join_field_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Errors from the sequential SKU generator
#[derive(Debug, Clone, thiserror::Error)]
pub enum SkuError {
    #[error("SKU sequence counter unavailable for scope '{scope}': {source}")]
    SequenceUnavailable { scope: String, source: StorageError },
}

/// Errors from the draft-to-product promotion pipeline.
///
/// Each variant names the step that failed so callers can decide between
/// retrying and manual reconciliation.
#[derive(Debug, Clone, thiserror::Error)]
pub enum PromotionError {
    /// Preconditions failed; nothing was written.
    #[error("Draft cannot be promoted: {}", join_field_errors(.0))]
    Validation(Vec<FieldError>),

    #[error("Draft not found: {draft_id}")]
    DraftNotFound { draft_id: Uuid },

    #[error("Failed to load draft {draft_id}: {source}")]
    DraftLookup { draft_id: Uuid, source: StorageError },

    /// Nothing was written except possibly a burned sequence number.
    #[error("SKU generation failed: {0}")]
    Sku(#[from] SkuError),

    /// The product row was not created; retrying is safe.
    #[error("Product insert failed, nothing was created: {source}")]
    ProductInsert { source: StorageError },

    #[error("Product {product_id} recorded for draft {draft_id} could not be loaded: {source}")]
    ResumeLookup {
        draft_id: Uuid,
        product_id: Uuid,
        source: StorageError,
    },

    /// The product exists but some images still belong to the draft.
    /// Re-running the migration is idempotent.
    #[error(
        "Product {product_id} was created but moving images from draft {draft_id} failed: {source}"
    )]
    ImageMigration {
        draft_id: Uuid,
        product_id: Uuid,
        product: Box<Product>,
        source: StorageError,
    },
}

impl PromotionError {
    /// Field errors when the failure was a precondition check
    pub fn field_errors(&self) -> Option<&[FieldError]> {
        match self {
            PromotionError::Validation(errors) => Some(errors),
            _ => None,
        }
    }

    /// The product that was created before the failure, if any
    pub fn created_product(&self) -> Option<&Product> {
        match self {
            PromotionError::ImageMigration { product, .. } => Some(product),
            _ => None,
        }
    }
}

/// Result type for promotion operations
pub type PromotionResult<T> = Result<T, PromotionError>;
