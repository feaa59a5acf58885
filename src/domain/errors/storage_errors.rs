/// Errors raised by the blob store and metadata repositories
#[derive(Debug, Clone, PartialEq)]
pub enum StorageError {
    /// Record or blob not found
    NotFound { resource: String },

    /// Record or blob already exists (unique constraint, create-only put)
    AlreadyExists { resource: String },

    /// A persisted value could not be mapped back into the domain
    InvalidData { message: String },

    /// Infrastructure error with external source
    InfrastructureError {
        message: String,
        source: Option<String>, // Store error as string to allow Clone
    },
}

impl StorageError {
    pub fn infrastructure(message: impl Into<String>, source: impl std::fmt::Display) -> Self {
        StorageError::InfrastructureError {
            message: message.into(),
            source: Some(source.to_string()),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StorageError::NotFound { .. })
    }
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageError::NotFound { resource } => write!(f, "Not found: {}", resource),
            StorageError::AlreadyExists { resource } => {
                write!(f, "Already exists: {}", resource)
            }
            StorageError::InvalidData { message } => {
                write!(f, "Invalid stored data: {}", message)
            }
            StorageError::InfrastructureError { message, source } => match source {
                Some(source) => write!(f, "Infrastructure error: {} ({})", message, source),
                None => write!(f, "Infrastructure error: {}", message),
            },
        }
    }
}

impl std::error::Error for StorageError {}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;
