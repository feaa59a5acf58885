use crate::domain::errors::StorageError;

/// Convert object_store errors to domain storage errors
impl From<object_store::Error> for StorageError {
    fn from(err: object_store::Error) -> Self {
        match err {
            object_store::Error::NotFound { path, .. } => StorageError::NotFound {
                resource: format!("blob {}", path),
            },
            object_store::Error::AlreadyExists { path, .. } => StorageError::AlreadyExists {
                resource: format!("blob {}", path),
            },
            object_store::Error::Precondition { path, .. } => StorageError::AlreadyExists {
                resource: format!("blob {}", path),
            },
            _ => StorageError::infrastructure("Object store operation failed", &err),
        }
    }
}
