use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{errors::ValidationError, value_objects::OwnerScope};

const MAX_PATH_LEN: usize = 1024;

/// A validated blob path inside the image bucket
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StoragePath(String);

impl StoragePath {
    /// Create a new StoragePath with validation
    pub fn new(value: String) -> Result<Self, ValidationError> {
        if value.is_empty() {
            return Err(ValidationError::EmptyStoragePath);
        }

        if value.len() > MAX_PATH_LEN {
            return Err(ValidationError::StoragePathTooLong {
                actual: value.len(),
                max: MAX_PATH_LEN,
            });
        }

        if let Some(c) = value.chars().find(|c| c.is_control()) {
            return Err(ValidationError::InvalidStoragePathCharacter(c));
        }

        if value.starts_with('/') {
            return Err(ValidationError::StoragePathStartsWithSlash);
        }

        if value.contains("//") {
            return Err(ValidationError::StoragePathContainsDoubleSlash);
        }

        Ok(Self(value))
    }

    /// Generate a fresh path for an owner: `{kind}/{owner}/{millis}-{random}.{ext}`
    pub fn generate(scope: &OwnerScope, extension: &str) -> Result<Self, ValidationError> {
        let random = Uuid::new_v4().simple().to_string();
        Self::new(format!(
            "{}/{}/{}-{}.{}",
            scope.kind.path_segment(),
            scope.owner_id,
            Utc::now().timestamp_millis(),
            &random[..12],
            extension
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Get the file name part of the path (everything after the last '/')
    pub fn file_name(&self) -> &str {
        self.0.rfind('/').map_or(&self.0, |idx| &self.0[idx + 1..])
    }

    pub fn has_prefix(&self, prefix: &str) -> bool {
        self.0.starts_with(prefix)
    }
}

impl TryFrom<String> for StoragePath {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<StoragePath> for String {
    fn from(path: StoragePath) -> Self {
        path.0
    }
}

impl std::fmt::Display for StoragePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
