/// Validation errors for domain value objects and incoming image files
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    // StoragePath validation errors
    EmptyStoragePath,
    StoragePathTooLong {
        actual: usize,
        max: usize,
    },
    InvalidStoragePathCharacter(char),
    StoragePathStartsWithSlash,
    StoragePathContainsDoubleSlash,

    // SKU validation errors
    EmptySku,
    SkuTooLong {
        actual: usize,
        max: usize,
    },
    InvalidSkuPrefix(String),

    // Slug validation errors
    EmptySlug {
        source_name: String,
    },

    // Image file validation errors
    EmptyFile,
    FileTooLarge {
        actual: u64,
        max: u64,
    },
    UnsupportedContentType(String),

    InvalidField {
        field: String,
        value: String,
        expected: String,
    },
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // StoragePath errors
            ValidationError::EmptyStoragePath => write!(f, "Storage path cannot be empty"),
            ValidationError::StoragePathTooLong { actual, max } => {
                write!(f, "Storage path too long: {} bytes (max: {})", actual, max)
            }
            ValidationError::InvalidStoragePathCharacter(c) => {
                write!(f, "Invalid character in storage path: {:?}", c)
            }
            ValidationError::StoragePathStartsWithSlash => {
                write!(f, "Storage path cannot start with '/'")
            }
            ValidationError::StoragePathContainsDoubleSlash => {
                write!(f, "Storage path cannot contain '//'")
            }

            // SKU errors
            ValidationError::EmptySku => write!(f, "SKU cannot be empty"),
            ValidationError::SkuTooLong { actual, max } => {
                write!(f, "SKU too long: {} characters (max: {})", actual, max)
            }
            ValidationError::InvalidSkuPrefix(prefix) => {
                write!(
                    f,
                    "Invalid SKU prefix '{}': expected exactly 3 uppercase letters",
                    prefix
                )
            }

            ValidationError::EmptySlug { source_name } => {
                write!(
                    f,
                    "Cannot derive a slug from '{}': it contains no letters or digits",
                    source_name
                )
            }

            // Image file errors
            ValidationError::EmptyFile => write!(f, "Image file is empty"),
            ValidationError::FileTooLarge { actual, max } => {
                write!(
                    f,
                    "Image file too large: {:.1} MB (max: {:.1} MB)",
                    *actual as f64 / 1_048_576.0,
                    *max as f64 / 1_048_576.0
                )
            }
            ValidationError::UnsupportedContentType(content_type) => {
                write!(f, "Unsupported image content type: {}", content_type)
            }

            ValidationError::InvalidField {
                field,
                value,
                expected,
            } => {
                write!(
                    f,
                    "Invalid value for field '{}': '{}' (expected: {})",
                    field, value, expected
                )
            }
        }
    }
}

impl std::error::Error for ValidationError {}
