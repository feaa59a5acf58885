use url::Url;

use crate::domain::{errors::StorageError, value_objects::StoragePath};

/// Builds `{base}/{bucket}/{path}` URLs for stored blobs
#[derive(Debug, Clone, PartialEq)]
pub struct PublicUrlResolver {
    prefix: String,
}

impl PublicUrlResolver {
    pub fn new(base_url: &str, bucket: &str) -> Result<Self, StorageError> {
        let bucket = bucket.trim_matches('/');
        if bucket.is_empty() || bucket.contains('/') {
            return Err(StorageError::infrastructure(
                "Invalid bucket name for public URLs",
                bucket,
            ));
        }

        let mut base = Url::parse(base_url)
            .map_err(|e| StorageError::infrastructure("Invalid public base URL", e))?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let prefix = base
            .join(&format!("{}/", bucket))
            .map_err(|e| StorageError::infrastructure("Invalid public base URL", e))?;

        Ok(Self {
            prefix: prefix.to_string(),
        })
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn resolve(&self, path: &StoragePath) -> String {
        format!("{}{}", self.prefix, path)
    }
}
