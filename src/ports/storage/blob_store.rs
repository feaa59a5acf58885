use async_trait::async_trait;
use bytes::Bytes;

use crate::domain::{errors::StorageResult, value_objects::StoragePath};

/// Port for the binary image store.
/// Implementations only hold bytes; all image metadata lives in the repository.
#[async_trait]
pub trait BlobStore: Send + Sync + 'static {
    /// Store a blob at `path`. Must fail with `AlreadyExists` instead of overwriting.
    async fn put(
        &self,
        path: &StoragePath,
        data: Bytes,
        content_type: &str,
    ) -> StorageResult<StoragePath>;

    /// Public URL a stored blob is served from. Pure string construction.
    fn public_url(&self, path: &StoragePath) -> String;

    /// Remove blobs; paths that are already gone are not an error
    async fn remove(&self, paths: &[StoragePath]) -> StorageResult<()>;
}
