use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use object_store::{
    memory::InMemory, path::Path as ObjectPath, Attribute, Attributes,
    ObjectStore as ApacheObjectStore, PutMode, PutOptions, PutPayload,
};
use std::sync::Arc;
use tracing::{debug, instrument};

use super::public_url::PublicUrlResolver;
use crate::{
    domain::{
        errors::{StorageError, StorageResult},
        value_objects::StoragePath,
    },
    ports::storage::BlobStore,
};

/// Adapter that implements our BlobStore trait using Apache object_store
pub struct ApacheBlobStoreAdapter {
    inner: Arc<dyn ApacheObjectStore>,
    urls: PublicUrlResolver,
    content_type_attributes: bool,
}

impl ApacheBlobStoreAdapter {
    pub fn new(store: Arc<dyn ApacheObjectStore>, urls: PublicUrlResolver) -> Self {
        Self {
            inner: store,
            urls,
            content_type_attributes: true,
        }
    }

    /// Process-local store, for tests and development
    pub fn in_memory(base_url: &str, bucket: &str) -> StorageResult<Self> {
        Ok(Self::new(
            Arc::new(InMemory::new()),
            PublicUrlResolver::new(base_url, bucket)?,
        ))
    }

    /// Skip the content-type attribute on writes, for backends that reject
    /// object attributes (local filesystem)
    pub fn without_content_type(mut self) -> Self {
        self.content_type_attributes = false;
        self
    }

    /// The wrapped object_store backend
    pub fn inner(&self) -> Arc<dyn ApacheObjectStore> {
        self.inner.clone()
    }

    fn put_options(&self, content_type: &str) -> PutOptions {
        let mut attributes = Attributes::new();
        if self.content_type_attributes {
            attributes.insert(Attribute::ContentType, content_type.to_string().into());
        }

        PutOptions {
            mode: PutMode::Create,
            attributes,
            ..Default::default()
        }
    }
}

#[async_trait]
impl BlobStore for ApacheBlobStoreAdapter {
    #[instrument(skip_all, fields(storage_path = %path, size = data.len()))]
    async fn put(
        &self,
        path: &StoragePath,
        data: Bytes,
        content_type: &str,
    ) -> StorageResult<StoragePath> {
        let location = ObjectPath::from(path.as_str());

        self.inner
            .put_opts(&location, PutPayload::from(data), self.put_options(content_type))
            .await?;

        debug!("Blob stored");
        Ok(path.clone())
    }

    fn public_url(&self, path: &StoragePath) -> String {
        self.urls.resolve(path)
    }

    #[instrument(skip_all, fields(count = paths.len()))]
    async fn remove(&self, paths: &[StoragePath]) -> StorageResult<()> {
        if paths.is_empty() {
            return Ok(());
        }

        let locations = futures::stream::iter(
            paths
                .iter()
                .map(|path| Ok::<_, object_store::Error>(ObjectPath::from(path.as_str())))
                .collect::<Vec<_>>(),
        )
        .boxed();

        let mut results = self.inner.delete_stream(locations);
        let mut first_error: Option<StorageError> = None;

        while let Some(result) = results.next().await {
            match result {
                Ok(location) => debug!(storage_path = %location, "Blob removed"),
                Err(object_store::Error::NotFound { path, .. }) => {
                    debug!(storage_path = %path, "Blob already gone")
                }
                Err(e) => {
                    if first_error.is_none() {
                        first_error = Some(e.into());
                    }
                }
            }
        }

        match first_error {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn adapter() -> ApacheBlobStoreAdapter {
        ApacheBlobStoreAdapter::in_memory("https://cdn.example.com/", "product-images").unwrap()
    }

    fn path(value: &str) -> StoragePath {
        StoragePath::new(value.to_string()).unwrap()
    }

    #[tokio::test]
    async fn test_put_is_create_only() {
        let store = adapter();
        let target = path("drafts/d1/1-abc.jpg");

        store
            .put(&target, Bytes::from_static(b"one"), "image/jpeg")
            .await
            .unwrap();
        let second = store
            .put(&target, Bytes::from_static(b"two"), "image/jpeg")
            .await;

        assert!(matches!(second, Err(StorageError::AlreadyExists { .. })));

        let stored = store
            .inner()
            .get(&ObjectPath::from(target.as_str()))
            .await
            .unwrap();
        assert_eq!(
            stored
                .attributes
                .get(&Attribute::ContentType)
                .map(|v| &**v),
            Some("image/jpeg")
        );
        assert_eq!(stored.bytes().await.unwrap(), Bytes::from_static(b"one"));
    }

    #[tokio::test]
    async fn test_remove_tolerates_missing_blobs() {
        let store = adapter();
        let kept = path("drafts/d1/1-abc.jpg");
        store
            .put(&kept, Bytes::from_static(b"data"), "image/jpeg")
            .await
            .unwrap();

        store
            .remove(&[kept.clone(), path("drafts/d1/missing.jpg")])
            .await
            .unwrap();

        assert!(store
            .inner()
            .head(&ObjectPath::from(kept.as_str()))
            .await
            .is_err());
    }

    #[test]
    fn test_public_url() {
        assert_eq!(
            adapter().public_url(&path("products/p1/2-def.png")),
            "https://cdn.example.com/product-images/products/p1/2-def.png"
        );
    }
}
