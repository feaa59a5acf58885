use anyhow::{Context, Result};
use object_store::{
    aws::{AmazonS3Builder, S3ConditionalPut},
    ObjectStore as ApacheObjectStore,
};
use std::sync::Arc;

/// Configuration for an S3-compatible backend (AWS, MinIO, Supabase storage)
#[derive(Debug, Clone)]
pub struct S3Config {
    pub bucket: String,
    pub region: String,
    pub access_key: Option<String>,
    pub secret_key: Option<String>,
    pub endpoint: Option<String>,
}

/// Create an S3 store from configuration
pub fn create_s3_store(config: &S3Config) -> Result<Arc<dyn ApacheObjectStore>> {
    let mut builder = AmazonS3Builder::new()
        .with_bucket_name(&config.bucket)
        .with_region(&config.region)
        .with_conditional_put(S3ConditionalPut::ETagMatch);

    if let Some(access_key) = &config.access_key {
        builder = builder.with_access_key_id(access_key);
    }

    if let Some(secret_key) = &config.secret_key {
        builder = builder.with_secret_access_key(secret_key);
    }

    if let Some(endpoint) = &config.endpoint {
        builder = builder
            .with_endpoint(endpoint)
            .with_allow_http(endpoint.starts_with("http://"))
            .with_virtual_hosted_style_request(false);
    }

    let store = builder
        .build()
        .with_context(|| format!("Failed to build S3 store for bucket '{}'", config.bucket))?;

    Ok(Arc::new(store))
}
