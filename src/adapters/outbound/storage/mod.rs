// Infrastructure error conversions
pub mod error;

pub mod apache_blob_store_adapter;
pub mod public_url;
pub mod s3;

pub use apache_blob_store_adapter::ApacheBlobStoreAdapter;
pub use public_url::PublicUrlResolver;
pub use s3::{create_s3_store, S3Config};
