use object_store::{local::LocalFileSystem, memory::InMemory, ObjectStore as ApacheObjectStore};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::{
    adapters::outbound::{
        persistence::{
            InMemoryCatalogRepository, InMemoryImageRepository, SqlCatalogRepository,
            SqlImageRepository,
        },
        storage::{create_s3_store, ApacheBlobStoreAdapter, PublicUrlResolver, S3Config},
    },
    domain::{models::UploadPolicy, value_objects::SkuScope},
    ports::{
        repositories::{CategoryRepository, DraftRepository, ImageRepository, ProductRepository},
        services::SkuGenerator,
        storage::BlobStore,
    },
    services::{ImageAttachmentServiceImpl, PromotionServiceImpl, SequentialSkuGenerator},
};

pub const DEFAULT_PUBLIC_BASE_URL: &str = "http://localhost:9000";
pub const DEFAULT_BUCKET: &str = "product-images";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Configuration for the application
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub storage_backend: StorageBackend,
    pub repository_backend: RepositoryBackend,
    /// Base of public image URLs; the bucket and path are appended
    pub public_base_url: String,
    pub bucket: String,
    pub upload_policy: UploadPolicy,
    pub sku_scope: SkuScope,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            storage_backend: StorageBackend::InMemory,
            repository_backend: RepositoryBackend::InMemory,
            public_base_url: DEFAULT_PUBLIC_BASE_URL.to_string(),
            bucket: DEFAULT_BUCKET.to_string(),
            upload_policy: UploadPolicy::default(),
            sku_scope: SkuScope::default(),
        }
    }
}

impl AppConfig {
    /// Load `.env` if present, then read configuration from the environment
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Read configuration through a variable lookup function
    pub fn from_vars<F>(var: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            var(key).ok_or_else(|| AppError::Configuration {
                message: format!("{} environment variable required", key),
            })
        };

        let bucket = var("IMAGE_BUCKET").unwrap_or_else(|| DEFAULT_BUCKET.to_string());

        let storage_backend = match var("STORAGE_BACKEND").as_deref() {
            None | Some("memory") | Some("in_memory") => StorageBackend::InMemory,
            Some("local") => StorageBackend::LocalFileSystem {
                root: required("LOCAL_STORAGE_ROOT")?,
            },
            Some("s3") => StorageBackend::S3 {
                bucket: var("S3_BUCKET").unwrap_or_else(|| bucket.clone()),
                region: required("S3_REGION")?,
                endpoint: var("S3_ENDPOINT"),
                access_key: var("S3_ACCESS_KEY"),
                secret_key: var("S3_SECRET_KEY"),
            },
            Some(other) => {
                return Err(AppError::Configuration {
                    message: format!("Unknown STORAGE_BACKEND '{}'", other),
                })
            }
        };

        let repository_backend = match var("REPOSITORY_BACKEND").as_deref() {
            None | Some("memory") | Some("in_memory") => RepositoryBackend::InMemory,
            Some("postgres") | Some("database") => RepositoryBackend::Postgres {
                connection_string: required("DATABASE_URL")?,
                max_connections: parse_var(&var, "DATABASE_MAX_CONNECTIONS")?
                    .unwrap_or(DEFAULT_MAX_CONNECTIONS),
            },
            Some(other) => {
                return Err(AppError::Configuration {
                    message: format!("Unknown REPOSITORY_BACKEND '{}'", other),
                })
            }
        };

        let mut upload_policy = UploadPolicy::default();
        if let Some(max) = parse_var(&var, "UPLOAD_MAX_BYTES")? {
            upload_policy.max_file_size = max;
        }

        let sku_scope = match var("SKU_SCOPE") {
            Some(value) => value.parse().map_err(|e| AppError::Configuration {
                message: format!("Invalid SKU_SCOPE: {}", e),
            })?,
            None => SkuScope::default(),
        };

        Ok(Self {
            storage_backend,
            repository_backend,
            public_base_url: var("PUBLIC_BASE_URL")
                .unwrap_or_else(|| DEFAULT_PUBLIC_BASE_URL.to_string()),
            bucket,
            upload_policy,
            sku_scope,
        })
    }
}

fn parse_var<F, T>(var: &F, key: &str) -> Result<Option<T>, AppError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    var(key)
        .map(|value| {
            value.trim().parse().map_err(|e| AppError::Configuration {
                message: format!("Invalid {} '{}': {}", key, value, e),
            })
        })
        .transpose()
}

/// Storage backend configuration
#[derive(Debug, Clone)]
pub enum StorageBackend {
    InMemory,
    LocalFileSystem {
        root: String,
    },
    /// AWS S3 or any S3-compatible endpoint (MinIO, Supabase storage)
    S3 {
        bucket: String,
        region: String,
        endpoint: Option<String>,
        access_key: Option<String>,
        secret_key: Option<String>,
    },
}

impl StorageBackend {
    pub fn name(&self) -> &'static str {
        match self {
            StorageBackend::InMemory => "memory",
            StorageBackend::LocalFileSystem { .. } => "local",
            StorageBackend::S3 { .. } => "s3",
        }
    }
}

/// Repository backend configuration
#[derive(Debug, Clone)]
pub enum RepositoryBackend {
    InMemory,
    Postgres {
        connection_string: String,
        max_connections: u32,
    },
}

impl RepositoryBackend {
    pub fn name(&self) -> &'static str {
        match self {
            RepositoryBackend::InMemory => "memory",
            RepositoryBackend::Postgres { .. } => "postgres",
        }
    }
}

/// Application dependencies container
#[derive(Clone)]
pub struct AppDependencies {
    pub blob_store: Arc<dyn BlobStore>,
    pub image_repository: Arc<dyn ImageRepository>,
    pub draft_repository: Arc<dyn DraftRepository>,
    pub product_repository: Arc<dyn ProductRepository>,
    pub category_repository: Arc<dyn CategoryRepository>,
}

/// Application services container
#[derive(Clone)]
pub struct AppServices {
    pub attachments: ImageAttachmentServiceImpl,
    pub sku_generator: Arc<dyn SkuGenerator>,
    pub promotion: PromotionServiceImpl,
}

impl AppServices {
    /// Wire services over already-built dependencies
    pub fn from_dependencies(
        deps: &AppDependencies,
        upload_policy: UploadPolicy,
        sku_scope: SkuScope,
    ) -> Self {
        let attachments =
            ImageAttachmentServiceImpl::new(deps.blob_store.clone(), deps.image_repository.clone())
                .with_policy(upload_policy);

        let sku_generator: Arc<dyn SkuGenerator> = Arc::new(
            SequentialSkuGenerator::new(
                deps.product_repository.clone(),
                deps.category_repository.clone(),
            )
            .with_scope(sku_scope),
        );

        let promotion = PromotionServiceImpl::new(
            deps.draft_repository.clone(),
            deps.product_repository.clone(),
            deps.image_repository.clone(),
            sku_generator.clone(),
        );

        Self {
            attachments,
            sku_generator,
            promotion,
        }
    }
}

/// Application builder for dependency injection
pub struct AppBuilder {
    config: AppConfig,
}

impl AppBuilder {
    /// Create a new application builder
    pub fn new() -> Self {
        Self {
            config: AppConfig::default(),
        }
    }

    /// Configure the application with custom settings
    pub fn with_config(mut self, config: AppConfig) -> Self {
        self.config = config;
        self
    }

    /// Configure storage backend
    pub fn with_storage_backend(mut self, backend: StorageBackend) -> Self {
        self.config.storage_backend = backend;
        self
    }

    /// Configure repository backend
    pub fn with_repository_backend(mut self, backend: RepositoryBackend) -> Self {
        self.config.repository_backend = backend;
        self
    }

    pub fn with_public_url(mut self, base_url: impl Into<String>, bucket: impl Into<String>) -> Self {
        self.config.public_base_url = base_url.into();
        self.config.bucket = bucket.into();
        self
    }

    pub fn with_upload_policy(mut self, policy: UploadPolicy) -> Self {
        self.config.upload_policy = policy;
        self
    }

    pub fn with_sku_scope(mut self, scope: SkuScope) -> Self {
        self.config.sku_scope = scope;
        self
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Build the application dependencies
    pub async fn build_dependencies(&self) -> Result<AppDependencies, AppError> {
        let blob_store = self.create_blob_store().await?;
        let (image_repository, draft_repository, product_repository, category_repository) =
            self.create_repositories().await?;

        Ok(AppDependencies {
            blob_store,
            image_repository,
            draft_repository,
            product_repository,
            category_repository,
        })
    }

    /// Build the complete application with services
    pub async fn build(self) -> Result<AppServices, AppError> {
        let deps = self.build_dependencies().await?;

        Ok(AppServices::from_dependencies(
            &deps,
            self.config.upload_policy.clone(),
            self.config.sku_scope,
        ))
    }

    /// Create the blob store adapter based on configuration
    async fn create_blob_store(&self) -> Result<Arc<dyn BlobStore>, AppError> {
        let urls = PublicUrlResolver::new(&self.config.public_base_url, &self.config.bucket)
            .map_err(|e| AppError::Configuration {
                message: e.to_string(),
            })?;

        let adapter = match &self.config.storage_backend {
            StorageBackend::InMemory => {
                let store: Arc<dyn ApacheObjectStore> = Arc::new(InMemory::new());
                ApacheBlobStoreAdapter::new(store, urls)
            }
            StorageBackend::LocalFileSystem { root } => {
                tokio::fs::create_dir_all(root)
                    .await
                    .map_err(|e| AppError::StorageInit {
                        message: format!("Cannot create storage root '{}': {}", root, e),
                    })?;
                let store = LocalFileSystem::new_with_prefix(root).map_err(|e| {
                    AppError::StorageInit {
                        message: format!("Cannot open storage root '{}': {}", root, e),
                    }
                })?;
                ApacheBlobStoreAdapter::new(Arc::new(store), urls).without_content_type()
            }
            StorageBackend::S3 {
                bucket,
                region,
                endpoint,
                access_key,
                secret_key,
            } => {
                let store = create_s3_store(&S3Config {
                    bucket: bucket.clone(),
                    region: region.clone(),
                    access_key: access_key.clone(),
                    secret_key: secret_key.clone(),
                    endpoint: endpoint.clone(),
                })
                .map_err(|e| AppError::StorageInit {
                    message: format!("{:#}", e),
                })?;
                ApacheBlobStoreAdapter::new(store, urls)
            }
        };

        Ok(Arc::new(adapter))
    }

    /// Create repositories based on configuration
    #[allow(clippy::type_complexity)]
    async fn create_repositories(
        &self,
    ) -> Result<
        (
            Arc<dyn ImageRepository>,
            Arc<dyn DraftRepository>,
            Arc<dyn ProductRepository>,
            Arc<dyn CategoryRepository>,
        ),
        AppError,
    > {
        match &self.config.repository_backend {
            RepositoryBackend::InMemory => {
                let images: Arc<dyn ImageRepository> = Arc::new(InMemoryImageRepository::new());
                let catalog = Arc::new(InMemoryCatalogRepository::new());
                let drafts: Arc<dyn DraftRepository> = catalog.clone();
                let products: Arc<dyn ProductRepository> = catalog.clone();
                let categories: Arc<dyn CategoryRepository> = catalog;
                Ok((images, drafts, products, categories))
            }
            RepositoryBackend::Postgres {
                connection_string,
                max_connections,
            } => {
                let pool = PgPoolOptions::new()
                    .max_connections(*max_connections)
                    .connect(connection_string)
                    .await
                    .map_err(|e| AppError::RepositoryInit {
                        message: format!("Failed to connect to database: {}", e),
                    })?;

                let images = SqlImageRepository::new(pool.clone());
                let catalog = Arc::new(SqlCatalogRepository::new(pool));

                images.migrate().await.map_err(|e| AppError::RepositoryInit {
                    message: format!("Image schema migration failed: {}", e),
                })?;
                catalog.migrate().await.map_err(|e| AppError::RepositoryInit {
                    message: format!("Catalog schema migration failed: {}", e),
                })?;
                info!("Database schema ready");

                let images: Arc<dyn ImageRepository> = Arc::new(images);
                let drafts: Arc<dyn DraftRepository> = catalog.clone();
                let products: Arc<dyn ProductRepository> = catalog.clone();
                let categories: Arc<dyn CategoryRepository> = catalog;
                Ok((images, drafts, products, categories))
            }
        }
    }
}

impl Default for AppBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Application-level errors
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Storage initialization error: {message}")]
    StorageInit { message: String },

    #[error("Repository initialization error: {message}")]
    RepositoryInit { message: String },
}

/// Install a global fmt subscriber. `RUST_LOG` overrides `default_level`.
pub fn init_tracing(default_level: &str) -> Result<(), AppError> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init()
        .map_err(|e| AppError::Configuration {
            message: format!("Tracing already initialized: {}", e),
        })
}

/// Create an in-memory application for testing and development
pub async fn create_in_memory_app() -> Result<AppServices, AppError> {
    AppBuilder::new()
        .with_storage_backend(StorageBackend::InMemory)
        .with_repository_backend(RepositoryBackend::InMemory)
        .build()
        .await
}

/// Create application from environment variables
pub async fn create_app_from_env() -> Result<AppServices, AppError> {
    let config = AppConfig::from_env()?;
    info!(
        storage = config.storage_backend.name(),
        repository = config.repository_backend.name(),
        "Building application from environment"
    );

    AppBuilder::new().with_config(config).build().await
}
