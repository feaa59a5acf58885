pub mod adapters;
pub mod app;
pub mod domain;
pub mod ports;
pub mod services;

// Re-export key types for convenience

// Domain types - core business entities and value objects
pub use domain::{
    // Errors
    AttachmentError,
    // Models
    AttachedImage,
    BatchUploadOptions,
    BatchUploadReport,
    DraftProduct,
    FieldError,
    ImageAsset,
    ImageFile,
    ImageMetadataUpdate,
    ImageType,
    // Value objects
    OwnerId,
    OwnerKind,
    OwnerScope,
    Product,
    PromotionError,
    PromotionReceipt,
    PromotionState,
    Sku,
    SkuError,
    SkuPrefix,
    SkuScope,
    Slug,
    StorageError,
    StoragePath,
    UploadOptions,
    UploadPolicy,
    ValidationError,
    WriteStage,
};

// Port types - interfaces for external systems
pub use ports::{
    // Storage ports
    BlobStore,
    // Repository ports
    CategoryRepository,
    DraftRepository,
    // Service ports
    ImageAttachmentService,
    ImageRepository,
    ProductRepository,
    PromotionService,
    SkuGenerator,
};

// Service implementations - business logic
pub use services::{
    ImageAttachmentServiceBuilder, ImageAttachmentServiceImpl, PromotionServiceImpl,
    SequentialSkuGenerator,
};

// Application factory and configuration
pub use app::{
    create_app_from_env, create_in_memory_app, init_tracing, AppBuilder, AppConfig,
    AppDependencies, AppError, AppServices, RepositoryBackend, StorageBackend,
};

// Adapters
pub use adapters::outbound::{
    persistence::{
        InMemoryCatalogRepository, InMemoryImageRepository, SqlCatalogRepository,
        SqlImageRepository,
    },
    storage::{ApacheBlobStoreAdapter, PublicUrlResolver},
};

// Public facade for easy construction
pub mod prelude {
    pub use crate::{
        create_in_memory_app, AppBuilder, AppServices, DraftProduct, ImageAttachmentService,
        ImageFile, OwnerScope, PromotionService, SkuGenerator, UploadOptions,
    };
}
