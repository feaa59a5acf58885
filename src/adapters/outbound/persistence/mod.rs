mod sql_support;

pub mod in_memory_catalog_repository;
pub mod in_memory_image_repository;
pub mod sql_catalog_repository;
pub mod sql_image_repository;

pub use in_memory_catalog_repository::InMemoryCatalogRepository;
pub use in_memory_image_repository::InMemoryImageRepository;
pub use sql_catalog_repository::SqlCatalogRepository;
pub use sql_image_repository::SqlImageRepository;
