use async_trait::async_trait;
use sqlx::{postgres::PgRow, PgPool};
use uuid::Uuid;

use super::sql_support::{column, invalid_data, map_sqlx_error, run_migrations};
use crate::{
    domain::{
        errors::StorageResult,
        models::{normalized_alt_text, ImageAsset, ImageMetadataUpdate, NewImageAsset},
        value_objects::{OwnerId, OwnerScope, StoragePath},
    },
    ports::repositories::ImageRepository,
};

const IMAGE_COLUMNS: &str = "id, owner_id, owner_kind, storage_path, display_order, is_primary, \
     image_type, alt_text, file_size, format, created_at, updated_at";

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS product_images (
        id UUID PRIMARY KEY,
        owner_id TEXT NOT NULL,
        owner_kind TEXT NOT NULL CHECK (owner_kind IN ('draft', 'product')),
        storage_path TEXT NOT NULL UNIQUE,
        display_order INTEGER NOT NULL CHECK (display_order >= 0),
        is_primary BOOLEAN NOT NULL DEFAULT FALSE,
        image_type TEXT NOT NULL DEFAULT 'gallery',
        alt_text TEXT,
        file_size BIGINT NOT NULL,
        format TEXT NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_product_images_owner \
     ON product_images(owner_id, owner_kind, display_order)",
];

/// PostgreSQL implementation of ImageRepository
#[derive(Clone)]
pub struct SqlImageRepository {
    pool: PgPool,
}

impl SqlImageRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Initialize database tables
    pub async fn migrate(&self) -> Result<(), sqlx::Error> {
        run_migrations(&self.pool, SCHEMA).await
    }
}

fn image_from_row(row: &PgRow) -> StorageResult<ImageAsset> {
    let owner_kind: String = column(row, "owner_kind")?;
    let storage_path: String = column(row, "storage_path")?;
    let display_order: i32 = column(row, "display_order")?;
    let image_type: String = column(row, "image_type")?;
    let file_size: i64 = column(row, "file_size")?;

    Ok(ImageAsset {
        id: column(row, "id")?,
        owner_id: OwnerId::new(column::<String>(row, "owner_id")?),
        owner_kind: owner_kind.parse().map_err(|e| invalid_data("owner_kind", e))?,
        storage_path: StoragePath::new(storage_path).map_err(|e| invalid_data("storage_path", e))?,
        display_order: u32::try_from(display_order)
            .map_err(|e| invalid_data("display_order", e))?,
        is_primary: column(row, "is_primary")?,
        image_type: image_type.parse().map_err(|e| invalid_data("image_type", e))?,
        alt_text: column(row, "alt_text")?,
        file_size: u64::try_from(file_size).map_err(|e| invalid_data("file_size", e))?,
        format: column(row, "format")?,
        created_at: column(row, "created_at")?,
        updated_at: column(row, "updated_at")?,
    })
}

#[async_trait]
impl ImageRepository for SqlImageRepository {
    async fn list_by_owner(&self, scope: &OwnerScope) -> StorageResult<Vec<ImageAsset>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM product_images \
             WHERE owner_id = $1 AND owner_kind = $2 \
             ORDER BY display_order ASC, created_at ASC",
            IMAGE_COLUMNS
        ))
        .bind(scope.owner_id.as_str())
        .bind(scope.kind.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("listing images", e))?;

        rows.iter().map(image_from_row).collect()
    }

    async fn list_by_owner_id(&self, owner_id: &OwnerId) -> StorageResult<Vec<ImageAsset>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM product_images \
             WHERE owner_id = $1 \
             ORDER BY display_order ASC, created_at ASC",
            IMAGE_COLUMNS
        ))
        .bind(owner_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("listing images by owner id", e))?;

        rows.iter().map(image_from_row).collect()
    }

    async fn get(&self, id: Uuid) -> StorageResult<Option<ImageAsset>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM product_images WHERE id = $1",
            IMAGE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("loading image", e))?;

        row.as_ref().map(image_from_row).transpose()
    }

    async fn max_display_order(&self, scope: &OwnerScope) -> StorageResult<Option<u32>> {
        let row = sqlx::query(
            "SELECT MAX(display_order) AS max_order FROM product_images \
             WHERE owner_id = $1 AND owner_kind = $2",
        )
        .bind(scope.owner_id.as_str())
        .bind(scope.kind.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("reading max display order", e))?;

        let max: Option<i32> = column(&row, "max_order")?;
        max.map(|value| u32::try_from(value).map_err(|e| invalid_data("display_order", e)))
            .transpose()
    }

    async fn insert(&self, image: NewImageAsset) -> StorageResult<ImageAsset> {
        let file_size = i64::try_from(image.file_size).map_err(|e| invalid_data("file_size", e))?;
        let display_order =
            i32::try_from(image.display_order).map_err(|e| invalid_data("display_order", e))?;

        let row = sqlx::query(&format!(
            "INSERT INTO product_images (\
                 id, owner_id, owner_kind, storage_path, display_order, is_primary, \
                 image_type, alt_text, file_size, format\
             ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
             RETURNING {}",
            IMAGE_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(image.owner.owner_id.as_str())
        .bind(image.owner.kind.as_str())
        .bind(image.storage_path.as_str())
        .bind(display_order)
        .bind(image.is_primary)
        .bind(image.image_type.as_str())
        .bind(&image.alt_text)
        .bind(file_size)
        .bind(&image.format)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("inserting image", e))?;

        image_from_row(&row)
    }

    async fn clear_primary(&self, scope: &OwnerScope) -> StorageResult<()> {
        sqlx::query(
            "UPDATE product_images SET is_primary = FALSE, updated_at = NOW() \
             WHERE owner_id = $1 AND owner_kind = $2 AND is_primary",
        )
        .bind(scope.owner_id.as_str())
        .bind(scope.kind.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("clearing primary image", e))?;

        Ok(())
    }

    async fn mark_primary(&self, id: Uuid, scope: &OwnerScope) -> StorageResult<bool> {
        let result = sqlx::query(
            "UPDATE product_images SET is_primary = TRUE, updated_at = NOW() \
             WHERE id = $1 AND owner_id = $2 AND owner_kind = $3",
        )
        .bind(id)
        .bind(scope.owner_id.as_str())
        .bind(scope.kind.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("setting primary image", e))?;

        Ok(result.rows_affected() > 0)
    }

    async fn set_display_order(
        &self,
        id: Uuid,
        owner_id: &OwnerId,
        display_order: u32,
    ) -> StorageResult<bool> {
        let display_order =
            i32::try_from(display_order).map_err(|e| invalid_data("display_order", e))?;

        let result = sqlx::query(
            "UPDATE product_images SET display_order = $3, updated_at = NOW() \
             WHERE id = $1 AND owner_id = $2",
        )
        .bind(id)
        .bind(owner_id.as_str())
        .bind(display_order)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("reordering image", e))?;

        Ok(result.rows_affected() > 0)
    }

    async fn update_metadata(
        &self,
        id: Uuid,
        update: &ImageMetadataUpdate,
    ) -> StorageResult<Option<ImageAsset>> {
        let alt_text = update.alt_text.as_deref().and_then(normalized_alt_text);

        let row = sqlx::query(&format!(
            "UPDATE product_images SET \
                 alt_text = CASE WHEN $2 THEN $3 ELSE alt_text END, \
                 image_type = COALESCE($4, image_type), \
                 updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {}",
            IMAGE_COLUMNS
        ))
        .bind(id)
        .bind(update.alt_text.is_some())
        .bind(alt_text)
        .bind(update.image_type.map(|t| t.as_str()))
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("updating image metadata", e))?;

        row.as_ref().map(image_from_row).transpose()
    }

    async fn delete(&self, id: Uuid) -> StorageResult<bool> {
        let result = sqlx::query("DELETE FROM product_images WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("deleting image", e))?;

        Ok(result.rows_affected() > 0)
    }

    async fn reassign_owner(&self, from: &OwnerScope, to: &OwnerScope) -> StorageResult<u64> {
        let result = sqlx::query(
            "UPDATE product_images SET owner_id = $3, owner_kind = $4, updated_at = NOW() \
             WHERE owner_id = $1 AND owner_kind = $2",
        )
        .bind(from.owner_id.as_str())
        .bind(from.kind.as_str())
        .bind(to.owner_id.as_str())
        .bind(to.kind.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("moving images to new owner", e))?;

        Ok(result.rows_affected())
    }
}
