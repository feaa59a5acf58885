use async_trait::async_trait;
use sqlx::{postgres::PgRow, PgPool};
use uuid::Uuid;

use super::sql_support::{column, invalid_data, map_sqlx_error, run_migrations};
use crate::{
    domain::{
        errors::StorageResult,
        models::{DraftProduct, NewProduct, Product, PromotionState},
        value_objects::{Sku, SkuPrefix, Slug},
    },
    ports::repositories::{CategoryRepository, DraftRepository, ProductRepository},
};

const DRAFT_COLUMNS: &str = "id, name, sku, supplier_reference, supplier_id, subcategory_id, \
     supplier_page_url, description, color, material, dimensions, weight, cost_price, \
     supplier_price, margin_percentage, estimated_selling_price, promotion_state, \
     promoted_product_id, created_at, updated_at";

const PRODUCT_COLUMNS: &str = "id, name, sku, slug, supplier_reference, supplier_id, \
     subcategory_id, supplier_page_url, description, variant_attributes, dimensions, weight, \
     price_ht, cost_price, tax_rate, margin_percentage, estimated_selling_price, status, \
     condition, created_at, updated_at";

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS subcategories (
        id UUID PRIMARY KEY,
        name TEXT NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS product_drafts (
        id UUID PRIMARY KEY,
        name TEXT,
        sku TEXT,
        supplier_reference TEXT,
        supplier_id UUID,
        subcategory_id UUID,
        supplier_page_url TEXT,
        description TEXT,
        color TEXT,
        material TEXT,
        dimensions JSONB,
        weight NUMERIC(10, 3),
        cost_price NUMERIC(10, 2),
        supplier_price NUMERIC(10, 2),
        margin_percentage NUMERIC(5, 2),
        estimated_selling_price NUMERIC(10, 2),
        promotion_state TEXT NOT NULL DEFAULT 'pending',
        promoted_product_id UUID,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS products (
        id UUID PRIMARY KEY,
        name TEXT NOT NULL,
        sku TEXT NOT NULL UNIQUE,
        slug TEXT NOT NULL,
        supplier_reference TEXT,
        supplier_id UUID NOT NULL,
        subcategory_id UUID NOT NULL,
        supplier_page_url TEXT,
        description TEXT,
        variant_attributes JSONB NOT NULL DEFAULT '{}',
        dimensions JSONB,
        weight NUMERIC(10, 3),
        price_ht NUMERIC(10, 2) NOT NULL,
        cost_price NUMERIC(10, 2),
        tax_rate NUMERIC(5, 4) NOT NULL DEFAULT 0.2000,
        margin_percentage NUMERIC(5, 2),
        estimated_selling_price NUMERIC(10, 2),
        status TEXT NOT NULL DEFAULT 'in_stock',
        condition TEXT NOT NULL DEFAULT 'new',
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_products_created_at ON products(created_at DESC)",
    r#"
    CREATE TABLE IF NOT EXISTS sku_sequences (
        scope TEXT PRIMARY KEY,
        last_value BIGINT NOT NULL,
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
];

/// PostgreSQL implementation of the draft, product and category repositories
#[derive(Clone)]
pub struct SqlCatalogRepository {
    pool: PgPool,
}

impl SqlCatalogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Initialize database tables
    pub async fn migrate(&self) -> Result<(), sqlx::Error> {
        run_migrations(&self.pool, SCHEMA).await
    }
}

fn draft_from_row(row: &PgRow) -> StorageResult<DraftProduct> {
    let state: String = column(row, "promotion_state")?;
    let promoted_product_id: Option<Uuid> = column(row, "promoted_product_id")?;

    Ok(DraftProduct {
        id: column(row, "id")?,
        name: column(row, "name")?,
        sku: column(row, "sku")?,
        supplier_reference: column(row, "supplier_reference")?,
        supplier_id: column(row, "supplier_id")?,
        subcategory_id: column(row, "subcategory_id")?,
        supplier_page_url: column(row, "supplier_page_url")?,
        description: column(row, "description")?,
        color: column(row, "color")?,
        material: column(row, "material")?,
        dimensions: column(row, "dimensions")?,
        weight: column(row, "weight")?,
        cost_price: column(row, "cost_price")?,
        supplier_price: column(row, "supplier_price")?,
        margin_percentage: column(row, "margin_percentage")?,
        estimated_selling_price: column(row, "estimated_selling_price")?,
        promotion_state: PromotionState::from_columns(&state, promoted_product_id)
            .map_err(|e| invalid_data("promotion_state", e))?,
        created_at: column(row, "created_at")?,
        updated_at: column(row, "updated_at")?,
    })
}

fn product_from_row(row: &PgRow) -> StorageResult<Product> {
    let sku: String = column(row, "sku")?;
    let status: String = column(row, "status")?;
    let condition: String = column(row, "condition")?;

    Ok(Product {
        id: column(row, "id")?,
        name: column(row, "name")?,
        sku: Sku::new(sku).map_err(|e| invalid_data("sku", e))?,
        slug: Slug::from_stored(column(row, "slug")?),
        supplier_reference: column(row, "supplier_reference")?,
        supplier_id: column(row, "supplier_id")?,
        subcategory_id: column(row, "subcategory_id")?,
        supplier_page_url: column(row, "supplier_page_url")?,
        description: column(row, "description")?,
        variant_attributes: column(row, "variant_attributes")?,
        dimensions: column(row, "dimensions")?,
        weight: column(row, "weight")?,
        price_ht: column(row, "price_ht")?,
        cost_price: column(row, "cost_price")?,
        tax_rate: column(row, "tax_rate")?,
        margin_percentage: column(row, "margin_percentage")?,
        estimated_selling_price: column(row, "estimated_selling_price")?,
        status: status.parse().map_err(|e| invalid_data("status", e))?,
        condition: condition.parse().map_err(|e| invalid_data("condition", e))?,
        created_at: column(row, "created_at")?,
        updated_at: column(row, "updated_at")?,
    })
}

#[async_trait]
impl DraftRepository for SqlCatalogRepository {
    async fn insert_draft(&self, draft: &DraftProduct) -> StorageResult<()> {
        sqlx::query(&format!(
            "INSERT INTO product_drafts ({}) VALUES \
             ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19, $20)",
            DRAFT_COLUMNS
        ))
        .bind(draft.id)
        .bind(&draft.name)
        .bind(&draft.sku)
        .bind(&draft.supplier_reference)
        .bind(draft.supplier_id)
        .bind(draft.subcategory_id)
        .bind(&draft.supplier_page_url)
        .bind(&draft.description)
        .bind(&draft.color)
        .bind(&draft.material)
        .bind(&draft.dimensions)
        .bind(draft.weight)
        .bind(draft.cost_price)
        .bind(draft.supplier_price)
        .bind(draft.margin_percentage)
        .bind(draft.estimated_selling_price)
        .bind(draft.promotion_state.as_str())
        .bind(draft.promotion_state.product_id())
        .bind(draft.created_at)
        .bind(draft.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("inserting draft", e))?;

        Ok(())
    }

    async fn get_draft(&self, id: Uuid) -> StorageResult<Option<DraftProduct>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM product_drafts WHERE id = $1",
            DRAFT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("loading draft", e))?;

        row.as_ref().map(draft_from_row).transpose()
    }

    async fn set_promotion_state(&self, id: Uuid, state: PromotionState) -> StorageResult<()> {
        let result = sqlx::query(
            "UPDATE product_drafts \
             SET promotion_state = $2, promoted_product_id = $3, updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(id)
        .bind(state.as_str())
        .bind(state.product_id())
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("recording promotion state", e))?;

        if result.rows_affected() == 0 {
            return Err(map_sqlx_error(
                &format!("draft {}", id),
                sqlx::Error::RowNotFound,
            ));
        }

        Ok(())
    }

    async fn delete_draft(&self, id: Uuid) -> StorageResult<bool> {
        let result = sqlx::query("DELETE FROM product_drafts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("deleting draft", e))?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl ProductRepository for SqlCatalogRepository {
    async fn insert_product(&self, product: NewProduct) -> StorageResult<Product> {
        let row = sqlx::query(&format!(
            "INSERT INTO products (\
                 id, name, sku, slug, supplier_reference, supplier_id, subcategory_id, \
                 supplier_page_url, description, variant_attributes, dimensions, weight, \
                 price_ht, cost_price, tax_rate, margin_percentage, estimated_selling_price, \
                 status, condition\
             ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19) \
             RETURNING {}",
            PRODUCT_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(&product.name)
        .bind(product.sku.as_str())
        .bind(product.slug.as_str())
        .bind(&product.supplier_reference)
        .bind(product.supplier_id)
        .bind(product.subcategory_id)
        .bind(&product.supplier_page_url)
        .bind(&product.description)
        .bind(&product.variant_attributes)
        .bind(&product.dimensions)
        .bind(product.weight)
        .bind(product.price_ht)
        .bind(product.cost_price)
        .bind(product.tax_rate)
        .bind(product.margin_percentage)
        .bind(product.estimated_selling_price)
        .bind(product.status.as_str())
        .bind(product.condition.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_sqlx_error(&format!("product sku {}", product.sku), e))?;

        product_from_row(&row)
    }

    async fn get_product(&self, id: Uuid) -> StorageResult<Option<Product>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM products WHERE id = $1",
            PRODUCT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("loading product", e))?;

        row.as_ref().map(product_from_row).transpose()
    }

    async fn latest_sku(&self, prefix: Option<&SkuPrefix>) -> StorageResult<Option<Sku>> {
        let pattern = prefix.map(|prefix| format!("{}-%", prefix));

        let row = sqlx::query(
            "SELECT sku FROM products \
             WHERE $1::TEXT IS NULL OR sku LIKE $1 \
             ORDER BY created_at DESC \
             LIMIT 1",
        )
        .bind(pattern)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("reading latest SKU", e))?;

        match row {
            Some(row) => {
                let sku: String = column(&row, "sku")?;
                Sku::new(sku).map(Some).map_err(|e| invalid_data("sku", e))
            }
            None => Ok(None),
        }
    }

    async fn next_sequence(&self, scope: &str, floor: u64) -> StorageResult<u64> {
        let floor = i64::try_from(floor).map_err(|e| invalid_data("sequence floor", e))?;

        let row = sqlx::query(
            "INSERT INTO sku_sequences (scope, last_value) VALUES ($1, $2 + 1) \
             ON CONFLICT (scope) DO UPDATE \
             SET last_value = GREATEST(sku_sequences.last_value, $2) + 1, updated_at = NOW() \
             RETURNING last_value",
        )
        .bind(scope)
        .bind(floor)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("advancing SKU sequence", e))?;

        let value: i64 = column(&row, "last_value")?;
        u64::try_from(value).map_err(|e| invalid_data("last_value", e))
    }
}

#[async_trait]
impl CategoryRepository for SqlCatalogRepository {
    async fn subcategory_name(&self, id: Uuid) -> StorageResult<Option<String>> {
        let row = sqlx::query("SELECT name FROM subcategories WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("loading subcategory", e))?;

        row.as_ref().map(|row| column(row, "name")).transpose()
    }
}
