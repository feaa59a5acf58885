use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    domain::{
        errors::{StorageError, StorageResult},
        models::{DraftProduct, NewProduct, Product, PromotionState},
        value_objects::{Sku, SkuPrefix},
    },
    ports::repositories::{CategoryRepository, DraftRepository, ProductRepository},
};

/// In-memory drafts, products, subcategories and SKU counters
#[derive(Clone, Default)]
pub struct InMemoryCatalogRepository {
    data: Arc<RwLock<CatalogData>>,
}

#[derive(Default)]
struct CatalogData {
    drafts: HashMap<Uuid, DraftProduct>,
    // Kept in creation order
    products: Vec<Product>,
    subcategories: HashMap<Uuid, String>,
    sequences: HashMap<String, u64>,
}

impl InMemoryCatalogRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a subcategory and return its id
    pub async fn add_subcategory(&self, name: impl Into<String>) -> Uuid {
        let id = Uuid::new_v4();
        self.data.write().await.subcategories.insert(id, name.into());
        id
    }

    pub async fn products(&self) -> Vec<Product> {
        self.data.read().await.products.clone()
    }

    pub async fn draft_count(&self) -> usize {
        self.data.read().await.drafts.len()
    }
}

#[async_trait]
impl DraftRepository for InMemoryCatalogRepository {
    async fn insert_draft(&self, draft: &DraftProduct) -> StorageResult<()> {
        let mut data = self.data.write().await;

        if data.drafts.contains_key(&draft.id) {
            return Err(StorageError::AlreadyExists {
                resource: format!("draft {}", draft.id),
            });
        }

        data.drafts.insert(draft.id, draft.clone());
        Ok(())
    }

    async fn get_draft(&self, id: Uuid) -> StorageResult<Option<DraftProduct>> {
        Ok(self.data.read().await.drafts.get(&id).cloned())
    }

    async fn set_promotion_state(&self, id: Uuid, state: PromotionState) -> StorageResult<()> {
        let mut data = self.data.write().await;

        let draft = data.drafts.get_mut(&id).ok_or_else(|| StorageError::NotFound {
            resource: format!("draft {}", id),
        })?;
        draft.promotion_state = state;
        draft.updated_at = Utc::now();

        Ok(())
    }

    async fn delete_draft(&self, id: Uuid) -> StorageResult<bool> {
        Ok(self.data.write().await.drafts.remove(&id).is_some())
    }
}

#[async_trait]
impl ProductRepository for InMemoryCatalogRepository {
    async fn insert_product(&self, product: NewProduct) -> StorageResult<Product> {
        let mut data = self.data.write().await;

        if data.products.iter().any(|p| p.sku == product.sku) {
            return Err(StorageError::AlreadyExists {
                resource: format!("product sku {}", product.sku),
            });
        }

        let now = Utc::now();
        let created = Product {
            id: Uuid::new_v4(),
            name: product.name,
            sku: product.sku,
            slug: product.slug,
            supplier_reference: product.supplier_reference,
            supplier_id: product.supplier_id,
            subcategory_id: product.subcategory_id,
            supplier_page_url: product.supplier_page_url,
            description: product.description,
            variant_attributes: product.variant_attributes,
            dimensions: product.dimensions,
            weight: product.weight,
            price_ht: product.price_ht,
            cost_price: product.cost_price,
            tax_rate: product.tax_rate,
            margin_percentage: product.margin_percentage,
            estimated_selling_price: product.estimated_selling_price,
            status: product.status,
            condition: product.condition,
            created_at: now,
            updated_at: now,
        };

        data.products.push(created.clone());
        Ok(created)
    }

    async fn get_product(&self, id: Uuid) -> StorageResult<Option<Product>> {
        let data = self.data.read().await;
        Ok(data.products.iter().find(|p| p.id == id).cloned())
    }

    async fn latest_sku(&self, prefix: Option<&SkuPrefix>) -> StorageResult<Option<Sku>> {
        let data = self.data.read().await;
        let pattern = prefix.map(|prefix| format!("{}-", prefix));

        Ok(data
            .products
            .iter()
            .rev()
            .find(|p| match &pattern {
                Some(pattern) => p.sku.as_str().starts_with(pattern.as_str()),
                None => true,
            })
            .map(|p| p.sku.clone()))
    }

    async fn next_sequence(&self, scope: &str, floor: u64) -> StorageResult<u64> {
        let mut data = self.data.write().await;

        let counter = data.sequences.entry(scope.to_string()).or_insert(0);
        *counter = (*counter).max(floor) + 1;

        Ok(*counter)
    }
}

#[async_trait]
impl CategoryRepository for InMemoryCatalogRepository {
    async fn subcategory_name(&self, id: Uuid) -> StorageResult<Option<String>> {
        Ok(self.data.read().await.subcategories.get(&id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::Slug;
    use rust_decimal::Decimal;

    fn new_product(sku: &str) -> NewProduct {
        NewProduct {
            name: "Table basse".to_string(),
            sku: Sku::new(sku).unwrap(),
            slug: Slug::from_name("Table basse").unwrap(),
            supplier_reference: None,
            supplier_id: Uuid::new_v4(),
            subcategory_id: Uuid::new_v4(),
            supplier_page_url: None,
            description: None,
            variant_attributes: serde_json::json!({}),
            dimensions: None,
            weight: None,
            price_ht: Decimal::new(100, 0),
            cost_price: Some(Decimal::new(100, 0)),
            tax_rate: NewProduct::default_tax_rate(),
            margin_percentage: None,
            estimated_selling_price: None,
            status: Default::default(),
            condition: Default::default(),
        }
    }

    #[tokio::test]
    async fn test_duplicate_sku_rejected() {
        let repo = InMemoryCatalogRepository::new();
        repo.insert_product(new_product("TAB-0001")).await.unwrap();

        assert!(matches!(
            repo.insert_product(new_product("TAB-0001")).await,
            Err(StorageError::AlreadyExists { .. })
        ));
    }

    #[tokio::test]
    async fn test_latest_sku_filters_by_prefix() {
        let repo = InMemoryCatalogRepository::new();
        repo.insert_product(new_product("TAB-0004")).await.unwrap();
        repo.insert_product(new_product("CHA-0007")).await.unwrap();

        assert_eq!(repo.latest_sku(None).await.unwrap().unwrap().as_str(), "CHA-0007");
        let tab = SkuPrefix::new("TAB").unwrap();
        assert_eq!(
            repo.latest_sku(Some(&tab)).await.unwrap().unwrap().as_str(),
            "TAB-0004"
        );
        let lam = SkuPrefix::new("LAM").unwrap();
        assert!(repo.latest_sku(Some(&lam)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_next_sequence_respects_floor() {
        let repo = InMemoryCatalogRepository::new();

        assert_eq!(repo.next_sequence("global", 0).await.unwrap(), 1);
        assert_eq!(repo.next_sequence("global", 0).await.unwrap(), 2);
        assert_eq!(repo.next_sequence("global", 41).await.unwrap(), 42);
        assert_eq!(repo.next_sequence("prefix:CHA", 0).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_promotion_state_requires_draft() {
        let repo = InMemoryCatalogRepository::new();
        let state = PromotionState::ProductCreated {
            product_id: Uuid::new_v4(),
        };

        assert!(repo.set_promotion_state(Uuid::new_v4(), state).await.is_err());

        let draft = DraftProduct::builder().name("Lampe").build();
        repo.insert_draft(&draft).await.unwrap();
        repo.set_promotion_state(draft.id, state).await.unwrap();
        assert_eq!(
            repo.get_draft(draft.id).await.unwrap().unwrap().promotion_state,
            state
        );
        assert!(repo.delete_draft(draft.id).await.unwrap());
        assert!(!repo.delete_draft(draft.id).await.unwrap());
    }
}
