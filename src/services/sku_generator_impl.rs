use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::{
    domain::{
        errors::SkuError,
        value_objects::{Sku, SkuPrefix, SkuScope},
    },
    ports::{
        repositories::{CategoryRepository, ProductRepository},
        services::SkuGenerator,
    },
};

/// Issues `PFX-NNNN` SKUs from a persisted counter.
///
/// The prefix comes from the subcategory name. The number comes from an
/// atomic increment, seeded by the sequence of the latest existing product
/// so that SKUs created before the counter existed are never reissued.
#[derive(Clone)]
pub struct SequentialSkuGenerator {
    products: Arc<dyn ProductRepository>,
    categories: Arc<dyn CategoryRepository>,
    scope: SkuScope,
}

impl SequentialSkuGenerator {
    pub fn new(
        products: Arc<dyn ProductRepository>,
        categories: Arc<dyn CategoryRepository>,
    ) -> Self {
        Self {
            products,
            categories,
            scope: SkuScope::default(),
        }
    }

    pub fn with_scope(mut self, scope: SkuScope) -> Self {
        self.scope = scope;
        self
    }

    pub fn scope(&self) -> SkuScope {
        self.scope
    }

    async fn prefix_for(&self, subcategory_id: Uuid) -> SkuPrefix {
        match self.categories.subcategory_name(subcategory_id).await {
            Ok(Some(name)) => SkuPrefix::derive(&name),
            Ok(None) => {
                debug!("Subcategory not found, using generic SKU prefix");
                SkuPrefix::generic()
            }
            Err(error) => {
                warn!(error = %error, "Subcategory lookup failed, using generic SKU prefix");
                SkuPrefix::generic()
            }
        }
    }

    /// Last sequence number already in use; 0 when unknown
    async fn floor_for(&self, prefix: &SkuPrefix) -> u64 {
        let filter = match self.scope {
            SkuScope::Global => None,
            SkuScope::PerPrefix => Some(prefix),
        };

        match self.products.latest_sku(filter).await {
            Ok(latest) => latest.and_then(|sku| sku.sequence()).unwrap_or(0),
            Err(error) => {
                warn!(error = %error, "Latest SKU lookup failed, counter floor defaults to 0");
                0
            }
        }
    }
}

#[async_trait]
impl SkuGenerator for SequentialSkuGenerator {
    #[instrument(skip_all, fields(subcategory_id = %subcategory_id, sku = tracing::field::Empty))]
    async fn generate(&self, subcategory_id: Uuid) -> Result<Sku, SkuError> {
        let prefix = self.prefix_for(subcategory_id).await;
        let floor = self.floor_for(&prefix).await;
        let counter = self.scope.counter_key(&prefix);

        let sequence = self
            .products
            .next_sequence(&counter, floor)
            .await
            .map_err(|source| SkuError::SequenceUnavailable {
                scope: counter.clone(),
                source,
            })?;

        let sku = Sku::sequential(&prefix, sequence);
        tracing::Span::current().record("sku", sku.as_str());
        info!(counter = %counter, sequence, "SKU issued");
        Ok(sku)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::outbound::persistence::InMemoryCatalogRepository;

    fn generator(repo: &Arc<InMemoryCatalogRepository>) -> SequentialSkuGenerator {
        SequentialSkuGenerator::new(repo.clone(), repo.clone())
    }

    #[tokio::test]
    async fn test_first_sku_for_known_category() {
        let repo = Arc::new(InMemoryCatalogRepository::new());
        let chairs = repo.add_subcategory("Chaises").await;

        let sku = generator(&repo).generate(chairs).await.unwrap();
        assert_eq!(sku.as_str(), "CHA-0001");
    }

    #[tokio::test]
    async fn test_unknown_category_uses_generic_prefix() {
        let repo = Arc::new(InMemoryCatalogRepository::new());

        let sku = generator(&repo).generate(Uuid::new_v4()).await.unwrap();
        assert_eq!(sku.as_str(), "GEN-0001");
    }

    #[tokio::test]
    async fn test_global_counter_spans_prefixes() {
        let repo = Arc::new(InMemoryCatalogRepository::new());
        let chairs = repo.add_subcategory("Chaises").await;
        let tables = repo.add_subcategory("Tables").await;
        let generator = generator(&repo);

        assert_eq!(generator.generate(chairs).await.unwrap().as_str(), "CHA-0001");
        assert_eq!(generator.generate(tables).await.unwrap().as_str(), "TAB-0002");
    }

    #[tokio::test]
    async fn test_per_prefix_counters_are_independent() {
        let repo = Arc::new(InMemoryCatalogRepository::new());
        let chairs = repo.add_subcategory("Chaises").await;
        let tables = repo.add_subcategory("Tables").await;
        let generator = generator(&repo).with_scope(SkuScope::PerPrefix);

        assert_eq!(generator.generate(chairs).await.unwrap().as_str(), "CHA-0001");
        assert_eq!(generator.generate(tables).await.unwrap().as_str(), "TAB-0001");
        assert_eq!(generator.generate(chairs).await.unwrap().as_str(), "CHA-0002");
    }
}
