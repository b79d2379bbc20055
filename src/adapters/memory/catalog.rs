//! In-memory catalog.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::catalog::{PricingTier, SubscriptionProduct};
use crate::domain::foundation::{DomainError, ProductId};
use crate::ports::CatalogReader;

#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    products: Arc<RwLock<HashMap<ProductId, SubscriptionProduct>>>,
    tiers: Arc<RwLock<Vec<PricingTier>>>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates and stores products and tiers, replacing current contents.
    pub async fn load(
        &self,
        products: Vec<SubscriptionProduct>,
        tiers: Vec<PricingTier>,
    ) -> Result<(), DomainError> {
        for product in &products {
            product.validate()?;
        }
        *self.products.write().await = products.into_iter().map(|p| (p.id, p)).collect();
        *self.tiers.write().await = tiers;
        Ok(())
    }

    pub async fn add_product(&self, product: SubscriptionProduct) -> Result<(), DomainError> {
        product.validate()?;
        self.products.write().await.insert(product.id, product);
        Ok(())
    }

    pub async fn add_tier(&self, tier: PricingTier) {
        self.tiers.write().await.push(tier);
    }

    pub async fn products(&self) -> Vec<SubscriptionProduct> {
        let mut products: Vec<_> = self.products.read().await.values().cloned().collect();
        products.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        products
    }

    pub async fn tiers(&self) -> Vec<PricingTier> {
        self.tiers.read().await.clone()
    }
}

#[async_trait]
impl CatalogReader for InMemoryCatalog {
    async fn product(&self, id: &ProductId) -> Result<Option<SubscriptionProduct>, DomainError> {
        Ok(self.products.read().await.get(id).cloned())
    }

    async fn tiers_for(&self, product_id: &ProductId) -> Result<Vec<PricingTier>, DomainError> {
        let mut tiers: Vec<_> = self
            .tiers
            .read()
            .await
            .iter()
            .filter(|t| &t.product_id == product_id)
            .cloned()
            .collect();
        tiers.sort_by_key(|t| t.created_seq);
        Ok(tiers)
    }
}
