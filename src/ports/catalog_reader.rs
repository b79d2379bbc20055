//! Catalog reader port.
//!
//! Read-only access to products and pricing tiers. The catalog is owned by
//! a collaborator; edits never reach participations that already locked a
//! price.

use async_trait::async_trait;

use crate::domain::catalog::{PricingTier, SubscriptionProduct};
use crate::domain::foundation::{DomainError, ProductId};

#[async_trait]
pub trait CatalogReader: Send + Sync {
    async fn product(&self, id: &ProductId) -> Result<Option<SubscriptionProduct>, DomainError>;

    /// Tiers of one product in creation order.
    async fn tiers_for(&self, product_id: &ProductId) -> Result<Vec<PricingTier>, DomainError>;
}
