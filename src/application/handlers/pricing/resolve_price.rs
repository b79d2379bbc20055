//! ResolvePriceHandler - Query handler for member-specific product prices.

use chrono::NaiveDate;
use std::sync::Arc;
use tracing::instrument;

use crate::domain::foundation::{MemberType, ProductId};
use crate::domain::lifecycle::LifecycleError;
use crate::domain::member::Holder;
use crate::domain::pricing::{PricingResolver, ResolvedPrice, SeatQuote};
use crate::ports::{CatalogReader, MemberDirectory};

/// Query for the price a member would pay.
///
/// The member type comes from `member_type` when given, otherwise from the
/// holder's profile. Neither means the standard price.
#[derive(Debug, Clone)]
pub struct ResolvePriceQuery {
    pub product_id: ProductId,
    pub holder: Option<Holder>,
    pub member_type: Option<MemberType>,
    pub as_of: NaiveDate,
    /// Enterprise seat count to quote.
    pub seats: Option<u32>,
}

impl ResolvePriceQuery {
    pub fn standard(product_id: ProductId, as_of: NaiveDate) -> Self {
        Self {
            product_id,
            holder: None,
            member_type: None,
            as_of,
            seats: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ResolvePriceResult {
    pub price: ResolvedPrice,
    pub seat_quote: Option<SeatQuote>,
}

pub struct ResolvePriceHandler {
    catalog: Arc<dyn CatalogReader>,
    members: Arc<dyn MemberDirectory>,
    resolver: PricingResolver,
}

impl ResolvePriceHandler {
    pub fn new(catalog: Arc<dyn CatalogReader>, members: Arc<dyn MemberDirectory>) -> Self {
        Self {
            catalog,
            members,
            resolver: PricingResolver::new(),
        }
    }

    #[instrument(skip(self), fields(product_id = %query.product_id))]
    pub async fn handle(&self, query: ResolvePriceQuery) -> Result<ResolvePriceResult, LifecycleError> {
        let product = self
            .catalog
            .product(&query.product_id)
            .await?
            .ok_or_else(|| LifecycleError::not_found("Product", query.product_id))?;
        let tiers = self.catalog.tiers_for(&product.id).await?;

        let member_type = match (query.member_type, query.holder) {
            (Some(member_type), _) => Some(member_type),
            (None, Some(holder)) => self
                .members
                .profile(&holder)
                .await?
                .and_then(|profile| profile.member_type),
            (None, None) => None,
        };

        let price = self
            .resolver
            .resolve(&product, &tiers, member_type.as_ref(), query.as_of);
        let seat_quote = query
            .seats
            .map(|seats| self.resolver.quote_seats(&product, &price, seats));

        Ok(ResolvePriceResult { price, seat_quote })
    }
}
