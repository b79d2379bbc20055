//! Price of the product a change request moves a participation onto.

use chrono::NaiveDate;

use crate::domain::catalog::SubscriptionProduct;
use crate::domain::change_request::ChangeKind;
use crate::domain::lifecycle::LifecycleError;
use crate::domain::member::MemberProfile;
use crate::domain::participation::Participation;
use crate::domain::pricing::{PricingResolver, ResolvedPrice};
use crate::ports::{CatalogReader, MemberDirectory};

pub(super) struct TargetPrice {
    pub product: SubscriptionProduct,
    /// The holder's profile with any requested member type applied.
    pub profile: MemberProfile,
    pub price: ResolvedPrice,
}

/// Resolves the target product and price of a pricing change as of
/// `as_of`. Plan changes keep the current member type; category changes
/// price with the requested one.
pub(super) async fn resolve(
    catalog: &dyn CatalogReader,
    members: &dyn MemberDirectory,
    participation: &Participation,
    kind: &ChangeKind,
    as_of: NaiveDate,
) -> Result<TargetPrice, LifecycleError> {
    let product_id = kind.target_product().unwrap_or(participation.product_id);
    let product = catalog
        .product(&product_id)
        .await?
        .ok_or_else(|| LifecycleError::not_found("Product", product_id))?;
    let tiers = catalog.tiers_for(&product_id).await?;

    let mut profile = members
        .profile(&participation.holder)
        .await?
        .ok_or_else(|| LifecycleError::not_found("Member", participation.holder))?;
    if let Some(member_type) = kind.target_member_type() {
        profile.member_type = Some(member_type.clone());
    }

    let price = PricingResolver::new().resolve(&product, &tiers, profile.member_type.as_ref(), as_of);

    Ok(TargetPrice {
        product,
        profile,
        price,
    })
}
