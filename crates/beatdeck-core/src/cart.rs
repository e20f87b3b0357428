//! Cart types.
//!
//! A cart is the set of live `CartItem` rows for a user. Each row is one
//! (product, license tier) selection with the price snapshotted at the time
//! it was added. Items are soft-deleted when removed or when a completed
//! order consumes them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{CartItemId, LicenseTier, ProductId, UserId};

/// One selection in a user's cart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartItem {
    /// The cart item ID.
    pub id: CartItemId,

    /// The cart owner.
    pub user_id: UserId,

    /// The selected product.
    pub product_id: ProductId,

    /// The selected license tier.
    pub license_tier: LicenseTier,

    /// License price at the time the item was added.
    ///
    /// Display-only; checkout re-reads the current license price.
    pub price_cents_snapshot: i64,

    /// When the item was added.
    pub created_at: DateTime<Utc>,

    /// Soft-delete marker (removed or purchased).
    pub deleted_at: Option<DateTime<Utc>>,
}

impl CartItem {
    /// Create a new cart item.
    #[must_use]
    pub fn new(
        user_id: UserId,
        product_id: ProductId,
        license_tier: LicenseTier,
        price_cents_snapshot: i64,
    ) -> Self {
        Self {
            id: CartItemId::generate(),
            user_id,
            product_id,
            license_tier,
            price_cents_snapshot,
            created_at: Utc::now(),
            deleted_at: None,
        }
    }

    /// Check whether this item is live (not removed or purchased).
    #[must_use]
    pub const fn is_live(&self) -> bool {
        self.deleted_at.is_none()
    }

    /// Check whether this item matches a purchased (product, tier) pair.
    #[must_use]
    pub fn matches(&self, product_id: &ProductId, tier: LicenseTier) -> bool {
        self.product_id == *product_id && self.license_tier == tier
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_item_is_live() {
        let item = CartItem::new(
            UserId::generate(),
            ProductId::generate(),
            LicenseTier::Basic,
            30_000,
        );
        assert!(item.is_live());
    }

    #[test]
    fn matches_same_product_and_tier_only() {
        let product_id = ProductId::generate();
        let item = CartItem::new(UserId::generate(), product_id, LicenseTier::Premium, 90_000);

        assert!(item.matches(&product_id, LicenseTier::Premium));
        assert!(!item.matches(&product_id, LicenseTier::Basic));
        assert!(!item.matches(&ProductId::generate(), LicenseTier::Premium));
    }
}
