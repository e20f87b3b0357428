//! Request and response types for the beatdeck client.

use serde::{Deserialize, Serialize};

use beatdeck_core::{
    Currency, LicenseTier, MembershipPlan, MembershipStatus, OrderStatus, ProductKind,
};

/// One license offering on a product.
#[derive(Debug, Clone, Deserialize)]
pub struct LicenseSummary {
    /// License tier.
    pub tier: LicenseTier,
    /// Price in KRW.
    pub price_cents: i64,
    /// Usage terms summary.
    #[serde(default)]
    pub terms: Option<String>,
}

/// A product as reported by the service.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductSummary {
    /// Product ID.
    pub id: String,
    /// Selling artist.
    pub artist_id: String,
    /// Track title.
    pub title: String,
    /// Beat or acapella.
    pub kind: ProductKind,
    /// Tempo, if known.
    #[serde(default)]
    pub bpm: Option<u16>,
    /// License offerings.
    pub licenses: Vec<LicenseSummary>,
}

/// One direct-checkout selection.
#[derive(Debug, Clone, Serialize)]
pub struct CheckoutItem {
    /// The product to buy.
    pub product_id: String,
    /// The license tier to buy.
    pub license_tier: LicenseTier,
}

/// What a checkout buys.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum CheckoutSelection {
    /// Buy everything currently in the cart.
    Cart,
    /// Buy an explicit product list (buy-now flow).
    Direct {
        /// The selections to buy.
        items: Vec<CheckoutItem>,
    },
}

/// Checkout request body.
#[derive(Debug, Clone, Serialize)]
pub struct CheckoutRequest {
    /// Cart or direct selections.
    #[serde(flatten)]
    pub selection: CheckoutSelection,
    /// Coupon code to apply, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coupon_code: Option<String>,
    /// Currency to pay in (default KRW).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<Currency>,
}

/// One line of a purchased order.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderItemSummary {
    /// The purchased product.
    pub product_id: String,
    /// Product title at purchase time.
    pub product_title: String,
    /// License tier at purchase time.
    pub license_tier: LicenseTier,
    /// License price at purchase time, in KRW.
    pub price_cents: i64,
}

/// An order as reported by the service.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderSummary {
    /// Order ID.
    pub id: String,
    /// External-facing order number (also the provider payment ID).
    pub order_number: String,
    /// Human-readable order name.
    pub order_name: String,
    /// Purchased items.
    pub items: Vec<OrderItemSummary>,
    /// Sum of item prices before discount, in KRW.
    pub subtotal_cents: i64,
    /// Discount taken off the subtotal, in KRW.
    pub discount_cents: i64,
    /// Amount charged, in `currency`.
    pub total_cents: i64,
    /// Currency the buyer pays in.
    pub currency: Currency,
    /// Current status.
    pub status: OrderStatus,
    /// When the payment was confirmed (RFC 3339), once it was.
    #[serde(default)]
    pub paid_at: Option<String>,
}

/// A coupon preview.
#[derive(Debug, Clone, Deserialize)]
pub struct CouponSummary {
    /// Coupon ID.
    pub id: String,
    /// The code buyers enter.
    pub code: String,
    /// Redemption budget, if limited.
    #[serde(default)]
    pub max_redemptions: Option<u32>,
    /// Redemptions so far.
    pub redeemed_count: u32,
}

/// A membership as reported by the service.
#[derive(Debug, Clone, Deserialize)]
pub struct MembershipSummary {
    /// Membership ID.
    pub id: String,
    /// The billing plan.
    pub plan: MembershipPlan,
    /// Per-period price in KRW.
    pub price_cents: i64,
    /// Current status.
    pub status: MembershipStatus,
    /// When the next recurring charge is due (RFC 3339).
    pub next_payment_date: String,
}

/// Result of a recurring-charge sweep.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct SweepResult {
    /// Memberships charged successfully.
    pub charged: usize,
    /// Charge attempts that failed.
    pub failed: usize,
}

/// Error envelope returned by the API.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorResponse {
    pub error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorBody {
    pub code: String,
    pub message: String,
    #[serde(default)]
    pub details: Option<serde_json::Value>,
}
