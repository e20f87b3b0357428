//! Order types and the order status state machine.
//!
//! An order is created at checkout in `Pending` status and mutated by the
//! payment-completion call or by provider webhooks. Orders are never
//! hard-deleted; cancellations are status transitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{CouponId, LicenseId, LicenseTier, OrderId, ProductId, UserId};

/// Currency an order is denominated in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    /// Korean won (the catalog's base currency).
    Krw,

    /// US dollars.
    Usd,
}

impl Currency {
    /// ISO 4217 code.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Krw => "KRW",
            Self::Usd => "USD",
        }
    }
}

/// Lifecycle states of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Created at checkout, payment not yet confirmed.
    Pending,

    /// A virtual account was issued; waiting for the buyer's bank transfer.
    WaitingForDeposit,

    /// Payment confirmed.
    Completed,

    /// Some items were cancelled/refunded after completion.
    PartialCancelled,

    /// The whole order was cancelled.
    Cancelled,
}

impl OrderStatus {
    /// Check whether a transition from `self` to `to` is legal.
    ///
    /// A transition to the same status is always allowed and treated as a
    /// no-op by callers; webhooks get redelivered and the second delivery
    /// must not fail.
    #[must_use]
    pub fn can_transition_to(self, to: Self) -> bool {
        use OrderStatus::{Cancelled, Completed, PartialCancelled, Pending, WaitingForDeposit};

        if self == to {
            return true;
        }

        matches!(
            (self, to),
            (Pending, WaitingForDeposit | Completed | Cancelled)
                | (WaitingForDeposit, Completed | Cancelled)
                | (Completed, PartialCancelled | Cancelled)
                | (PartialCancelled, Cancelled)
        )
    }

    /// Check whether this status is terminal.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// Snapshot of a purchased product/license at checkout time.
///
/// Item rows are frozen copies: later catalog edits or soft-deletes must not
/// change what the buyer paid for.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    /// The purchased product.
    pub product_id: ProductId,

    /// Product title at purchase time.
    pub product_title: String,

    /// The purchased license.
    pub license_id: LicenseId,

    /// License tier at purchase time.
    pub license_tier: LicenseTier,

    /// License price at purchase time, in KRW.
    pub price_cents: i64,
}

/// A buyer's order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    /// The order ID (ULID, time-ordered).
    pub id: OrderId,

    /// The buyer.
    pub user_id: UserId,

    /// External-facing order number quoted to the payment provider.
    pub order_number: String,

    /// Human-readable order name (e.g. "Night Drive and 2 others").
    pub order_name: String,

    /// Purchased items.
    pub items: Vec<OrderItem>,

    /// Sum of item prices in KRW, before discount.
    pub subtotal_cents: i64,

    /// Discount taken off the subtotal in KRW.
    pub discount_cents: i64,

    /// Amount charged, in `currency`.
    pub total_cents: i64,

    /// Currency the buyer paid in.
    pub currency: Currency,

    /// KRW→currency rate applied at checkout, when `currency` is not KRW.
    pub exchange_rate: Option<f64>,

    /// Coupon redeemed on this order, if any.
    pub coupon_id: Option<CouponId>,

    /// Current status.
    pub status: OrderStatus,

    /// Provider payment ID, once a payment exists.
    pub payment_id: Option<String>,

    /// PG transaction ID reported by the provider.
    pub pg_transaction_id: Option<String>,

    /// When the payment was confirmed.
    pub paid_at: Option<DateTime<Utc>>,

    /// When the order was cancelled.
    pub cancelled_at: Option<DateTime<Utc>>,

    /// When the order was created.
    pub created_at: DateTime<Utc>,

    /// When the order was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Create a new pending order from item snapshots.
    ///
    /// `total_cents` is the discounted subtotal, converted to `currency`
    /// when an exchange rate is given. The order number is derived from the
    /// ULID so it is unique without extra coordination.
    #[must_use]
    pub fn new(
        user_id: UserId,
        items: Vec<OrderItem>,
        discount_cents: i64,
        currency: Currency,
        exchange_rate: Option<f64>,
        coupon_id: Option<CouponId>,
    ) -> Self {
        let id = OrderId::generate();
        let now = Utc::now();

        let subtotal_cents: i64 = items.iter().map(|i| i.price_cents).sum();
        let discounted = (subtotal_cents - discount_cents).max(0);

        #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
        let total_cents = match exchange_rate {
            Some(rate) if rate > 0.0 => (discounted as f64 * rate).round() as i64,
            _ => discounted,
        };

        let order_name = Self::derive_order_name(&items);

        Self {
            id,
            user_id,
            order_number: id.order_number(),
            order_name,
            items,
            subtotal_cents,
            discount_cents,
            total_cents,
            currency,
            exchange_rate,
            coupon_id,
            status: OrderStatus::Pending,
            payment_id: None,
            pg_transaction_id: None,
            paid_at: None,
            cancelled_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Derive the display name from item titles.
    fn derive_order_name(items: &[OrderItem]) -> String {
        match items {
            [] => "Empty order".to_string(),
            [only] => only.product_title.clone(),
            [first, rest @ ..] => format!("{} and {} others", first.product_title, rest.len()),
        }
    }
}
