//! Order handlers: checkout, completion, cancellation, history.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use beatdeck_core::{
    Coupon, Currency, LicenseTier, Order, OrderId, OrderItem, OrderStatus, Product, ProductId,
};
use beatdeck_store::Store;

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::portone::types::PaymentStatus;
use crate::state::AppState;

/// Order item response.
#[derive(Debug, Serialize)]
pub struct OrderItemResponse {
    /// The purchased product.
    pub product_id: String,
    /// Product title at purchase time.
    pub product_title: String,
    /// License tier at purchase time.
    pub license_tier: LicenseTier,
    /// License price at purchase time.
    pub price_cents: i64,
}

/// Order response.
#[derive(Debug, Serialize)]
pub struct OrderResponse {
    /// Order ID.
    pub id: String,
    /// External-facing order number.
    pub order_number: String,
    /// Human-readable order name.
    pub order_name: String,
    /// Purchased items.
    pub items: Vec<OrderItemResponse>,
    /// Sum of item prices before discount, in KRW.
    pub subtotal_cents: i64,
    /// Discount taken off the subtotal, in KRW.
    pub discount_cents: i64,
    /// Amount charged, in `currency`.
    pub total_cents: i64,
    /// Currency the buyer pays in.
    pub currency: Currency,
    /// KRW→currency rate applied, when not KRW.
    pub exchange_rate: Option<f64>,
    /// Current status.
    pub status: OrderStatus,
    /// Provider payment ID, once a payment exists.
    pub payment_id: Option<String>,
    /// When the payment was confirmed.
    pub paid_at: Option<String>,
    /// Created timestamp.
    pub created_at: String,
}

impl From<&Order> for OrderResponse {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id.to_string(),
            order_number: order.order_number.clone(),
            order_name: order.order_name.clone(),
            items: order
                .items
                .iter()
                .map(|i| OrderItemResponse {
                    product_id: i.product_id.to_string(),
                    product_title: i.product_title.clone(),
                    license_tier: i.license_tier,
                    price_cents: i.price_cents,
                })
                .collect(),
            subtotal_cents: order.subtotal_cents,
            discount_cents: order.discount_cents,
            total_cents: order.total_cents,
            currency: order.currency,
            exchange_rate: order.exchange_rate,
            status: order.status,
            payment_id: order.payment_id.clone(),
            paid_at: order.paid_at.map(|t| t.to_rfc3339()),
            created_at: order.created_at.to_rfc3339(),
        }
    }
}

/// One selection in a direct checkout.
#[derive(Debug, Deserialize)]
pub struct DirectItem {
    /// The product to buy.
    pub product_id: ProductId,
    /// The license tier to buy.
    pub license_tier: LicenseTier,
}

/// What the checkout buys.
#[derive(Debug, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum CheckoutSource {
    /// Buy everything currently in the cart.
    Cart,
    /// Buy an explicit product list (buy-now flow).
    Direct {
        /// The selections to buy.
        items: Vec<DirectItem>,
    },
}

/// Checkout request.
#[derive(Debug, Deserialize)]
pub struct CheckoutRequest {
    /// Cart or direct selections.
    #[serde(flatten)]
    pub source: CheckoutSource,
    /// Coupon code to apply, if any.
    pub coupon_code: Option<String>,
    /// Currency to pay in (default KRW).
    pub currency: Option<Currency>,
}

/// Create a PENDING order from the cart or a direct product list.
///
/// Prices come from the current license offerings, not cart snapshots. The
/// coupon is validated here but only counted as redeemed when the payment
/// completes.
pub async fn checkout(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Json(body): Json<CheckoutRequest>,
) -> Result<Json<OrderResponse>, ApiError> {
    let selections: Vec<(ProductId, LicenseTier)> = match body.source {
        CheckoutSource::Cart => state
            .store
            .list_cart_items(&auth.user_id)?
            .into_iter()
            .map(|i| (i.product_id, i.license_tier))
            .collect(),
        CheckoutSource::Direct { items } => items
            .into_iter()
            .map(|i| (i.product_id, i.license_tier))
            .collect(),
    };

    if selections.is_empty() {
        return Err(ApiError::BadRequest("nothing to order".into()));
    }

    let mut items = Vec::with_capacity(selections.len());
    for (product_id, tier) in selections {
        let product = state
            .store
            .get_product(&product_id)?
            .filter(Product::is_live)
            .ok_or_else(|| ApiError::BadRequest(format!("product not found: {product_id}")))?;

        let license = product.license(tier).ok_or_else(|| {
            ApiError::BadRequest(format!(
                "product {} does not offer a {} license",
                product.id,
                tier.as_str()
            ))
        })?;

        items.push(OrderItem {
            product_id: product.id,
            product_title: product.title.clone(),
            license_id: license.id,
            license_tier: tier,
            price_cents: license.price_cents,
        });
    }

    let subtotal_cents: i64 = items.iter().map(|i| i.price_cents).sum();

    let coupon = match body.coupon_code.as_deref() {
        Some(code) => Some(resolve_coupon(&state, code)?),
        None => None,
    };
    let discount_cents = coupon
        .as_ref()
        .map_or(0, |c| subtotal_cents - c.discount.apply(subtotal_cents));

    let currency = body.currency.unwrap_or(Currency::Krw);
    let exchange_rate = if currency == Currency::Krw {
        None
    } else {
        Some(state.fx.krw_rate(currency).await?)
    };

    let order = Order::new(
        auth.user_id,
        items,
        discount_cents,
        currency,
        exchange_rate,
        coupon.map(|c| c.id),
    );

    state.store.put_order(&order)?;

    tracing::info!(
        order_id = %order.id,
        order_number = %order.order_number,
        user_id = %auth.user_id,
        total_cents = %order.total_cents,
        currency = %currency.as_str(),
        "Order created"
    );

    Ok(Json(OrderResponse::from(&order)))
}

/// Look up and validate a coupon code.
fn resolve_coupon(state: &AppState, code: &str) -> Result<Coupon, ApiError> {
    let coupon = state
        .store
        .get_coupon_by_code(code)?
        .ok_or_else(|| ApiError::BadRequest(format!("coupon not found: {code}")))?;

    coupon.validate(Utc::now())?;

    Ok(coupon)
}

/// List query parameters.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// Page size (default 20, max 100).
    pub limit: Option<usize>,
    /// Offset into the newest-first history.
    pub offset: Option<usize>,
}

/// List the caller's orders, newest first.
pub async fn list_orders(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<OrderResponse>>, ApiError> {
    let limit = query.limit.unwrap_or(20).min(100);
    let offset = query.offset.unwrap_or(0);

    let orders = state
        .store
        .list_orders_by_user(&auth.user_id, limit, offset)?;

    Ok(Json(orders.iter().map(OrderResponse::from).collect()))
}

/// Get one of the caller's orders.
pub async fn get_order(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(order_id): Path<OrderId>,
) -> Result<Json<OrderResponse>, ApiError> {
    let order = load_own_order(&state, &auth, &order_id)?;

    Ok(Json(OrderResponse::from(&order)))
}

/// Confirm payment for an order against the provider's record.
///
/// The provider payment is fetched under the order number (the merchant
/// payment ID quoted at checkout). A PAID payment must match the order's
/// amount and currency exactly; a virtual-account issuance moves the order
/// to `WaitingForDeposit` instead. Re-completing a completed order is a
/// no-op.
pub async fn complete_order(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(order_id): Path<OrderId>,
) -> Result<Json<OrderResponse>, ApiError> {
    let order = load_own_order(&state, &auth, &order_id)?;

    let portone = state
        .portone
        .as_ref()
        .ok_or_else(|| ApiError::ExternalService("payment provider not configured".into()))?;

    let payment = portone.get_payment(&order.order_number).await?;

    let order = match payment.status {
        PaymentStatus::Paid => {
            if payment.currency != order.currency.as_str() {
                return Err(ApiError::BadRequest(format!(
                    "payment currency {} does not match order currency {}",
                    payment.currency,
                    order.currency.as_str()
                )));
            }
            if payment.amount.total != order.total_cents {
                return Err(ApiError::AmountMismatch {
                    expected: order.total_cents,
                    actual: payment.amount.total,
                });
            }

            state.store.complete_order(
                &order.id,
                &order.order_number,
                payment.pg_tx_id.as_deref(),
                Utc::now(),
            )?
        }
        PaymentStatus::VirtualAccountIssued => state
            .store
            .transition_order(&order.id, OrderStatus::WaitingForDeposit)?,
        other => {
            return Err(ApiError::BadRequest(format!(
                "payment is not completed (provider status: {other:?})"
            )));
        }
    };

    tracing::info!(
        order_id = %order.id,
        status = ?order.status,
        "Order payment confirmed"
    );

    Ok(Json(OrderResponse::from(&order)))
}

/// Cancel request.
#[derive(Debug, Deserialize, Default)]
pub struct CancelOrderRequest {
    /// Why the order is being cancelled.
    pub reason: Option<String>,
}

/// Cancel one of the caller's orders.
///
/// If a payment exists at the provider it is cancelled there first; only a
/// successful provider cancellation transitions the order.
pub async fn cancel_order(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(order_id): Path<OrderId>,
    body: Option<Json<CancelOrderRequest>>,
) -> Result<Json<OrderResponse>, ApiError> {
    let order = load_own_order(&state, &auth, &order_id)?;

    let reason = body
        .and_then(|Json(b)| b.reason)
        .unwrap_or_else(|| "buyer request".to_string());

    // Money moved only once a payment exists; a pending order cancels locally.
    let money_moved = order.payment_id.is_some()
        || matches!(
            order.status,
            OrderStatus::Completed | OrderStatus::PartialCancelled | OrderStatus::WaitingForDeposit
        );

    if money_moved {
        let portone = state
            .portone
            .as_ref()
            .ok_or_else(|| ApiError::ExternalService("payment provider not configured".into()))?;

        portone.cancel_payment(&order.order_number, &reason).await?;
    }

    let order = state
        .store
        .transition_order(&order.id, OrderStatus::Cancelled)?;

    tracing::info!(order_id = %order.id, reason = %reason, "Order cancelled");

    Ok(Json(OrderResponse::from(&order)))
}

/// Load an order and enforce ownership. Foreign orders read as not-found.
fn load_own_order(
    state: &AppState,
    auth: &AuthUser,
    order_id: &OrderId,
) -> Result<Order, ApiError> {
    state
        .store
        .get_order(order_id)?
        .filter(|o| o.user_id == auth.user_id)
        .ok_or_else(|| ApiError::NotFound(format!("order not found: {order_id}")))
}
