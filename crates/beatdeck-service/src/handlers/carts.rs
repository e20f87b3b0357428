//! Cart handlers.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use beatdeck_core::{CartItem, CartItemId, LicenseTier, Product, ProductId};
use beatdeck_store::Store;

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::state::AppState;

/// Cart item response.
#[derive(Debug, Serialize)]
pub struct CartItemResponse {
    /// Cart item ID.
    pub id: String,
    /// The selected product.
    pub product_id: String,
    /// Product title (resolved at read time).
    pub product_title: Option<String>,
    /// The selected license tier.
    pub license_tier: LicenseTier,
    /// License price at the time the item was added.
    pub price_cents: i64,
    /// When the item was added.
    pub created_at: String,
}

/// Cart response.
#[derive(Debug, Serialize)]
pub struct CartResponse {
    /// Items in the cart, oldest first.
    pub items: Vec<CartItemResponse>,
    /// Sum of item price snapshots.
    pub subtotal_cents: i64,
}

/// Add item request.
#[derive(Debug, Deserialize)]
pub struct AddCartItemRequest {
    /// The product to add.
    pub product_id: ProductId,
    /// The license tier to buy.
    pub license_tier: LicenseTier,
}

/// Add a (product, license tier) selection to the caller's cart.
pub async fn add_item(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Json(body): Json<AddCartItemRequest>,
) -> Result<Json<CartItemResponse>, ApiError> {
    let product = state
        .store
        .get_product(&body.product_id)?
        .filter(Product::is_live)
        .ok_or_else(|| ApiError::NotFound(format!("product not found: {}", body.product_id)))?;

    let license = product.license(body.license_tier).ok_or_else(|| {
        ApiError::BadRequest(format!(
            "product {} does not offer a {} license",
            product.id,
            body.license_tier.as_str()
        ))
    })?;

    let item = CartItem::new(
        auth.user_id,
        product.id,
        body.license_tier,
        license.price_cents,
    );

    state.store.add_cart_item(&item)?;

    tracing::info!(
        user_id = %auth.user_id,
        product_id = %product.id,
        tier = %body.license_tier.as_str(),
        "Cart item added"
    );

    Ok(Json(CartItemResponse {
        id: item.id.to_string(),
        product_id: item.product_id.to_string(),
        product_title: Some(product.title),
        license_tier: item.license_tier,
        price_cents: item.price_cents_snapshot,
        created_at: item.created_at.to_rfc3339(),
    }))
}

/// Get the caller's cart.
pub async fn get_cart(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> Result<Json<CartResponse>, ApiError> {
    let items = state.store.list_cart_items(&auth.user_id)?;

    let mut responses = Vec::with_capacity(items.len());
    let mut subtotal_cents = 0;

    for item in &items {
        let title = state
            .store
            .get_product(&item.product_id)?
            .map(|p| p.title);

        subtotal_cents += item.price_cents_snapshot;
        responses.push(CartItemResponse {
            id: item.id.to_string(),
            product_id: item.product_id.to_string(),
            product_title: title,
            license_tier: item.license_tier,
            price_cents: item.price_cents_snapshot,
            created_at: item.created_at.to_rfc3339(),
        });
    }

    Ok(Json(CartResponse {
        items: responses,
        subtotal_cents,
    }))
}

/// Remove an item from the caller's cart.
pub async fn remove_item(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(item_id): Path<CartItemId>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.store.remove_cart_item(&auth.user_id, &item_id)?;

    tracing::info!(user_id = %auth.user_id, item_id = %item_id, "Cart item removed");

    Ok(Json(serde_json::json!({ "deleted": true })))
}
