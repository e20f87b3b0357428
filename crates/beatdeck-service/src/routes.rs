//! Router configuration.
//!
//! This module sets up the Axum router with all routes and middleware.

use std::sync::Arc;
use std::time::Duration;

use axum::routing::{delete, get, post};
use axum::Router;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::{
    artists, attachments, carts, coupons, health, memberships, orders, products, webhooks,
};
use crate::state::AppState;

/// Maximum concurrent requests for general API endpoints.
const API_MAX_CONCURRENT_REQUESTS: usize = 50;

/// Create the service router with all routes and middleware.
///
/// # Routes
///
/// ## Public
/// - `GET /health` - Health check
///
/// ## Catalog (JWT auth)
/// - `POST /v1/artists`, `GET /v1/artists/:id`, `GET /v1/artists/:id/products`
/// - `POST /v1/products`, `GET /v1/products/:id`, `DELETE /v1/products/:id`
/// - `POST /v1/attachments`, `DELETE /v1/attachments/:id`
///
/// ## Carts and coupons (JWT auth; coupon creation is admin)
/// - `GET /v1/carts`, `POST /v1/carts/items`, `DELETE /v1/carts/items/:id`
/// - `POST /v1/coupons` (admin), `GET /v1/coupons/:code`
///
/// ## Orders (JWT auth)
/// - `POST /v1/orders`, `GET /v1/orders`, `GET /v1/orders/:id`
/// - `POST /v1/orders/:id/complete`, `POST /v1/orders/:id/cancel`
///
/// ## Memberships (JWT auth)
/// - `POST /v1/memberships`, `GET /v1/memberships/me`, `DELETE /v1/memberships/me`
///
/// ## Internal (Service API key)
/// - `POST /v1/internal/charge-sweep` - Run the recurring-charge sweep now
///
/// ## Webhooks (Signature verification)
/// - `POST /webhooks/portone` - PortOne webhooks
pub fn create_router(state: AppState) -> Router {
    // Extract config values before moving state
    let cors_origins = state.config.cors_origins.clone();
    let max_body_bytes = state.config.max_body_bytes;
    let request_timeout_seconds = state.config.request_timeout_seconds;

    let cors = build_cors_layer(&cors_origins);

    let state = Arc::new(state);

    let api_routes = Router::new()
        // Artists
        .route("/artists", post(artists::create_artist))
        .route("/artists/:id", get(artists::get_artist))
        .route("/artists/:id/products", get(products::list_artist_products))
        // Products
        .route("/products", post(products::create_product))
        .route("/products/:id", get(products::get_product))
        .route("/products/:id", delete(products::delete_product))
        // Attachments
        .route("/attachments", post(attachments::create_attachment))
        .route("/attachments/:id", delete(attachments::delete_attachment))
        // Carts
        .route("/carts", get(carts::get_cart))
        .route("/carts/items", post(carts::add_item))
        .route("/carts/items/:id", delete(carts::remove_item))
        // Coupons
        .route("/coupons", post(coupons::create_coupon))
        .route("/coupons/:code", get(coupons::get_coupon))
        // Orders
        .route("/orders", post(orders::checkout))
        .route("/orders", get(orders::list_orders))
        .route("/orders/:id", get(orders::get_order))
        .route("/orders/:id/complete", post(orders::complete_order))
        .route("/orders/:id/cancel", post(orders::cancel_order))
        // Memberships
        .route("/memberships", post(memberships::create_membership))
        .route("/memberships/me", get(memberships::get_membership))
        .route("/memberships/me", delete(memberships::cancel_membership))
        // Internal
        .route(
            "/internal/charge-sweep",
            post(memberships::trigger_charge_sweep),
        )
        .layer(ConcurrencyLimitLayer::new(API_MAX_CONCURRENT_REQUESTS));

    Router::new()
        // Health (public, no rate limit)
        .route("/health", get(health::health))
        // API v1 routes (rate limited)
        .nest("/v1", api_routes)
        // Webhooks (no rate limit - controlled by the provider)
        .route("/webhooks/portone", post(webhooks::portone_webhook))
        // Global middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(TimeoutLayer::new(Duration::from_secs(
            request_timeout_seconds,
        )))
        .with_state(state)
}

/// Build the CORS layer from configured origins.
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    }
}
