//! Product catalog handlers.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use beatdeck_core::{
    Artist, ArtistId, AttachmentId, License, LicenseTier, Product, ProductId, ProductKind,
};
use beatdeck_store::Store;

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::state::AppState;

/// License offering in requests and responses.
#[derive(Debug, Serialize, Deserialize)]
pub struct LicenseBody {
    /// License tier.
    pub tier: LicenseTier,
    /// Price in KRW.
    pub price_cents: i64,
    /// Usage terms summary.
    pub terms: Option<String>,
}

/// Product response.
#[derive(Debug, Serialize)]
pub struct ProductResponse {
    /// Product ID.
    pub id: String,
    /// Selling artist.
    pub artist_id: String,
    /// Track title.
    pub title: String,
    /// Beat or acapella.
    pub kind: ProductKind,
    /// Tempo, if known.
    pub bpm: Option<u16>,
    /// License offerings.
    pub licenses: Vec<LicenseBody>,
    /// Cover image attachment.
    pub cover_attachment_id: Option<String>,
    /// Audio attachment.
    pub audio_attachment_id: Option<String>,
    /// Created timestamp.
    pub created_at: String,
}

impl From<&Product> for ProductResponse {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.to_string(),
            artist_id: product.artist_id.to_string(),
            title: product.title.clone(),
            kind: product.kind,
            bpm: product.bpm,
            licenses: product
                .licenses
                .iter()
                .map(|l| LicenseBody {
                    tier: l.tier,
                    price_cents: l.price_cents,
                    terms: l.terms.clone(),
                })
                .collect(),
            cover_attachment_id: product.cover_attachment_id.map(|id| id.to_string()),
            audio_attachment_id: product.audio_attachment_id.map(|id| id.to_string()),
            created_at: product.created_at.to_rfc3339(),
        }
    }
}

/// Create product request.
#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    /// Artist the product belongs to.
    pub artist_id: ArtistId,
    /// Track title.
    pub title: String,
    /// Beat or acapella.
    pub kind: ProductKind,
    /// Tempo, if known.
    pub bpm: Option<u16>,
    /// License offerings; at least one.
    pub licenses: Vec<LicenseBody>,
    /// Cover image attachment, if already uploaded.
    pub cover_attachment_id: Option<AttachmentId>,
    /// Audio attachment, if already uploaded.
    pub audio_attachment_id: Option<AttachmentId>,
}

/// Create a product under one of the caller's artist profiles.
pub async fn create_product(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Json(body): Json<CreateProductRequest>,
) -> Result<Json<ProductResponse>, ApiError> {
    let artist = state
        .store
        .get_artist(&body.artist_id)?
        .filter(Artist::is_live)
        .ok_or_else(|| ApiError::NotFound(format!("artist not found: {}", body.artist_id)))?;

    if artist.user_id != auth.user_id {
        return Err(ApiError::Forbidden);
    }

    if body.licenses.is_empty() {
        return Err(ApiError::BadRequest(
            "product must offer at least one license".into(),
        ));
    }

    // One offering per tier.
    let mut seen = Vec::new();
    for license in &body.licenses {
        if license.price_cents <= 0 {
            return Err(ApiError::BadRequest("license price must be positive".into()));
        }
        if seen.contains(&license.tier) {
            return Err(ApiError::BadRequest(format!(
                "duplicate license tier: {}",
                license.tier.as_str()
            )));
        }
        seen.push(license.tier);
    }

    let licenses = body
        .licenses
        .into_iter()
        .map(|l| {
            let mut license = License::new(l.tier, l.price_cents);
            license.terms = l.terms;
            license
        })
        .collect();

    let mut product = Product::new(body.artist_id, body.title, body.kind, licenses);
    product.bpm = body.bpm;
    product.cover_attachment_id = body.cover_attachment_id;
    product.audio_attachment_id = body.audio_attachment_id;

    state.store.put_product(&product)?;

    tracing::info!(
        product_id = %product.id,
        artist_id = %product.artist_id,
        "Product created"
    );

    Ok(Json(ProductResponse::from(&product)))
}

/// Get a product by ID.
pub async fn get_product(
    State(state): State<Arc<AppState>>,
    _auth: AuthUser,
    Path(product_id): Path<ProductId>,
) -> Result<Json<ProductResponse>, ApiError> {
    let product = state
        .store
        .get_product(&product_id)?
        .filter(Product::is_live)
        .ok_or_else(|| ApiError::NotFound(format!("product not found: {product_id}")))?;

    Ok(Json(ProductResponse::from(&product)))
}

/// List an artist's live products.
pub async fn list_artist_products(
    State(state): State<Arc<AppState>>,
    _auth: AuthUser,
    Path(artist_id): Path<ArtistId>,
) -> Result<Json<Vec<ProductResponse>>, ApiError> {
    let products = state.store.list_products_by_artist(&artist_id)?;

    Ok(Json(products.iter().map(ProductResponse::from).collect()))
}

/// Soft-delete a product. Only the owning artist's user may delete.
pub async fn delete_product(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(product_id): Path<ProductId>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let product = state
        .store
        .get_product(&product_id)?
        .filter(Product::is_live)
        .ok_or_else(|| ApiError::NotFound(format!("product not found: {product_id}")))?;

    let artist = state
        .store
        .get_artist(&product.artist_id)?
        .ok_or_else(|| ApiError::NotFound(format!("artist not found: {}", product.artist_id)))?;

    if artist.user_id != auth.user_id {
        return Err(ApiError::Forbidden);
    }

    state.store.soft_delete_product(&product_id)?;

    tracing::info!(product_id = %product_id, "Product deleted");

    Ok(Json(serde_json::json!({ "deleted": true })))
}
