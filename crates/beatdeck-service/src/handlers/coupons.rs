//! Coupon handlers.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use beatdeck_core::{Coupon, Discount};
use beatdeck_store::Store;

use crate::auth::{AdminAuth, AuthUser};
use crate::error::ApiError;
use crate::state::AppState;

/// Coupon response.
#[derive(Debug, Serialize)]
pub struct CouponResponse {
    /// Coupon ID.
    pub id: String,
    /// The code buyers enter.
    pub code: String,
    /// What the coupon takes off.
    pub discount: Discount,
    /// Expiry, if limited.
    pub expires_at: Option<String>,
    /// Redemption budget, if limited.
    pub max_redemptions: Option<u32>,
    /// Redemptions so far.
    pub redeemed_count: u32,
}

impl From<&Coupon> for CouponResponse {
    fn from(coupon: &Coupon) -> Self {
        Self {
            id: coupon.id.to_string(),
            code: coupon.code.clone(),
            discount: coupon.discount,
            expires_at: coupon.expires_at.map(|t| t.to_rfc3339()),
            max_redemptions: coupon.max_redemptions,
            redeemed_count: coupon.redeemed_count,
        }
    }
}

/// Create coupon request.
#[derive(Debug, Deserialize)]
pub struct CreateCouponRequest {
    /// The code buyers will enter.
    pub code: String,
    /// Discount to apply.
    pub discount: Discount,
    /// Optional expiry.
    pub expires_at: Option<DateTime<Utc>>,
    /// Optional redemption budget.
    pub max_redemptions: Option<u32>,
}

/// Create a coupon (admin only).
pub async fn create_coupon(
    State(state): State<Arc<AppState>>,
    admin: AdminAuth,
    Json(body): Json<CreateCouponRequest>,
) -> Result<Json<CouponResponse>, ApiError> {
    let code = body.code.trim().to_string();
    if code.is_empty() {
        return Err(ApiError::BadRequest("code must not be empty".into()));
    }

    if let Discount::Fixed { amount_cents } = body.discount {
        if amount_cents <= 0 {
            return Err(ApiError::BadRequest(
                "fixed discount must be positive".into(),
            ));
        }
    }

    if state.store.get_coupon_by_code(&code)?.is_some() {
        return Err(ApiError::Conflict(format!("coupon {code} already exists")));
    }

    let mut coupon = Coupon::new(code, body.discount);
    coupon.expires_at = body.expires_at;
    coupon.max_redemptions = body.max_redemptions;

    state.store.put_coupon(&coupon)?;

    tracing::info!(
        coupon_id = %coupon.id,
        code = %coupon.code,
        admin_id = %admin.admin_id,
        "Coupon created"
    );

    Ok(Json(CouponResponse::from(&coupon)))
}

/// Look up a coupon by code and validate it.
///
/// Buyers use this to preview a discount before checkout; an invalid coupon
/// is a 400 with the coupon error.
pub async fn get_coupon(
    State(state): State<Arc<AppState>>,
    _auth: AuthUser,
    Path(code): Path<String>,
) -> Result<Json<CouponResponse>, ApiError> {
    let coupon = state
        .store
        .get_coupon_by_code(&code)?
        .ok_or_else(|| ApiError::NotFound(format!("coupon not found: {code}")))?;

    coupon.validate(Utc::now())?;

    Ok(Json(CouponResponse::from(&coupon)))
}
