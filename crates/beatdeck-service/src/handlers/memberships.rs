//! Membership handlers: signup, status, cancellation, and the manual
//! charge-sweep trigger.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use beatdeck_core::{
    BillingKeyRecord, BillingKeyStatus, Charge, Membership, MembershipPlan, MembershipStatus,
};
use beatdeck_store::Store;

use crate::auth::{AuthUser, ServiceAuth};
use crate::error::ApiError;
use crate::portone::PortOneError;
use crate::scheduler::run_due_charges;
use crate::state::AppState;

/// Shown on provider statements for membership charges.
pub(crate) const MEMBERSHIP_ORDER_NAME: &str = "Beatdeck membership";

/// Membership response.
#[derive(Debug, Serialize)]
pub struct MembershipResponse {
    /// Membership ID.
    pub id: String,
    /// The billing plan.
    pub plan: MembershipPlan,
    /// Per-period price in KRW.
    pub price_cents: i64,
    /// Current status.
    pub status: MembershipStatus,
    /// When the membership started.
    pub started_at: String,
    /// When the next recurring charge is due.
    pub next_payment_date: String,
    /// When the membership was cancelled, if it was.
    pub canceled_at: Option<String>,
}

impl From<&Membership> for MembershipResponse {
    fn from(membership: &Membership) -> Self {
        Self {
            id: membership.id.to_string(),
            plan: membership.plan,
            price_cents: membership.price_cents,
            status: membership.status,
            started_at: membership.started_at.to_rfc3339(),
            next_payment_date: membership.next_payment_date.to_rfc3339(),
            canceled_at: membership.canceled_at.map(|t| t.to_rfc3339()),
        }
    }
}

/// Create membership request.
#[derive(Debug, Deserialize)]
pub struct CreateMembershipRequest {
    /// The billing plan to sign up for.
    pub plan: MembershipPlan,
    /// Provider-issued billing key from the issuance flow.
    pub billing_key: String,
    /// Coupon code applied to each period's charge, if any.
    pub coupon_code: Option<String>,
}

/// Sign up for a membership and charge the first period synchronously.
///
/// One active membership per user. A declined first charge records the
/// failed attempt, marks the billing key failed, and surfaces 402 without
/// creating the membership, so the user can retry with another card.
pub async fn create_membership(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Json(body): Json<CreateMembershipRequest>,
) -> Result<Json<MembershipResponse>, ApiError> {
    if body.billing_key.trim().is_empty() {
        return Err(ApiError::BadRequest("billing_key must not be empty".into()));
    }

    if let Some(existing) = state.store.get_membership_by_user(&auth.user_id)? {
        if existing.status == MembershipStatus::Active {
            return Err(ApiError::Conflict(format!(
                "active membership already exists for user {}",
                auth.user_id
            )));
        }
    }

    let portone = state
        .portone
        .as_ref()
        .ok_or_else(|| ApiError::ExternalService("payment provider not configured".into()))?;

    // Validate the coupon now; it is only counted as redeemed once the
    // first charge succeeds, so a declined signup leaves the budget alone.
    let coupon = match body.coupon_code.as_deref() {
        Some(code) => {
            let coupon = state
                .store
                .get_coupon_by_code(code)?
                .ok_or_else(|| ApiError::BadRequest(format!("coupon not found: {code}")))?;
            coupon.validate(Utc::now())?;
            Some(coupon)
        }
        None => None,
    };

    let membership = Membership::new(auth.user_id, body.plan, coupon.as_ref().map(|c| c.id));

    let amount_cents = coupon
        .as_ref()
        .map_or(membership.price_cents, |c| {
            c.discount.apply(membership.price_cents)
        });

    let charge = Charge::initiated(membership.id, auth.user_id, amount_cents);

    let charge_result = portone
        .pay_with_billing_key(
            &charge.payment_id,
            &body.billing_key,
            MEMBERSHIP_ORDER_NAME,
            amount_cents,
            "KRW",
        )
        .await;

    match charge_result {
        Ok(response) => {
            state
                .store
                .put_charge(&charge.succeeded(response.payment.pg_tx_id))?;

            let key_record =
                BillingKeyRecord::issued(membership.id, auth.user_id, body.billing_key);
            state.store.put_billing_key(&key_record)?;
            state.store.put_membership(&membership)?;

            // The money already moved, so a lost redemption bump is only a
            // bookkeeping gap; log it instead of failing the signup.
            if let Some(coupon) = &coupon {
                if let Err(e) = state.store.redeem_coupon(&coupon.id) {
                    tracing::warn!(
                        coupon_id = %coupon.id,
                        error = %e,
                        "Coupon redemption count not recorded"
                    );
                }
            }

            tracing::info!(
                membership_id = %membership.id,
                user_id = %auth.user_id,
                plan = ?membership.plan,
                amount_cents = %amount_cents,
                "Membership created, first period charged"
            );

            Ok(Json(MembershipResponse::from(&membership)))
        }
        Err(err) => {
            let reason = err.to_string();

            // Keep the failed attempt and the dead key for audit; the
            // membership row itself is not created, so signup can be retried.
            state.store.put_charge(&charge.failed(reason.clone()))?;

            let mut key_record =
                BillingKeyRecord::issued(membership.id, auth.user_id, body.billing_key);
            key_record.status = BillingKeyStatus::Failed;
            state.store.put_billing_key(&key_record)?;

            tracing::warn!(
                user_id = %auth.user_id,
                error = %reason,
                "First membership charge failed"
            );

            match err {
                PortOneError::Api { message, .. } => {
                    Err(ApiError::PaymentRequired { reason: message })
                }
                other => Err(other.into()),
            }
        }
    }
}

/// Get the caller's membership, if any.
pub async fn get_membership(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> Result<Json<MembershipResponse>, ApiError> {
    let membership = state
        .store
        .get_membership_by_user(&auth.user_id)?
        .ok_or_else(|| ApiError::NotFound("no membership".into()))?;

    Ok(Json(MembershipResponse::from(&membership)))
}

/// Cancel the caller's membership.
///
/// The row is kept with CANCELED status; the billing key is deleted at the
/// provider best-effort and marked deleted locally.
pub async fn cancel_membership(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> Result<Json<MembershipResponse>, ApiError> {
    let mut membership = state
        .store
        .get_membership_by_user(&auth.user_id)?
        .filter(|m| m.status == MembershipStatus::Active)
        .ok_or_else(|| ApiError::NotFound("no active membership".into()))?;

    let now = Utc::now();
    membership.status = MembershipStatus::Canceled;
    membership.canceled_at = Some(now);
    membership.updated_at = now;

    if let Some(mut key_record) = state.store.get_billing_key(&membership.id)? {
        if let Some(portone) = &state.portone {
            if let Err(e) = portone.delete_billing_key(&key_record.billing_key).await {
                tracing::warn!(
                    membership_id = %membership.id,
                    error = %e,
                    "Failed to delete billing key at provider - continuing"
                );
            }
        }

        key_record.status = BillingKeyStatus::Deleted;
        key_record.deleted_at = Some(now);
        state.store.put_billing_key(&key_record)?;
    }

    state.store.put_membership(&membership)?;

    tracing::info!(
        membership_id = %membership.id,
        user_id = %auth.user_id,
        "Membership cancelled"
    );

    Ok(Json(MembershipResponse::from(&membership)))
}

/// Sweep response.
#[derive(Debug, Serialize)]
pub struct SweepResponse {
    /// Memberships charged successfully.
    pub charged: usize,
    /// Charge attempts that failed.
    pub failed: usize,
}

/// Run the recurring-charge sweep now (service-to-service).
///
/// Refused with 409 while another sweep holds the lock, so a manual
/// trigger racing the timer cannot double-charge a due membership.
pub async fn trigger_charge_sweep(
    State(state): State<Arc<AppState>>,
    service: ServiceAuth,
) -> Result<Json<SweepResponse>, ApiError> {
    let Ok(_guard) = state.sweep_lock.try_lock() else {
        tracing::warn!(
            service = %service.service_name,
            "Charge sweep already running - refusing trigger"
        );
        return Err(ApiError::Conflict("charge sweep already running".into()));
    };

    tracing::info!(service = %service.service_name, "Charge sweep triggered");

    let outcome = run_due_charges(&state, Utc::now()).await;

    Ok(Json(SweepResponse {
        charged: outcome.charged,
        failed: outcome.failed,
    }))
}
