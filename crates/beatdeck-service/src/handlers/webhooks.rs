//! PortOne webhook handler.
//!
//! Webhooks are the source of truth for payment state: the browser may never
//! come back after an approval, but the provider always delivers the event.
//! Processing failures are logged and swallowed so the provider does not
//! retry an event we cannot act on; only a bad signature is rejected.

use std::sync::Arc;

use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;

use beatdeck_core::{BillingKeyStatus, OrderStatus};
use beatdeck_store::{Store, StoreError};

use crate::crypto::verify_webhook_signature;
use crate::error::ApiError;
use crate::state::AppState;

/// Webhook envelope (PortOne V2).
#[derive(Debug, Deserialize)]
struct WebhookEvent {
    /// Event type, e.g. `Transaction.Paid`.
    #[serde(rename = "type")]
    event_type: String,
    /// Event payload.
    data: WebhookData,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WebhookData {
    /// Merchant payment ID; for orders this is the order number.
    payment_id: Option<String>,
    /// Billing key token, on `BillingKey.*` events.
    billing_key: Option<String>,
}

/// Handle a PortOne webhook delivery.
///
/// The signature is checked against the standard-webhooks headers when a
/// webhook secret is configured. Deliveries are deduplicated by webhook ID,
/// and state transitions themselves are idempotent, so redeliveries and
/// out-of-order events settle without side effects.
pub async fn portone_webhook(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: String,
) -> Result<Json<serde_json::Value>, ApiError> {
    let webhook_id = header_str(&headers, "webhook-id");
    let timestamp = header_str(&headers, "webhook-timestamp");
    let signature = header_str(&headers, "webhook-signature");

    if let Some(secret) = state.config.portone_webhook_secret.as_deref() {
        let (Some(id), Some(ts), Some(sig)) = (webhook_id, timestamp, signature) else {
            tracing::warn!("Webhook rejected: missing signature headers");
            return Err(ApiError::Unauthorized);
        };

        verify_webhook_signature(secret, id, ts, &body, sig, Utc::now())
            .map_err(|e| {
                tracing::warn!(error = %e, "Webhook rejected: bad signature");
                ApiError::Unauthorized
            })?;
    } else {
        tracing::warn!("PORTONE_WEBHOOK_SECRET not set - skipping signature verification");
    }

    // Dedup by delivery ID before looking at the payload.
    let event: WebhookEvent = match serde_json::from_str(&body) {
        Ok(event) => event,
        Err(e) => {
            tracing::warn!(error = %e, "Webhook payload did not parse - ignoring");
            return Ok(Json(serde_json::json!({ "received": true })));
        }
    };

    if let Some(id) = webhook_id {
        match state.store.has_webhook_event(id) {
            Ok(true) => {
                tracing::info!(webhook_id = %id, "Duplicate webhook delivery - ignoring");
                return Ok(Json(serde_json::json!({ "received": true })));
            }
            Ok(false) => {
                state.store.put_webhook_event(id, &event.event_type)?;
            }
            Err(e) => {
                tracing::error!(error = %e, "Webhook dedup check failed");
                return Err(e.into());
            }
        }
    }

    if let Err(e) = process_event(&state, &event).await {
        tracing::error!(
            event_type = %event.event_type,
            error = %e,
            "Webhook processing failed - acknowledging anyway"
        );
    }

    Ok(Json(serde_json::json!({ "received": true })))
}

/// Apply one event to local state.
async fn process_event(state: &AppState, event: &WebhookEvent) -> Result<(), ApiError> {
    match event.event_type.as_str() {
        "Transaction.Paid" => {
            let order = require_order(state, event)?;

            // Verify against the provider's own record before trusting the
            // event, when the API client is configured.
            let pg_tx_id = match &state.portone {
                Some(portone) => {
                    let payment = portone.get_payment(&order.order_number).await?;
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
                    payment.pg_tx_id
                }
                None => None,
            };

            let order = state.store.complete_order(
                &order.id,
                &order.order_number,
                pg_tx_id.as_deref(),
                Utc::now(),
            )?;

            tracing::info!(order_id = %order.id, "Order completed via webhook");
            Ok(())
        }
        "Transaction.VirtualAccountIssued" => {
            let order = require_order(state, event)?;
            let order = state
                .store
                .transition_order(&order.id, OrderStatus::WaitingForDeposit)?;

            tracing::info!(order_id = %order.id, "Order awaiting virtual account deposit");
            Ok(())
        }
        "Transaction.Cancelled" => {
            let order = require_order(state, event)?;
            let order = state
                .store
                .transition_order(&order.id, OrderStatus::Cancelled)?;

            tracing::info!(order_id = %order.id, "Order cancelled via webhook");
            Ok(())
        }
        "Transaction.PartialCancelled" => {
            let order = require_order(state, event)?;
            let order = state
                .store
                .transition_order(&order.id, OrderStatus::PartialCancelled)?;

            tracing::info!(order_id = %order.id, "Order partially cancelled via webhook");
            Ok(())
        }
        "BillingKey.Deleted" => {
            let token = event
                .data
                .billing_key
                .as_deref()
                .ok_or_else(|| ApiError::BadRequest("event carries no billingKey".into()))?;

            let Some(mut record) = state.store.get_billing_key_by_token(token)? else {
                tracing::warn!("BillingKey.Deleted for unknown key - ignoring");
                return Ok(());
            };

            record.status = BillingKeyStatus::Deleted;
            record.deleted_at = Some(Utc::now());
            state.store.put_billing_key(&record)?;

            tracing::info!(
                membership_id = %record.membership_id,
                "Billing key deleted at provider"
            );
            Ok(())
        }
        other => {
            tracing::debug!(event_type = %other, "Unhandled webhook event type");
            Ok(())
        }
    }
}

/// Resolve the order named by the event's merchant payment ID.
fn require_order(
    state: &AppState,
    event: &WebhookEvent,
) -> Result<beatdeck_core::Order, ApiError> {
    let payment_id = event
        .data
        .payment_id
        .as_deref()
        .ok_or_else(|| ApiError::BadRequest("event carries no paymentId".into()))?;

    // Recurring charges come through here too; their payment IDs are not
    // order numbers, so an unknown ID on a charge payment is expected.
    state
        .store
        .get_order_by_number(payment_id)
        .map_err(ApiError::from)?
        .ok_or_else(|| {
            StoreError::NotFound {
                entity: "order",
                id: payment_id.to_string(),
            }
            .into()
        })
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}
