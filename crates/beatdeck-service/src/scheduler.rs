//! Recurring membership charges.
//!
//! A periodic sweep finds memberships whose next payment date has passed and
//! charges their stored billing keys. A failed charge is recorded and the due
//! date left alone, so the next sweep retries it.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::task::JoinHandle;

use beatdeck_core::{BillingKeyStatus, Charge, Membership};
use beatdeck_store::Store;

use crate::handlers::memberships::MEMBERSHIP_ORDER_NAME;
use crate::state::AppState;

/// What one sweep did.
#[derive(Debug, Default, Clone, Copy)]
pub struct SweepOutcome {
    /// Memberships charged successfully.
    pub charged: usize,
    /// Charge attempts that failed.
    pub failed: usize,
    /// Due memberships skipped (no usable billing key).
    pub skipped: usize,
}

/// Charge every membership that is due as of `now`.
///
/// One membership failing never stops the rest of the sweep.
pub async fn run_due_charges(state: &AppState, now: DateTime<Utc>) -> SweepOutcome {
    let mut outcome = SweepOutcome::default();

    let Some(portone) = state.portone.clone() else {
        tracing::warn!("Payment provider not configured - skipping charge sweep");
        return outcome;
    };

    let due = match state.store.list_due_memberships(now) {
        Ok(due) => due,
        Err(e) => {
            tracing::error!(error = %e, "Failed to list due memberships");
            return outcome;
        }
    };

    if due.is_empty() {
        tracing::debug!("No memberships due");
        return outcome;
    }

    tracing::info!(count = due.len(), "Charging due memberships");

    for membership in due {
        match charge_membership(state, &portone, &membership).await {
            Ok(true) => outcome.charged += 1,
            Ok(false) => outcome.skipped += 1,
            Err(e) => {
                outcome.failed += 1;
                tracing::warn!(
                    membership_id = %membership.id,
                    error = %e,
                    "Recurring charge failed"
                );
            }
        }
    }

    tracing::info!(
        charged = outcome.charged,
        failed = outcome.failed,
        skipped = outcome.skipped,
        "Charge sweep finished"
    );

    outcome
}

/// Charge one due membership. Returns `Ok(false)` when it had to be skipped.
async fn charge_membership(
    state: &AppState,
    portone: &crate::portone::PortOneClient,
    membership: &Membership,
) -> Result<bool, String> {
    let key_record = state
        .store
        .get_billing_key(&membership.id)
        .map_err(|e| e.to_string())?;

    let Some(key_record) = key_record.filter(|k| k.status == BillingKeyStatus::Issued) else {
        tracing::warn!(
            membership_id = %membership.id,
            "Due membership has no usable billing key - skipping"
        );
        return Ok(false);
    };

    let amount_cents = period_amount(state, membership);
    let charge = Charge::initiated(membership.id, membership.user_id, amount_cents);

    let result = portone
        .pay_with_billing_key(
            &charge.payment_id,
            &key_record.billing_key,
            MEMBERSHIP_ORDER_NAME,
            amount_cents,
            "KRW",
        )
        .await;

    match result {
        Ok(response) => {
            state
                .store
                .put_charge(&charge.succeeded(response.payment.pg_tx_id))
                .map_err(|e| e.to_string())?;

            // Advance from the scheduled date, not from now, so a late sweep
            // does not drift the billing anchor.
            let mut membership = membership.clone();
            membership.next_payment_date =
                membership.plan.next_period_from(membership.next_payment_date);
            membership.updated_at = Utc::now();
            state
                .store
                .put_membership(&membership)
                .map_err(|e| e.to_string())?;

            tracing::info!(
                membership_id = %membership.id,
                amount_cents = %amount_cents,
                next_payment_date = %membership.next_payment_date,
                "Membership charged"
            );
            Ok(true)
        }
        Err(e) => {
            let reason = e.to_string();
            state
                .store
                .put_charge(&charge.failed(reason.clone()))
                .map_err(|e| e.to_string())?;
            Err(reason)
        }
    }
}

/// Period price with the membership's coupon applied, when it still validates.
fn period_amount(state: &AppState, membership: &Membership) -> i64 {
    let Some(coupon_id) = membership.coupon_id else {
        return membership.price_cents;
    };

    match state.store.get_coupon(&coupon_id) {
        Ok(Some(coupon)) if coupon.validate(Utc::now()).is_ok() => {
            coupon.discount.apply(membership.price_cents)
        }
        Ok(_) => {
            tracing::debug!(
                membership_id = %membership.id,
                "Membership coupon no longer valid - charging full price"
            );
            membership.price_cents
        }
        Err(e) => {
            tracing::warn!(
                membership_id = %membership.id,
                error = %e,
                "Failed to load membership coupon - charging full price"
            );
            membership.price_cents
        }
    }
}

/// Spawn the periodic charge sweep.
///
/// Ticks are skipped while another sweep holds the state's sweep lock,
/// whether that is a previous tick or the manual trigger endpoint.
pub fn spawn_charge_sweep(state: Arc<AppState>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        // The first tick fires immediately; skip it so startup stays quiet.
        ticker.tick().await;

        loop {
            ticker.tick().await;

            match state.sweep_lock.try_lock() {
                Ok(_guard) => {
                    run_due_charges(&state, Utc::now()).await;
                }
                Err(_) => {
                    tracing::warn!("Another charge sweep is running - skipping tick");
                }
            }
        }
    })
}
