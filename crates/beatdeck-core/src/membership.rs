//! Membership and recurring billing types.
//!
//! A membership is a recurring plan charged through a provider-issued
//! billing key. Each charge attempt gets its own `Charge` row so failures
//! keep their provider fail reason for support and the daily sweep.

use chrono::{DateTime, Datelike, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::{ChargeId, CouponId, MembershipId, UserId};

// ============================================================================
// Plan constants
// ============================================================================

/// Monthly plan price in KRW.
pub const MONTH_PLAN_PRICE_CENTS: i64 = 9_900;

/// Yearly plan price in KRW.
pub const YEAR_PLAN_PRICE_CENTS: i64 = 99_000;

/// Available membership plans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MembershipPlan {
    /// Billed every month.
    Month,

    /// Billed every year.
    Year,
}

impl MembershipPlan {
    /// Price per billing period in KRW.
    #[must_use]
    pub const fn price_cents(&self) -> i64 {
        match self {
            Self::Month => MONTH_PLAN_PRICE_CENTS,
            Self::Year => YEAR_PLAN_PRICE_CENTS,
        }
    }

    /// Compute the next payment date one period after `from`.
    ///
    /// Month arithmetic clamps to the last day of shorter months
    /// (Jan 31 + 1 month = Feb 28/29).
    #[must_use]
    pub fn next_period_from(&self, from: DateTime<Utc>) -> DateTime<Utc> {
        match self {
            Self::Month => add_months(from, 1),
            Self::Year => add_months(from, 12),
        }
    }
}

/// Add calendar months, clamping the day to the target month's length.
fn add_months(from: DateTime<Utc>, months: u32) -> DateTime<Utc> {
    let total = from.year() * 12 + i32::try_from(from.month0()).unwrap_or(0) + i32::try_from(months).unwrap_or(0);
    let year = total.div_euclid(12);
    let month0 = u32::try_from(total.rem_euclid(12)).unwrap_or(0);

    let day = from.day();
    let last = last_day_of_month(year, month0 + 1);

    from.with_day(1)
        .and_then(|d| d.with_year(year))
        .and_then(|d| d.with_month(month0 + 1))
        .and_then(|d| d.with_day(day.min(last)))
        // Unreachable with the clamped day, but fall back rather than panic.
        .unwrap_or_else(|| from + Duration::days(30 * i64::from(months)))
}

fn last_day_of_month(year: i32, month: u32) -> u32 {
    match month {
        2 => {
            if (year % 4 == 0 && year % 100 != 0) || year % 400 == 0 {
                29
            } else {
                28
            }
        }
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    }
}

/// Status of a membership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MembershipStatus {
    /// Membership is active and will be charged on the next payment date.
    Active,

    /// Membership was cancelled; no further charges.
    Canceled,
}

/// A user's recurring membership.
///
/// At most one membership row exists per user; cancellation flips the status
/// and keeps the row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Membership {
    /// The membership ID.
    pub id: MembershipId,

    /// The member.
    pub user_id: UserId,

    /// The billing plan.
    pub plan: MembershipPlan,

    /// Per-period price in KRW at signup time.
    pub price_cents: i64,

    /// Current status.
    pub status: MembershipStatus,

    /// Coupon applied to each period's charge, if any.
    pub coupon_id: Option<CouponId>,

    /// When the membership started.
    pub started_at: DateTime<Utc>,

    /// When the next recurring charge is due.
    pub next_payment_date: DateTime<Utc>,

    /// When the membership was cancelled, if it was.
    pub canceled_at: Option<DateTime<Utc>>,

    /// When the record was created.
    pub created_at: DateTime<Utc>,

    /// When the record was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Membership {
    /// Create a new active membership starting now.
    ///
    /// The next payment date is one period out; the first period is charged
    /// synchronously at signup.
    #[must_use]
    pub fn new(user_id: UserId, plan: MembershipPlan, coupon_id: Option<CouponId>) -> Self {
        let now = Utc::now();
        Self {
            id: MembershipId::generate(),
            user_id,
            plan,
            price_cents: plan.price_cents(),
            status: MembershipStatus::Active,
            coupon_id,
            started_at: now,
            next_payment_date: plan.next_period_from(now),
            canceled_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Check whether a recurring charge is due at `now`.
    #[must_use]
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.status == MembershipStatus::Active && self.next_payment_date <= now
    }
}

/// Status of a billing key held for a membership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BillingKeyStatus {
    /// Issuance started, not confirmed yet.
    Ready,

    /// Key issued and usable for charges.
    Issued,

    /// Issuance or a charge with this key failed.
    Failed,

    /// Key deleted at the provider.
    Deleted,
}

/// A billing key record tied to a membership.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BillingKeyRecord {
    /// The membership the key charges.
    pub membership_id: MembershipId,

    /// The member (denormalized for webhook lookups).
    pub user_id: UserId,

    /// The provider-issued billing key token.
    pub billing_key: String,

    /// Current status.
    pub status: BillingKeyStatus,

    /// PG provider name reported at issuance, if known.
    pub pg_provider: Option<String>,

    /// When the key was issued.
    pub issued_at: DateTime<Utc>,

    /// When the key was deleted at the provider, if it was.
    pub deleted_at: Option<DateTime<Utc>>,
}

impl BillingKeyRecord {
    /// Create a record for a freshly issued key.
    #[must_use]
    pub fn issued(membership_id: MembershipId, user_id: UserId, billing_key: String) -> Self {
        Self {
            membership_id,
            user_id,
            billing_key,
            status: BillingKeyStatus::Issued,
            pg_provider: None,
            issued_at: Utc::now(),
            deleted_at: None,
        }
    }
}

/// Status of a single charge attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChargeStatus {
    /// Charge request sent to the provider.
    Initiated,

    /// Provider confirmed the charge.
    Succeeded,

    /// Provider rejected the charge.
    Failed,
}

/// One recurring (or first-period) charge attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Charge {
    /// The charge ID (ULID, time-ordered).
    pub id: ChargeId,

    /// The membership being charged.
    pub membership_id: MembershipId,

    /// The member.
    pub user_id: UserId,

    /// Provider payment ID used for this attempt.
    pub payment_id: String,

    /// Amount charged in KRW.
    pub amount_cents: i64,

    /// Current status.
    pub status: ChargeStatus,

    /// PG transaction ID, once the provider reports one.
    pub pg_tx_id: Option<String>,

    /// Provider fail reason, when the charge failed.
    pub fail_reason: Option<String>,

    /// When the attempt was made.
    pub created_at: DateTime<Utc>,
}

impl Charge {
    /// Create a record for a charge that was just sent to the provider.
    #[must_use]
    pub fn initiated(membership_id: MembershipId, user_id: UserId, amount_cents: i64) -> Self {
        let id = ChargeId::generate();
        Self {
            id,
            membership_id,
            user_id,
            payment_id: format!("chg-{id}"),
            amount_cents,
            status: ChargeStatus::Initiated,
            pg_tx_id: None,
            fail_reason: None,
            created_at: Utc::now(),
        }
    }

    /// Mark this attempt succeeded with the provider's transaction ID.
    #[must_use]
    pub fn succeeded(mut self, pg_tx_id: Option<String>) -> Self {
        self.status = ChargeStatus::Succeeded;
        self.pg_tx_id = pg_tx_id;
        self
    }

    /// Mark this attempt failed with the provider's reason.
    #[must_use]
    pub fn failed(mut self, reason: String) -> Self {
        self.status = ChargeStatus::Failed;
        self.fail_reason = Some(reason);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn plan_prices() {
        assert_eq!(MembershipPlan::Month.price_cents(), 9_900);
        assert_eq!(MembershipPlan::Year.price_cents(), 99_000);
    }

    #[test]
    fn month_plan_advances_one_month() {
        let from = Utc.with_ymd_and_hms(2026, 3, 15, 9, 0, 0).unwrap();
        let next = MembershipPlan::Month.next_period_from(from);
        assert_eq!(next, Utc.with_ymd_and_hms(2026, 4, 15, 9, 0, 0).unwrap());
    }

    #[test]
    fn month_plan_clamps_to_short_months() {
        let from = Utc.with_ymd_and_hms(2026, 1, 31, 12, 0, 0).unwrap();
        let next = MembershipPlan::Month.next_period_from(from);
        assert_eq!(next, Utc.with_ymd_and_hms(2026, 2, 28, 12, 0, 0).unwrap());

        let leap = Utc.with_ymd_and_hms(2028, 1, 31, 12, 0, 0).unwrap();
        let next = MembershipPlan::Month.next_period_from(leap);
        assert_eq!(next, Utc.with_ymd_and_hms(2028, 2, 29, 12, 0, 0).unwrap());
    }

    #[test]
    fn year_plan_advances_december_across_year() {
        let from = Utc.with_ymd_and_hms(2026, 12, 5, 0, 0, 0).unwrap();
        let next = MembershipPlan::Year.next_period_from(from);
        assert_eq!(next, Utc.with_ymd_and_hms(2027, 12, 5, 0, 0, 0).unwrap());
    }

    #[test]
    fn new_membership_is_active_and_not_due() {
        let membership = Membership::new(UserId::generate(), MembershipPlan::Month, None);
        assert_eq!(membership.status, MembershipStatus::Active);
        assert!(!membership.is_due(Utc::now()));
    }

    #[test]
    fn past_payment_date_is_due() {
        let mut membership = Membership::new(UserId::generate(), MembershipPlan::Month, None);
        membership.next_payment_date = Utc::now() - Duration::days(1);
        assert!(membership.is_due(Utc::now()));
    }

    #[test]
    fn canceled_membership_is_never_due() {
        let mut membership = Membership::new(UserId::generate(), MembershipPlan::Month, None);
        membership.next_payment_date = Utc::now() - Duration::days(10);
        membership.status = MembershipStatus::Canceled;
        assert!(!membership.is_due(Utc::now()));
    }

    #[test]
    fn charge_lifecycle() {
        let charge = Charge::initiated(MembershipId::generate(), UserId::generate(), 9_900);
        assert_eq!(charge.status, ChargeStatus::Initiated);
        assert!(charge.payment_id.starts_with("chg-"));

        let ok = charge.clone().succeeded(Some("tx_1".into()));
        assert_eq!(ok.status, ChargeStatus::Succeeded);
        assert_eq!(ok.pg_tx_id.as_deref(), Some("tx_1"));

        let failed = charge.failed("card declined".into());
        assert_eq!(failed.status, ChargeStatus::Failed);
        assert_eq!(failed.fail_reason.as_deref(), Some("card declined"));
    }
}
