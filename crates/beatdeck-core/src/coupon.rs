//! Coupon and discount types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::CouponId;

/// A discount applied by a coupon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Discount {
    /// Percentage off, 0-100.
    Percent {
        /// Percentage points to take off.
        percent: u8,
    },

    /// Fixed amount off, in cents.
    Fixed {
        /// Amount to take off in cents.
        amount_cents: i64,
    },
}

impl Discount {
    /// Apply this discount to an amount.
    ///
    /// Percent math truncates toward zero; the result never goes negative.
    #[must_use]
    pub fn apply(&self, amount_cents: i64) -> i64 {
        let discounted = match self {
            Self::Percent { percent } => {
                amount_cents - amount_cents * i64::from((*percent).min(100)) / 100
            }
            Self::Fixed { amount_cents: off } => amount_cents - off,
        };
        discounted.max(0)
    }
}

/// A discount code with an expiry and a redemption budget.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Coupon {
    /// The coupon ID.
    pub id: CouponId,

    /// The code buyers enter (unique, case-sensitive).
    pub code: String,

    /// What the coupon takes off.
    pub discount: Discount,

    /// When the coupon stops being valid, if limited.
    pub expires_at: Option<DateTime<Utc>>,

    /// Maximum number of redemptions, if limited.
    pub max_redemptions: Option<u32>,

    /// How many times the coupon has been redeemed.
    pub redeemed_count: u32,

    /// When the coupon was created.
    pub created_at: DateTime<Utc>,

    /// Soft-delete marker.
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Coupon {
    /// Create a new coupon.
    #[must_use]
    pub fn new(code: String, discount: Discount) -> Self {
        Self {
            id: CouponId::generate(),
            code,
            discount,
            expires_at: None,
            max_redemptions: None,
            redeemed_count: 0,
            created_at: Utc::now(),
            deleted_at: None,
        }
    }

    /// Validate the coupon against expiry, budget, and soft-delete.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::CouponExpired` or `DomainError::CouponExhausted`
    /// when the coupon can no longer be redeemed.
    pub fn validate(&self, now: DateTime<Utc>) -> Result<(), DomainError> {
        if self.deleted_at.is_some() {
            return Err(DomainError::CouponExpired {
                code: self.code.clone(),
            });
        }

        if let Some(expires_at) = self.expires_at {
            if now >= expires_at {
                return Err(DomainError::CouponExpired {
                    code: self.code.clone(),
                });
            }
        }

        if let Some(max) = self.max_redemptions {
            if self.redeemed_count >= max {
                return Err(DomainError::CouponExhausted {
                    code: self.code.clone(),
                });
            }
        }

        Ok(())
    }
}
