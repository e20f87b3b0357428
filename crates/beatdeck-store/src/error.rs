//! Error types for beatdeck storage.

use beatdeck_core::OrderStatus;

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors that can occur in storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Database operation failed.
    #[error("database error: {0}")]
    Database(String),

    /// Serialization/deserialization failed.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Record not found.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Entity kind (e.g. "order").
        entity: &'static str,
        /// The missing ID.
        id: String,
    },

    /// A conflicting live record already exists.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Illegal order status transition.
    #[error("invalid order transition from {from:?} to {to:?}")]
    InvalidTransition {
        /// The current status.
        from: OrderStatus,
        /// The requested status.
        to: OrderStatus,
    },

    /// Coupon cannot be redeemed.
    #[error("coupon {code} cannot be redeemed: {reason}")]
    CouponInvalid {
        /// The coupon code.
        code: String,
        /// Why redemption failed.
        reason: String,
    },

    /// Duplicate webhook delivery (idempotency check failed).
    #[error("duplicate event: {event_id}")]
    DuplicateEvent {
        /// The delivery ID that was duplicated.
        event_id: String,
    },
}
