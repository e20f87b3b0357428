//! Error types for beatdeck domain operations.

use crate::ids::IdError;
use crate::order::OrderStatus;

/// Result type for beatdeck domain operations.
pub type Result<T> = std::result::Result<T, DomainError>;

/// Errors that can occur in beatdeck domain operations.
#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    /// Product not found or soft-deleted.
    #[error("product not found: {product_id}")]
    ProductNotFound {
        /// The product ID that was not found.
        product_id: String,
    },

    /// The product does not offer the requested license tier.
    #[error("license tier {tier} not offered by product {product_id}")]
    LicenseNotOffered {
        /// The product ID.
        product_id: String,
        /// The requested tier.
        tier: String,
    },

    /// Order not found.
    #[error("order not found: {order_id}")]
    OrderNotFound {
        /// The order ID that was not found.
        order_id: String,
    },

    /// Illegal order status transition.
    #[error("invalid order transition from {from:?} to {to:?}")]
    InvalidTransition {
        /// The current status.
        from: OrderStatus,
        /// The requested status.
        to: OrderStatus,
    },

    /// Paid amount does not match the order total.
    #[error("amount mismatch: order total {expected}, provider reports {actual}")]
    AmountMismatch {
        /// Amount the order expects.
        expected: i64,
        /// Amount the provider reports.
        actual: i64,
    },

    /// Coupon expired or deleted.
    #[error("coupon expired: {code}")]
    CouponExpired {
        /// The coupon code.
        code: String,
    },

    /// Coupon redemption budget used up.
    #[error("coupon exhausted: {code}")]
    CouponExhausted {
        /// The coupon code.
        code: String,
    },

    /// User already has an active membership.
    #[error("active membership already exists for user {user_id}")]
    MembershipExists {
        /// The user ID.
        user_id: String,
    },

    /// External service error (payment provider, exchange rates).
    #[error("external service error: {service} - {message}")]
    ExternalService {
        /// The service that failed.
        service: String,
        /// Error message.
        message: String,
    },

    /// Invalid identifier.
    #[error("invalid identifier: {0}")]
    InvalidId(#[from] IdError),

    /// Invalid amount.
    #[error("invalid amount: {0}")]
    InvalidAmount(String),
}
