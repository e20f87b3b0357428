//! API error types and responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

/// API error type.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Unauthorized - missing or invalid credentials.
    #[error("unauthorized")]
    Unauthorized,

    /// Forbidden - valid credentials but insufficient permissions.
    #[error("forbidden")]
    Forbidden,

    /// Resource not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// Bad request - invalid input.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Conflict - resource already exists or invalid state transition.
    #[error("conflict: {0}")]
    Conflict(String),

    /// The provider declined a charge.
    #[error("payment required: {reason}")]
    PaymentRequired {
        /// Provider-reported decline reason.
        reason: String,
    },

    /// Paid amount does not match the order.
    #[error("amount mismatch: expected {expected}, provider reports {actual}")]
    AmountMismatch {
        /// What the order says is owed.
        expected: i64,
        /// What the provider says was paid.
        actual: i64,
    },

    /// Duplicate event (idempotency).
    #[error("duplicate event: {0}")]
    DuplicateEvent(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),

    /// External service error.
    #[error("external service error: {0}")]
    ExternalService(String),
}

/// JSON error response body.
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message, details) = match &self {
            Self::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "unauthorized",
                self.to_string(),
                None,
            ),
            Self::Forbidden => (StatusCode::FORBIDDEN, "forbidden", self.to_string(), None),
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg.clone(), None),
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg.clone(), None),
            Self::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg.clone(), None),
            Self::PaymentRequired { reason } => (
                StatusCode::PAYMENT_REQUIRED,
                "payment_required",
                reason.clone(),
                None,
            ),
            Self::AmountMismatch { expected, actual } => (
                StatusCode::BAD_REQUEST,
                "amount_mismatch",
                self.to_string(),
                Some(serde_json::json!({
                    "expected": expected,
                    "actual": actual
                })),
            ),
            Self::DuplicateEvent(id) => (
                StatusCode::CONFLICT,
                "duplicate_event",
                format!("Event {id} already processed"),
                None,
            ),
            Self::Internal(msg) => {
                tracing::error!(error = %msg, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                    None,
                )
            }
            Self::ExternalService(msg) => (
                StatusCode::BAD_GATEWAY,
                "external_service_error",
                msg.clone(),
                None,
            ),
        };

        let body = ErrorResponse {
            error: ErrorBody {
                code: code.to_string(),
                message,
                details,
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<beatdeck_store::StoreError> for ApiError {
    fn from(err: beatdeck_store::StoreError) -> Self {
        match err {
            beatdeck_store::StoreError::NotFound { entity, id } => {
                Self::NotFound(format!("{entity} not found: {id}"))
            }
            beatdeck_store::StoreError::Conflict(msg) => Self::Conflict(msg),
            beatdeck_store::StoreError::InvalidTransition { from, to } => {
                Self::Conflict(format!("cannot transition order from {from:?} to {to:?}"))
            }
            beatdeck_store::StoreError::CouponInvalid { code, reason } => {
                Self::BadRequest(format!("coupon {code} cannot be redeemed: {reason}"))
            }
            beatdeck_store::StoreError::DuplicateEvent { event_id } => {
                Self::DuplicateEvent(event_id)
            }
            beatdeck_store::StoreError::Database(msg)
            | beatdeck_store::StoreError::Serialization(msg) => Self::Internal(msg),
        }
    }
}

impl From<crate::portone::PortOneError> for ApiError {
    fn from(err: crate::portone::PortOneError) -> Self {
        Self::ExternalService(err.to_string())
    }
}

impl From<beatdeck_core::DomainError> for ApiError {
    fn from(err: beatdeck_core::DomainError) -> Self {
        use beatdeck_core::DomainError;

        match err {
            DomainError::ProductNotFound { .. } | DomainError::OrderNotFound { .. } => {
                Self::NotFound(err.to_string())
            }
            DomainError::InvalidTransition { from, to } => {
                Self::Conflict(format!("cannot transition order from {from:?} to {to:?}"))
            }
            DomainError::AmountMismatch { expected, actual } => {
                Self::AmountMismatch { expected, actual }
            }
            DomainError::MembershipExists { .. } => Self::Conflict(err.to_string()),
            DomainError::ExternalService { .. } => Self::ExternalService(err.to_string()),
            DomainError::LicenseNotOffered { .. }
            | DomainError::CouponExpired { .. }
            | DomainError::CouponExhausted { .. }
            | DomainError::InvalidId(_)
            | DomainError::InvalidAmount(_) => Self::BadRequest(err.to_string()),
        }
    }
}
