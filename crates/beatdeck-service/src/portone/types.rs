//! PortOne API types.

use serde::{Deserialize, Serialize};

/// Status of a payment at the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    /// Payment created, nothing happened yet.
    Ready,

    /// Payment confirmed.
    Paid,

    /// A virtual account was issued; waiting for the transfer.
    VirtualAccountIssued,

    /// Payment fully cancelled.
    Cancelled,

    /// Payment partially cancelled.
    PartialCancelled,

    /// Payment failed.
    Failed,
}

/// Amount breakdown on a payment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentAmount {
    /// Total amount charged.
    pub total: i64,
}

/// A payment as reported by the provider.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    /// The merchant-assigned payment ID.
    pub id: String,

    /// Current status.
    pub status: PaymentStatus,

    /// Amount breakdown.
    pub amount: PaymentAmount,

    /// ISO 4217 currency code.
    pub currency: String,

    /// PG transaction ID, once one exists.
    #[serde(default)]
    pub pg_tx_id: Option<String>,
}

/// Request body for a billing-key charge.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BillingKeyPaymentRequest {
    /// The billing key to charge.
    pub billing_key: String,

    /// Human-readable order name shown on statements.
    pub order_name: String,

    /// Amount to charge.
    pub amount: PaymentAmount,

    /// ISO 4217 currency code.
    pub currency: String,
}

/// Response from a billing-key charge.
#[derive(Debug, Clone, Deserialize)]
pub struct BillingKeyPaymentResponse {
    /// Summary of the resulting payment.
    pub payment: BillingKeyPaymentSummary,
}

/// Payment summary nested in a billing-key charge response.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillingKeyPaymentSummary {
    /// PG transaction ID for the charge.
    #[serde(default)]
    pub pg_tx_id: Option<String>,

    /// When the provider recorded the payment.
    #[serde(default)]
    pub paid_at: Option<String>,
}

/// Request body for a cancellation.
#[derive(Debug, Serialize)]
pub struct CancelPaymentRequest {
    /// Why the payment is being cancelled.
    pub reason: String,
}

/// Error body returned by the PortOne API.
#[derive(Debug, Deserialize)]
pub struct PortOneErrorResponse {
    /// Machine-readable error type.
    #[serde(rename = "type")]
    pub error_type: String,

    /// Human-readable message, when present.
    #[serde(default)]
    pub message: Option<String>,
}
