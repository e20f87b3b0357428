//! Client error types.

/// Errors that can occur when using the beatdeck client.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Server returned an error response.
    #[error("API error: {code} - {message}")]
    Api {
        /// Error code.
        code: String,
        /// Error message.
        message: String,
        /// HTTP status code.
        status: u16,
    },

    /// The provider declined a charge.
    #[error("payment declined: {reason}")]
    PaymentDeclined {
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

    /// Resource not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid configuration.
    #[error("configuration error: {0}")]
    Configuration(String),
}
