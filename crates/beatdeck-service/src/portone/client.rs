//! PortOne API client implementation.

use std::time::Duration;

use reqwest::Client;

use super::types::{
    BillingKeyPaymentRequest, BillingKeyPaymentResponse, CancelPaymentRequest, Payment,
    PaymentAmount, PortOneErrorResponse,
};

/// Error type for PortOne operations.
#[derive(Debug, thiserror::Error)]
pub enum PortOneError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// PortOne API returned an error.
    #[error("PortOne API error: {error_type} - {message}")]
    Api {
        /// Error type reported by the API.
        error_type: String,
        /// Error message.
        message: String,
    },

    /// Configuration error.
    #[error("configuration error: {0}")]
    Configuration(String),
}

/// PortOne V2 API client.
#[derive(Debug, Clone)]
pub struct PortOneClient {
    client: Client,
    base_url: String,
    api_secret: String,
}

impl PortOneClient {
    /// Create a new PortOne client.
    ///
    /// # Errors
    ///
    /// Returns `PortOneError::Configuration` if the HTTP client cannot be
    /// built.
    pub fn new(base_url: &str, api_secret: &str) -> Result<Self, PortOneError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| PortOneError::Configuration(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_secret: api_secret.to_string(),
        })
    }

    /// Fetch a payment by its merchant-assigned ID.
    pub async fn get_payment(&self, payment_id: &str) -> Result<Payment, PortOneError> {
        let response = self
            .client
            .get(format!("{}/payments/{payment_id}", self.base_url))
            .header("Authorization", format!("PortOne {}", self.api_secret))
            .send()
            .await?;

        Self::handle_response(response).await
    }

    /// Charge a billing key, creating a payment under `payment_id`.
    pub async fn pay_with_billing_key(
        &self,
        payment_id: &str,
        billing_key: &str,
        order_name: &str,
        amount_total: i64,
        currency: &str,
    ) -> Result<BillingKeyPaymentResponse, PortOneError> {
        let body = BillingKeyPaymentRequest {
            billing_key: billing_key.to_string(),
            order_name: order_name.to_string(),
            amount: PaymentAmount {
                total: amount_total,
            },
            currency: currency.to_string(),
        };

        tracing::debug!(
            payment_id = %payment_id,
            amount = %amount_total,
            currency = %currency,
            "Charging billing key"
        );

        let response = self
            .client
            .post(format!(
                "{}/payments/{payment_id}/billing-key",
                self.base_url
            ))
            .header("Authorization", format!("PortOne {}", self.api_secret))
            .json(&body)
            .send()
            .await?;

        Self::handle_response(response).await
    }

    /// Cancel a payment (full cancellation).
    pub async fn cancel_payment(
        &self,
        payment_id: &str,
        reason: &str,
    ) -> Result<(), PortOneError> {
        let body = CancelPaymentRequest {
            reason: reason.to_string(),
        };

        let response = self
            .client
            .post(format!("{}/payments/{payment_id}/cancel", self.base_url))
            .header("Authorization", format!("PortOne {}", self.api_secret))
            .json(&body)
            .send()
            .await?;

        Self::check_status(response).await
    }

    /// Delete a billing key at the provider.
    pub async fn delete_billing_key(&self, billing_key: &str) -> Result<(), PortOneError> {
        let response = self
            .client
            .delete(format!("{}/billing-keys/{billing_key}", self.base_url))
            .header("Authorization", format!("PortOne {}", self.api_secret))
            .send()
            .await?;

        Self::check_status(response).await
    }

    /// Handle API response and convert errors.
    async fn handle_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, PortOneError> {
        let status = response.status();

        if status.is_success() {
            return Ok(response.json().await?);
        }

        Err(Self::api_error(status, response).await)
    }

    /// Check a response for success, discarding the body.
    async fn check_status(response: reqwest::Response) -> Result<(), PortOneError> {
        let status = response.status();

        if status.is_success() {
            return Ok(());
        }

        Err(Self::api_error(status, response).await)
    }

    async fn api_error(status: reqwest::StatusCode, response: reqwest::Response) -> PortOneError {
        let error_body: Result<PortOneErrorResponse, _> = response.json().await;

        match error_body {
            Ok(err) => PortOneError::Api {
                error_type: err.error_type,
                message: err.message.unwrap_or_else(|| format!("HTTP {status}")),
            },
            Err(_) => PortOneError::Api {
                error_type: "UNKNOWN".to_string(),
                message: format!("HTTP {status}"),
            },
        }
    }
}
