//! Beatdeck HTTP client implementation.

use reqwest::Client;
use std::time::Duration;

use crate::error::ClientError;
use crate::types::{
    ApiErrorResponse, CheckoutRequest, CouponSummary, MembershipSummary, OrderSummary,
    ProductSummary, SweepResult,
};

/// Beatdeck API client.
///
/// Service-to-service calls authenticate with the service API key; the
/// user-facing reads take the caller's JWT instead.
#[derive(Debug, Clone)]
pub struct BeatdeckClient {
    client: Client,
    base_url: String,
    api_key: String,
    service_name: String,
}

impl BeatdeckClient {
    /// Create a new beatdeck client.
    ///
    /// # Arguments
    ///
    /// * `base_url` - Base URL of the beatdeck service (e.g., `"http://beatdeck:8080"`)
    /// * `api_key` - Service API key for authentication
    #[must_use]
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self::with_options(base_url, api_key, ClientOptions::default())
    }

    /// Create a new beatdeck client with custom options.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be built (should not happen with default settings).
    #[must_use]
    pub fn with_options(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        options: ClientOptions,
    ) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(options.timeout_seconds))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            service_name: options.service_name,
        }
    }

    /// Run the recurring-charge sweep now.
    ///
    /// Used by external cron jobs instead of the service's built-in timer.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn trigger_charge_sweep(&self) -> Result<SweepResult, ClientError> {
        let url = format!("{}/v1/internal/charge-sweep", self.base_url);

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("x-service-name", &self.service_name)
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Get a live product by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the product does not exist.
    pub async fn get_product(
        &self,
        user_jwt: &str,
        product_id: &str,
    ) -> Result<ProductSummary, ClientError> {
        let url = format!("{}/v1/products/{product_id}", self.base_url);

        let response = self
            .client
            .get(&url)
            .header("authorization", format!("Bearer {user_jwt}"))
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Create a pending order from the cart or a direct product list.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the selections cannot be
    /// purchased.
    pub async fn checkout(
        &self,
        user_jwt: &str,
        request: &CheckoutRequest,
    ) -> Result<OrderSummary, ClientError> {
        let url = format!("{}/v1/orders", self.base_url);

        let response = self
            .client
            .post(&url)
            .header("authorization", format!("Bearer {user_jwt}"))
            .json(request)
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Get one of the user's orders.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn get_order(
        &self,
        user_jwt: &str,
        order_id: &str,
    ) -> Result<OrderSummary, ClientError> {
        let url = format!("{}/v1/orders/{order_id}", self.base_url);

        let response = self
            .client
            .get(&url)
            .header("authorization", format!("Bearer {user_jwt}"))
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// List the user's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn list_orders(
        &self,
        user_jwt: &str,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<OrderSummary>, ClientError> {
        let url = format!(
            "{}/v1/orders?limit={limit}&offset={offset}",
            self.base_url
        );

        let response = self
            .client
            .get(&url)
            .header("authorization", format!("Bearer {user_jwt}"))
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Confirm payment for an order against the provider's record.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn complete_order(
        &self,
        user_jwt: &str,
        order_id: &str,
    ) -> Result<OrderSummary, ClientError> {
        let url = format!("{}/v1/orders/{order_id}/complete", self.base_url);

        let response = self
            .client
            .post(&url)
            .header("authorization", format!("Bearer {user_jwt}"))
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Preview a coupon by code.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the coupon does not exist, or
    /// it can no longer be redeemed.
    pub async fn get_coupon(
        &self,
        user_jwt: &str,
        code: &str,
    ) -> Result<CouponSummary, ClientError> {
        let url = format!("{}/v1/coupons/{code}", self.base_url);

        let response = self
            .client
            .get(&url)
            .header("authorization", format!("Bearer {user_jwt}"))
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Get the user's membership.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the user has no membership.
    pub async fn get_membership(&self, user_jwt: &str) -> Result<MembershipSummary, ClientError> {
        let url = format!("{}/v1/memberships/me", self.base_url);

        let response = self
            .client
            .get(&url)
            .header("authorization", format!("Bearer {user_jwt}"))
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Handle API response and convert errors.
    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, ClientError> {
        let status = response.status();

        if status.is_success() {
            return Ok(response.json().await?);
        }

        // Try to parse error response
        let error_body: Result<ApiErrorResponse, _> = response.json().await;

        match error_body {
            Ok(api_error) => {
                let code = api_error.error.code.as_str();
                let message = api_error.error.message;

                // Map specific error codes to typed errors
                match code {
                    "payment_required" => Err(ClientError::PaymentDeclined { reason: message }),
                    "amount_mismatch" => {
                        let expected = api_error
                            .error
                            .details
                            .as_ref()
                            .and_then(|d| d.get("expected"))
                            .and_then(serde_json::Value::as_i64)
                            .unwrap_or(0);
                        let actual = api_error
                            .error
                            .details
                            .as_ref()
                            .and_then(|d| d.get("actual"))
                            .and_then(serde_json::Value::as_i64)
                            .unwrap_or(0);

                        Err(ClientError::AmountMismatch { expected, actual })
                    }
                    "not_found" => Err(ClientError::NotFound(message)),
                    _ => Err(ClientError::Api {
                        code: code.to_string(),
                        message,
                        status: status.as_u16(),
                    }),
                }
            }
            Err(_) => Err(ClientError::Api {
                code: "unknown".to_string(),
                message: format!("HTTP {status}"),
                status: status.as_u16(),
            }),
        }
    }
}

/// Client options for customization.
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Request timeout in seconds (default: 30).
    pub timeout_seconds: u64,
    /// Service name to include in requests.
    pub service_name: String,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout_seconds: 30,
            service_name: "unknown".to_string(),
        }
    }
}

impl ClientOptions {
    /// Create options with a service name.
    #[must_use]
    pub fn with_service_name(name: impl Into<String>) -> Self {
        Self {
            service_name: name.into(),
            ..Self::default()
        }
    }
}
