//! Exchange-rate lookup with an in-process TTL cache.
//!
//! Checkout in a non-KRW currency needs a KRW→currency rate. Rates are
//! fetched from a public rate API and cached for an hour; the rate applied
//! at checkout is recorded on the order.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use serde::Deserialize;
use tokio::sync::RwLock;

use beatdeck_core::Currency;

use crate::error::ApiError;

/// How long fetched rates stay valid.
const RATES_TTL: Duration = Duration::from_secs(3600); // 1 hour

/// Timeout for rate fetch requests.
const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Rate API response.
#[derive(Debug, Deserialize)]
struct RatesResponse {
    rates: HashMap<String, f64>,
}

struct CachedRates {
    rates: HashMap<String, f64>,
    fetched_at: Instant,
}

/// KRW exchange rates with a TTL cache.
pub struct ExchangeRates {
    client: reqwest::Client,
    api_url: String,
    cache: RwLock<Option<CachedRates>>,
}

impl ExchangeRates {
    /// Create a rate source against the given API base URL.
    ///
    /// The API is expected to answer `GET {api_url}/KRW` with a JSON body
    /// containing a `rates` map of currency code to rate.
    #[must_use]
    pub fn new(api_url: &str) -> Self {
        let client = reqwest::Client::builder()
            .timeout(FETCH_TIMEOUT)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
            cache: RwLock::new(None),
        }
    }

    /// Get the KRW→`currency` rate.
    ///
    /// KRW is always 1.0 and never hits the network.
    pub async fn krw_rate(&self, currency: Currency) -> Result<f64, ApiError> {
        if currency == Currency::Krw {
            return Ok(1.0);
        }

        // Fast path: fresh cache.
        {
            let cache = self.cache.read().await;
            if let Some(cached) = cache.as_ref() {
                if cached.fetched_at.elapsed() < RATES_TTL {
                    return Self::lookup(&cached.rates, currency);
                }
            }
        }

        let rates = self.fetch_rates().await?;
        let result = Self::lookup(&rates, currency);

        let mut cache = self.cache.write().await;
        *cache = Some(CachedRates {
            rates,
            fetched_at: Instant::now(),
        });

        result
    }

    fn lookup(rates: &HashMap<String, f64>, currency: Currency) -> Result<f64, ApiError> {
        rates
            .get(currency.as_str())
            .copied()
            .filter(|rate| *rate > 0.0)
            .ok_or_else(|| {
                ApiError::ExternalService(format!(
                    "no exchange rate available for {}",
                    currency.as_str()
                ))
            })
    }

    async fn fetch_rates(&self) -> Result<HashMap<String, f64>, ApiError> {
        let url = format!("{}/KRW", self.api_url);

        tracing::debug!(url = %url, "Fetching exchange rates");

        let response = self.client.get(&url).send().await.map_err(|e| {
            tracing::error!(error = %e, url = %url, "Failed to fetch exchange rates");
            ApiError::ExternalService("Failed to fetch exchange rates".into())
        })?;

        if !response.status().is_success() {
            tracing::error!(status = %response.status(), "Rate API returned non-success status");
            return Err(ApiError::ExternalService(
                "Failed to fetch exchange rates".into(),
            ));
        }

        let body: RatesResponse = response.json().await.map_err(|e| {
            tracing::error!(error = %e, "Failed to parse rate API response");
            ApiError::ExternalService("Failed to parse exchange rates".into())
        })?;

        tracing::info!(count = %body.rates.len(), "Exchange rates fetched");

        Ok(body.rates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn krw_shortcut_never_fetches() {
        let rates = ExchangeRates::new("http://127.0.0.1:9"); // unreachable
        assert_eq!(rates.krw_rate(Currency::Krw).await.unwrap(), 1.0);
    }

    #[tokio::test]
    async fn usd_rate_is_fetched_and_cached() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/KRW"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "rates": { "USD": 0.00074, "KRW": 1.0 }
            })))
            .expect(1) // Second call must come from the cache
            .mount(&server)
            .await;

        let rates = ExchangeRates::new(&server.uri());

        let first = rates.krw_rate(Currency::Usd).await.unwrap();
        let second = rates.krw_rate(Currency::Usd).await.unwrap();

        assert!((first - 0.00074).abs() < f64::EPSILON);
        assert!((second - 0.00074).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn missing_rate_is_an_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/KRW"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "rates": { "EUR": 0.00063 }
            })))
            .mount(&server)
            .await;

        let rates = ExchangeRates::new(&server.uri());

        assert!(rates.krw_rate(Currency::Usd).await.is_err());
    }
}
