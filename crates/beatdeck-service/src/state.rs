//! Application state.

use std::sync::Arc;

use tokio::sync::Mutex;

use beatdeck_store::RocksStore;

use crate::config::ServiceConfig;
use crate::fx::ExchangeRates;
use crate::portone::PortOneClient;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// The storage backend.
    pub store: Arc<RocksStore>,

    /// Service configuration.
    pub config: ServiceConfig,

    /// PortOne client for payments (optional).
    pub portone: Option<Arc<PortOneClient>>,

    /// Exchange-rate source for non-KRW checkout.
    pub fx: Arc<ExchangeRates>,

    /// Held while a charge sweep runs. The timer tick and the manual
    /// trigger both take it, so two sweeps never see the same due
    /// membership.
    pub sweep_lock: Arc<Mutex<()>>,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(store: Arc<RocksStore>, config: ServiceConfig) -> Self {
        // Create PortOne client if configured
        let portone = config.portone_api_secret.as_ref().and_then(|secret| {
            match PortOneClient::new(&config.portone_api_url, secret) {
                Ok(client) => {
                    tracing::info!(api_url = %config.portone_api_url, "PortOne integration enabled");
                    Some(Arc::new(client))
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to create PortOne client");
                    None
                }
            }
        });

        if portone.is_none() {
            tracing::warn!("PortOne not configured - payments will not be available");
        }

        let fx = Arc::new(ExchangeRates::new(&config.fx_api_url));

        Self {
            store,
            config,
            portone,
            fx,
            sweep_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Check if PortOne is configured.
    #[must_use]
    pub fn has_portone(&self) -> bool {
        self.portone.is_some()
    }
}
