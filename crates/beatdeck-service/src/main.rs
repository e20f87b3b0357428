//! Beatdeck Service - HTTP API for the beat marketplace
//!
//! This is the main entry point for the beatdeck service.

use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use beatdeck_service::{create_router, spawn_charge_sweep, AppState, ServiceConfig};
use beatdeck_store::RocksStore;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,beatdeck=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Beatdeck Service");

    // Load configuration from environment
    let config = ServiceConfig::from_env();

    tracing::info!(
        listen_addr = %config.listen_addr,
        data_dir = %config.data_dir,
        portone_configured = %config.portone_api_secret.is_some(),
        webhook_secret_configured = %config.portone_webhook_secret.is_some(),
        "Service configuration loaded"
    );

    // Initialize RocksDB store
    tracing::info!(path = %config.data_dir, "Opening RocksDB store");
    let store = Arc::new(RocksStore::open(&config.data_dir)?);

    // Build app state
    let state = AppState::new(store, config.clone());

    // Background sweep for due membership charges
    let sweep_interval = Duration::from_secs(config.charge_sweep_interval_seconds);
    spawn_charge_sweep(Arc::new(state.clone()), sweep_interval);
    tracing::info!(
        interval_seconds = %config.charge_sweep_interval_seconds,
        "Charge sweep scheduled"
    );

    // Create the router
    let app = create_router(state);
    tracing::info!("Router configured with all API endpoints");

    // Start HTTP server
    tracing::info!(listen_addr = %config.listen_addr, "Starting HTTP server");
    let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
