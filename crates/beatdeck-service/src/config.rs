//! Service configuration.

use serde::Deserialize;
use std::path::Path;

/// Service configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Address to listen on (default: "0.0.0.0:8080").
    pub listen_addr: String,

    /// Path to `RocksDB` data directory (default: "/data/beatdeck").
    pub data_dir: String,

    /// JWT validation base URL (JWKS is fetched from
    /// `{auth_base_url}/.well-known/jwks.json`).
    pub auth_base_url: String,

    /// Expected JWT audience (default: "beatdeck").
    pub auth_audience: String,

    /// Service API key for service-to-service auth.
    pub service_api_key: Option<String>,

    /// Admin API key for privileged endpoints.
    pub admin_api_key: Option<String>,

    /// PortOne API base URL (default: `<https://api.portone.io>`).
    pub portone_api_url: String,

    /// PortOne API secret (optional).
    pub portone_api_secret: Option<String>,

    /// PortOne webhook signing secret, base64 (optional).
    pub portone_webhook_secret: Option<String>,

    /// Exchange-rate API base URL.
    pub fx_api_url: String,

    /// CDN base URL for uploaded files.
    pub cdn_base_url: String,

    /// Secret for signing upload keys.
    pub upload_signing_secret: Option<String>,

    /// Seconds between recurring-charge sweep ticks (default: daily).
    pub charge_sweep_interval_seconds: u64,

    /// CORS allowed origins.
    pub cors_origins: Vec<String>,

    /// Maximum request body size in bytes.
    pub max_body_bytes: usize,

    /// Request timeout in seconds.
    pub request_timeout_seconds: u64,
}

/// PortOne secrets file structure.
#[derive(Debug, Deserialize)]
struct PortOneSecrets {
    api_secret: String,
    #[serde(default)]
    webhook_secret: Option<String>,
}

impl ServiceConfig {
    /// Load configuration from environment variables and secrets files.
    #[must_use]
    pub fn from_env() -> Self {
        // Try to load PortOne secrets from file first, then fall back to env vars
        let (portone_api_secret, portone_webhook_secret) = load_portone_secrets();

        Self {
            listen_addr: std::env::var("LISTEN_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".into()),
            data_dir: std::env::var("DATA_DIR").unwrap_or_else(|_| "/data/beatdeck".into()),
            auth_base_url: std::env::var("AUTH_BASE_URL")
                .unwrap_or_else(|_| "https://auth.beatdeck.io".into()),
            auth_audience: std::env::var("AUTH_AUDIENCE").unwrap_or_else(|_| "beatdeck".into()),
            service_api_key: std::env::var("SERVICE_API_KEY").ok(),
            admin_api_key: std::env::var("ADMIN_API_KEY").ok(),
            portone_api_url: std::env::var("PORTONE_API_URL")
                .unwrap_or_else(|_| "https://api.portone.io".into()),
            portone_api_secret,
            portone_webhook_secret,
            fx_api_url: std::env::var("FX_API_URL")
                .unwrap_or_else(|_| "https://open.er-api.com/v6/latest".into()),
            cdn_base_url: std::env::var("CDN_BASE_URL")
                .unwrap_or_else(|_| "https://cdn.beatdeck.io".into()),
            upload_signing_secret: std::env::var("UPLOAD_SIGNING_SECRET").ok(),
            charge_sweep_interval_seconds: std::env::var("CHARGE_SWEEP_INTERVAL_SECONDS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(24 * 60 * 60),
            cors_origins: std::env::var("CORS_ORIGINS")
                .unwrap_or_else(|_| "*".into())
                .split(',')
                .map(|s| s.trim().to_string())
                .collect(),
            max_body_bytes: std::env::var("MAX_BODY_BYTES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(1024 * 1024), // 1MB
            request_timeout_seconds: std::env::var("REQUEST_TIMEOUT_SECONDS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(30),
        }
    }
}

/// Load PortOne secrets from file or environment.
fn load_portone_secrets() -> (Option<String>, Option<String>) {
    let secret_paths = [
        ".secrets/portone.json",
        "beatdeck/.secrets/portone.json",
        "../.secrets/portone.json",
    ];

    for path in &secret_paths {
        if let Ok(secrets) = load_secrets_file::<PortOneSecrets>(path) {
            tracing::info!(path = %path, "Loaded PortOne secrets from file");
            return (Some(secrets.api_secret), secrets.webhook_secret);
        }
    }

    // Fall back to environment variables
    tracing::debug!("PortOne secrets file not found, using environment variables");
    (
        std::env::var("PORTONE_API_SECRET").ok(),
        std::env::var("PORTONE_WEBHOOK_SECRET").ok(),
    )
}

/// Load secrets from a JSON file.
fn load_secrets_file<T: serde::de::DeserializeOwned>(path: &str) -> Result<T, std::io::Error> {
    let path = Path::new(path);
    if !path.exists() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "Secrets file not found",
        ));
    }
    let contents = std::fs::read_to_string(path)?;
    serde_json::from_str(&contents)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8080".into(),
            data_dir: "/data/beatdeck".into(),
            auth_base_url: "https://auth.beatdeck.io".into(),
            auth_audience: "beatdeck".into(),
            service_api_key: None,
            admin_api_key: None,
            portone_api_url: "https://api.portone.io".into(),
            portone_api_secret: None,
            portone_webhook_secret: None,
            fx_api_url: "https://open.er-api.com/v6/latest".into(),
            cdn_base_url: "https://cdn.beatdeck.io".into(),
            upload_signing_secret: None,
            charge_sweep_interval_seconds: 24 * 60 * 60,
            cors_origins: vec!["*".into()],
            max_body_bytes: 1024 * 1024,
            request_timeout_seconds: 30,
        }
    }
}
