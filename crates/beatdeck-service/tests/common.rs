//! Common test utilities for beatdeck integration tests.

#![allow(dead_code)] // Some utilities are used by different test files

use std::sync::Arc;

use axum::Router;
use axum_test::TestServer;
use serde_json::json;
use tempfile::TempDir;

use beatdeck_core::UserId;
use beatdeck_service::{create_router, AppState, ServiceConfig};
use beatdeck_store::RocksStore;

/// Base64 of a fixed 32-byte webhook signing key for tests.
pub const WEBHOOK_SECRET: &str = "dGVzdC13ZWJob29rLXNlY3JldC1iZWF0ZGVjay0wMQ==";

/// Test harness containing everything needed for integration tests.
pub struct TestHarness {
    /// The test server for making HTTP requests.
    pub server: TestServer,
    /// Temporary directory for the database (kept alive for test duration).
    pub _temp_dir: TempDir,
    /// A test user ID for authenticated requests.
    pub test_user_id: UserId,
    /// The service API key for service-to-service requests.
    pub service_api_key: String,
    /// The admin API key for privileged requests.
    pub admin_api_key: String,
    /// Direct store handle for seeding and asserting on persisted state.
    pub store: Arc<RocksStore>,
    /// The application state the router was built from.
    pub state: AppState,
}

impl TestHarness {
    /// Create a new test harness with a fresh database and no provider.
    pub fn new() -> Self {
        Self::build(None, None)
    }

    /// Create a harness whose PortOne and FX calls hit the given mock URLs.
    pub fn with_mocks(portone_url: &str, fx_url: &str) -> Self {
        Self::build(Some(portone_url), Some(fx_url))
    }

    /// Create a harness with only the PortOne API mocked.
    pub fn with_portone(portone_url: &str) -> Self {
        Self::build(Some(portone_url), None)
    }

    fn build(portone_url: Option<&str>, fx_url: Option<&str>) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let store = Arc::new(RocksStore::open(temp_dir.path()).expect("Failed to open store"));

        let service_api_key = "test-service-key".to_string();
        let admin_api_key = "test-admin-key".to_string();

        let config = ServiceConfig {
            listen_addr: "127.0.0.1:0".into(),
            data_dir: temp_dir.path().to_string_lossy().to_string(),
            auth_base_url: "http://localhost".into(),
            auth_audience: "beatdeck".into(),
            service_api_key: Some(service_api_key.clone()),
            admin_api_key: Some(admin_api_key.clone()),
            portone_api_url: portone_url.unwrap_or("http://localhost:1").into(),
            portone_api_secret: portone_url.map(|_| "test-portone-secret".into()),
            portone_webhook_secret: Some(WEBHOOK_SECRET.into()),
            fx_api_url: fx_url.unwrap_or("http://localhost:1").into(),
            cdn_base_url: "https://cdn.test.beatdeck.io".into(),
            upload_signing_secret: Some("test-upload-secret".into()),
            charge_sweep_interval_seconds: 24 * 60 * 60,
            cors_origins: vec!["*".into()],
            max_body_bytes: 1024 * 1024,
            request_timeout_seconds: 30,
        };

        let state = AppState::new(Arc::clone(&store), config);
        let router: Router = create_router(state.clone());

        let server = TestServer::new(router).expect("Failed to create test server");
        let test_user_id = UserId::generate();

        Self {
            server,
            _temp_dir: temp_dir,
            test_user_id,
            service_api_key,
            admin_api_key,
            store,
            state,
        }
    }

    /// Get the authorization header for user authentication.
    pub fn user_auth_header(&self) -> String {
        format!("Bearer test-token:{}", self.test_user_id)
    }

    /// Get a different user's auth header (for testing isolation).
    pub fn other_user_auth_header() -> String {
        let other_user = UserId::generate();
        format!("Bearer test-token:{other_user}")
    }

    /// Create an artist owned by the test user and return its JSON.
    pub async fn create_artist(&self) -> serde_json::Value {
        let response = self
            .server
            .post("/v1/artists")
            .add_header("authorization", self.user_auth_header())
            .json(&json!({ "stage_name": "Test Artist" }))
            .await;

        response.assert_status_ok();
        response.json()
    }

    /// Create a product with basic and exclusive licenses; returns its JSON.
    pub async fn create_product(&self, artist_id: &str) -> serde_json::Value {
        let response = self
            .server
            .post("/v1/products")
            .add_header("authorization", self.user_auth_header())
            .json(&json!({
                "artist_id": artist_id,
                "title": "Midnight Drive",
                "kind": "beat",
                "licenses": [
                    { "tier": "basic", "price_cents": 30000 },
                    { "tier": "exclusive", "price_cents": 250000 }
                ]
            }))
            .await;

        response.assert_status_ok();
        response.json()
    }

    /// Create an artist and product, returning the product ID.
    pub async fn seed_product(&self) -> String {
        let artist = self.create_artist().await;
        let product = self
            .create_product(artist["id"].as_str().expect("artist id"))
            .await;
        product["id"].as_str().expect("product id").to_string()
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}
