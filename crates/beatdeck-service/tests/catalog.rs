//! Catalog integration tests: artists, products, coupons.

mod common;

use axum::http::StatusCode;
use common::TestHarness;
use serde_json::json;

// ============================================================================
// Artists
// ============================================================================

#[tokio::test]
async fn create_and_get_artist() {
    let harness = TestHarness::new();

    let artist = harness.create_artist().await;
    let artist_id = artist["id"].as_str().unwrap();

    let response = harness
        .server
        .get(&format!("/v1/artists/{artist_id}"))
        .add_header("authorization", harness.user_auth_header())
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["stage_name"], "Test Artist");
    assert_eq!(body["user_id"], harness.test_user_id.to_string());
}

#[tokio::test]
async fn create_artist_rejects_empty_name() {
    let harness = TestHarness::new();

    let response = harness
        .server
        .post("/v1/artists")
        .add_header("authorization", harness.user_auth_header())
        .json(&json!({ "stage_name": "   " }))
        .await;

    response.assert_status_bad_request();
}

#[tokio::test]
async fn create_artist_without_auth_fails() {
    let harness = TestHarness::new();

    let response = harness
        .server
        .post("/v1/artists")
        .json(&json!({ "stage_name": "No Auth" }))
        .await;

    response.assert_status_unauthorized();
}

// ============================================================================
// Products
// ============================================================================

#[tokio::test]
async fn create_and_get_product() {
    let harness = TestHarness::new();
    let product_id = harness.seed_product().await;

    let response = harness
        .server
        .get(&format!("/v1/products/{product_id}"))
        .add_header("authorization", harness.user_auth_header())
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["title"], "Midnight Drive");
    assert_eq!(body["kind"], "beat");
    assert_eq!(body["licenses"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn create_product_under_foreign_artist_is_forbidden() {
    let harness = TestHarness::new();
    let artist = harness.create_artist().await;

    let response = harness
        .server
        .post("/v1/products")
        .add_header("authorization", TestHarness::other_user_auth_header())
        .json(&json!({
            "artist_id": artist["id"],
            "title": "Stolen Beat",
            "kind": "beat",
            "licenses": [{ "tier": "basic", "price_cents": 10000 }]
        }))
        .await;

    response.assert_status_forbidden();
}

#[tokio::test]
async fn create_product_rejects_duplicate_tiers() {
    let harness = TestHarness::new();
    let artist = harness.create_artist().await;

    let response = harness
        .server
        .post("/v1/products")
        .add_header("authorization", harness.user_auth_header())
        .json(&json!({
            "artist_id": artist["id"],
            "title": "Doubled Up",
            "kind": "beat",
            "licenses": [
                { "tier": "basic", "price_cents": 10000 },
                { "tier": "basic", "price_cents": 20000 }
            ]
        }))
        .await;

    response.assert_status_bad_request();
}

#[tokio::test]
async fn create_product_rejects_nonpositive_price() {
    let harness = TestHarness::new();
    let artist = harness.create_artist().await;

    let response = harness
        .server
        .post("/v1/products")
        .add_header("authorization", harness.user_auth_header())
        .json(&json!({
            "artist_id": artist["id"],
            "title": "Free Beat",
            "kind": "beat",
            "licenses": [{ "tier": "basic", "price_cents": 0 }]
        }))
        .await;

    response.assert_status_bad_request();
}

#[tokio::test]
async fn list_artist_products() {
    let harness = TestHarness::new();
    let artist = harness.create_artist().await;
    let artist_id = artist["id"].as_str().unwrap();

    harness.create_product(artist_id).await;
    harness.create_product(artist_id).await;

    let response = harness
        .server
        .get(&format!("/v1/artists/{artist_id}/products"))
        .add_header("authorization", harness.user_auth_header())
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn deleted_product_reads_as_not_found() {
    let harness = TestHarness::new();
    let product_id = harness.seed_product().await;

    harness
        .server
        .delete(&format!("/v1/products/{product_id}"))
        .add_header("authorization", harness.user_auth_header())
        .await
        .assert_status_ok();

    let response = harness
        .server
        .get(&format!("/v1/products/{product_id}"))
        .add_header("authorization", harness.user_auth_header())
        .await;

    response.assert_status_not_found();
}

#[tokio::test]
async fn delete_product_requires_ownership() {
    let harness = TestHarness::new();
    let product_id = harness.seed_product().await;

    let response = harness
        .server
        .delete(&format!("/v1/products/{product_id}"))
        .add_header("authorization", TestHarness::other_user_auth_header())
        .await;

    response.assert_status_forbidden();
}

// ============================================================================
// Coupons
// ============================================================================

#[tokio::test]
async fn admin_creates_coupon_and_user_previews_it() {
    let harness = TestHarness::new();

    let response = harness
        .server
        .post("/v1/coupons")
        .add_header("x-admin-key", harness.admin_api_key.clone())
        .json(&json!({
            "code": "LAUNCH10",
            "discount": { "type": "percent", "percent": 10 }
        }))
        .await;

    response.assert_status_ok();

    let response = harness
        .server
        .get("/v1/coupons/LAUNCH10")
        .add_header("authorization", harness.user_auth_header())
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "LAUNCH10");
    assert_eq!(body["redeemed_count"], 0);
}

#[tokio::test]
async fn create_coupon_requires_admin_key() {
    let harness = TestHarness::new();

    let response = harness
        .server
        .post("/v1/coupons")
        .add_header("x-admin-key", "wrong-key")
        .json(&json!({
            "code": "NOPE",
            "discount": { "type": "percent", "percent": 10 }
        }))
        .await;

    response.assert_status_unauthorized();
}

#[tokio::test]
async fn duplicate_coupon_code_conflicts() {
    let harness = TestHarness::new();

    for expected_ok in [true, false] {
        let response = harness
            .server
            .post("/v1/coupons")
            .add_header("x-admin-key", harness.admin_api_key.clone())
            .json(&json!({
                "code": "ONCE",
                "discount": { "type": "fixed", "amount_cents": 5000 }
            }))
            .await;

        if expected_ok {
            response.assert_status_ok();
        } else {
            response.assert_status(StatusCode::CONFLICT);
        }
    }
}

#[tokio::test]
async fn expired_coupon_preview_fails() {
    let harness = TestHarness::new();

    harness
        .server
        .post("/v1/coupons")
        .add_header("x-admin-key", harness.admin_api_key.clone())
        .json(&json!({
            "code": "EXPIRED",
            "discount": { "type": "percent", "percent": 50 },
            "expires_at": "2020-01-01T00:00:00Z"
        }))
        .await
        .assert_status_ok();

    let response = harness
        .server
        .get("/v1/coupons/EXPIRED")
        .add_header("authorization", harness.user_auth_header())
        .await;

    response.assert_status_bad_request();
}
