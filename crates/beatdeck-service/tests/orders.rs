//! Order integration tests: checkout, completion, cancellation.

mod common;

use axum::http::StatusCode;
use common::TestHarness;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn checkout_direct(harness: &TestHarness, product_id: &str, tier: &str) -> serde_json::Value {
    let response = harness
        .server
        .post("/v1/orders")
        .add_header("authorization", harness.user_auth_header())
        .json(&json!({
            "source": "direct",
            "items": [{ "product_id": product_id, "license_tier": tier }]
        }))
        .await;

    response.assert_status_ok();
    response.json()
}

/// Mount a provider payment record for an order number.
async fn mount_payment(server: &MockServer, order_number: &str, status: &str, total: i64) {
    Mock::given(method("GET"))
        .and(path(format!("/payments/{order_number}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": order_number,
            "status": status,
            "amount": { "total": total },
            "currency": "KRW",
            "pgTxId": "tx_test_1"
        })))
        .mount(server)
        .await;
}

// ============================================================================
// Checkout
// ============================================================================

#[tokio::test]
async fn direct_checkout_totals_license_prices() {
    let harness = TestHarness::new();
    let product_id = harness.seed_product().await;

    let response = harness
        .server
        .post("/v1/orders")
        .add_header("authorization", harness.user_auth_header())
        .json(&json!({
            "source": "direct",
            "items": [
                { "product_id": product_id, "license_tier": "basic" },
                { "product_id": product_id, "license_tier": "exclusive" }
            ]
        }))
        .await;

    response.assert_status_ok();
    let order: serde_json::Value = response.json();
    assert_eq!(order["subtotal_cents"], 30000 + 250000);
    assert_eq!(order["total_cents"], 30000 + 250000);
    assert_eq!(order["status"], "pending");
    assert!(order["order_number"].as_str().unwrap().starts_with("ORD-"));
}

#[tokio::test]
async fn cart_checkout_uses_cart_items() {
    let harness = TestHarness::new();
    let product_id = harness.seed_product().await;

    harness
        .server
        .post("/v1/carts/items")
        .add_header("authorization", harness.user_auth_header())
        .json(&json!({ "product_id": product_id, "license_tier": "basic" }))
        .await
        .assert_status_ok();

    let response = harness
        .server
        .post("/v1/orders")
        .add_header("authorization", harness.user_auth_header())
        .json(&json!({ "source": "cart" }))
        .await;

    response.assert_status_ok();
    let order: serde_json::Value = response.json();
    assert_eq!(order["items"].as_array().unwrap().len(), 1);
    assert_eq!(order["total_cents"], 30000);
}

#[tokio::test]
async fn cart_checkout_with_empty_cart_fails() {
    let harness = TestHarness::new();

    let response = harness
        .server
        .post("/v1/orders")
        .add_header("authorization", harness.user_auth_header())
        .json(&json!({ "source": "cart" }))
        .await;

    response.assert_status_bad_request();
}

#[tokio::test]
async fn coupon_discounts_checkout_but_is_not_redeemed_yet() {
    let harness = TestHarness::new();
    let product_id = harness.seed_product().await;

    harness
        .server
        .post("/v1/coupons")
        .add_header("x-admin-key", harness.admin_api_key.clone())
        .json(&json!({
            "code": "TEN",
            "discount": { "type": "percent", "percent": 10 }
        }))
        .await
        .assert_status_ok();

    let response = harness
        .server
        .post("/v1/orders")
        .add_header("authorization", harness.user_auth_header())
        .json(&json!({
            "source": "direct",
            "items": [{ "product_id": product_id, "license_tier": "basic" }],
            "coupon_code": "TEN"
        }))
        .await;

    response.assert_status_ok();
    let order: serde_json::Value = response.json();
    assert_eq!(order["subtotal_cents"], 30000);
    assert_eq!(order["discount_cents"], 3000);
    assert_eq!(order["total_cents"], 27000);

    // Redemption happens at completion, not checkout.
    let coupon: serde_json::Value = harness
        .server
        .get("/v1/coupons/TEN")
        .add_header("authorization", harness.user_auth_header())
        .await
        .json();
    assert_eq!(coupon["redeemed_count"], 0);
}

#[tokio::test]
async fn checkout_with_invalid_coupon_fails() {
    let harness = TestHarness::new();
    let product_id = harness.seed_product().await;

    let response = harness
        .server
        .post("/v1/orders")
        .add_header("authorization", harness.user_auth_header())
        .json(&json!({
            "source": "direct",
            "items": [{ "product_id": product_id, "license_tier": "basic" }],
            "coupon_code": "MISSING"
        }))
        .await;

    response.assert_status_bad_request();
}

// ============================================================================
// Reads
// ============================================================================

#[tokio::test]
async fn foreign_order_reads_as_not_found() {
    let harness = TestHarness::new();
    let product_id = harness.seed_product().await;
    let order = checkout_direct(&harness, &product_id, "basic").await;
    let order_id = order["id"].as_str().unwrap();

    let response = harness
        .server
        .get(&format!("/v1/orders/{order_id}"))
        .add_header("authorization", TestHarness::other_user_auth_header())
        .await;

    response.assert_status_not_found();
}

#[tokio::test]
async fn list_orders_paginates_newest_first() {
    let harness = TestHarness::new();
    let product_id = harness.seed_product().await;

    for _ in 0..3 {
        checkout_direct(&harness, &product_id, "basic").await;
    }

    let response = harness
        .server
        .get("/v1/orders?limit=2&offset=0")
        .add_header("authorization", harness.user_auth_header())
        .await;

    response.assert_status_ok();
    let orders: serde_json::Value = response.json();
    assert_eq!(orders.as_array().unwrap().len(), 2);
}

// ============================================================================
// Completion
// ============================================================================

#[tokio::test]
async fn complete_order_verifies_and_clears_cart() {
    let provider = MockServer::start().await;
    let harness = TestHarness::with_portone(&provider.uri());
    let product_id = harness.seed_product().await;

    harness
        .server
        .post("/v1/carts/items")
        .add_header("authorization", harness.user_auth_header())
        .json(&json!({ "product_id": product_id, "license_tier": "basic" }))
        .await
        .assert_status_ok();

    let order: serde_json::Value = harness
        .server
        .post("/v1/orders")
        .add_header("authorization", harness.user_auth_header())
        .json(&json!({ "source": "cart" }))
        .await
        .json();
    let order_id = order["id"].as_str().unwrap();
    let order_number = order["order_number"].as_str().unwrap();

    mount_payment(&provider, order_number, "PAID", 30000).await;

    let response = harness
        .server
        .post(&format!("/v1/orders/{order_id}/complete"))
        .add_header("authorization", harness.user_auth_header())
        .await;

    response.assert_status_ok();
    let completed: serde_json::Value = response.json();
    assert_eq!(completed["status"], "completed");
    assert_eq!(completed["payment_id"], order_number);

    // Purchased items leave the cart.
    let cart: serde_json::Value = harness
        .server
        .get("/v1/carts")
        .add_header("authorization", harness.user_auth_header())
        .await
        .json();
    assert!(cart["items"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn complete_order_is_idempotent() {
    let provider = MockServer::start().await;
    let harness = TestHarness::with_portone(&provider.uri());
    let product_id = harness.seed_product().await;
    let order = checkout_direct(&harness, &product_id, "basic").await;
    let order_id = order["id"].as_str().unwrap();

    mount_payment(&provider, order["order_number"].as_str().unwrap(), "PAID", 30000).await;

    for _ in 0..2 {
        let response = harness
            .server
            .post(&format!("/v1/orders/{order_id}/complete"))
            .add_header("authorization", harness.user_auth_header())
            .await;

        response.assert_status_ok();
        let body: serde_json::Value = response.json();
        assert_eq!(body["status"], "completed");
    }
}

#[tokio::test]
async fn completion_redeems_the_coupon_once() {
    let provider = MockServer::start().await;
    let harness = TestHarness::with_portone(&provider.uri());
    let product_id = harness.seed_product().await;

    harness
        .server
        .post("/v1/coupons")
        .add_header("x-admin-key", harness.admin_api_key.clone())
        .json(&json!({
            "code": "TEN",
            "discount": { "type": "percent", "percent": 10 }
        }))
        .await
        .assert_status_ok();

    let order: serde_json::Value = harness
        .server
        .post("/v1/orders")
        .add_header("authorization", harness.user_auth_header())
        .json(&json!({
            "source": "direct",
            "items": [{ "product_id": product_id, "license_tier": "basic" }],
            "coupon_code": "TEN"
        }))
        .await
        .json();
    let order_id = order["id"].as_str().unwrap();

    mount_payment(&provider, order["order_number"].as_str().unwrap(), "PAID", 27000).await;

    // Complete twice; the redemption must only count once.
    for _ in 0..2 {
        harness
            .server
            .post(&format!("/v1/orders/{order_id}/complete"))
            .add_header("authorization", harness.user_auth_header())
            .await
            .assert_status_ok();
    }

    let coupon: serde_json::Value = harness
        .server
        .get("/v1/coupons/TEN")
        .add_header("authorization", harness.user_auth_header())
        .await
        .json();
    assert_eq!(coupon["redeemed_count"], 1);
}

#[tokio::test]
async fn complete_order_rejects_amount_mismatch() {
    let provider = MockServer::start().await;
    let harness = TestHarness::with_portone(&provider.uri());
    let product_id = harness.seed_product().await;
    let order = checkout_direct(&harness, &product_id, "basic").await;
    let order_id = order["id"].as_str().unwrap();

    // Provider reports less than the order total.
    mount_payment(&provider, order["order_number"].as_str().unwrap(), "PAID", 100).await;

    let response = harness
        .server
        .post(&format!("/v1/orders/{order_id}/complete"))
        .add_header("authorization", harness.user_auth_header())
        .await;

    response.assert_status_bad_request();
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"]["code"], "amount_mismatch");
    assert_eq!(body["error"]["details"]["expected"], 30000);
    assert_eq!(body["error"]["details"]["actual"], 100);

    // Order stays pending.
    let order: serde_json::Value = harness
        .server
        .get(&format!("/v1/orders/{order_id}"))
        .add_header("authorization", harness.user_auth_header())
        .await
        .json();
    assert_eq!(order["status"], "pending");
}

#[tokio::test]
async fn virtual_account_moves_order_to_waiting_for_deposit() {
    let provider = MockServer::start().await;
    let harness = TestHarness::with_portone(&provider.uri());
    let product_id = harness.seed_product().await;
    let order = checkout_direct(&harness, &product_id, "basic").await;
    let order_id = order["id"].as_str().unwrap();

    mount_payment(
        &provider,
        order["order_number"].as_str().unwrap(),
        "VIRTUAL_ACCOUNT_ISSUED",
        30000,
    )
    .await;

    let response = harness
        .server
        .post(&format!("/v1/orders/{order_id}/complete"))
        .add_header("authorization", harness.user_auth_header())
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["status"], "waiting_for_deposit");
}

// ============================================================================
// Cancellation
// ============================================================================

#[tokio::test]
async fn pending_order_cancels_without_provider() {
    let harness = TestHarness::new();
    let product_id = harness.seed_product().await;
    let order = checkout_direct(&harness, &product_id, "basic").await;
    let order_id = order["id"].as_str().unwrap();

    let response = harness
        .server
        .post(&format!("/v1/orders/{order_id}/cancel"))
        .add_header("authorization", harness.user_auth_header())
        .json(&json!({ "reason": "changed my mind" }))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["status"], "cancelled");
}

#[tokio::test]
async fn completed_order_cancel_goes_through_provider() {
    let provider = MockServer::start().await;
    let harness = TestHarness::with_portone(&provider.uri());
    let product_id = harness.seed_product().await;
    let order = checkout_direct(&harness, &product_id, "basic").await;
    let order_id = order["id"].as_str().unwrap();
    let order_number = order["order_number"].as_str().unwrap();

    mount_payment(&provider, order_number, "PAID", 30000).await;

    harness
        .server
        .post(&format!("/v1/orders/{order_id}/complete"))
        .add_header("authorization", harness.user_auth_header())
        .await
        .assert_status_ok();

    // Refund must land at the provider before the local transition.
    Mock::given(method("POST"))
        .and(path(format!("/payments/{order_number}/cancel")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "cancellation": { "status": "SUCCEEDED" }
        })))
        .expect(1)
        .mount(&provider)
        .await;

    let response = harness
        .server
        .post(&format!("/v1/orders/{order_id}/cancel"))
        .add_header("authorization", harness.user_auth_header())
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["status"], "cancelled");
}

#[tokio::test]
async fn completed_order_cancel_fails_when_provider_refuses() {
    let provider = MockServer::start().await;
    let harness = TestHarness::with_portone(&provider.uri());
    let product_id = harness.seed_product().await;
    let order = checkout_direct(&harness, &product_id, "basic").await;
    let order_id = order["id"].as_str().unwrap();
    let order_number = order["order_number"].as_str().unwrap();

    mount_payment(&provider, order_number, "PAID", 30000).await;

    harness
        .server
        .post(&format!("/v1/orders/{order_id}/complete"))
        .add_header("authorization", harness.user_auth_header())
        .await
        .assert_status_ok();

    Mock::given(method("POST"))
        .and(path(format!("/payments/{order_number}/cancel")))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "type": "CANCEL_AMOUNT_EXCEEDED",
            "message": "already refunded"
        })))
        .mount(&provider)
        .await;

    let response = harness
        .server
        .post(&format!("/v1/orders/{order_id}/cancel"))
        .add_header("authorization", harness.user_auth_header())
        .await;

    response.assert_status(StatusCode::BAD_GATEWAY);

    // Order state is untouched when the provider call fails.
    let order: serde_json::Value = harness
        .server
        .get(&format!("/v1/orders/{order_id}"))
        .add_header("authorization", harness.user_auth_header())
        .await
        .json();
    assert_eq!(order["status"], "completed");
}
