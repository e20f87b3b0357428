//! PortOne webhook integration tests.

mod common;

use axum_test::TestResponse;
use chrono::Utc;
use common::{TestHarness, WEBHOOK_SECRET};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use beatdeck_core::{BillingKeyRecord, MembershipId, UserId};
use beatdeck_service::crypto::sign_webhook;
use beatdeck_store::Store;

/// Send a correctly signed webhook delivery.
async fn send_webhook(harness: &TestHarness, webhook_id: &str, event: &serde_json::Value) -> TestResponse {
    let body = event.to_string();
    let timestamp = Utc::now().timestamp().to_string();
    let signature = sign_webhook(WEBHOOK_SECRET, webhook_id, &timestamp, &body);

    harness
        .server
        .post("/webhooks/portone")
        .add_header("webhook-id", webhook_id)
        .add_header("webhook-timestamp", timestamp)
        .add_header("webhook-signature", signature)
        .text(body)
        .await
}

/// Check out a basic license and return (order id, order number).
async fn seed_order(harness: &TestHarness) -> (String, String) {
    let product_id = harness.seed_product().await;

    let order: serde_json::Value = harness
        .server
        .post("/v1/orders")
        .add_header("authorization", harness.user_auth_header())
        .json(&json!({
            "source": "direct",
            "items": [{ "product_id": product_id, "license_tier": "basic" }]
        }))
        .await
        .json();

    (
        order["id"].as_str().unwrap().to_string(),
        order["order_number"].as_str().unwrap().to_string(),
    )
}

async fn order_status(harness: &TestHarness, order_id: &str) -> serde_json::Value {
    let order: serde_json::Value = harness
        .server
        .get(&format!("/v1/orders/{order_id}"))
        .add_header("authorization", harness.user_auth_header())
        .await
        .json();
    order["status"].clone()
}

// ============================================================================
// Signature verification
// ============================================================================

#[tokio::test]
async fn webhook_with_bad_signature_is_rejected() {
    let harness = TestHarness::new();
    let body = json!({ "type": "Transaction.Paid", "data": { "paymentId": "ORD-X" } });

    let response = harness
        .server
        .post("/webhooks/portone")
        .add_header("webhook-id", "wh_1")
        .add_header("webhook-timestamp", Utc::now().timestamp().to_string())
        .add_header("webhook-signature", "v1,AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA=")
        .text(body.to_string())
        .await;

    response.assert_status_unauthorized();
}

#[tokio::test]
async fn webhook_without_signature_headers_is_rejected() {
    let harness = TestHarness::new();

    let response = harness
        .server
        .post("/webhooks/portone")
        .text(json!({ "type": "Transaction.Paid", "data": {} }).to_string())
        .await;

    response.assert_status_unauthorized();
}

#[tokio::test]
async fn webhook_with_stale_timestamp_is_rejected() {
    let harness = TestHarness::new();
    let body = json!({ "type": "Transaction.Paid", "data": {} }).to_string();

    // Signed correctly, but ten minutes old.
    let timestamp = (Utc::now().timestamp() - 600).to_string();
    let signature = sign_webhook(WEBHOOK_SECRET, "wh_old", &timestamp, &body);

    let response = harness
        .server
        .post("/webhooks/portone")
        .add_header("webhook-id", "wh_old")
        .add_header("webhook-timestamp", timestamp)
        .add_header("webhook-signature", signature)
        .text(body)
        .await;

    response.assert_status_unauthorized();
}

// ============================================================================
// Order transitions
// ============================================================================

#[tokio::test]
async fn paid_webhook_completes_the_order() {
    let provider = MockServer::start().await;
    let harness = TestHarness::with_portone(&provider.uri());
    let (order_id, order_number) = seed_order(&harness).await;

    Mock::given(method("GET"))
        .and(path(format!("/payments/{order_number}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": order_number,
            "status": "PAID",
            "amount": { "total": 30000 },
            "currency": "KRW",
            "pgTxId": "tx_hook_1"
        })))
        .mount(&provider)
        .await;

    let event = json!({
        "type": "Transaction.Paid",
        "data": { "paymentId": order_number }
    });

    let response = send_webhook(&harness, "wh_paid_1", &event).await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["received"], true);

    assert_eq!(order_status(&harness, &order_id).await, "completed");
}

#[tokio::test]
async fn paid_webhook_with_mismatched_currency_leaves_order_pending() {
    let provider = MockServer::start().await;
    let harness = TestHarness::with_portone(&provider.uri());
    let (order_id, order_number) = seed_order(&harness).await;

    // Right amount, wrong currency: the provider record must match both.
    Mock::given(method("GET"))
        .and(path(format!("/payments/{order_number}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": order_number,
            "status": "PAID",
            "amount": { "total": 30000 },
            "currency": "USD",
            "pgTxId": "tx_hook_fx"
        })))
        .mount(&provider)
        .await;

    let event = json!({
        "type": "Transaction.Paid",
        "data": { "paymentId": order_number }
    });

    // Acknowledged so the provider stops retrying, but not completed.
    send_webhook(&harness, "wh_fx_1", &event).await.assert_status_ok();

    assert_eq!(order_status(&harness, &order_id).await, "pending");
}

#[tokio::test]
async fn duplicate_delivery_is_acknowledged_once() {
    let provider = MockServer::start().await;
    let harness = TestHarness::with_portone(&provider.uri());
    let (order_id, order_number) = seed_order(&harness).await;

    // The provider record is only consulted for the first delivery.
    Mock::given(method("GET"))
        .and(path(format!("/payments/{order_number}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": order_number,
            "status": "PAID",
            "amount": { "total": 30000 },
            "currency": "KRW"
        })))
        .expect(1)
        .mount(&provider)
        .await;

    let event = json!({
        "type": "Transaction.Paid",
        "data": { "paymentId": order_number }
    });

    for _ in 0..2 {
        send_webhook(&harness, "wh_dup_1", &event)
            .await
            .assert_status_ok();
    }

    assert_eq!(order_status(&harness, &order_id).await, "completed");
}

#[tokio::test]
async fn virtual_account_webhook_moves_order_to_waiting() {
    let harness = TestHarness::new();
    let (order_id, order_number) = seed_order(&harness).await;

    let event = json!({
        "type": "Transaction.VirtualAccountIssued",
        "data": { "paymentId": order_number }
    });

    send_webhook(&harness, "wh_va_1", &event).await.assert_status_ok();

    assert_eq!(order_status(&harness, &order_id).await, "waiting_for_deposit");
}

#[tokio::test]
async fn cancelled_webhook_cancels_the_order() {
    let harness = TestHarness::new();
    let (order_id, order_number) = seed_order(&harness).await;

    let event = json!({
        "type": "Transaction.Cancelled",
        "data": { "paymentId": order_number }
    });

    send_webhook(&harness, "wh_cancel_1", &event).await.assert_status_ok();

    assert_eq!(order_status(&harness, &order_id).await, "cancelled");
}

#[tokio::test]
async fn unknown_payment_id_is_swallowed() {
    let harness = TestHarness::new();

    // Recurring membership charges report payment IDs that are not order
    // numbers; the handler must acknowledge them without failing.
    let event = json!({
        "type": "Transaction.Paid",
        "data": { "paymentId": "chg-01J0000000000000000000TEST" }
    });

    let response = send_webhook(&harness, "wh_chg_1", &event).await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["received"], true);
}

#[tokio::test]
async fn unknown_event_type_is_acknowledged() {
    let harness = TestHarness::new();

    let event = json!({
        "type": "Transaction.ReadyForPickup",
        "data": { "paymentId": "ORD-NOPE" }
    });

    send_webhook(&harness, "wh_odd_1", &event).await.assert_status_ok();
}

// ============================================================================
// Billing keys
// ============================================================================

#[tokio::test]
async fn billing_key_deleted_webhook_marks_key_deleted() {
    let harness = TestHarness::new();

    let record = BillingKeyRecord::issued(
        MembershipId::generate(),
        UserId::generate(),
        "bk_hook_1".to_string(),
    );
    harness.store.put_billing_key(&record).unwrap();

    let event = json!({
        "type": "BillingKey.Deleted",
        "data": { "billingKey": "bk_hook_1" }
    });

    send_webhook(&harness, "wh_bk_1", &event).await.assert_status_ok();

    let record = harness
        .store
        .get_billing_key_by_token("bk_hook_1")
        .unwrap()
        .unwrap();
    assert_eq!(record.status, beatdeck_core::BillingKeyStatus::Deleted);
    assert!(record.deleted_at.is_some());
}
