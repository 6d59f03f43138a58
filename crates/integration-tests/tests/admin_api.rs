//! HTTP tests for the admin back-office.
//!
//! These tests require:
//! - A running admin binary (`cargo run -p readymix-admin`)
//! - Valid backend credentials in the environment
//! - A provisioned staff account in `READYMIX_STAFF_EMAIL` /
//!   `READYMIX_STAFF_PASSWORD`
//!
//! Run with: `cargo test -p readymix-integration-tests -- --ignored`

use reqwest::{Client, StatusCode};
use serde_json::{Value, json};

/// Base URL for the admin API (configurable via environment).
fn admin_base_url() -> String {
    std::env::var("ADMIN_BASE_URL").unwrap_or_else(|_| "http://localhost:3001".to_string())
}

fn staff_credentials() -> (String, String) {
    (
        std::env::var("READYMIX_STAFF_EMAIL").expect("READYMIX_STAFF_EMAIL not set"),
        std::env::var("READYMIX_STAFF_PASSWORD").expect("READYMIX_STAFF_PASSWORD not set"),
    )
}

/// Sign the shared admin session in.
async fn sign_in(client: &Client) {
    let (email, password) = staff_credentials();
    let resp = client
        .post(format!("{}/auth/login", admin_base_url()))
        .json(&json!({ "email": email, "password": password }))
        .send()
        .await
        .expect("Failed to sign in");
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
#[ignore = "Requires running admin binary and staff credentials"]
async fn test_staff_operations_require_sign_in() {
    let client = Client::new();
    let base_url = admin_base_url();

    // Make sure nobody is signed in from an earlier test.
    let _ = client.post(format!("{base_url}/auth/logout")).send().await;

    let resp = client
        .post(format!("{base_url}/orders"))
        .json(&json!({
            "customer_name": "X",
            "customer_email": "x@example.com",
            "project_type": "M25",
            "quantity": "1.0",
            "area": "a",
            "location": "b",
            "requirements": "c"
        }))
        .send()
        .await
        .expect("Failed to post order");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = client
        .get(format!("{base_url}/dashboard/stats"))
        .send()
        .await
        .expect("Failed to get stats");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "Requires running admin binary and staff credentials"]
async fn test_login_rejects_bad_credentials() {
    let resp = Client::new()
        .post(format!("{}/auth/login", admin_base_url()))
        .json(&json!({ "email": "nobody@readymix.example", "password": "wrong" }))
        .send()
        .await
        .expect("Failed to post login");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let body: Value = resp.json().await.expect("Failed to read response");
    assert_eq!(body["success"], json!(false));
}

#[tokio::test]
#[ignore = "Requires running admin binary and staff credentials"]
async fn test_order_lifecycle_over_http() {
    let client = Client::new();
    let base_url = admin_base_url();
    sign_in(&client).await;

    // Create
    let resp = client
        .post(format!("{base_url}/orders"))
        .json(&json!({
            "customer_name": "Integration Test Co",
            "customer_email": "orders@test.example",
            "project_type": "M25 ready mix",
            "quantity": "12.5",
            "area": "240 sq m slab",
            "location": "Test site",
            "requirements": "Pump placement"
        }))
        .send()
        .await
        .expect("Failed to create order");
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Value = resp.json().await.expect("Failed to read response");
    let id = created["id"].as_str().expect("missing order id").to_owned();

    // Update status
    let resp = client
        .patch(format!("{base_url}/orders/{id}"))
        .json(&json!({ "status": "processing" }))
        .send()
        .await
        .expect("Failed to update order");
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    // The live list reflects the change after the next snapshot.
    let resp = client
        .get(format!("{base_url}/orders"))
        .send()
        .await
        .expect("Failed to list orders");
    assert_eq!(resp.status(), StatusCode::OK);

    // Delete (cleanup)
    let resp = client
        .delete(format!("{base_url}/orders/{id}"))
        .send()
        .await
        .expect("Failed to delete order");
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
#[ignore = "Requires running admin binary and staff credentials"]
async fn test_dashboard_stats_shape() {
    let client = Client::new();
    sign_in(&client).await;

    let resp = client
        .get(format!("{}/dashboard/stats", admin_base_url()))
        .send()
        .await
        .expect("Failed to get stats");
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = resp.json().await.expect("Failed to read response");
    assert!(body["orders"]["total"].is_u64());
    assert!(body["recent_orders"].is_array());
    assert!(body["recent_inquiries"].is_array());
}
