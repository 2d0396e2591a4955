//! API integration tests
//!
//! Drive the full router in-process, no network.

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use bank_api::{build_router, DeletePolicy, Ledger};
use serde_json::{json, Value};
use tower::util::ServiceExt;

fn app() -> Router {
    build_router(Arc::new(Ledger::new(DeletePolicy::default())))
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

fn alice_body() -> Value {
    json!({
        "username": "alice",
        "first_name": "Alice",
        "last_name": "Example",
        "contact_info": { "email": "alice@example.com", "phone": "555-123-4567" }
    })
}

/// Create a user and an account, returning the generated account name.
async fn open_account(app: &Router, username: &str, deposit: &str) -> String {
    let (status, _) = send(
        app,
        "POST",
        "/api/v1/users",
        Some(json!({
            "username": username,
            "first_name": "Test",
            "last_name": "User",
            "contact_info": { "email": format!("{username}@example.com") }
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "user creation failed");

    let (status, body) = send(
        app,
        "POST",
        &format!("/api/v1/accounts/{username}"),
        Some(json!({
            "account_type": "CHECKING",
            "currency": "USD",
            "initial_deposit": deposit
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "account creation failed");
    body["account_name"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_health_and_index() {
    let app = app();
    let response = app
        .clone()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_user_crud() {
    let app = app();

    // Create
    let (status, body) = send(&app, "POST", "/api/v1/users", Some(alice_body())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["username"], "alice");
    assert_eq!(body["contact_info"]["email"], "alice@example.com");

    // Duplicate username conflicts
    let (status, body) = send(&app, "POST", "/api/v1/users", Some(alice_body())).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error_code"], "duplicate_user");

    // Read
    let (status, body) = send(&app, "GET", "/api/v1/users/alice", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["first_name"], "Alice");

    let (status, body) = send(&app, "GET", "/api/v1/users", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);

    // Update keeps the username
    let (status, body) = send(
        &app,
        "PUT",
        "/api/v1/users/alice",
        Some(json!({ "first_name": "Alicia" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["first_name"], "Alicia");
    assert_eq!(body["username"], "alice");

    // Delete, then 404
    let (status, _) = send(&app, "DELETE", "/api/v1/users/alice", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, "GET", "/api/v1/users/alice", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_unknown_user_is_404() {
    let app = app();
    let (status, _) = send(&app, "GET", "/api/v1/users/nobody", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        "POST",
        "/api/v1/accounts/nobody",
        Some(json!({
            "account_type": "SAVINGS",
            "currency": "USD",
            "initial_deposit": "10.00"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_create_account_records_initial_deposit() {
    let app = app();
    let account = open_account(&app, "alice", "100.00").await;

    let uri = format!("/api/v1/accounts/history/{account}?balance=true&transactions=true");
    let (status, body) = send(&app, "GET", &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["balance"], "100.00");
    assert_eq!(body["username"], "alice");

    let transactions = body["transactions"].as_array().unwrap();
    assert_eq!(transactions.len(), 1);
    assert_eq!(transactions[0]["kind"], "DEPOSIT");
    assert_eq!(transactions[0]["destination_account"], account.as_str());
    assert!(transactions[0]["source_account"].is_null());
}

#[tokio::test]
async fn test_create_account_rejects_negative_deposit() {
    let app = app();
    let (status, _) = send(&app, "POST", "/api/v1/users", Some(alice_body())).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/accounts/alice",
        Some(json!({
            "account_type": "CHECKING",
            "currency": "USD",
            "initial_deposit": "-5.00"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_code"], "invalid_request");
}

#[tokio::test]
async fn test_deposit_and_withdraw_round_trip() {
    let app = app();
    let account = open_account(&app, "alice", "100.00").await;

    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/v1/accounts/deposit/alice/{account}"),
        Some(json!({ "amount": "42.50", "description": "paycheck" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["balance"], "142.50");
    assert_eq!(body["transaction"]["kind"], "DEPOSIT");

    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/v1/accounts/withdraw/alice/{account}"),
        Some(json!({ "amount": "42.50" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["balance"], "100.00");
    assert_eq!(body["transaction"]["kind"], "WITHDRAWAL");
}

#[tokio::test]
async fn test_deposit_validation() {
    let app = app();
    let account = open_account(&app, "alice", "10.00").await;

    // Non-positive amount
    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/v1/accounts/deposit/alice/{account}"),
        Some(json!({ "amount": "0" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Currency mismatch
    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/v1/accounts/deposit/alice/{account}"),
        Some(json!({ "amount": "5.00", "currency": "EUR" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_code"], "currency_mismatch");

    // Unknown account
    let (status, _) = send(
        &app,
        "POST",
        "/api/v1/accounts/deposit/alice/checking_zzzzz",
        Some(json!({ "amount": "5.00" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_overdraft_is_unprocessable_and_balance_unchanged() {
    let app = app();
    let account = open_account(&app, "alice", "100.00").await;

    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/v1/accounts/withdraw/alice/{account}"),
        Some(json!({ "amount": "150.00" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error_code"], "insufficient_funds");

    let uri = format!("/api/v1/accounts/history/{account}?balance=true");
    let (_, body) = send(&app, "GET", &uri, None).await;
    assert_eq!(body["balance"], "100.00");
}

#[tokio::test]
async fn test_transfer_e2e() {
    let app = app();

    // alice with 100.00, bob with an empty savings account
    let alice_checking = open_account(&app, "alice", "100.00").await;
    let (status, _) = send(
        &app,
        "POST",
        "/api/v1/users",
        Some(json!({
            "username": "bob",
            "first_name": "Bob",
            "last_name": "Example",
            "contact_info": { "email": "bob@example.com" }
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/accounts/bob",
        Some(json!({
            "account_type": "SAVINGS",
            "currency": "USD",
            "initial_deposit": "0.00"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let bob_savings = body["account_name"].as_str().unwrap().to_string();

    // Transfer 50.00
    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/accounts/transfer",
        Some(json!({
            "source_account": alice_checking,
            "destination_account": bob_savings,
            "amount": "50.00",
            "description": "rent"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "transfer failed");
    assert_eq!(body["kind"], "TRANSFER");
    assert_eq!(body["source_account"], alice_checking.as_str());
    assert_eq!(body["destination_account"], bob_savings.as_str());

    // Both balances moved; exactly one transfer record on each side
    let (_, body) = send(
        &app,
        "GET",
        &format!("/api/v1/accounts/history/{alice_checking}?balance=true&transactions=true"),
        None,
    )
    .await;
    assert_eq!(body["balance"], "50.00");
    let transfers = body["transactions"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|tx| tx["kind"] == "TRANSFER")
        .count();
    assert_eq!(transfers, 1);

    let (_, body) = send(
        &app,
        "GET",
        &format!("/api/v1/accounts/history/{bob_savings}?balance=true&transactions=true"),
        None,
    )
    .await;
    assert_eq!(body["balance"], "50.00");
    let transfers = body["transactions"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|tx| tx["kind"] == "TRANSFER")
        .count();
    assert_eq!(transfers, 1);
}

#[tokio::test]
async fn test_transfer_validation() {
    let app = app();
    let account = open_account(&app, "alice", "100.00").await;

    // Same account
    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/accounts/transfer",
        Some(json!({
            "source_account": account,
            "destination_account": account,
            "amount": "10.00"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_code"], "same_account_transfer");

    // Unknown destination
    let (status, _) = send(
        &app,
        "POST",
        "/api/v1/accounts/transfer",
        Some(json!({
            "source_account": account,
            "destination_account": "savings_zzzzz",
            "amount": "10.00"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Insufficient funds
    let bob_savings = open_account(&app, "bob", "0.00").await;
    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/accounts/transfer",
        Some(json!({
            "source_account": bob_savings,
            "destination_account": account,
            "amount": "10.00"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error_code"], "insufficient_funds");
}

#[tokio::test]
async fn test_transfer_currency_mismatch() {
    let app = app();
    let usd_account = open_account(&app, "alice", "100.00").await;
    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/accounts/alice",
        Some(json!({
            "account_type": "SAVINGS",
            "currency": "EUR",
            "initial_deposit": "0.00"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let eur_account = body["account_name"].as_str().unwrap().to_string();

    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/accounts/transfer",
        Some(json!({
            "source_account": usd_account,
            "destination_account": eur_account,
            "amount": "10.00"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_code"], "currency_mismatch");
}

#[tokio::test]
async fn test_delete_account_with_balance_conflicts() {
    let app = app();
    let account = open_account(&app, "alice", "50.00").await;

    let (status, body) = send(
        &app,
        "DELETE",
        &format!("/api/v1/accounts/alice/{account}"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error_code"], "non_zero_balance");

    // Still present afterward
    let (status, _) = send(
        &app,
        "GET",
        &format!("/api/v1/accounts/history/{account}?balance=true"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_delete_user_with_accounts_conflicts() {
    let app = app();
    open_account(&app, "alice", "0.00").await;

    let (status, body) = send(&app, "DELETE", "/api/v1/users/alice", None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error_code"], "user_has_accounts");
}

#[tokio::test]
async fn test_history_flags_are_optional() {
    let app = app();
    let account = open_account(&app, "alice", "10.00").await;

    let (status, body) = send(
        &app,
        "GET",
        &format!("/api/v1/accounts/history/{account}"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["account_name"], account.as_str());
    assert!(body.get("balance").is_none());
    assert!(body.get("transactions").is_none());

    let (status, _) = send(&app, "GET", "/api/v1/accounts/history/checking_zzzzz", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_transaction_log_endpoint() {
    let app = app();
    let a = open_account(&app, "alice", "100.00").await;
    let b = open_account(&app, "bob", "100.00").await;

    send(
        &app,
        "POST",
        "/api/v1/accounts/transfer",
        Some(json!({
            "source_account": a,
            "destination_account": b,
            "amount": "25.00"
        })),
    )
    .await;

    let (status, body) = send(&app, "GET", "/api/v1/transactions", None).await;
    assert_eq!(status, StatusCode::OK);
    // Two initial deposits plus the transfer
    assert_eq!(body["count"], 3);
}

#[tokio::test]
async fn test_account_metadata_update() {
    let app = app();
    let account = open_account(&app, "alice", "0.00").await;

    let (status, body) = send(
        &app,
        "PUT",
        &format!("/api/v1/accounts/alice/{account}"),
        Some(json!({ "status": "FROZEN" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "FROZEN");
    // Name and currency untouched
    assert_eq!(body["account_name"], account.as_str());
    assert_eq!(body["currency"], "USD");
}
