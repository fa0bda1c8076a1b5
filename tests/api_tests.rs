// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use fintrack::handlers::AppState;
use fintrack::{db, server};
use serde_json::{Value, json};
use tower::ServiceExt;

fn app() -> Router {
    let state = Arc::new(AppState::new(db::open_in_memory().unwrap()));
    server::router(state, server::cors_layer(None))
}

async fn call(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut req = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(v) => {
            req = req.header("content-type", "application/json");
            Body::from(v.to_string())
        }
        None => Body::empty(),
    };
    let res = app.clone().oneshot(req.body(body).unwrap()).await.unwrap();
    let status = res.status();
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
    let v = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, v)
}

#[tokio::test]
async fn banner_is_served_under_api() {
    let app = app();
    let (status, v) = call(&app, "GET", "/api", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(v["message"].as_str().unwrap().contains("Fintrack"));
}

#[tokio::test]
async fn cash_expense_round_trip() {
    let app = app();
    let (status, acct) = call(
        &app,
        "POST",
        "/api/accounts",
        Some(json!({ "name": "Cash", "type": "Cash", "balance": 0 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(acct["currency"], "IDR");

    let (status, tx) = call(
        &app,
        "POST",
        "/api/transactions",
        Some(json!({
            "description": "Nasi goreng",
            "amount": 50000,
            "type": "expense",
            "category": "Food",
            "account": "Cash",
            "date": "2025-01-15T08:30:00Z",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(tx["date"], "2025-01-15");
    assert_eq!(tx["payment_method"], "Cash");

    let (_, accounts) = call(&app, "GET", "/api/accounts", None).await;
    assert_eq!(accounts[0]["balance"], -50000.0);

    let (_, stats) = call(&app, "GET", "/api/transactions/stats", None).await;
    assert_eq!(stats["total_expense"], 50000.0);
    assert_eq!(stats["net"], -50000.0);

    let (_, found) = call(
        &app,
        "GET",
        "/api/transactions?search=NASI&type=expense&sort_by=amount&sort_order=asc&limit=5",
        None,
    )
    .await;
    assert_eq!(found.as_array().unwrap().len(), 1);

    let id = tx["id"].as_str().unwrap();
    let (status, msg) = call(&app, "DELETE", &format!("/api/transactions/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(msg["message"], "Transaction deleted successfully");
    let (_, accounts) = call(&app, "GET", "/api/accounts", None).await;
    assert_eq!(accounts[0]["balance"], 0.0);
}

#[tokio::test]
async fn errors_carry_detail_and_status() {
    let app = app();

    let (status, v) = call(&app, "GET", "/api/transactions/missing", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(v["detail"], "Transaction not found");

    call(
        &app,
        "POST",
        "/api/accounts",
        Some(json!({ "name": "BCA", "type": "Bank" })),
    )
    .await;
    let (status, v) = call(
        &app,
        "POST",
        "/api/accounts",
        Some(json!({ "name": "bca", "type": "Bank" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(v["detail"], "Account name already exists");

    let (status, v) = call(
        &app,
        "POST",
        "/api/transactions",
        Some(json!({ "description": "x", "amount": 1, "type": "expense", "category": "Snacks", "account": "BCA" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(v["detail"].is_string());

    let (status, _) = call(&app, "GET", "/api/transactions?sort_by=payee", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = call(
        &app,
        "POST",
        "/api/investments/detailed/bonds",
        Some(json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn recurring_pay_and_generate_share_one_month_guard() {
    let app = app();
    let (_, item) = call(
        &app,
        "POST",
        "/api/recurring-bills",
        Some(json!({
            "name": "Spotify",
            "amount": 55000,
            "type": "expense",
            "category": "Subscription",
            "account": "Cash",
            "day_of_month": 3,
        })),
    )
    .await;
    let id = item["id"].as_str().unwrap().to_string();

    let (status, paid) = call(
        &app,
        "POST",
        &format!("/api/recurring-bills/{}/pay", id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(paid["message"], "Paid successfully");

    let (status, v) = call(
        &app,
        "POST",
        &format!("/api/recurring-transactions/{}/generate", id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(v["detail"], "Already paid for this month");

    let (status, _) = call(
        &app,
        "POST",
        &format!("/api/recurring-bills/{}/pay", id),
        Some(json!({ "month_year": "2020-01" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, payments) = call(&app, "GET", "/api/recurring-payments?month_year=2020-01", None).await;
    assert_eq!(payments.as_array().unwrap().len(), 1);
    let (_, listed) = call(&app, "GET", "/api/recurring-transactions", None).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);
}

async fn call_raw(app: &Router, uri: &str, content_type: Option<&str>, body: &str) -> StatusCode {
    let mut req = Request::builder().method("POST").uri(uri);
    if let Some(ct) = content_type {
        req = req.header("content-type", ct);
    }
    let res = app
        .clone()
        .oneshot(req.body(Body::from(body.to_string())).unwrap())
        .await
        .unwrap();
    res.status()
}

#[tokio::test]
async fn recurring_pay_rejects_unreadable_bodies() {
    let app = app();
    let (_, item) = call(
        &app,
        "POST",
        "/api/recurring-bills",
        Some(json!({
            "name": "Gym",
            "amount": 300000,
            "type": "expense",
            "category": "Health",
            "account": "Cash",
            "day_of_month": 10,
        })),
    )
    .await;
    let uri = format!("/api/recurring-bills/{}/pay", item["id"].as_str().unwrap());

    let json_ct = Some("application/json");
    assert_eq!(call_raw(&app, &uri, json_ct, "{not json").await, StatusCode::BAD_REQUEST);
    assert_eq!(
        call_raw(&app, &uri, json_ct, r#"{"month_year": 202001}"#).await,
        StatusCode::BAD_REQUEST
    );
    assert_eq!(
        call_raw(&app, &uri, None, r#"{"month_year": "2020-01"}"#).await,
        StatusCode::BAD_REQUEST
    );

    let (_, payments) = call(&app, "GET", "/api/recurring-payments", None).await;
    assert!(payments.as_array().unwrap().is_empty());

    assert_eq!(
        call_raw(&app, &uri, json_ct, r#"{"month_year": "2020-01"}"#).await,
        StatusCode::OK
    );
    let (_, payments) = call(&app, "GET", "/api/recurring-payments", None).await;
    assert_eq!(payments[0]["month_year"], "2020-01");
}

#[tokio::test]
async fn budget_list_rejects_malformed_month() {
    let app = app();
    let (status, v) = call(&app, "GET", "/api/budgets?month_year=garbage", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(v["detail"].as_str().unwrap().contains("garbage"));
    let (status, _) = call(&app, "GET", "/api/budgets?month_year=", None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn goals_budgets_and_reports_respond() {
    let app = app();
    let (_, g) = call(
        &app,
        "POST",
        "/api/goals",
        Some(json!({
            "name": "Laptop",
            "target_amount": 100,
            "target_date": "2026-06-30",
            "category": "Gadget",
        })),
    )
    .await;
    let id = g["id"].as_str().unwrap();
    let (status, out) = call(
        &app,
        "POST",
        &format!("/api/goals/{}/contribute", id),
        Some(json!({ "amount": 60 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(out["goal"]["current_amount"], 60.0);

    let (_, alerts) = call(&app, "GET", "/api/alerts", None).await;
    assert_eq!(alerts[0]["type"], "goal_milestone");
    assert_eq!(alerts[0]["goal_name"], "Laptop");

    let (status, _) = call(
        &app,
        "POST",
        "/api/budgets",
        Some(json!({ "category": "Food", "amount": 500, "month_year": "2025-04" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let (_, summary) = call(&app, "GET", "/api/budgets/summary?month_year=2025-04", None).await;
    assert_eq!(summary["budgets_count"], 1);

    for path in [
        "/api/dashboard",
        "/api/investments",
        "/api/investments/detailed",
        "/api/analytics/monthly",
        "/api/analytics/category",
        "/api/analytics/balance-sheet",
        "/api/analytics/ratios",
    ] {
        let (status, _) = call(&app, "GET", path, None).await;
        assert_eq!(status, StatusCode::OK, "{}", path);
    }

    let (status, s) = call(&app, "POST", "/api/smart-categorize?description=Bayar%20PLN", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(s["category"], "Bills");
}
