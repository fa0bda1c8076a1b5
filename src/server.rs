// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use axum::http::HeaderValue;
use axum::routing::{get, post, put};
use rusqlite::Connection;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers::{self as h, AppState};

pub const CORS_ENV: &str = "FINTRACK_CORS_ORIGINS";

/// Comma-separated origins; unset, empty or `*` allows any origin.
pub fn cors_layer(origins: Option<&str>) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    let list: Vec<HeaderValue> = match origins.map(str::trim) {
        None | Some("") | Some("*") => return layer.allow_origin(Any),
        Some(raw) => raw
            .split(',')
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .filter_map(|o| match HeaderValue::from_str(o) {
                Ok(v) => Some(v),
                Err(_) => {
                    tracing::warn!(origin = o, "ignoring unparsable CORS origin");
                    None
                }
            })
            .collect(),
    };
    layer.allow_origin(AllowOrigin::list(list))
}

fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(h::root))
        .route("/accounts", get(h::list_accounts).post(h::create_account))
        .route("/accounts/:id", put(h::update_account).delete(h::delete_account))
        .route(
            "/transactions",
            get(h::list_transactions).post(h::create_transaction),
        )
        .route("/transactions/stats", get(h::transaction_stats))
        .route(
            "/transactions/:id",
            get(h::get_transaction)
                .put(h::update_transaction)
                .delete(h::delete_transaction),
        )
        .route("/stocks", get(h::list_stocks).post(h::create_stock))
        .route("/stocks/:id", put(h::update_stock).delete(h::delete_stock))
        .route("/deposits", get(h::list_deposits).post(h::create_deposit))
        .route("/deposits/:id", put(h::update_deposit).delete(h::delete_deposit))
        .route("/gold", get(h::list_gold).post(h::create_gold))
        .route("/gold/:id", put(h::update_gold).delete(h::delete_gold))
        .route(
            "/mutual-funds",
            get(h::list_mutual_funds).post(h::create_mutual_fund),
        )
        .route(
            "/mutual-funds/:id",
            put(h::update_mutual_fund).delete(h::delete_mutual_fund),
        )
        .route(
            "/investments",
            get(h::legacy_investments).post(h::legacy_investments_post),
        )
        .route("/investments/detailed", get(h::detailed_investments))
        .route("/investments/detailed/:kind", post(h::create_detailed))
        .route(
            "/investments/detailed/:kind/:id",
            put(h::update_detailed).delete(h::delete_detailed),
        )
        .route("/debts", get(h::list_debts).post(h::create_debt))
        .route("/debts/:id", put(h::update_debt).delete(h::delete_debt))
        .route("/debts/:id/pay", post(h::pay_debt))
        .route("/bills", get(h::list_bills).post(h::create_bill))
        .route("/bills/:id", put(h::update_bill).delete(h::delete_bill))
        .route(
            "/bill-payments",
            get(h::list_bill_payments).post(h::create_bill_payment),
        )
        .merge(recurring_routes("/recurring-bills"))
        .merge(recurring_routes("/recurring-transactions"))
        .route(
            "/recurring-transactions/:id/generate",
            post(h::generate_recurring),
        )
        .route("/recurring-payments", get(h::list_recurring_payments))
        .route("/goals", get(h::list_goals).post(h::create_goal))
        .route("/goals/:id", put(h::update_goal).delete(h::delete_goal))
        .route("/goals/:id/contribute", post(h::contribute_goal))
        .route("/goals/:id/contributions", get(h::goal_contributions))
        .route("/budgets", get(h::list_budgets).post(h::create_budget))
        .route("/budgets/summary", get(h::budget_summary))
        .route("/budgets/:id", put(h::update_budget).delete(h::delete_budget))
        .route("/smart-categorize", post(h::smart_categorize))
        .route("/alerts", get(h::list_alerts))
        .route("/dashboard", get(h::dashboard))
        .route("/analytics/monthly", get(h::analytics_monthly))
        .route("/analytics/category", get(h::analytics_category))
        .route("/analytics/balance-sheet", get(h::analytics_balance_sheet))
        .route("/analytics/ratios", get(h::analytics_ratios))
}

fn recurring_routes(base: &str) -> Router<Arc<AppState>> {
    Router::new()
        .route(base, get(h::list_recurring).post(h::create_recurring))
        .route(
            &format!("{}/:id", base),
            put(h::update_recurring).delete(h::delete_recurring),
        )
        .route(&format!("{}/:id/pay", base), post(h::pay_recurring))
}

/// The full application: every route under `/api`, CORS and request tracing.
pub fn router(state: Arc<AppState>, cors: CorsLayer) -> Router {
    Router::new()
        .nest("/api", api_routes())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for ctrl-c");
    }
    tracing::info!("shutting down");
}

/// Serves until ctrl-c, then hands the connection back so it can be closed.
pub async fn serve(conn: Connection, addr: &str) -> Result<Connection> {
    let state = Arc::new(AppState::new(conn));
    let cors = cors_layer(std::env::var(CORS_ENV).ok().as_deref());
    let app = router(state.clone(), cors);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Bind {}", addr))?;
    tracing::info!(addr = %listener.local_addr()?, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    let state = Arc::try_unwrap(state)
        .map_err(|_| anyhow::anyhow!("server state still shared after shutdown"))?;
    Ok(state.conn.into_inner())
}
