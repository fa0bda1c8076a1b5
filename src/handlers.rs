// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! JSON handlers for the `/api` routes. Each handler locks the shared
//! connection, calls into `commands::*`, and maps failures through [`ApiError`].

use std::sync::Arc;

use axum::Json;
use axum::body::Bytes;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use rusqlite::Connection;
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::sync::Mutex;

use crate::commands::{
    accounts, alerts, bills, budgets, categorize, debts, goals, investments, recurring, reports,
    transactions,
};
use crate::error::FinanceError;
use crate::models::*;
use crate::utils::{month_of, today};

pub struct AppState {
    pub conn: Mutex<Connection>,
}

impl AppState {
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }
}

pub type Shared = State<Arc<AppState>>;

/// Any failure surfaced by a handler. Domain errors keep their status; bad
/// request bodies and query strings are 400; everything else is a 500.
#[derive(Debug)]
pub struct ApiError(anyhow::Error);

impl<E: Into<anyhow::Error>> From<E> for ApiError {
    fn from(e: E) -> Self {
        ApiError(e.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = if let Some(e) = self.0.downcast_ref::<FinanceError>() {
            let status = match e {
                FinanceError::NotFound(_) => StatusCode::NOT_FOUND,
                FinanceError::Conflict(_) | FinanceError::Validation(_) => StatusCode::BAD_REQUEST,
            };
            (status, e.to_string())
        } else if self.0.is::<JsonRejection>() || self.0.is::<QueryRejection>() {
            (StatusCode::BAD_REQUEST, self.0.to_string())
        } else {
            tracing::error!(error = ?self.0, "request failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            )
        };
        (status, Json(json!({ "detail": detail }))).into_response()
    }
}

type ApiResult<T> = Result<Json<T>, ApiError>;

fn message(text: &str) -> Json<Value> {
    Json(json!({ "message": text }))
}

pub async fn root() -> Json<Value> {
    Json(json!({
        "message": "Fintrack API - personal finance management",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

// ---------------------------------------------------------------- accounts

pub async fn list_accounts(State(state): Shared) -> ApiResult<Vec<Account>> {
    let conn = state.conn.lock().await;
    Ok(Json(accounts::list(&conn)?))
}

pub async fn create_account(
    State(state): Shared,
    body: Result<Json<NewAccount>, JsonRejection>,
) -> ApiResult<Account> {
    let Json(input) = body?;
    let conn = state.conn.lock().await;
    Ok(Json(accounts::create(&conn, input)?))
}

pub async fn update_account(
    State(state): Shared,
    Path(id): Path<String>,
    body: Result<Json<AccountUpdate>, JsonRejection>,
) -> ApiResult<Account> {
    let Json(patch) = body?;
    let conn = state.conn.lock().await;
    Ok(Json(accounts::update(&conn, &id, patch)?))
}

pub async fn delete_account(State(state): Shared, Path(id): Path<String>) -> ApiResult<Value> {
    let conn = state.conn.lock().await;
    accounts::delete(&conn, &id)?;
    Ok(message("Account deleted successfully"))
}

// ------------------------------------------------------------ transactions

pub async fn list_transactions(
    State(state): Shared,
    q: Result<Query<transactions::TransactionQuery>, QueryRejection>,
) -> ApiResult<Vec<Transaction>> {
    let Query(q) = q?;
    let conn = state.conn.lock().await;
    Ok(Json(transactions::query(&conn, &q)?))
}

pub async fn create_transaction(
    State(state): Shared,
    body: Result<Json<NewTransaction>, JsonRejection>,
) -> ApiResult<Transaction> {
    let Json(input) = body?;
    let mut conn = state.conn.lock().await;
    Ok(Json(transactions::create(&mut conn, input)?))
}

pub async fn get_transaction(
    State(state): Shared,
    Path(id): Path<String>,
) -> ApiResult<Transaction> {
    let conn = state.conn.lock().await;
    Ok(Json(transactions::get(&conn, &id)?))
}

pub async fn update_transaction(
    State(state): Shared,
    Path(id): Path<String>,
    body: Result<Json<TransactionUpdate>, JsonRejection>,
) -> ApiResult<Transaction> {
    let Json(patch) = body?;
    let mut conn = state.conn.lock().await;
    Ok(Json(transactions::update(&mut conn, &id, patch)?))
}

pub async fn delete_transaction(
    State(state): Shared,
    Path(id): Path<String>,
) -> ApiResult<Value> {
    let mut conn = state.conn.lock().await;
    transactions::delete(&mut conn, &id)?;
    Ok(message("Transaction deleted successfully"))
}

pub async fn transaction_stats(
    State(state): Shared,
) -> ApiResult<transactions::TransactionStats> {
    let conn = state.conn.lock().await;
    Ok(Json(transactions::stats(&conn)?))
}

// ------------------------------------------------------------- instruments

pub async fn list_stocks(State(state): Shared) -> ApiResult<Vec<Stock>> {
    let conn = state.conn.lock().await;
    Ok(Json(investments::list_stocks(&conn)?))
}

pub async fn create_stock(
    State(state): Shared,
    body: Result<Json<NewStock>, JsonRejection>,
) -> ApiResult<Stock> {
    let Json(input) = body?;
    let conn = state.conn.lock().await;
    Ok(Json(investments::create_stock(&conn, input)?))
}

pub async fn update_stock(
    State(state): Shared,
    Path(id): Path<String>,
    body: Result<Json<StockUpdate>, JsonRejection>,
) -> ApiResult<Stock> {
    let Json(patch) = body?;
    let conn = state.conn.lock().await;
    Ok(Json(investments::update_stock(&conn, &id, patch)?))
}

pub async fn delete_stock(State(state): Shared, Path(id): Path<String>) -> ApiResult<Value> {
    let conn = state.conn.lock().await;
    investments::delete_stock(&conn, &id)?;
    Ok(message("Stock deleted successfully"))
}

pub async fn list_deposits(State(state): Shared) -> ApiResult<Vec<Deposit>> {
    let conn = state.conn.lock().await;
    Ok(Json(investments::list_deposits(&conn)?))
}

pub async fn create_deposit(
    State(state): Shared,
    body: Result<Json<NewDeposit>, JsonRejection>,
) -> ApiResult<Deposit> {
    let Json(input) = body?;
    let conn = state.conn.lock().await;
    Ok(Json(investments::create_deposit(&conn, input)?))
}

pub async fn update_deposit(
    State(state): Shared,
    Path(id): Path<String>,
    body: Result<Json<DepositUpdate>, JsonRejection>,
) -> ApiResult<Deposit> {
    let Json(patch) = body?;
    let conn = state.conn.lock().await;
    Ok(Json(investments::update_deposit(&conn, &id, patch)?))
}

pub async fn delete_deposit(State(state): Shared, Path(id): Path<String>) -> ApiResult<Value> {
    let conn = state.conn.lock().await;
    investments::delete_deposit(&conn, &id)?;
    Ok(message("Deposit deleted successfully"))
}

pub async fn list_gold(State(state): Shared) -> ApiResult<Vec<Gold>> {
    let conn = state.conn.lock().await;
    Ok(Json(investments::list_gold(&conn)?))
}

pub async fn create_gold(
    State(state): Shared,
    body: Result<Json<NewGold>, JsonRejection>,
) -> ApiResult<Gold> {
    let Json(input) = body?;
    let conn = state.conn.lock().await;
    Ok(Json(investments::create_gold(&conn, input)?))
}

pub async fn update_gold(
    State(state): Shared,
    Path(id): Path<String>,
    body: Result<Json<GoldUpdate>, JsonRejection>,
) -> ApiResult<Gold> {
    let Json(patch) = body?;
    let conn = state.conn.lock().await;
    Ok(Json(investments::update_gold(&conn, &id, patch)?))
}

pub async fn delete_gold(State(state): Shared, Path(id): Path<String>) -> ApiResult<Value> {
    let conn = state.conn.lock().await;
    investments::delete_gold(&conn, &id)?;
    Ok(message("Gold deleted successfully"))
}

pub async fn list_mutual_funds(State(state): Shared) -> ApiResult<Vec<MutualFund>> {
    let conn = state.conn.lock().await;
    Ok(Json(investments::list_mutual_funds(&conn)?))
}

pub async fn create_mutual_fund(
    State(state): Shared,
    body: Result<Json<NewMutualFund>, JsonRejection>,
) -> ApiResult<MutualFund> {
    let Json(input) = body?;
    let conn = state.conn.lock().await;
    Ok(Json(investments::create_mutual_fund(&conn, input)?))
}

pub async fn update_mutual_fund(
    State(state): Shared,
    Path(id): Path<String>,
    body: Result<Json<MutualFundUpdate>, JsonRejection>,
) -> ApiResult<MutualFund> {
    let Json(patch) = body?;
    let conn = state.conn.lock().await;
    Ok(Json(investments::update_mutual_fund(&conn, &id, patch)?))
}

pub async fn delete_mutual_fund(
    State(state): Shared,
    Path(id): Path<String>,
) -> ApiResult<Value> {
    let conn = state.conn.lock().await;
    investments::delete_mutual_fund(&conn, &id)?;
    Ok(message("Mutual fund deleted successfully"))
}

pub async fn legacy_investments(
    State(state): Shared,
) -> ApiResult<investments::LegacyInvestments> {
    let conn = state.conn.lock().await;
    Ok(Json(investments::totals(&conn)?.into()))
}

/// Old clients post a totals object here; nothing is stored.
pub async fn legacy_investments_post(body: Result<Json<Value>, JsonRejection>) -> ApiResult<Value> {
    let Json(data) = body?;
    Ok(Json(json!({
        "message": "Please use detailed investment endpoints",
        "data": data,
    })))
}

pub async fn detailed_investments(
    State(state): Shared,
) -> ApiResult<investments::DetailedInvestments> {
    let conn = state.conn.lock().await;
    Ok(Json(investments::DetailedInvestments::load(&conn)?))
}

pub async fn create_detailed(
    State(state): Shared,
    Path(kind): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Value> {
    let kind: InstrumentKind = kind.parse()?;
    let Json(data) = body?;
    let conn = state.conn.lock().await;
    let id = investments::create_detailed(&conn, kind, data)?;
    Ok(Json(json!({ "message": "Investment added", "id": id })))
}

pub async fn update_detailed(
    State(state): Shared,
    Path((kind, id)): Path<(String, String)>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Value> {
    let kind: InstrumentKind = kind.parse()?;
    let Json(data) = body?;
    let conn = state.conn.lock().await;
    investments::update_detailed(&conn, kind, &id, data)?;
    Ok(message("Investment updated"))
}

pub async fn delete_detailed(
    State(state): Shared,
    Path((kind, id)): Path<(String, String)>,
) -> ApiResult<Value> {
    let kind: InstrumentKind = kind.parse()?;
    let conn = state.conn.lock().await;
    investments::delete_detailed(&conn, kind, &id)?;
    Ok(message("Investment deleted"))
}

// ------------------------------------------------------------------- debts

pub async fn list_debts(State(state): Shared) -> ApiResult<Vec<Debt>> {
    let conn = state.conn.lock().await;
    Ok(Json(debts::list(&conn)?))
}

pub async fn create_debt(
    State(state): Shared,
    body: Result<Json<NewDebt>, JsonRejection>,
) -> ApiResult<Debt> {
    let Json(input) = body?;
    let conn = state.conn.lock().await;
    Ok(Json(debts::create(&conn, input)?))
}

pub async fn update_debt(
    State(state): Shared,
    Path(id): Path<String>,
    body: Result<Json<DebtUpdate>, JsonRejection>,
) -> ApiResult<Debt> {
    let Json(patch) = body?;
    let conn = state.conn.lock().await;
    Ok(Json(debts::update(&conn, &id, patch)?))
}

pub async fn delete_debt(State(state): Shared, Path(id): Path<String>) -> ApiResult<Value> {
    let conn = state.conn.lock().await;
    debts::delete(&conn, &id)?;
    Ok(message("Debt deleted successfully"))
}

pub async fn pay_debt(
    State(state): Shared,
    Path(id): Path<String>,
    body: Result<Json<DebtPaymentRequest>, JsonRejection>,
) -> ApiResult<debts::DebtPaymentOutcome> {
    let Json(req) = body?;
    let mut conn = state.conn.lock().await;
    Ok(Json(debts::pay(&mut conn, &id, req)?))
}

// ------------------------------------------------------------------- bills

pub async fn list_bills(State(state): Shared) -> ApiResult<Vec<Bill>> {
    let conn = state.conn.lock().await;
    Ok(Json(bills::list(&conn)?))
}

pub async fn create_bill(
    State(state): Shared,
    body: Result<Json<NewBill>, JsonRejection>,
) -> ApiResult<Bill> {
    let Json(input) = body?;
    let conn = state.conn.lock().await;
    Ok(Json(bills::create(&conn, input)?))
}

pub async fn update_bill(
    State(state): Shared,
    Path(id): Path<String>,
    body: Result<Json<BillUpdate>, JsonRejection>,
) -> ApiResult<Bill> {
    let Json(patch) = body?;
    let conn = state.conn.lock().await;
    Ok(Json(bills::update(&conn, &id, patch)?))
}

pub async fn delete_bill(State(state): Shared, Path(id): Path<String>) -> ApiResult<Value> {
    let conn = state.conn.lock().await;
    bills::delete(&conn, &id)?;
    Ok(message("Bill deleted successfully"))
}

pub async fn list_bill_payments(
    State(state): Shared,
    q: Result<Query<bills::PaymentFilter>, QueryRejection>,
) -> ApiResult<Vec<BillPayment>> {
    let Query(filter) = q?;
    let conn = state.conn.lock().await;
    Ok(Json(bills::list_payments(&conn, &filter)?))
}

pub async fn create_bill_payment(
    State(state): Shared,
    body: Result<Json<NewBillPayment>, JsonRejection>,
) -> ApiResult<BillPayment> {
    let Json(input) = body?;
    let mut conn = state.conn.lock().await;
    Ok(Json(bills::pay(&mut conn, input)?))
}

// --------------------------------------------------------------- recurring

pub async fn list_recurring(State(state): Shared) -> ApiResult<Vec<RecurringTransaction>> {
    let conn = state.conn.lock().await;
    Ok(Json(recurring::list_merged(&conn, today())?))
}

pub async fn create_recurring(
    State(state): Shared,
    body: Result<Json<NewRecurringTransaction>, JsonRejection>,
) -> ApiResult<RecurringTransaction> {
    let Json(input) = body?;
    let conn = state.conn.lock().await;
    Ok(Json(recurring::create(&conn, input, today())?))
}

pub async fn update_recurring(
    State(state): Shared,
    Path(id): Path<String>,
    body: Result<Json<RecurringTransactionUpdate>, JsonRejection>,
) -> ApiResult<RecurringTransaction> {
    let Json(patch) = body?;
    let conn = state.conn.lock().await;
    Ok(Json(recurring::update(&conn, &id, patch, today())?))
}

pub async fn delete_recurring(State(state): Shared, Path(id): Path<String>) -> ApiResult<Value> {
    let conn = state.conn.lock().await;
    recurring::delete(&conn, &id)?;
    Ok(message("Deleted successfully"))
}

/// The body is optional; without one the current month is paid.
fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(|mime| {
            let mime = mime.trim();
            mime == "application/json" || mime.ends_with("+json")
        })
        .unwrap_or(false)
}

/// The body is optional; when present it must be a well-formed JSON request.
pub async fn pay_recurring(
    State(state): Shared,
    Path(id): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<recurring::PayOutcome> {
    let month_year = if body.iter().all(u8::is_ascii_whitespace) {
        None
    } else if !is_json(&headers) {
        return Err(FinanceError::validation(
            "Expected request with `Content-Type: application/json`",
        )
        .into());
    } else {
        let Json(req) = Json::<PayRequest>::from_bytes(&body)?;
        req.month_year
    };
    let mut conn = state.conn.lock().await;
    Ok(Json(recurring::pay(&mut conn, &id, month_year, today())?))
}

pub async fn generate_recurring(
    State(state): Shared,
    Path(id): Path<String>,
) -> ApiResult<recurring::PayOutcome> {
    let today = today();
    let mut conn = state.conn.lock().await;
    Ok(Json(recurring::pay(&mut conn, &id, Some(month_of(today)), today)?))
}

#[derive(Debug, Default, Deserialize)]
pub struct MonthFilter {
    pub month_year: Option<String>,
}

pub async fn list_recurring_payments(
    State(state): Shared,
    q: Result<Query<MonthFilter>, QueryRejection>,
) -> ApiResult<Vec<RecurringPayment>> {
    let Query(f) = q?;
    let conn = state.conn.lock().await;
    Ok(Json(recurring::list_payments(
        &conn,
        f.month_year.as_deref().filter(|m| !m.is_empty()),
    )?))
}

// ------------------------------------------------------------------- goals

pub async fn list_goals(State(state): Shared) -> ApiResult<Vec<FinancialGoal>> {
    let conn = state.conn.lock().await;
    Ok(Json(goals::list(&conn)?))
}

pub async fn create_goal(
    State(state): Shared,
    body: Result<Json<NewGoal>, JsonRejection>,
) -> ApiResult<FinancialGoal> {
    let Json(input) = body?;
    let conn = state.conn.lock().await;
    Ok(Json(goals::create(&conn, input)?))
}

pub async fn update_goal(
    State(state): Shared,
    Path(id): Path<String>,
    body: Result<Json<GoalUpdate>, JsonRejection>,
) -> ApiResult<FinancialGoal> {
    let Json(patch) = body?;
    let conn = state.conn.lock().await;
    Ok(Json(goals::update(&conn, &id, patch)?))
}

pub async fn delete_goal(State(state): Shared, Path(id): Path<String>) -> ApiResult<Value> {
    let conn = state.conn.lock().await;
    goals::delete(&conn, &id)?;
    Ok(message("Goal deleted successfully"))
}

pub async fn contribute_goal(
    State(state): Shared,
    Path(id): Path<String>,
    body: Result<Json<NewContribution>, JsonRejection>,
) -> ApiResult<goals::ContributionOutcome> {
    let Json(input) = body?;
    let mut conn = state.conn.lock().await;
    Ok(Json(goals::contribute(&mut conn, &id, input)?))
}

pub async fn goal_contributions(
    State(state): Shared,
    Path(id): Path<String>,
) -> ApiResult<Vec<GoalContribution>> {
    let conn = state.conn.lock().await;
    Ok(Json(goals::contributions(&conn, &id)?))
}

// ----------------------------------------------------------------- budgets

pub async fn list_budgets(
    State(state): Shared,
    q: Result<Query<MonthFilter>, QueryRejection>,
) -> ApiResult<Vec<Budget>> {
    let Query(f) = q?;
    let conn = state.conn.lock().await;
    Ok(Json(budgets::list(
        &conn,
        f.month_year.as_deref().filter(|m| !m.is_empty()),
    )?))
}

pub async fn create_budget(
    State(state): Shared,
    body: Result<Json<NewBudget>, JsonRejection>,
) -> ApiResult<Budget> {
    let Json(input) = body?;
    let conn = state.conn.lock().await;
    Ok(Json(budgets::create(&conn, input)?))
}

pub async fn update_budget(
    State(state): Shared,
    Path(id): Path<String>,
    body: Result<Json<BudgetUpdate>, JsonRejection>,
) -> ApiResult<Budget> {
    let Json(patch) = body?;
    let conn = state.conn.lock().await;
    Ok(Json(budgets::update(&conn, &id, patch)?))
}

pub async fn delete_budget(State(state): Shared, Path(id): Path<String>) -> ApiResult<Value> {
    let conn = state.conn.lock().await;
    budgets::delete(&conn, &id)?;
    Ok(message("Budget deleted successfully"))
}

pub async fn budget_summary(
    State(state): Shared,
    q: Result<Query<MonthFilter>, QueryRejection>,
) -> ApiResult<budgets::BudgetSummary> {
    let Query(f) = q?;
    let month = match f.month_year.filter(|m| !m.trim().is_empty()) {
        Some(m) => crate::utils::parse_month(&m)?,
        None => month_of(today()),
    };
    let conn = state.conn.lock().await;
    Ok(Json(budgets::summary(&conn, &month)?))
}

// --------------------------------------------------------- derived reports

#[derive(Debug, Deserialize)]
pub struct CategorizeParams {
    pub description: String,
}

pub async fn smart_categorize(
    q: Result<Query<CategorizeParams>, QueryRejection>,
) -> ApiResult<categorize::Suggestion> {
    let Query(p) = q?;
    Ok(Json(categorize::suggest(&p.description)))
}

pub async fn list_alerts(State(state): Shared) -> ApiResult<Vec<alerts::Alert>> {
    let conn = state.conn.lock().await;
    Ok(Json(alerts::evaluate(&conn, today())?))
}

pub async fn dashboard(State(state): Shared) -> ApiResult<reports::Dashboard> {
    let conn = state.conn.lock().await;
    Ok(Json(reports::dashboard(&conn, today())?))
}

pub async fn analytics_monthly(
    State(state): Shared,
) -> ApiResult<std::collections::BTreeMap<String, reports::MonthFlow>> {
    let conn = state.conn.lock().await;
    Ok(Json(reports::monthly(&conn)?))
}

pub async fn analytics_category(
    State(state): Shared,
) -> ApiResult<std::collections::BTreeMap<String, rust_decimal::Decimal>> {
    let conn = state.conn.lock().await;
    Ok(Json(reports::by_category(&conn)?))
}

pub async fn analytics_balance_sheet(State(state): Shared) -> ApiResult<reports::BalanceSheet> {
    let conn = state.conn.lock().await;
    Ok(Json(reports::balance_sheet(&conn)?))
}

pub async fn analytics_ratios(State(state): Shared) -> ApiResult<reports::Ratios> {
    let conn = state.conn.lock().await;
    Ok(Json(reports::ratios(&conn)?))
}
