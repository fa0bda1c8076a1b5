// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use fintrack::commands::{budgets, transactions};
use fintrack::db;
use fintrack::error::FinanceError;
use fintrack::models::{BudgetUpdate, Category, NewBudget};
use rusqlite::Connection;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::json;

fn setup() -> Connection {
    db::open_in_memory().unwrap()
}

fn budget(category: &str, amount: i64, month: &str) -> NewBudget {
    serde_json::from_value(json!({ "category": category, "amount": amount, "month_year": month }))
        .unwrap()
}

fn spend(conn: &mut Connection, date: &str, category: &str, amount: i64) {
    transactions::create(
        conn,
        serde_json::from_value(json!({
            "date": date,
            "description": "spend",
            "amount": amount,
            "type": "expense",
            "category": category,
            "account": "Cash",
        }))
        .unwrap(),
    )
    .unwrap();
}

#[test]
fn spent_counts_only_the_budget_month_and_category() {
    let mut conn = setup();
    let b = budgets::create(&conn, budget("Food", 1000, "2025-03")).unwrap();
    assert_eq!(b.spent, Decimal::ZERO);

    spend(&mut conn, "2025-03-01", "Food", 100);
    spend(&mut conn, "2025-03-31", "Food", 50);
    spend(&mut conn, "2025-02-28", "Food", 999);
    spend(&mut conn, "2025-04-01", "Food", 999);
    spend(&mut conn, "2025-03-15", "Transport", 999);
    transactions::create(
        &mut conn,
        serde_json::from_value(json!({
            "date": "2025-03-10",
            "description": "Refund",
            "amount": 999,
            "type": "income",
            "category": "Food",
            "account": "Cash",
        }))
        .unwrap(),
    )
    .unwrap();

    assert_eq!(budgets::get(&conn, &b.id).unwrap().spent, dec!(150));
    assert_eq!(
        budgets::budget_spent(&conn, Category::Food, "2025-03").unwrap(),
        dec!(150)
    );
}

#[test]
fn spent_is_recomputed_after_each_new_expense() {
    let mut conn = setup();
    budgets::create(&conn, budget("Bills", 500, "2025-12")).unwrap();
    spend(&mut conn, "2025-12-20", "Bills", 120);
    let before = budgets::list(&conn, Some("2025-12")).unwrap()[0].spent;
    spend(&mut conn, "2025-12-21", "Bills", 80);
    let after = budgets::list(&conn, Some("2025-12")).unwrap()[0].spent;
    assert_eq!(after - before, dec!(80));
}

#[test]
fn duplicate_category_month_is_a_conflict() {
    let conn = setup();
    budgets::create(&conn, budget("Food", 100, "2025-05")).unwrap();
    let err = budgets::create(&conn, budget("Food", 200, "2025-05")).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<FinanceError>(),
        Some(FinanceError::Conflict(_))
    ));
    // Another month is fine.
    let other = budgets::create(&conn, budget("Food", 200, "2025-06")).unwrap();

    let patch = BudgetUpdate {
        month_year: Some("2025-05".into()),
        ..Default::default()
    };
    let err = budgets::update(&conn, &other.id, patch).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<FinanceError>(),
        Some(FinanceError::Conflict(_))
    ));
}

#[test]
fn malformed_month_is_rejected() {
    let conn = setup();
    let err = budgets::create(&conn, budget("Food", 100, "2025-13")).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<FinanceError>(),
        Some(FinanceError::Validation(_))
    ));
}

#[test]
fn summary_counts_over_and_near_limit() {
    let mut conn = setup();
    budgets::create(&conn, budget("Food", 100, "2025-07")).unwrap();
    budgets::create(&conn, budget("Transport", 100, "2025-07")).unwrap();
    budgets::create(&conn, budget("Shopping", 200, "2025-07")).unwrap();
    spend(&mut conn, "2025-07-03", "Food", 150);
    spend(&mut conn, "2025-07-04", "Transport", 80);
    spend(&mut conn, "2025-07-05", "Shopping", 10);

    let s = budgets::summary(&conn, "2025-07").unwrap();
    assert_eq!(s.budgets_count, 3);
    assert_eq!(s.total_budget, dec!(400));
    assert_eq!(s.total_spent, dec!(240));
    assert_eq!(s.remaining, dec!(160));
    assert_eq!(s.utilization_percentage, dec!(60));
    assert_eq!(s.over_budget_count, 1);
    assert_eq!(s.near_limit_count, 1);
}

#[test]
fn empty_month_summary_has_zero_utilization() {
    let conn = setup();
    let s = budgets::summary(&conn, "2030-01").unwrap();
    assert_eq!(s.budgets_count, 0);
    assert_eq!(s.utilization_percentage, Decimal::ZERO);
}
