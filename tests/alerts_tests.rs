// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{NaiveDate, Utc};
use fintrack::commands::alerts::{self, AlertKind, Severity};
use fintrack::commands::{bills, budgets, recurring, transactions};
use fintrack::db;
use fintrack::models::{Budget, BudgetPeriod, Category, FinancialGoal};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::json;

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn budget(amount: Decimal, spent: Decimal) -> Budget {
    Budget {
        id: "b1".into(),
        category: Category::Food,
        amount,
        period: BudgetPeriod::Monthly,
        month_year: "2025-01".into(),
        spent,
        is_active: true,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn goal(current: Decimal, achieved: bool) -> FinancialGoal {
    FinancialGoal {
        id: "g1".into(),
        name: "House".into(),
        target_amount: dec!(100),
        current_amount: current,
        target_date: day(2030, 1, 1),
        category: "Home".into(),
        is_achieved: achieved,
        notes: None,
        color: "#6366f1".into(),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

#[test]
fn budget_thresholds() {
    assert!(alerts::budget_alert(&budget(dec!(100), dec!(79.99))).is_none());

    let warn = alerts::budget_alert(&budget(dec!(100), dec!(80))).unwrap();
    assert_eq!(warn.kind, AlertKind::BudgetWarning);
    assert_eq!(warn.severity, Severity::Medium);

    let over = alerts::budget_alert(&budget(dec!(100), dec!(100))).unwrap();
    assert_eq!(over.kind, AlertKind::BudgetExceeded);
    assert_eq!(over.severity, Severity::High);

    // A zero limit never divides.
    assert!(alerts::budget_alert(&budget(Decimal::ZERO, dec!(50))).is_none());
}

#[test]
fn goal_milestones() {
    assert!(alerts::goal_alerts(&goal(dec!(49), false)).is_empty());

    let at_60 = alerts::goal_alerts(&goal(dec!(60), false));
    assert_eq!(at_60.len(), 1);
    assert_eq!(at_60[0].kind, AlertKind::GoalMilestone);
    assert_eq!(at_60[0].title, "50% milestone reached");

    assert!(alerts::goal_alerts(&goal(dec!(70), false)).is_empty());

    let at_80 = alerts::goal_alerts(&goal(dec!(80), false));
    assert_eq!(at_80.len(), 1);
    assert_eq!(at_80[0].title, "75% milestone reached");

    let at_95 = alerts::goal_alerts(&goal(dec!(95), false));
    assert_eq!(at_95.len(), 1);
    assert_eq!(at_95[0].kind, AlertKind::GoalAlmost);
    assert_eq!(at_95[0].severity, Severity::Low);

    assert!(alerts::goal_alerts(&goal(dec!(95), true)).is_empty());
}

#[test]
fn bill_due_window_is_one_to_three_days() {
    let today = day(2025, 1, 10);
    let due = |d: u32| alerts::bill_due_alert("Internet", dec!(500000), d, today);
    assert!(due(10).is_none());
    assert!(due(9).is_none());
    assert!(due(14).is_none());
    let a = due(13).unwrap();
    assert_eq!(a.kind, AlertKind::BillDueSoon);
    assert!(due(11).is_some());
}

#[test]
fn alerts_serialize_with_type_and_subject_fields() {
    let a = alerts::bill_due_alert("Water", dec!(20), 12, day(2025, 1, 10)).unwrap();
    let v = serde_json::to_value(&a).unwrap();
    assert_eq!(v["type"], "bill_due_soon");
    assert_eq!(v["severity"], "medium");
    assert_eq!(v["bill_name"], "Water");
    assert_eq!(v["days_until_due"], 2);
}

#[test]
fn evaluate_collects_budget_goal_and_bill_alerts() {
    let mut conn = db::open_in_memory().unwrap();
    let today = day(2025, 3, 10);

    budgets::create(
        &conn,
        serde_json::from_value(json!({ "category": "Food", "amount": 100, "month_year": "2025-03" }))
            .unwrap(),
    )
    .unwrap();
    transactions::create(
        &mut conn,
        serde_json::from_value(json!({
            "date": "2025-03-02",
            "description": "Groceries",
            "amount": 120,
            "type": "expense",
            "category": "Food",
            "account": "Cash",
        }))
        .unwrap(),
    )
    .unwrap();
    bills::create(
        &conn,
        serde_json::from_value(json!({ "name": "Internet", "amount": 300, "due_date": "12" }))
            .unwrap(),
    )
    .unwrap();
    recurring::create(
        &conn,
        serde_json::from_value(json!({
            "name": "Rent",
            "amount": 1000,
            "type": "expense",
            "category": "Bills",
            "account": "Bank",
            "day_of_month": 11,
        }))
        .unwrap(),
        today,
    )
    .unwrap();
    recurring::create(
        &conn,
        serde_json::from_value(json!({
            "name": "Salary",
            "amount": 5000,
            "type": "income",
            "category": "Salary",
            "account": "Bank",
            "day_of_month": 11,
        }))
        .unwrap(),
        today,
    )
    .unwrap();

    let out = alerts::evaluate(&conn, today).unwrap();
    let kinds: Vec<AlertKind> = out.iter().map(|a| a.kind).collect();
    assert_eq!(
        kinds,
        vec![
            AlertKind::BudgetExceeded,
            AlertKind::BillDueSoon,
            AlertKind::BillDueSoon
        ]
    );
}
