// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use fintrack::commands::{accounts, bills, debts, recurring, transactions};
use fintrack::db;
use fintrack::error::FinanceError;
use fintrack::models::{
    Category, DebtPaymentRequest, Frequency, NewBillPayment, TransactionType,
};
use fintrack::utils::set_setting;
use rusqlite::Connection;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::json;

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn setup() -> Connection {
    db::open_in_memory().unwrap()
}

fn add_account(conn: &Connection, name: &str) {
    let input = serde_json::from_value(json!({ "name": name, "type": "Bank" })).unwrap();
    accounts::create(conn, input).unwrap();
}

fn balance(conn: &Connection, name: &str) -> Decimal {
    accounts::find_by_name(conn, name).unwrap().unwrap().balance
}

fn is_conflict(err: &anyhow::Error) -> bool {
    matches!(
        err.downcast_ref::<FinanceError>(),
        Some(FinanceError::Conflict(_))
    )
}

#[test]
fn next_due_later_this_month() {
    assert_eq!(
        recurring::next_due(20, day(2025, 3, 10)),
        Some(day(2025, 3, 20))
    );
}

#[test]
fn next_due_today_rolls_to_next_month() {
    assert_eq!(
        recurring::next_due(10, day(2025, 3, 10)),
        Some(day(2025, 4, 10))
    );
}

#[test]
fn next_due_rolls_december_into_next_year() {
    assert_eq!(
        recurring::next_due(5, day(2025, 12, 20)),
        Some(day(2026, 1, 5))
    );
}

#[test]
fn next_due_clamps_to_short_months() {
    assert_eq!(
        recurring::next_due(31, day(2025, 2, 3)),
        Some(day(2025, 2, 28))
    );
    assert_eq!(
        recurring::next_due(31, day(2025, 4, 30)),
        Some(day(2025, 5, 31))
    );
}

#[test]
fn only_monthly_items_are_scheduled() {
    let today = day(2025, 6, 1);
    assert!(recurring::schedule(Frequency::Yearly, 15, today).is_none());
    assert!(recurring::schedule(Frequency::Monthly, 15, today).is_some());
}

fn rent(conn: &Connection, today: NaiveDate) -> String {
    recurring::create(
        conn,
        serde_json::from_value(json!({
            "name": "Rent",
            "amount": 1500,
            "type": "expense",
            "category": "Bills",
            "account": "Bank",
            "frequency": "monthly",
            "day_of_month": 25,
        }))
        .unwrap(),
        today,
    )
    .unwrap()
    .id
}

#[test]
fn paying_a_recurring_item_books_once_per_month() {
    let mut conn = setup();
    add_account(&conn, "Bank");
    let today = day(2025, 6, 26);
    let id = rent(&conn, today);

    let out = recurring::pay(&mut conn, &id, Some("2025-06".into()), today).unwrap();
    assert_eq!(out.message, "Paid successfully");
    assert_eq!(out.payment.month_year, "2025-06");
    assert_eq!(balance(&conn, "Bank"), dec!(-1500));

    let tx = transactions::get(&conn, &out.transaction_id).unwrap();
    assert_eq!(tx.description, "Rent");
    assert_eq!(tx.date, today);
    assert_eq!(tx.notes.as_deref(), Some("Auto-paid recurring: Rent"));

    let item = recurring::get(&conn, &id).unwrap();
    assert!(item.last_generated.is_some());
    assert_eq!(item.next_due, Some(day(2025, 7, 25)));

    let err = recurring::pay(&mut conn, &id, Some("2025-06".into()), today).unwrap_err();
    assert!(is_conflict(&err));
    assert_eq!(balance(&conn, "Bank"), dec!(-1500));
    assert_eq!(transactions::list_all(&conn).unwrap().len(), 1);

    // Defaults to the month of today.
    let out = recurring::pay(&mut conn, &id, None, day(2025, 7, 2)).unwrap();
    assert_eq!(out.payment.month_year, "2025-07");
    assert_eq!(recurring::list_payments(&conn, Some("2025-07")).unwrap().len(), 1);
    assert_eq!(recurring::list_payments(&conn, None).unwrap().len(), 2);
}

#[test]
fn unknown_recurring_item_is_not_found() {
    let mut conn = setup();
    let err = recurring::pay(&mut conn, "nope", None, day(2025, 1, 1)).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<FinanceError>(),
        Some(FinanceError::NotFound(_))
    ));
}

#[test]
fn merged_list_includes_converted_legacy_bills() {
    let conn = setup();
    let today = day(2025, 6, 1);
    rent(&conn, today);
    let bill = bills::create(
        &conn,
        serde_json::from_value(json!({ "name": "Water", "amount": 80, "due_date": "07" })).unwrap(),
    )
    .unwrap();

    let merged = recurring::list_merged(&conn, today).unwrap();
    assert_eq!(merged.len(), 2);
    let water = merged.iter().find(|i| i.id == bill.id).unwrap();
    assert_eq!(water.r#type, TransactionType::Expense);
    assert_eq!(water.account, "Cash");
    assert_eq!(water.day_of_month, 7);
    assert_eq!(water.next_due, Some(day(2025, 6, 7)));
}

#[test]
fn internet_bill_payment_creates_expense() {
    let mut conn = setup();
    add_account(&conn, "Cash");
    let bill = bills::create(
        &conn,
        serde_json::from_value(json!({ "name": "Internet", "amount": 500000, "due_date": "15" }))
            .unwrap(),
    )
    .unwrap();

    let input: NewBillPayment = serde_json::from_value(json!({
        "bill_id": bill.id,
        "month_year": "2025-01",
        "payment_date": "2025-01-14",
    }))
    .unwrap();
    let p = bills::pay(&mut conn, input.clone()).unwrap();
    assert_eq!(p.bill_name, "Internet");
    assert_eq!(p.amount, dec!(500000));
    assert_eq!(p.due_date, "15");

    let tx = transactions::get(&conn, p.transaction_id.as_deref().unwrap()).unwrap();
    assert_eq!(tx.description, "Bill Payment: Internet");
    assert_eq!(tx.amount, dec!(500000));
    assert_eq!(tx.r#type, TransactionType::Expense);
    assert_eq!(tx.category, Category::Bills);
    assert_eq!(tx.date, day(2025, 1, 14));
    assert_eq!(balance(&conn, "Cash"), dec!(-500000));

    let err = bills::pay(&mut conn, input).unwrap_err();
    assert!(is_conflict(&err));
    assert_eq!(bills::list_payments(&conn, &Default::default()).unwrap().len(), 1);
}

#[test]
fn bill_payment_account_is_configurable() {
    let mut conn = setup();
    add_account(&conn, "Checking");
    set_setting(&conn, "bill_payment_account", "Checking").unwrap();
    let input: NewBillPayment = serde_json::from_value(json!({
        "bill_id": "no-such-bill",
        "bill_name": "Gym",
        "amount": 300,
        "due_date": "01",
        "month_year": "2025-02",
    }))
    .unwrap();
    bills::pay(&mut conn, input).unwrap();
    assert_eq!(balance(&conn, "Checking"), dec!(-300));
}

#[test]
fn bill_payment_for_missing_bill_without_details_is_not_found() {
    let mut conn = setup();
    let input: NewBillPayment = serde_json::from_value(json!({
        "bill_id": "no-such-bill",
        "month_year": "2025-02",
    }))
    .unwrap();
    let err = bills::pay(&mut conn, input).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<FinanceError>(),
        Some(FinanceError::NotFound("Bill"))
    ));
    assert!(transactions::list_all(&conn).unwrap().is_empty());
}

#[test]
fn debt_payment_floors_balance_and_deactivates() {
    let mut conn = setup();
    add_account(&conn, "Bank");
    let debt = debts::create(
        &conn,
        serde_json::from_value(json!({
            "debt_type": "Car Loan",
            "creditor": "Auto Finance",
            "principal_amount": 10000,
            "current_balance": 600,
            "interest_rate": 5,
            "monthly_payment": 500,
            "remaining_installments": 2,
            "due_date": "10",
        }))
        .unwrap(),
    )
    .unwrap();

    let req = |amount: i64| -> DebtPaymentRequest {
        serde_json::from_value(json!({ "amount": amount, "account": "Bank" })).unwrap()
    };
    let out = debts::pay(&mut conn, &debt.id, req(500)).unwrap();
    assert_eq!(out.debt.current_balance, dec!(100));
    assert_eq!(out.debt.remaining_installments, 1);
    assert!(out.debt.is_active);
    assert_eq!(out.transaction.description, "Debt Payment: Auto Finance");
    assert_eq!(out.transaction.category, Category::DebtPayment);

    let out = debts::pay(&mut conn, &debt.id, req(500)).unwrap();
    assert_eq!(out.debt.current_balance, Decimal::ZERO);
    assert_eq!(out.debt.remaining_installments, 0);
    assert!(!out.debt.is_active);
    assert!(debts::list_active(&conn).unwrap().is_empty());
    assert_eq!(balance(&conn, "Bank"), dec!(-1000));
}
