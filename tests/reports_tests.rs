// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{NaiveDate, Utc};
use fintrack::commands::investments::{self, InvestmentTotals, LegacyInvestments};
use fintrack::commands::reports::{self, NetWorth, Ratios};
use fintrack::commands::{accounts, debts, transactions};
use fintrack::db;
use fintrack::error::FinanceError;
use fintrack::models::{Account, AccountType, Debt, DebtType, InstrumentKind};
use fintrack::utils::MAX_AMOUNT;
use proptest::prelude::*;
use rusqlite::Connection;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::json;

fn setup() -> Connection {
    db::open_in_memory().unwrap()
}

fn account(balance: Decimal) -> Account {
    Account {
        id: "a".into(),
        name: "A".into(),
        r#type: AccountType::Bank,
        balance,
        currency: "IDR".into(),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn debt(balance: Decimal, active: bool) -> Debt {
    Debt {
        id: "d".into(),
        debt_type: DebtType::PersonalLoan,
        creditor: "Bank".into(),
        principal_amount: balance,
        current_balance: balance,
        interest_rate: Decimal::ZERO,
        monthly_payment: Decimal::ZERO,
        remaining_installments: 0,
        due_date: "01".into(),
        start_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
        notes: None,
        is_active: active,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn seed_portfolio(conn: &Connection) {
    investments::create_stock(
        conn,
        serde_json::from_value(json!({
            "ticker": "BBCA",
            "name": "Bank Central Asia",
            "securities": "Ajaib",
            "lots": 2,
            "buy_price": 9000,
            "current_price": 10000,
        }))
        .unwrap(),
    )
    .unwrap();
    investments::create_deposit(
        conn,
        serde_json::from_value(json!({
            "bank_name": "BCA",
            "amount": 5000000,
            "tenor_months": 6,
            "interest_rate": 4,
            "start_date": "2025-01-31",
        }))
        .unwrap(),
    )
    .unwrap();
    investments::create_gold(
        conn,
        serde_json::from_value(json!({
            "type": "Antam",
            "weight_grams": 10,
            "buy_price_per_gram": 1000000,
            "current_price_per_gram": 1100000,
            "purchase_location": "Butik",
        }))
        .unwrap(),
    )
    .unwrap();
    investments::create_mutual_fund(
        conn,
        serde_json::from_value(json!({
            "product_name": "Sucorinvest Money Market",
            "fund_manager": "Sucorinvest",
            "type": "Money Market",
            "units": 1000,
            "buy_nav": 1500,
            "current_nav": 1600,
        }))
        .unwrap(),
    )
    .unwrap();
}

#[test]
fn instrument_values_roll_up() {
    let conn = setup();
    seed_portfolio(&conn);
    let t = investments::totals(&conn).unwrap();
    assert_eq!(t.stocks, dec!(2000000));
    assert_eq!(t.deposits, dec!(5000000));
    assert_eq!(t.gold, dec!(11000000));
    assert_eq!(t.mutual_funds, dec!(1600000));
    assert_eq!(t.total().unwrap(), dec!(19600000));

    let legacy = LegacyInvestments::from(t);
    let v = serde_json::to_value(&legacy).unwrap();
    assert_eq!(v["saham"], 2000000.0);
    assert_eq!(v["reksadana"], 1600000.0);
}

#[test]
fn deposit_maturity_follows_start_and_tenor() {
    let conn = setup();
    seed_portfolio(&conn);
    let d = &investments::list_deposits(&conn).unwrap()[0];
    assert_eq!(d.maturity_date, NaiveDate::from_ymd_opt(2025, 7, 31).unwrap());

    let patch = serde_json::from_value(json!({ "tenor_months": 1 })).unwrap();
    let d = investments::update_deposit(&conn, &d.id, patch).unwrap();
    // January 31st plus one month lands on the last day of February.
    assert_eq!(d.maturity_date, NaiveDate::from_ymd_opt(2025, 2, 28).unwrap());
}

#[test]
fn detailed_dispatch_by_kind() {
    let conn = setup();
    let id = investments::create_detailed(
        &conn,
        InstrumentKind::Gold,
        json!({
            "type": "UBS",
            "weight_grams": 5,
            "buy_price_per_gram": 900000,
            "current_price_per_gram": 950000,
            "purchase_location": "Online",
        }),
    )
    .unwrap();
    investments::update_detailed(
        &conn,
        InstrumentKind::Gold,
        &id,
        json!({ "current_price_per_gram": 1000000 }),
    )
    .unwrap();
    assert_eq!(
        investments::get_gold(&conn, &id).unwrap().current_value(),
        Some(dec!(5000000))
    );

    let err = investments::create_detailed(&conn, InstrumentKind::Stocks, json!({ "ticker": 1 }))
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<FinanceError>(),
        Some(FinanceError::Validation(_))
    ));
    assert!("bonds".parse::<InstrumentKind>().is_err());

    investments::delete_detailed(&conn, InstrumentKind::Gold, &id).unwrap();
    assert!(investments::delete_detailed(&conn, InstrumentKind::Gold, &id).is_err());
}

#[test]
fn net_worth_ignores_paid_off_debts() {
    let nw = NetWorth::compute(
        &[account(dec!(1000)), account(dec!(-200))],
        &InvestmentTotals {
            stocks: dec!(300),
            ..Default::default()
        },
        &[debt(dec!(400), true), debt(dec!(999), false)],
    )
    .unwrap();
    assert_eq!(nw.liquid_assets, dec!(800));
    assert_eq!(nw.total_assets, dec!(1100));
    assert_eq!(nw.total_liabilities, dec!(400));
    assert_eq!(nw.net_worth, dec!(700));
}

#[test]
fn ratios_are_zero_without_assets_or_expenses() {
    let nw = NetWorth::compute(&[], &InvestmentTotals::default(), &[]).unwrap();
    let r = Ratios::compute(&nw, Decimal::ZERO);
    assert_eq!(r.debt_to_asset_ratio, Decimal::ZERO);
    assert_eq!(r.emergency_fund_months, Decimal::ZERO);
    assert_eq!(r.investment_ratio, Decimal::ZERO);
    assert_eq!(r.liquid_asset_ratio, Decimal::ZERO);
}

#[test]
fn ratios_round_to_two_places() {
    let nw = NetWorth::compute(
        &[account(dec!(2000))],
        &InvestmentTotals {
            deposits: dec!(1000),
            ..Default::default()
        },
        &[debt(dec!(1000), true)],
    )
    .unwrap();
    let r = Ratios::compute(&nw, dec!(12000));
    assert_eq!(r.debt_to_asset_ratio, dec!(33.33));
    assert_eq!(r.investment_ratio, dec!(33.33));
    assert_eq!(r.liquid_asset_ratio, dec!(66.67));
    assert_eq!(r.emergency_fund_months, dec!(2));
}

#[test]
fn dashboard_and_balance_sheet_agree() {
    let mut conn = setup();
    seed_portfolio(&conn);
    accounts::create(
        &conn,
        serde_json::from_value(json!({ "name": "BCA", "type": "Bank", "balance": 10000000 }))
            .unwrap(),
    )
    .unwrap();
    transactions::create(
        &mut conn,
        serde_json::from_value(json!({
            "description": "Laptop",
            "amount": 15000000,
            "type": "expense",
            "category": "Shopping",
            "account": "Visa",
            "payment_method": "Credit Card",
        }))
        .unwrap(),
    )
    .unwrap();
    assert_eq!(debts::list_active(&conn).unwrap().len(), 1);

    let today = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
    let dash = reports::dashboard(&conn, today).unwrap();
    assert_eq!(dash.liquid_assets, dec!(10000000));
    assert_eq!(dash.total_investments, dec!(19600000));
    assert_eq!(dash.total_liabilities, dec!(15000000));
    assert_eq!(dash.net_worth, dash.total_assets - dash.total_liabilities);
    assert_eq!(dash.active_debts, 1);
    assert_eq!(dash.total_expense, dec!(15000000));
    assert_eq!(dash.investment_items_count.gold, 1);
    assert_eq!(dash.recent_transactions.len(), 1);

    let sheet = reports::balance_sheet(&conn).unwrap();
    assert_eq!(sheet.assets.total, dash.total_assets);
    assert_eq!(sheet.liabilities.total, dash.total_liabilities);
    assert_eq!(sheet.equity.net_worth, dash.net_worth);
}

#[test]
fn monthly_and_category_analytics() {
    let mut conn = setup();
    for (date, kind, cat, amount) in [
        ("2025-01-03", "income", "Salary", 1000),
        ("2025-01-20", "expense", "Food", 200),
        ("2025-02-02", "expense", "Food", 50),
    ] {
        transactions::create(
            &mut conn,
            serde_json::from_value(json!({
                "date": date,
                "description": cat,
                "amount": amount,
                "type": kind,
                "category": cat,
                "account": "Cash",
            }))
            .unwrap(),
        )
        .unwrap();
    }
    let months = reports::monthly(&conn).unwrap();
    let keys: Vec<&String> = months.keys().collect();
    assert_eq!(keys, vec!["2025-01", "2025-02"]);
    assert_eq!(months["2025-01"].income, dec!(1000));
    assert_eq!(months["2025-01"].expense, dec!(200));
    assert_eq!(months["2025-02"].expense, dec!(50));

    let cats = reports::by_category(&conn).unwrap();
    assert_eq!(cats["Food"], dec!(250));
    assert_eq!(cats["Salary"], dec!(1000));
}

fn is_validation(err: &anyhow::Error) -> bool {
    matches!(err.downcast_ref::<FinanceError>(), Some(FinanceError::Validation(_)))
}

#[test]
fn oversized_holdings_are_rejected_and_reports_keep_working() {
    let conn = setup();
    seed_portfolio(&conn);

    let huge_lots = investments::create_stock(
        &conn,
        serde_json::from_value(json!({
            "ticker": "BIG",
            "name": "Big",
            "securities": "Ajaib",
            "lots": 1e27,
            "buy_price": 1,
            "current_price": 1,
        }))
        .unwrap(),
    )
    .unwrap_err();
    assert!(is_validation(&huge_lots));

    // Each input is in range but their product is not.
    let huge_value = investments::create_gold(
        &conn,
        serde_json::from_value(json!({
            "type": "Antam",
            "weight_grams": 10000000000000u64,
            "buy_price_per_gram": 1,
            "current_price_per_gram": 10000000000000u64,
            "purchase_location": "Butik",
        }))
        .unwrap(),
    )
    .unwrap_err();
    assert!(is_validation(&huge_value));

    let id = investments::list_stocks(&conn).unwrap()[0].id.clone();
    let patch = serde_json::from_value(json!({ "current_price": 1e15 })).unwrap();
    assert!(is_validation(&investments::update_stock(&conn, &id, patch).unwrap_err()));

    let dash = reports::dashboard(&conn, NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()).unwrap();
    assert_eq!(dash.total_investments, dec!(19600000));
    reports::balance_sheet(&conn).unwrap();
    reports::ratios(&conn).unwrap();
}

#[test]
fn amounts_beyond_the_limit_are_rejected() {
    let mut conn = setup();
    assert_eq!(MAX_AMOUNT, dec!(1000000000000000));
    accounts::create(
        &conn,
        serde_json::from_value(json!({ "name": "Reserve", "type": "Bank", "balance": 1e15 }))
            .unwrap(),
    )
    .unwrap();
    let err = accounts::create(
        &conn,
        serde_json::from_value(json!({ "name": "Vault", "type": "Bank", "balance": 1e16 }))
            .unwrap(),
    )
    .unwrap_err();
    assert!(is_validation(&err));

    let err = transactions::create(
        &mut conn,
        serde_json::from_value(json!({
            "description": "Too much",
            "amount": 1e16,
            "type": "income",
            "category": "Salary",
            "account": "Cash",
        }))
        .unwrap(),
    )
    .unwrap_err();
    assert!(is_validation(&err));
}

#[test]
fn net_worth_reports_overflow_as_an_error() {
    let err = NetWorth::compute(
        &[account(Decimal::MAX), account(Decimal::MAX)],
        &InvestmentTotals::default(),
        &[],
    )
    .unwrap_err();
    assert!(is_validation(&err));
}

#[test]
fn ratios_saturate_against_tiny_assets() {
    let nw = NetWorth::compute(
        &[account(dec!(0.0000000000000000000000000001))],
        &InvestmentTotals::default(),
        &[debt(dec!(1000000000000000), true)],
    )
    .unwrap();
    let r = Ratios::compute(&nw, Decimal::ZERO);
    assert_eq!(r.debt_to_asset_ratio, Decimal::MAX.round_dp(2));
    assert_eq!(r.liquid_asset_ratio, dec!(100));
}

proptest! {
    #[test]
    fn net_worth_identity_holds(
        balances in prop::collection::vec(-1_000_000i64..1_000_000, 0..8),
        holdings in prop::collection::vec(0i64..1_000_000, 4),
        liabilities in prop::collection::vec((0i64..1_000_000, any::<bool>()), 0..8),
    ) {
        let accounts: Vec<Account> = balances.iter().map(|b| account(Decimal::new(*b, 2))).collect();
        let inv = InvestmentTotals {
            stocks: Decimal::from(holdings[0]),
            deposits: Decimal::from(holdings[1]),
            gold: Decimal::new(holdings[2], 3),
            mutual_funds: Decimal::new(holdings[3], 4),
        };
        let debts: Vec<Debt> = liabilities.iter().map(|(b, a)| debt(Decimal::new(*b, 2), *a)).collect();
        let nw = NetWorth::compute(&accounts, &inv, &debts).unwrap();
        prop_assert_eq!(nw.total_assets, nw.liquid_assets + nw.total_investments);
        prop_assert_eq!(nw.total_assets - nw.total_liabilities, nw.net_worth);
        prop_assert!(nw.total_liabilities >= Decimal::ZERO);
    }
}
