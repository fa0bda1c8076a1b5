// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use directories::ProjectDirs;
use once_cell::sync::Lazy;
use rusqlite::Connection;
use std::fs;
use std::path::{Path, PathBuf};

static APP: Lazy<(&str, &str, &str)> =
    Lazy::new(|| ("com.alphavelocity", "Fintrack", "fintrack"));

pub fn db_path() -> Result<PathBuf> {
    let proj = ProjectDirs::from(APP.0, APP.1, APP.2)
        .context("Could not determine platform-specific data dir")?;
    let data_dir = proj.data_dir();
    fs::create_dir_all(data_dir).context("Failed to create data dir")?;
    Ok(data_dir.join("fintrack.sqlite"))
}

/// Opens the database at `path` (or the platform data dir) and ensures the schema.
pub fn open_or_init(path: Option<&Path>) -> Result<Connection> {
    let path = match path {
        Some(p) => {
            if let Some(parent) = p.parent().filter(|d| !d.as_os_str().is_empty()) {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
            p.to_path_buf()
        }
        None => db_path()?,
    };
    let mut conn =
        Connection::open(&path).with_context(|| format!("Open DB at {}", path.display()))?;
    init_schema(&mut conn)?;
    tracing::debug!(path = %path.display(), "database opened");
    Ok(conn)
}

pub fn open_in_memory() -> Result<Connection> {
    let mut conn = Connection::open_in_memory().context("Open in-memory DB")?;
    init_schema(&mut conn)?;
    Ok(conn)
}

pub fn close(conn: Connection) -> Result<()> {
    conn.close()
        .map_err(|(_, e)| e)
        .context("Failed to close database")?;
    tracing::debug!("database closed");
    Ok(())
}

// References between collections are soft (ids or names as TEXT) on purpose:
// deleting a parent leaves its children in place.
pub fn init_schema(conn: &mut Connection) -> Result<()> {
    conn.execute_batch(
        r#"
    CREATE TABLE IF NOT EXISTS settings(
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS accounts(
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        type TEXT NOT NULL,
        balance TEXT NOT NULL DEFAULT '0',
        currency TEXT NOT NULL,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_accounts_name ON accounts(name);

    CREATE TABLE IF NOT EXISTS transactions(
        id TEXT PRIMARY KEY,
        date TEXT NOT NULL,
        description TEXT NOT NULL,
        amount TEXT NOT NULL,
        type TEXT NOT NULL CHECK(type IN ('income','expense')),
        category TEXT NOT NULL,
        sub_category TEXT,
        account TEXT NOT NULL,
        payment_method TEXT NOT NULL,
        status TEXT NOT NULL,
        notes TEXT,
        tags TEXT NOT NULL DEFAULT '[]',
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_transactions_date ON transactions(date);
    CREATE INDEX IF NOT EXISTS idx_transactions_account ON transactions(account);
    CREATE INDEX IF NOT EXISTS idx_transactions_category ON transactions(category, type);

    CREATE TABLE IF NOT EXISTS stocks(
        id TEXT PRIMARY KEY,
        ticker TEXT NOT NULL,
        name TEXT NOT NULL,
        securities TEXT NOT NULL,
        lots TEXT NOT NULL,
        buy_price TEXT NOT NULL,
        current_price TEXT NOT NULL,
        buy_date TEXT NOT NULL,
        notes TEXT,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS deposits(
        id TEXT PRIMARY KEY,
        bank_name TEXT NOT NULL,
        amount TEXT NOT NULL,
        tenor_months INTEGER NOT NULL,
        interest_rate TEXT NOT NULL,
        start_date TEXT NOT NULL,
        maturity_date TEXT NOT NULL,
        is_auto_renewal INTEGER NOT NULL DEFAULT 0,
        notes TEXT,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS gold(
        id TEXT PRIMARY KEY,
        type TEXT NOT NULL,
        weight_grams TEXT NOT NULL,
        buy_price_per_gram TEXT NOT NULL,
        current_price_per_gram TEXT NOT NULL,
        purchase_location TEXT NOT NULL,
        buy_date TEXT NOT NULL,
        certificate_number TEXT,
        notes TEXT,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS mutual_funds(
        id TEXT PRIMARY KEY,
        product_name TEXT NOT NULL,
        fund_manager TEXT NOT NULL,
        type TEXT NOT NULL,
        units TEXT NOT NULL,
        buy_nav TEXT NOT NULL,
        current_nav TEXT NOT NULL,
        buy_date TEXT NOT NULL,
        notes TEXT,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS debts(
        id TEXT PRIMARY KEY,
        debt_type TEXT NOT NULL,
        creditor TEXT NOT NULL,
        principal_amount TEXT NOT NULL,
        current_balance TEXT NOT NULL,
        interest_rate TEXT NOT NULL,
        monthly_payment TEXT NOT NULL,
        remaining_installments INTEGER NOT NULL,
        due_date TEXT NOT NULL,
        start_date TEXT NOT NULL,
        notes TEXT,
        is_active INTEGER NOT NULL DEFAULT 1,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_debts_creditor ON debts(creditor, is_active);

    CREATE TABLE IF NOT EXISTS bills(
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        amount TEXT NOT NULL,
        due_date TEXT NOT NULL,
        period TEXT NOT NULL,
        category TEXT NOT NULL,
        is_active INTEGER NOT NULL DEFAULT 1,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    );

    -- at most one payment per (bill, month) is checked in code, not by a constraint
    CREATE TABLE IF NOT EXISTS bill_payments(
        id TEXT PRIMARY KEY,
        bill_id TEXT NOT NULL,
        bill_name TEXT NOT NULL,
        amount TEXT NOT NULL,
        due_date TEXT NOT NULL,
        payment_date TEXT NOT NULL,
        is_paid INTEGER NOT NULL DEFAULT 1,
        month_year TEXT NOT NULL,
        notes TEXT,
        transaction_id TEXT,
        created_at TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_bill_payments_bill ON bill_payments(bill_id, month_year);

    CREATE TABLE IF NOT EXISTS recurring_transactions(
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        amount TEXT NOT NULL,
        type TEXT NOT NULL CHECK(type IN ('income','expense')),
        category TEXT NOT NULL,
        account TEXT NOT NULL,
        frequency TEXT NOT NULL,
        day_of_month INTEGER NOT NULL,
        is_active INTEGER NOT NULL DEFAULT 1,
        last_generated TEXT,
        next_due TEXT,
        notes TEXT,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS recurring_payments(
        id TEXT PRIMARY KEY,
        recurring_id TEXT NOT NULL,
        transaction_id TEXT NOT NULL,
        amount TEXT NOT NULL,
        month_year TEXT NOT NULL,
        paid_at TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_recurring_payments_item ON recurring_payments(recurring_id, month_year);

    CREATE TABLE IF NOT EXISTS goals(
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        target_amount TEXT NOT NULL,
        current_amount TEXT NOT NULL DEFAULT '0',
        target_date TEXT NOT NULL,
        category TEXT NOT NULL,
        is_achieved INTEGER NOT NULL DEFAULT 0,
        notes TEXT,
        color TEXT NOT NULL,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS goal_contributions(
        id TEXT PRIMARY KEY,
        goal_id TEXT NOT NULL,
        amount TEXT NOT NULL,
        date TEXT NOT NULL,
        notes TEXT
    );
    CREATE INDEX IF NOT EXISTS idx_goal_contributions_goal ON goal_contributions(goal_id);

    -- spent is derived on read and never stored
    CREATE TABLE IF NOT EXISTS budgets(
        id TEXT PRIMARY KEY,
        category TEXT NOT NULL,
        amount TEXT NOT NULL,
        period TEXT NOT NULL,
        month_year TEXT NOT NULL,
        is_active INTEGER NOT NULL DEFAULT 1,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_budgets_month ON budgets(month_year, category);
    "#,
    )?;
    Ok(())
}
