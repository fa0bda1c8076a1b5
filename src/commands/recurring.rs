// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Recurring income and expense templates, paid at most once per month.

use anyhow::Result;
use chrono::{Datelike, NaiveDate};
use rusqlite::{Connection, OptionalExtension, Row, ToSql, params};
use serde::Serialize;

use crate::commands::{arg, bills, transactions};
use crate::error::FinanceError;
use crate::models::{
    Bill, Frequency, NewRecurringTransaction, PaymentMethod, RecurringPayment,
    RecurringTransaction, RecurringTransactionUpdate, Transaction, TransactionStatus,
    TransactionType,
};
use crate::utils::{
    days_in_month, decimal_at, maybe_print_json, month_of, new_id, next_month, now, parse_month,
    pretty_table, require_positive, require_text, today,
};

const RECURRING_COLUMNS: &str = "id, name, amount, type, category, account, frequency, \
     day_of_month, is_active, last_generated, next_due, notes, created_at, updated_at";
const PAYMENT_COLUMNS: &str = "id, recurring_id, transaction_id, amount, month_year, paid_at";

/// Account a legacy bill is charged to when shown as a recurring item.
const LEGACY_ACCOUNT: &str = "Cash";

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("list", sub)) => {
            let data = list_merged(conn, today())?;
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
                let rows = data
                    .iter()
                    .map(|r| {
                        vec![
                            r.name.clone(),
                            r.r#type.to_string(),
                            r.amount.round_dp(2).to_string(),
                            r.account.clone(),
                            r.frequency.to_string(),
                            r.day_of_month.to_string(),
                            r.next_due.map(|d| d.to_string()).unwrap_or_default(),
                            r.id.clone(),
                        ]
                    })
                    .collect();
                println!(
                    "{}",
                    pretty_table(
                        &["Name", "Type", "Amount", "Account", "Frequency", "Day", "Next due", "Id"],
                        rows,
                    )
                );
            }
        }
        Some(("pay", sub)) => {
            let id = arg(sub, "id")?;
            let month = sub.get_one::<String>("month").cloned();
            let out = pay(conn, id, month, today())?;
            println!(
                "Paid {} for {} (transaction {})",
                out.payment.amount, out.payment.month_year, out.transaction_id
            );
        }
        _ => {}
    }
    Ok(())
}

/// Next occurrence of `day` strictly after `today`. Days past the end of a
/// month fall on its last day.
pub fn next_due(day: u32, today: NaiveDate) -> Option<NaiveDate> {
    let on = |y: i32, m: u32| NaiveDate::from_ymd_opt(y, m, day.clamp(1, days_in_month(y, m)));
    let this_month = on(today.year(), today.month())?;
    if this_month > today {
        return Some(this_month);
    }
    let (y, m) = next_month(today.year(), today.month());
    on(y, m)
}

/// Only monthly items carry a schedule.
pub fn schedule(frequency: Frequency, day: u32, today: NaiveDate) -> Option<NaiveDate> {
    match frequency {
        Frequency::Monthly => next_due(day, today),
        _ => None,
    }
}

fn row_to_item(r: &Row<'_>) -> rusqlite::Result<RecurringTransaction> {
    Ok(RecurringTransaction {
        id: r.get(0)?,
        name: r.get(1)?,
        amount: decimal_at(r, 2)?,
        r#type: r.get(3)?,
        category: r.get(4)?,
        account: r.get(5)?,
        frequency: r.get(6)?,
        day_of_month: r.get(7)?,
        is_active: r.get(8)?,
        last_generated: r.get(9)?,
        next_due: r.get(10)?,
        notes: r.get(11)?,
        created_at: r.get(12)?,
        updated_at: r.get(13)?,
    })
}

fn row_to_payment(r: &Row<'_>) -> rusqlite::Result<RecurringPayment> {
    Ok(RecurringPayment {
        id: r.get(0)?,
        recurring_id: r.get(1)?,
        transaction_id: r.get(2)?,
        amount: decimal_at(r, 3)?,
        month_year: r.get(4)?,
        paid_at: r.get(5)?,
    })
}

/// Stored items with `next_due` re-evaluated against `today`.
pub fn list(conn: &Connection, today: NaiveDate) -> Result<Vec<RecurringTransaction>> {
    let sql = format!(
        "SELECT {} FROM recurring_transactions ORDER BY day_of_month, name",
        RECURRING_COLUMNS
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([], row_to_item)?;
    let mut items = rows.collect::<rusqlite::Result<Vec<_>>>()?;
    for item in &mut items {
        item.next_due = schedule(item.frequency, item.day_of_month, today);
    }
    Ok(items)
}

fn from_legacy(b: Bill, today: NaiveDate) -> RecurringTransaction {
    let day = b.due_date.trim().parse::<u32>().unwrap_or(1);
    RecurringTransaction {
        id: b.id,
        name: b.name,
        amount: b.amount,
        r#type: TransactionType::Expense,
        category: b.category,
        account: LEGACY_ACCOUNT.to_string(),
        frequency: b.period,
        day_of_month: day,
        is_active: b.is_active,
        last_generated: None,
        next_due: schedule(b.period, day, today),
        notes: None,
        created_at: b.created_at,
        updated_at: b.updated_at,
    }
}

/// Recurring items followed by legacy bills, converted, whose id is not
/// already listed.
pub fn list_merged(conn: &Connection, today: NaiveDate) -> Result<Vec<RecurringTransaction>> {
    let mut items = list(conn, today)?;
    for b in bills::list(conn)? {
        if !items.iter().any(|i| i.id == b.id) {
            items.push(from_legacy(b, today));
        }
    }
    Ok(items)
}

pub fn get(conn: &Connection, id: &str) -> Result<RecurringTransaction> {
    let sql = format!(
        "SELECT {} FROM recurring_transactions WHERE id=?1",
        RECURRING_COLUMNS
    );
    conn.query_row(&sql, params![id], row_to_item)
        .optional()?
        .ok_or_else(|| FinanceError::NotFound("Recurring item").into())
}

fn validate(r: &RecurringTransaction) -> Result<()> {
    require_text("name", &r.name)?;
    require_text("account", &r.account)?;
    require_positive("amount", r.amount)?;
    if !(1..=31).contains(&r.day_of_month) {
        return Err(FinanceError::validation("day_of_month must be between 1 and 31").into());
    }
    Ok(())
}

fn save(conn: &Connection, r: &RecurringTransaction) -> Result<()> {
    conn.execute(
        "INSERT INTO recurring_transactions(id, name, amount, type, category, account, frequency,
            day_of_month, is_active, last_generated, next_due, notes, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
         ON CONFLICT(id) DO UPDATE SET name=excluded.name, amount=excluded.amount,
            type=excluded.type, category=excluded.category, account=excluded.account,
            frequency=excluded.frequency, day_of_month=excluded.day_of_month,
            is_active=excluded.is_active, last_generated=excluded.last_generated,
            next_due=excluded.next_due, notes=excluded.notes, updated_at=excluded.updated_at",
        params![
            r.id,
            r.name,
            r.amount.to_string(),
            r.r#type,
            r.category,
            r.account,
            r.frequency,
            r.day_of_month,
            r.is_active,
            r.last_generated,
            r.next_due,
            r.notes,
            r.created_at,
            r.updated_at,
        ],
    )?;
    Ok(())
}

pub fn create(
    conn: &Connection,
    input: NewRecurringTransaction,
    today: NaiveDate,
) -> Result<RecurringTransaction> {
    let ts = now();
    let r = RecurringTransaction {
        id: new_id(),
        name: input.name.trim().to_string(),
        amount: input.amount,
        r#type: input.r#type,
        category: input.category,
        account: input.account.trim().to_string(),
        frequency: input.frequency,
        day_of_month: input.day_of_month,
        is_active: true,
        last_generated: None,
        next_due: schedule(input.frequency, input.day_of_month, today),
        notes: input.notes,
        created_at: ts,
        updated_at: ts,
    };
    validate(&r)?;
    save(conn, &r)?;
    tracing::info!(id = %r.id, name = %r.name, next_due = ?r.next_due, "recurring item created");
    Ok(r)
}

pub fn update(
    conn: &Connection,
    id: &str,
    p: RecurringTransactionUpdate,
    today: NaiveDate,
) -> Result<RecurringTransaction> {
    let mut r = get(conn, id)?;
    if let Some(v) = p.name {
        r.name = v.trim().to_string();
    }
    if let Some(v) = p.amount {
        r.amount = v;
    }
    if let Some(v) = p.r#type {
        r.r#type = v;
    }
    if let Some(v) = p.category {
        r.category = v;
    }
    if let Some(v) = p.account {
        r.account = v.trim().to_string();
    }
    if let Some(v) = p.frequency {
        r.frequency = v;
    }
    if let Some(v) = p.day_of_month {
        r.day_of_month = v;
    }
    if let Some(v) = p.is_active {
        r.is_active = v;
    }
    if p.notes.is_some() {
        r.notes = p.notes;
    }
    validate(&r)?;
    r.next_due = schedule(r.frequency, r.day_of_month, today);
    r.updated_at = now();
    save(conn, &r)?;
    Ok(r)
}

/// Payment history for the item is kept.
pub fn delete(conn: &Connection, id: &str) -> Result<()> {
    if conn.execute("DELETE FROM recurring_transactions WHERE id=?1", params![id])? == 0 {
        return Err(FinanceError::NotFound("Recurring item").into());
    }
    tracing::info!(id, "recurring item deleted");
    Ok(())
}

pub fn list_payments(conn: &Connection, month_year: Option<&str>) -> Result<Vec<RecurringPayment>> {
    let mut sql = format!("SELECT {} FROM recurring_payments", PAYMENT_COLUMNS);
    let mut args: Vec<Box<dyn ToSql>> = Vec::new();
    if let Some(m) = month_year.filter(|m| !m.is_empty()) {
        sql.push_str(" WHERE month_year=?");
        args.push(Box::new(parse_month(m)?));
    }
    sql.push_str(" ORDER BY paid_at DESC");
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(rusqlite::params_from_iter(args.iter()), row_to_payment)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

#[derive(Debug, Clone, Serialize)]
pub struct PayOutcome {
    pub message: &'static str,
    pub transaction_id: String,
    pub payment: RecurringPayment,
}

/// Pays `id` for `month_year` (default: the month of `today`): books the
/// transaction through the ledger, records the payment and advances the
/// item's schedule. A month can only be paid once.
pub fn pay(
    conn: &mut Connection,
    id: &str,
    month_year: Option<String>,
    today: NaiveDate,
) -> Result<PayOutcome> {
    let month_year = match month_year.filter(|m| !m.trim().is_empty()) {
        Some(m) => parse_month(&m)?,
        None => month_of(today),
    };
    let db = conn.transaction()?;
    let mut item = get(&db, id)?;
    let paid: i64 = db.query_row(
        "SELECT COUNT(*) FROM recurring_payments WHERE recurring_id=?1 AND month_year=?2",
        params![item.id, month_year],
        |r| r.get(0),
    )?;
    if paid > 0 {
        return Err(FinanceError::conflict("Already paid for this month").into());
    }

    let ts = now();
    let tx = Transaction {
        id: new_id(),
        date: today,
        description: item.name.clone(),
        amount: item.amount,
        r#type: item.r#type,
        category: item.category,
        sub_category: None,
        account: item.account.clone(),
        payment_method: PaymentMethod::default(),
        status: TransactionStatus::Completed,
        notes: Some(format!("Auto-paid recurring: {}", item.name)),
        tags: Vec::new(),
        created_at: ts,
        updated_at: ts,
    };
    transactions::record(&db, &tx)?;

    let payment = RecurringPayment {
        id: new_id(),
        recurring_id: item.id.clone(),
        transaction_id: tx.id.clone(),
        amount: item.amount,
        month_year,
        paid_at: ts,
    };
    db.execute(
        "INSERT INTO recurring_payments(id, recurring_id, transaction_id, amount, month_year, paid_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            payment.id,
            payment.recurring_id,
            payment.transaction_id,
            payment.amount.to_string(),
            payment.month_year,
            payment.paid_at,
        ],
    )?;

    item.last_generated = Some(ts);
    item.next_due = schedule(item.frequency, item.day_of_month, today);
    item.updated_at = ts;
    save(&db, &item)?;
    db.commit()?;

    tracing::info!(item = %item.id, month = %payment.month_year, tx = %tx.id, "recurring item paid");
    Ok(PayOutcome {
        message: "Paid successfully",
        transaction_id: tx.id,
        payment,
    })
}
