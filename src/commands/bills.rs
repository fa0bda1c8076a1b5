// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Legacy recurring bills and their monthly payment records.

use anyhow::Result;
use rusqlite::{Connection, OptionalExtension, Row, ToSql, params};
use serde::Deserialize;

use crate::commands::transactions;
use crate::error::FinanceError;
use crate::models::{
    Bill, BillPayment, BillUpdate, Category, NewBill, NewBillPayment, PaymentMethod, Transaction,
    TransactionStatus, TransactionType,
};
use crate::utils::{
    bill_payment_account, decimal_at, new_id, now, parse_day_of_month, parse_month,
    require_positive, require_text, today,
};

const BILL_COLUMNS: &str = "id, name, amount, due_date, period, category, is_active, created_at, updated_at";
const PAYMENT_COLUMNS: &str = "id, bill_id, bill_name, amount, due_date, payment_date, is_paid, \
     month_year, notes, transaction_id, created_at";

fn row_to_bill(r: &Row<'_>) -> rusqlite::Result<Bill> {
    Ok(Bill {
        id: r.get(0)?,
        name: r.get(1)?,
        amount: decimal_at(r, 2)?,
        due_date: r.get(3)?,
        period: r.get(4)?,
        category: r.get(5)?,
        is_active: r.get(6)?,
        created_at: r.get(7)?,
        updated_at: r.get(8)?,
    })
}

fn row_to_payment(r: &Row<'_>) -> rusqlite::Result<BillPayment> {
    Ok(BillPayment {
        id: r.get(0)?,
        bill_id: r.get(1)?,
        bill_name: r.get(2)?,
        amount: decimal_at(r, 3)?,
        due_date: r.get(4)?,
        payment_date: r.get(5)?,
        is_paid: r.get(6)?,
        month_year: r.get(7)?,
        notes: r.get(8)?,
        transaction_id: r.get(9)?,
        created_at: r.get(10)?,
    })
}

pub fn list(conn: &Connection) -> Result<Vec<Bill>> {
    let sql = format!("SELECT {} FROM bills ORDER BY due_date, name", BILL_COLUMNS);
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([], row_to_bill)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

pub fn list_active(conn: &Connection) -> Result<Vec<Bill>> {
    Ok(list(conn)?.into_iter().filter(|b| b.is_active).collect())
}

pub fn get(conn: &Connection, id: &str) -> Result<Bill> {
    find(conn, id)?.ok_or_else(|| FinanceError::NotFound("Bill").into())
}

fn validate(b: &Bill) -> Result<()> {
    require_text("name", &b.name)?;
    require_positive("amount", b.amount)?;
    parse_day_of_month(&b.due_date)?;
    Ok(())
}

fn save(conn: &Connection, b: &Bill) -> Result<()> {
    conn.execute(
        "INSERT INTO bills(id, name, amount, due_date, period, category, is_active, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
         ON CONFLICT(id) DO UPDATE SET name=excluded.name, amount=excluded.amount,
            due_date=excluded.due_date, period=excluded.period, category=excluded.category,
            is_active=excluded.is_active, updated_at=excluded.updated_at",
        params![
            b.id,
            b.name,
            b.amount.to_string(),
            b.due_date,
            b.period,
            b.category,
            b.is_active,
            b.created_at,
            b.updated_at,
        ],
    )?;
    Ok(())
}

pub fn create(conn: &Connection, input: NewBill) -> Result<Bill> {
    let ts = now();
    let b = Bill {
        id: new_id(),
        name: input.name.trim().to_string(),
        amount: input.amount,
        due_date: input.due_date.trim().to_string(),
        period: input.period,
        category: input.category,
        is_active: true,
        created_at: ts,
        updated_at: ts,
    };
    validate(&b)?;
    save(conn, &b)?;
    tracing::info!(id = %b.id, name = %b.name, "bill created");
    Ok(b)
}

pub fn update(conn: &Connection, id: &str, p: BillUpdate) -> Result<Bill> {
    let mut b = get(conn, id)?;
    if let Some(v) = p.name {
        b.name = v.trim().to_string();
    }
    if let Some(v) = p.amount {
        b.amount = v;
    }
    if let Some(v) = p.due_date {
        b.due_date = v.trim().to_string();
    }
    if let Some(v) = p.period {
        b.period = v;
    }
    if let Some(v) = p.category {
        b.category = v;
    }
    if let Some(v) = p.is_active {
        b.is_active = v;
    }
    validate(&b)?;
    b.updated_at = now();
    save(conn, &b)?;
    Ok(b)
}

/// Payment records for the bill are kept.
pub fn delete(conn: &Connection, id: &str) -> Result<()> {
    if conn.execute("DELETE FROM bills WHERE id=?1", params![id])? == 0 {
        return Err(FinanceError::NotFound("Bill").into());
    }
    tracing::info!(id, "bill deleted");
    Ok(())
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PaymentFilter {
    pub bill_id: Option<String>,
    pub month_year: Option<String>,
}

pub fn list_payments(conn: &Connection, f: &PaymentFilter) -> Result<Vec<BillPayment>> {
    let mut sql = format!("SELECT {} FROM bill_payments WHERE 1=1", PAYMENT_COLUMNS);
    let mut args: Vec<Box<dyn ToSql>> = Vec::new();
    if let Some(id) = f.bill_id.as_deref().filter(|s| !s.is_empty()) {
        sql.push_str(" AND bill_id=?");
        args.push(Box::new(id.to_string()));
    }
    if let Some(m) = f.month_year.as_deref().filter(|s| !s.is_empty()) {
        sql.push_str(" AND month_year=?");
        args.push(Box::new(parse_month(m)?));
    }
    sql.push_str(" ORDER BY payment_date DESC, created_at DESC");
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(rusqlite::params_from_iter(args.iter()), row_to_payment)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

pub fn is_paid(conn: &Connection, bill_id: &str, month_year: &str) -> Result<bool> {
    let n: i64 = conn.query_row(
        "SELECT COUNT(*) FROM bill_payments WHERE bill_id=?1 AND month_year=?2",
        params![bill_id, month_year],
        |r| r.get(0),
    )?;
    Ok(n > 0)
}

fn find(conn: &Connection, id: &str) -> Result<Option<Bill>> {
    let sql = format!("SELECT {} FROM bills WHERE id=?1", BILL_COLUMNS);
    Ok(conn.query_row(&sql, params![id], row_to_bill).optional()?)
}

/// Records one month's payment of a bill. The amount is debited from the
/// configured bill-payment account through an ordinary expense transaction,
/// and a second payment for the same month is refused. Name, amount and due
/// day default to the bill's own; the bill must exist unless all three are
/// given.
pub fn pay(conn: &mut Connection, input: NewBillPayment) -> Result<BillPayment> {
    let month_year = parse_month(&input.month_year)?;
    let db = conn.transaction()?;
    if is_paid(&db, &input.bill_id, &month_year)? {
        return Err(FinanceError::conflict("Bill already paid for this month").into());
    }
    let bill = find(&db, &input.bill_id)?;
    let known = || bill.as_ref().ok_or(FinanceError::NotFound("Bill"));
    let bill_name = match input.bill_name.filter(|n| !n.trim().is_empty()) {
        Some(n) => n.trim().to_string(),
        None => known()?.name.clone(),
    };
    let amount = match input.amount {
        Some(a) => a,
        None => known()?.amount,
    };
    require_positive("amount", amount)?;
    let due_date = match input.due_date.filter(|d| !d.trim().is_empty()) {
        Some(d) => d.trim().to_string(),
        None => known()?.due_date.clone(),
    };
    let payment_date = input.payment_date.unwrap_or_else(today);
    let account = bill_payment_account(&db)?;

    let ts = now();
    let tx = Transaction {
        id: new_id(),
        date: payment_date,
        description: format!("Bill Payment: {}", bill_name),
        amount,
        r#type: TransactionType::Expense,
        category: Category::Bills,
        sub_category: None,
        account,
        payment_method: PaymentMethod::BankTransfer,
        status: TransactionStatus::Completed,
        notes: Some(format!("Auto-created from bill payment: {}", month_year)),
        tags: Vec::new(),
        created_at: ts,
        updated_at: ts,
    };
    transactions::record(&db, &tx)?;

    let p = BillPayment {
        id: new_id(),
        bill_id: input.bill_id,
        bill_name,
        amount,
        due_date,
        payment_date,
        is_paid: true,
        month_year,
        notes: input.notes,
        transaction_id: Some(tx.id.clone()),
        created_at: ts,
    };
    db.execute(
        "INSERT INTO bill_payments(id, bill_id, bill_name, amount, due_date, payment_date,
            is_paid, month_year, notes, transaction_id, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            p.id,
            p.bill_id,
            p.bill_name,
            p.amount.to_string(),
            p.due_date,
            p.payment_date,
            p.is_paid,
            p.month_year,
            p.notes,
            p.transaction_id,
            p.created_at,
        ],
    )?;
    db.commit()?;
    tracing::info!(bill = %p.bill_id, month = %p.month_year, account = %tx.account, "bill paid");
    Ok(p)
}
