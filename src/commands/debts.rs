// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, Row, params};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::commands::{arg, transactions};
use crate::error::FinanceError;
use crate::models::{
    Category, Debt, DebtPaymentRequest, DebtUpdate, NewDebt, PaymentMethod, Transaction,
    TransactionStatus, TransactionType,
};
use crate::utils::{
    decimal_at, maybe_print_json, new_id, now, parse_day_of_month, parse_decimal, pretty_table,
    require_non_negative, require_positive, require_text, today,
};

const DEBT_COLUMNS: &str = "id, debt_type, creditor, principal_amount, current_balance, \
     interest_rate, monthly_payment, remaining_installments, due_date, start_date, notes, \
     is_active, created_at, updated_at";

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("list", sub)) => {
            let all = sub.get_flag("all");
            let data = if all { list(conn)? } else { list_active(conn)? };
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
                let rows = data
                    .iter()
                    .map(|d| {
                        vec![
                            d.creditor.clone(),
                            d.debt_type.to_string(),
                            d.current_balance.round_dp(2).to_string(),
                            d.monthly_payment.round_dp(2).to_string(),
                            d.remaining_installments.to_string(),
                            d.due_date.clone(),
                            if d.is_active { "yes".into() } else { "no".into() },
                            d.id.clone(),
                        ]
                    })
                    .collect();
                println!(
                    "{}",
                    pretty_table(
                        &["Creditor", "Type", "Balance", "Monthly", "Left", "Due", "Active", "Id"],
                        rows,
                    )
                );
            }
        }
        Some(("pay", sub)) => {
            let id = arg(sub, "id")?;
            let req = DebtPaymentRequest {
                amount: parse_decimal(arg(sub, "amount")?)?,
                account: arg(sub, "account")?.to_string(),
                date: None,
                notes: sub.get_one::<String>("notes").cloned(),
            };
            let out = pay(conn, id, req)?;
            println!(
                "Paid {} to {}; remaining {} ({} installments left)",
                out.transaction.amount,
                out.debt.creditor,
                out.debt.current_balance,
                out.debt.remaining_installments
            );
        }
        _ => {}
    }
    Ok(())
}

fn row_to_debt(r: &Row<'_>) -> rusqlite::Result<Debt> {
    Ok(Debt {
        id: r.get(0)?,
        debt_type: r.get(1)?,
        creditor: r.get(2)?,
        principal_amount: decimal_at(r, 3)?,
        current_balance: decimal_at(r, 4)?,
        interest_rate: decimal_at(r, 5)?,
        monthly_payment: decimal_at(r, 6)?,
        remaining_installments: r.get(7)?,
        due_date: r.get(8)?,
        start_date: r.get(9)?,
        notes: r.get(10)?,
        is_active: r.get(11)?,
        created_at: r.get(12)?,
        updated_at: r.get(13)?,
    })
}

fn select(conn: &Connection, filter: &str, args: &[&dyn rusqlite::ToSql]) -> Result<Vec<Debt>> {
    let sql = format!(
        "SELECT {} FROM debts {} ORDER BY created_at DESC, id",
        DEBT_COLUMNS, filter
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(args, row_to_debt)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

pub fn list(conn: &Connection) -> Result<Vec<Debt>> {
    select(conn, "", &[])
}

pub fn list_active(conn: &Connection) -> Result<Vec<Debt>> {
    select(conn, "WHERE is_active=1", &[])
}

pub fn get(conn: &Connection, id: &str) -> Result<Debt> {
    let sql = format!("SELECT {} FROM debts WHERE id=?1", DEBT_COLUMNS);
    conn.query_row(&sql, params![id], row_to_debt)
        .optional()?
        .ok_or_else(|| FinanceError::NotFound("Debt").into())
}

/// The oldest active debt owed to `creditor` (exact name).
pub fn find_active_by_creditor(conn: &Connection, creditor: &str) -> Result<Option<Debt>> {
    let sql = format!(
        "SELECT {} FROM debts WHERE creditor=?1 AND is_active=1 ORDER BY created_at LIMIT 1",
        DEBT_COLUMNS
    );
    Ok(conn.query_row(&sql, params![creditor], row_to_debt).optional()?)
}

pub fn insert(conn: &Connection, d: &Debt) -> Result<()> {
    conn.execute(
        "INSERT INTO debts(id, debt_type, creditor, principal_amount, current_balance,
            interest_rate, monthly_payment, remaining_installments, due_date, start_date, notes,
            is_active, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
        params![
            d.id,
            d.debt_type,
            d.creditor,
            d.principal_amount.to_string(),
            d.current_balance.to_string(),
            d.interest_rate.to_string(),
            d.monthly_payment.to_string(),
            d.remaining_installments,
            d.due_date,
            d.start_date,
            d.notes,
            d.is_active,
            d.created_at,
            d.updated_at,
        ],
    )?;
    Ok(())
}

fn write(conn: &Connection, d: &Debt) -> Result<()> {
    conn.execute(
        "UPDATE debts SET debt_type=?2, creditor=?3, principal_amount=?4, current_balance=?5,
            interest_rate=?6, monthly_payment=?7, remaining_installments=?8, due_date=?9,
            start_date=?10, notes=?11, is_active=?12, updated_at=?13
         WHERE id=?1",
        params![
            d.id,
            d.debt_type,
            d.creditor,
            d.principal_amount.to_string(),
            d.current_balance.to_string(),
            d.interest_rate.to_string(),
            d.monthly_payment.to_string(),
            d.remaining_installments,
            d.due_date,
            d.start_date,
            d.notes,
            d.is_active,
            d.updated_at,
        ],
    )?;
    Ok(())
}

pub fn set_balance(
    conn: &Connection,
    id: &str,
    balance: Decimal,
    updated_at: DateTime<Utc>,
) -> Result<()> {
    conn.execute(
        "UPDATE debts SET current_balance=?1, updated_at=?2 WHERE id=?3",
        params![balance.to_string(), updated_at, id],
    )?;
    Ok(())
}

fn validate(d: &Debt) -> Result<()> {
    require_text("creditor", &d.creditor)?;
    require_non_negative("principal_amount", d.principal_amount)?;
    require_non_negative("current_balance", d.current_balance)?;
    require_non_negative("interest_rate", d.interest_rate)?;
    require_non_negative("monthly_payment", d.monthly_payment)?;
    parse_day_of_month(&d.due_date)?;
    Ok(())
}

pub fn create(conn: &Connection, input: NewDebt) -> Result<Debt> {
    let ts = now();
    let debt = Debt {
        id: new_id(),
        debt_type: input.debt_type,
        creditor: input.creditor.trim().to_string(),
        principal_amount: input.principal_amount,
        current_balance: input.current_balance,
        interest_rate: input.interest_rate,
        monthly_payment: input.monthly_payment,
        remaining_installments: input.remaining_installments,
        due_date: input.due_date.trim().to_string(),
        start_date: input.start_date.unwrap_or_else(today),
        notes: input.notes,
        is_active: true,
        created_at: ts,
        updated_at: ts,
    };
    validate(&debt)?;
    insert(conn, &debt)?;
    tracing::info!(id = %debt.id, creditor = %debt.creditor, "debt created");
    Ok(debt)
}

pub fn update(conn: &Connection, id: &str, patch: DebtUpdate) -> Result<Debt> {
    let mut d = get(conn, id)?;
    if let Some(v) = patch.debt_type {
        d.debt_type = v;
    }
    if let Some(v) = patch.creditor {
        d.creditor = v.trim().to_string();
    }
    if let Some(v) = patch.principal_amount {
        d.principal_amount = v;
    }
    if let Some(v) = patch.current_balance {
        d.current_balance = v;
    }
    if let Some(v) = patch.interest_rate {
        d.interest_rate = v;
    }
    if let Some(v) = patch.monthly_payment {
        d.monthly_payment = v;
    }
    if let Some(v) = patch.remaining_installments {
        d.remaining_installments = v;
    }
    if let Some(v) = patch.due_date {
        d.due_date = v.trim().to_string();
    }
    if let Some(v) = patch.start_date {
        d.start_date = v;
    }
    if patch.notes.is_some() {
        d.notes = patch.notes;
    }
    if let Some(v) = patch.is_active {
        d.is_active = v;
    }
    validate(&d)?;
    d.updated_at = now();
    write(conn, &d)?;
    Ok(d)
}

pub fn delete(conn: &Connection, id: &str) -> Result<()> {
    let n = conn.execute("DELETE FROM debts WHERE id=?1", params![id])?;
    if n == 0 {
        return Err(FinanceError::NotFound("Debt").into());
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize)]
pub struct DebtPaymentOutcome {
    pub debt: Debt,
    pub transaction: Transaction,
}

/// Pays down a debt from `req.account`: the balance never drops below zero,
/// one installment is consumed, and a fully repaid debt is deactivated. The
/// payment is booked as a "Debt Payment" expense through the ledger.
pub fn pay(conn: &mut Connection, id: &str, req: DebtPaymentRequest) -> Result<DebtPaymentOutcome> {
    require_positive("amount", req.amount)?;
    require_text("account", &req.account)?;

    let db = conn.transaction()?;
    let mut debt = get(&db, id)?;
    debt.current_balance = (debt.current_balance - req.amount).max(Decimal::ZERO);
    debt.remaining_installments = debt.remaining_installments.saturating_sub(1);
    if debt.current_balance.is_zero() {
        debt.is_active = false;
    }
    let ts = now();
    debt.updated_at = ts;
    write(&db, &debt)?;

    let tx = Transaction {
        id: new_id(),
        date: req.date.unwrap_or_else(today),
        description: format!("Debt Payment: {}", debt.creditor),
        amount: req.amount,
        r#type: TransactionType::Expense,
        category: Category::DebtPayment,
        sub_category: None,
        account: req.account.trim().to_string(),
        payment_method: PaymentMethod::BankTransfer,
        status: TransactionStatus::Completed,
        notes: req
            .notes
            .or_else(|| Some(format!("Payment toward {} debt", debt.debt_type))),
        tags: Vec::new(),
        created_at: ts,
        updated_at: ts,
    };
    transactions::record(&db, &tx)?;
    db.commit()?;

    tracing::info!(
        debt = %debt.id,
        creditor = %debt.creditor,
        amount = %req.amount,
        remaining = %debt.current_balance,
        "debt payment recorded"
    );
    Ok(DebtPaymentOutcome {
        debt,
        transaction: tx,
    })
}
