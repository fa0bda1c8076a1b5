// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Balance bookkeeping for transaction postings.
//!
//! Every function here takes a plain `&Connection` so callers can run it
//! inside their own `rusqlite::Transaction`; the transaction, balance and
//! debt writes of one request then commit or roll back together.

use anyhow::{Context, Result};
use rusqlite::{Connection, OptionalExtension, params};
use rust_decimal::Decimal;

use crate::commands::debts;
use crate::models::{Debt, DebtType, PaymentMethod, Transaction, TransactionType};
use crate::utils::{in_range, new_id, now};

/// Installments assumed for a debt opened by a deferred-payment expense.
pub const DEFERRED_INSTALLMENTS: u32 = 10;
/// Day of month a synthesized debt falls due.
pub const DEFERRED_DUE_DAY: &str = "05";

/// Flat monthly rate, in percent, for a debt opened by a deferred-payment expense.
pub fn deferred_rate(method: PaymentMethod) -> Decimal {
    match method {
        PaymentMethod::PayLater => Decimal::new(15, 1),
        _ => Decimal::new(25, 1),
    }
}

/// Adds `delta` to the balance of the account named exactly `account`.
///
/// Matching is case-sensitive. Returns `false` and leaves everything untouched
/// when no account has that name.
pub fn adjust_balance(conn: &Connection, account: &str, delta: Decimal) -> Result<bool> {
    let row: Option<(String, String)> = conn
        .query_row(
            "SELECT id, balance FROM accounts WHERE name=?1 ORDER BY created_at LIMIT 1",
            params![account],
            |r| Ok((r.get(0)?, r.get(1)?)),
        )
        .optional()?;
    let Some((id, balance)) = row else {
        tracing::warn!(account, %delta, "no account with this name; balance not adjusted");
        return Ok(false);
    };
    let balance = balance
        .parse::<Decimal>()
        .with_context(|| format!("Invalid balance '{}' for account {}", balance, account))?;
    let balance = in_range(balance.checked_add(delta), "account balance")?;
    conn.execute(
        "UPDATE accounts SET balance=?1, updated_at=?2 WHERE id=?3",
        params![balance.to_string(), now(), id],
    )?;
    tracing::debug!(account, %delta, "balance adjusted");
    Ok(true)
}

/// Applies the transaction's signed amount to its account.
pub fn post(conn: &Connection, tx: &Transaction) -> Result<bool> {
    adjust_balance(conn, &tx.account, tx.signed_amount())
}

/// Undoes [`post`] for the same transaction.
pub fn reverse(conn: &Connection, tx: &Transaction) -> Result<bool> {
    adjust_balance(conn, &tx.account, -tx.signed_amount())
}

#[derive(Debug, Clone)]
pub enum DebtCascade {
    /// An active debt for the creditor absorbed the charge.
    Charged(Debt),
    /// No active debt existed, so one was opened.
    Opened(Debt),
}

impl DebtCascade {
    pub fn debt(&self) -> &Debt {
        match self {
            DebtCascade::Charged(d) | DebtCascade::Opened(d) => d,
        }
    }
}

/// Charges a credit-card or pay-later expense to the debt whose creditor is
/// the transaction's account, opening one when none is active.
pub fn cascade_debt(conn: &Connection, tx: &Transaction) -> Result<Option<DebtCascade>> {
    if tx.r#type != TransactionType::Expense || !tx.payment_method.is_deferred() {
        return Ok(None);
    }
    if let Some(mut debt) = debts::find_active_by_creditor(conn, &tx.account)? {
        debt.current_balance = in_range(
            debt.current_balance.checked_add(tx.amount),
            "debt balance",
        )?;
        debt.updated_at = now();
        debts::set_balance(conn, &debt.id, debt.current_balance, debt.updated_at)?;
        tracing::info!(creditor = %debt.creditor, balance = %debt.current_balance, "charged existing debt");
        return Ok(Some(DebtCascade::Charged(debt)));
    }
    let debt = deferred_debt(tx);
    debts::insert(conn, &debt)?;
    tracing::info!(creditor = %debt.creditor, debt_type = %debt.debt_type, "opened debt from deferred payment");
    Ok(Some(DebtCascade::Opened(debt)))
}

/// The debt a first deferred-payment expense opens: a flat heuristic, not an
/// amortization schedule.
pub fn deferred_debt(tx: &Transaction) -> Debt {
    let debt_type = match tx.payment_method {
        PaymentMethod::PayLater => DebtType::Installment,
        _ => DebtType::CreditCard,
    };
    let ts = now();
    Debt {
        id: new_id(),
        debt_type,
        creditor: tx.account.clone(),
        principal_amount: tx.amount,
        current_balance: tx.amount,
        interest_rate: deferred_rate(tx.payment_method),
        monthly_payment: tx.amount * Decimal::new(1, 1),
        remaining_installments: DEFERRED_INSTALLMENTS,
        due_date: DEFERRED_DUE_DAY.to_string(),
        start_date: ts.date_naive(),
        notes: Some(format!(
            "Auto-created from {} transaction: {}",
            tx.payment_method, tx.description
        )),
        is_active: true,
        created_at: ts,
        updated_at: ts,
    }
}
