// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::collections::BTreeMap;

use anyhow::Result;
use chrono::NaiveDate;
use rusqlite::{Connection, OptionalExtension, Row, ToSql, params};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

use crate::commands::arg;
use crate::error::FinanceError;
use crate::ledger::{self, DebtCascade};
use crate::models::{
    Category, NewTransaction, Transaction, TransactionStatus, TransactionType, TransactionUpdate,
};
use crate::utils::{
    decimal_at, maybe_print_json, new_id, now, parse_date, parse_decimal, pretty_table,
    require_positive, require_text, serde_date, tags_at, today,
};

pub const DEFAULT_LIMIT: usize = 1000;

const TX_COLUMNS: &str = "id, date, description, amount, type, category, sub_category, \
     account, payment_method, status, notes, tags, created_at, updated_at";

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        Some(("rm", sub)) => {
            let id = arg(sub, "id")?;
            delete(conn, id)?;
            println!("Deleted transaction {}", id);
        }
        Some(("stats", sub)) => {
            let s = stats(conn)?;
            if !maybe_print_json(sub.get_flag("json"), false, &s)? {
                let mut rows: Vec<Vec<String>> = s
                    .category_breakdown
                    .iter()
                    .map(|(cat, t)| {
                        vec![
                            cat.clone(),
                            t.income.round_dp(2).to_string(),
                            t.expense.round_dp(2).to_string(),
                            t.count.to_string(),
                        ]
                    })
                    .collect();
                rows.push(vec![
                    "TOTAL".into(),
                    s.total_income.round_dp(2).to_string(),
                    s.total_expense.round_dp(2).to_string(),
                    s.total_transactions.to_string(),
                ]);
                println!(
                    "{}",
                    pretty_table(&["Category", "Income", "Expense", "Count"], rows)
                );
                println!("Net: {}", s.net.round_dp(2));
            }
        }
        _ => {}
    }
    Ok(())
}

fn add(conn: &mut Connection, sub: &clap::ArgMatches) -> Result<()> {
    let input = NewTransaction {
        description: arg(sub, "description")?.to_string(),
        amount: parse_decimal(arg(sub, "amount")?)?,
        r#type: arg(sub, "type")?.parse()?,
        category: arg(sub, "category")?.parse()?,
        sub_category: sub
            .get_one::<String>("sub-category")
            .map(|s| s.parse())
            .transpose()?,
        account: arg(sub, "account")?.to_string(),
        payment_method: sub
            .get_one::<String>("method")
            .map(|s| s.parse())
            .transpose()?,
        status: sub
            .get_one::<String>("status")
            .map(|s| s.parse())
            .transpose()?
            .unwrap_or_default(),
        notes: sub.get_one::<String>("notes").cloned(),
        tags: sub
            .get_many::<String>("tag")
            .map(|v| v.cloned().collect())
            .unwrap_or_default(),
        date: sub
            .get_one::<String>("date")
            .map(|s| parse_date(s))
            .transpose()?,
    };
    let tx = create(conn, input)?;
    println!(
        "Recorded {} {} on {} at '{}' (acct: {}, id: {})",
        tx.r#type, tx.amount, tx.date, tx.description, tx.account, tx.id
    );
    Ok(())
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let q = query_from_args(sub)?;
    let data = query(conn, &q)?;
    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        let rows: Vec<Vec<String>> = data
            .iter()
            .map(|t| {
                vec![
                    t.date.to_string(),
                    t.account.clone(),
                    t.description.clone(),
                    t.signed_amount().round_dp(2).to_string(),
                    t.category.to_string(),
                    t.payment_method.to_string(),
                    t.status.to_string(),
                    t.id.clone(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["Date", "Account", "Description", "Amount", "Category", "Method", "Status", "Id"],
                rows,
            )
        );
    }
    Ok(())
}

pub(crate) fn row_to_tx(r: &Row<'_>) -> rusqlite::Result<Transaction> {
    Ok(Transaction {
        id: r.get(0)?,
        date: r.get(1)?,
        description: r.get(2)?,
        amount: decimal_at(r, 3)?,
        r#type: r.get(4)?,
        category: r.get(5)?,
        sub_category: r.get(6)?,
        account: r.get(7)?,
        payment_method: r.get(8)?,
        status: r.get(9)?,
        notes: r.get(10)?,
        tags: tags_at(r, 11)?,
        created_at: r.get(12)?,
        updated_at: r.get(13)?,
    })
}

pub fn get(conn: &Connection, id: &str) -> Result<Transaction> {
    let sql = format!("SELECT {} FROM transactions WHERE id=?1", TX_COLUMNS);
    conn.query_row(&sql, params![id], row_to_tx)
        .optional()?
        .ok_or_else(|| FinanceError::NotFound("Transaction").into())
}

/// Every transaction, newest first.
pub fn list_all(conn: &Connection) -> Result<Vec<Transaction>> {
    let sql = format!(
        "SELECT {} FROM transactions ORDER BY date DESC, created_at DESC, rowid DESC",
        TX_COLUMNS
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([], row_to_tx)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

/// Transactions dated inside `[from, to)`.
pub fn between(conn: &Connection, from: NaiveDate, to: NaiveDate) -> Result<Vec<Transaction>> {
    let sql = format!(
        "SELECT {} FROM transactions WHERE date>=?1 AND date<?2 ORDER BY date DESC, created_at DESC",
        TX_COLUMNS
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![from, to], row_to_tx)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

fn insert(conn: &Connection, t: &Transaction) -> Result<()> {
    conn.execute(
        "INSERT INTO transactions(id, date, description, amount, type, category, sub_category,
            account, payment_method, status, notes, tags, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
        params![
            t.id,
            t.date,
            t.description,
            t.amount.to_string(),
            t.r#type,
            t.category,
            t.sub_category,
            t.account,
            t.payment_method,
            t.status,
            t.notes,
            serde_json::to_string(&t.tags)?,
            t.created_at,
            t.updated_at,
        ],
    )?;
    Ok(())
}

fn write(conn: &Connection, t: &Transaction) -> Result<()> {
    conn.execute(
        "UPDATE transactions SET date=?2, description=?3, amount=?4, type=?5, category=?6,
            sub_category=?7, account=?8, payment_method=?9, status=?10, notes=?11, tags=?12,
            updated_at=?13
         WHERE id=?1",
        params![
            t.id,
            t.date,
            t.description,
            t.amount.to_string(),
            t.r#type,
            t.category,
            t.sub_category,
            t.account,
            t.payment_method,
            t.status,
            t.notes,
            serde_json::to_string(&t.tags)?,
            t.updated_at,
        ],
    )?;
    Ok(())
}

fn validate(t: &Transaction) -> Result<()> {
    require_text("description", &t.description)?;
    require_text("account", &t.account)?;
    require_positive("amount", t.amount)?;
    Ok(())
}

/// Materializes a transaction from user input without touching storage.
pub fn build(input: NewTransaction) -> Result<Transaction> {
    let ts = now();
    let t = Transaction {
        id: new_id(),
        date: input.date.unwrap_or_else(today),
        description: input.description.trim().to_string(),
        amount: input.amount,
        r#type: input.r#type,
        category: input.category,
        sub_category: input.sub_category,
        account: input.account.trim().to_string(),
        payment_method: input.payment_method.unwrap_or_default(),
        status: input.status,
        notes: input.notes,
        tags: input.tags,
        created_at: ts,
        updated_at: ts,
    };
    validate(&t)?;
    Ok(t)
}

/// Stores `t`, posts it to its account and runs the deferred-payment debt
/// cascade, all on the caller's connection or open transaction.
pub fn record(conn: &Connection, t: &Transaction) -> Result<Option<DebtCascade>> {
    insert(conn, t)?;
    if !ledger::post(conn, t)? {
        tracing::warn!(tx = %t.id, account = %t.account, "transaction stored without a matching account");
    }
    ledger::cascade_debt(conn, t)
}

pub fn create(conn: &mut Connection, input: NewTransaction) -> Result<Transaction> {
    let t = build(input)?;
    let db = conn.transaction()?;
    record(&db, &t)?;
    db.commit()?;
    tracing::info!(id = %t.id, kind = %t.r#type, amount = %t.amount, account = %t.account, "transaction created");
    Ok(t)
}

fn apply(t: &mut Transaction, patch: TransactionUpdate) {
    if let Some(v) = patch.description {
        t.description = v.trim().to_string();
    }
    if let Some(v) = patch.amount {
        t.amount = v;
    }
    if let Some(v) = patch.r#type {
        t.r#type = v;
    }
    if let Some(v) = patch.category {
        t.category = v;
    }
    if patch.sub_category.is_some() {
        t.sub_category = patch.sub_category;
    }
    if let Some(v) = patch.account {
        t.account = v.trim().to_string();
    }
    if let Some(v) = patch.payment_method {
        t.payment_method = v;
    }
    if let Some(v) = patch.status {
        t.status = v;
    }
    if patch.notes.is_some() {
        t.notes = patch.notes;
    }
    if let Some(v) = patch.tags {
        t.tags = v;
    }
    if let Some(v) = patch.date {
        t.date = v;
    }
}

/// Rewrites a transaction: the old posting is reversed and the new one
/// applied, so a changed account, amount or type moves the money. Debts are
/// not revisited.
pub fn update(conn: &mut Connection, id: &str, patch: TransactionUpdate) -> Result<Transaction> {
    let db = conn.transaction()?;
    let old = get(&db, id)?;
    let mut new = old.clone();
    apply(&mut new, patch);
    validate(&new)?;
    new.updated_at = now();

    ledger::reverse(&db, &old)?;
    write(&db, &new)?;
    ledger::post(&db, &new)?;
    db.commit()?;
    tracing::info!(id = %new.id, "transaction updated");
    Ok(new)
}

/// Removes a transaction and reverses its posting. Debts it opened or
/// charged stay as they are.
pub fn delete(conn: &mut Connection, id: &str) -> Result<()> {
    let db = conn.transaction()?;
    let old = get(&db, id)?;
    ledger::reverse(&db, &old)?;
    db.execute("DELETE FROM transactions WHERE id=?1", params![id])?;
    db.commit()?;
    tracing::info!(id, "transaction deleted");
    Ok(())
}

// ------------------------------------------------------------------ search

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    #[default]
    Date,
    Amount,
    Description,
    Category,
    Account,
    CreatedAt,
}

impl SortField {
    fn column(&self) -> &'static str {
        match self {
            SortField::Date => "date",
            SortField::Amount => "CAST(amount AS REAL)",
            SortField::Description => "description",
            SortField::Category => "category",
            SortField::Account => "account",
            SortField::CreatedAt => "created_at",
        }
    }
}

impl std::str::FromStr for SortField {
    type Err = FinanceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "date" => Ok(SortField::Date),
            "amount" => Ok(SortField::Amount),
            "description" => Ok(SortField::Description),
            "category" => Ok(SortField::Category),
            "account" => Ok(SortField::Account),
            "created_at" => Ok(SortField::CreatedAt),
            other => Err(FinanceError::validation(format!("Invalid sort_by '{}'", other))),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    fn keyword(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// Filters for [`query`]. Every field is optional; unset ones do not filter.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TransactionQuery {
    pub search: Option<String>,
    pub r#type: Option<TransactionType>,
    pub category: Option<Category>,
    pub account: Option<String>,
    pub status: Option<TransactionStatus>,
    #[serde(default, with = "serde_date::option")]
    pub date_from: Option<NaiveDate>,
    #[serde(default, with = "serde_date::option")]
    pub date_to: Option<NaiveDate>,
    pub min_amount: Option<Decimal>,
    pub max_amount: Option<Decimal>,
    #[serde(default)]
    pub sort_by: SortField,
    #[serde(default)]
    pub sort_order: SortOrder,
    pub limit: Option<usize>,
}

pub fn query_from_args(sub: &clap::ArgMatches) -> Result<TransactionQuery> {
    Ok(TransactionQuery {
        search: sub.get_one::<String>("search").cloned(),
        r#type: sub.get_one::<String>("type").map(|s| s.parse()).transpose()?,
        category: sub
            .get_one::<String>("category")
            .map(|s| s.parse())
            .transpose()?,
        account: sub.get_one::<String>("account").cloned(),
        status: sub.get_one::<String>("status").map(|s| s.parse()).transpose()?,
        date_from: sub.get_one::<String>("from").map(|s| parse_date(s)).transpose()?,
        date_to: sub.get_one::<String>("to").map(|s| parse_date(s)).transpose()?,
        min_amount: sub.get_one::<String>("min").map(|s| parse_decimal(s)).transpose()?,
        max_amount: sub.get_one::<String>("max").map(|s| parse_decimal(s)).transpose()?,
        sort_by: sub
            .get_one::<String>("sort")
            .map(|s| s.parse())
            .transpose()?
            .unwrap_or_default(),
        sort_order: if sub.get_flag("asc") {
            SortOrder::Asc
        } else {
            SortOrder::Desc
        },
        limit: sub.get_one::<usize>("limit").copied(),
    })
}

fn amount_arg(v: Decimal) -> Result<f64> {
    v.to_f64()
        .ok_or_else(|| FinanceError::validation(format!("Amount {} out of range", v)).into())
}

/// Filtered, sorted search over transactions. Date bounds are inclusive and
/// the text search matches description or notes case-insensitively.
pub fn query(conn: &Connection, q: &TransactionQuery) -> Result<Vec<Transaction>> {
    let mut sql = format!("SELECT {} FROM transactions WHERE 1=1", TX_COLUMNS);
    let mut args: Vec<Box<dyn ToSql>> = Vec::new();

    if let Some(s) = q.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        sql.push_str(
            " AND (instr(lower(description), ?) > 0 OR instr(lower(IFNULL(notes, '')), ?) > 0)",
        );
        let needle = s.to_lowercase();
        args.push(Box::new(needle.clone()));
        args.push(Box::new(needle));
    }
    if let Some(t) = q.r#type {
        sql.push_str(" AND type=?");
        args.push(Box::new(t));
    }
    if let Some(c) = q.category {
        sql.push_str(" AND category=?");
        args.push(Box::new(c));
    }
    if let Some(a) = q.account.as_deref().filter(|a| !a.is_empty()) {
        sql.push_str(" AND account=?");
        args.push(Box::new(a.to_string()));
    }
    if let Some(s) = q.status {
        sql.push_str(" AND status=?");
        args.push(Box::new(s));
    }
    if let Some(d) = q.date_from {
        sql.push_str(" AND date>=?");
        args.push(Box::new(d));
    }
    if let Some(d) = q.date_to {
        sql.push_str(" AND date<=?");
        args.push(Box::new(d));
    }
    if let Some(v) = q.min_amount {
        sql.push_str(" AND CAST(amount AS REAL)>=?");
        args.push(Box::new(amount_arg(v)?));
    }
    if let Some(v) = q.max_amount {
        sql.push_str(" AND CAST(amount AS REAL)<=?");
        args.push(Box::new(amount_arg(v)?));
    }

    let dir = q.sort_order.keyword();
    sql.push_str(&format!(
        " ORDER BY {} {dir}, created_at {dir}, rowid {dir} LIMIT ?",
        q.sort_by.column()
    ));
    args.push(Box::new(q.limit.unwrap_or(DEFAULT_LIMIT) as i64));

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(rusqlite::params_from_iter(args.iter()), row_to_tx)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

// ------------------------------------------------------------------- stats

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct CategoryTotals {
    pub income: Decimal,
    pub expense: Decimal,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct TransactionStats {
    pub total_income: Decimal,
    pub total_expense: Decimal,
    pub net: Decimal,
    pub total_transactions: usize,
    pub category_breakdown: BTreeMap<String, CategoryTotals>,
}

pub fn summarize(txs: &[Transaction]) -> TransactionStats {
    let mut total_income = Decimal::ZERO;
    let mut total_expense = Decimal::ZERO;
    let mut breakdown: BTreeMap<String, CategoryTotals> = BTreeMap::new();
    for t in txs {
        let entry = breakdown.entry(t.category.to_string()).or_default();
        entry.count += 1;
        match t.r#type {
            TransactionType::Income => {
                total_income += t.amount;
                entry.income += t.amount;
            }
            TransactionType::Expense => {
                total_expense += t.amount;
                entry.expense += t.amount;
            }
        }
    }
    TransactionStats {
        total_income,
        total_expense,
        net: total_income - total_expense,
        total_transactions: txs.len(),
        category_breakdown: breakdown,
    }
}

pub fn stats(conn: &Connection) -> Result<TransactionStats> {
    Ok(summarize(&list_all(conn)?))
}
