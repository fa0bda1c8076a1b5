// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use rusqlite::{Connection, OptionalExtension, Row, params};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::commands::arg;
use crate::error::FinanceError;
use crate::models::{Budget, BudgetUpdate, Category, NewBudget, TransactionType};
use crate::utils::{
    decimal_at, maybe_print_json, month_bounds, month_of, new_id, now, parse_decimal,
    parse_month, percent, pretty_table, require_positive, today,
};

const BUDGET_COLUMNS: &str = "id, category, amount, period, month_year, is_active, created_at, updated_at";

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("set", sub)) => set(conn, sub)?,
        Some(("list", sub)) => {
            let month = sub.get_one::<String>("month").map(|s| parse_month(s)).transpose()?;
            let data = list(conn, month.as_deref())?;
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
                let rows = data
                    .iter()
                    .map(|b| {
                        vec![
                            b.month_year.clone(),
                            b.category.to_string(),
                            format!("{:.2}", b.amount),
                            format!("{:.2}", b.spent),
                            format!("{:.2}", b.amount - b.spent),
                        ]
                    })
                    .collect();
                println!(
                    "{}",
                    pretty_table(&["Month", "Category", "Budget", "Spent", "Left"], rows)
                );
            }
        }
        Some(("summary", sub)) => {
            let month = match sub.get_one::<String>("month") {
                Some(m) => parse_month(m)?,
                None => month_of(today()),
            };
            let s = summary(conn, &month)?;
            if !maybe_print_json(sub.get_flag("json"), false, &s)? {
                println!(
                    "{}",
                    pretty_table(
                        &["Month", "Budget", "Spent", "Remaining", "Used %", "Over", "Near"],
                        vec![vec![
                            s.month_year.clone(),
                            format!("{:.2}", s.total_budget),
                            format!("{:.2}", s.total_spent),
                            format!("{:.2}", s.remaining),
                            format!("{:.2}", s.utilization_percentage),
                            s.over_budget_count.to_string(),
                            s.near_limit_count.to_string(),
                        ]],
                    )
                );
            }
        }
        _ => {}
    }
    Ok(())
}

/// Creates the month's budget for a category, or changes its amount when one exists.
fn set(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let category: Category = arg(sub, "category")?.parse()?;
    let amount = parse_decimal(arg(sub, "amount")?)?;
    let month = match sub.get_one::<String>("month") {
        Some(m) => parse_month(m)?,
        None => month_of(today()),
    };
    let existing: Option<String> = conn
        .query_row(
            "SELECT id FROM budgets WHERE category=?1 AND month_year=?2",
            params![category, month],
            |r| r.get(0),
        )
        .optional()?;
    let b = match existing {
        Some(id) => update(
            conn,
            &id,
            BudgetUpdate {
                amount: Some(amount),
                ..Default::default()
            },
        )?,
        None => create(
            conn,
            NewBudget {
                category,
                amount,
                period: Default::default(),
                month_year: Some(month),
            },
        )?,
    };
    println!("Budget set for {} / {} = {}", b.month_year, b.category, b.amount);
    Ok(())
}

/// Sum of the category's expenses dated inside `month_year`.
pub fn budget_spent(conn: &Connection, category: Category, month_year: &str) -> Result<Decimal> {
    let (start, end) = month_bounds(month_year)?;
    spent_between(conn, category, start, end)
}

fn spent_between(
    conn: &Connection,
    category: Category,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Decimal> {
    let mut stmt = conn.prepare(
        "SELECT amount FROM transactions
         WHERE type=?1 AND category=?2 AND date>=?3 AND date<?4",
    )?;
    let mut rows = stmt.query(params![TransactionType::Expense, category, start, end])?;
    let mut spent = Decimal::ZERO;
    while let Some(r) = rows.next()? {
        let s: String = r.get(0)?;
        spent += s
            .parse::<Decimal>()
            .with_context(|| format!("Invalid amount '{}' in transactions", s))?;
    }
    Ok(spent)
}

fn row_to_budget(r: &Row<'_>) -> rusqlite::Result<Budget> {
    Ok(Budget {
        id: r.get(0)?,
        category: r.get(1)?,
        amount: decimal_at(r, 2)?,
        period: r.get(3)?,
        month_year: r.get(4)?,
        spent: Decimal::ZERO,
        is_active: r.get(5)?,
        created_at: r.get(6)?,
        updated_at: r.get(7)?,
    })
}

fn with_spent(conn: &Connection, mut b: Budget) -> Result<Budget> {
    b.spent = budget_spent(conn, b.category, &b.month_year)?;
    Ok(b)
}

/// Budgets (optionally of one month) with `spent` filled in.
pub fn list(conn: &Connection, month_year: Option<&str>) -> Result<Vec<Budget>> {
    let budgets = match month_year.map(parse_month).transpose()? {
        Some(m) => {
            let sql = format!(
                "SELECT {} FROM budgets WHERE month_year=?1 ORDER BY category",
                BUDGET_COLUMNS
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(params![m], row_to_budget)?;
            rows.collect::<rusqlite::Result<Vec<_>>>()?
        }
        None => {
            let sql = format!(
                "SELECT {} FROM budgets ORDER BY month_year DESC, category",
                BUDGET_COLUMNS
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map([], row_to_budget)?;
            rows.collect::<rusqlite::Result<Vec<_>>>()?
        }
    };
    budgets.into_iter().map(|b| with_spent(conn, b)).collect()
}

pub fn get(conn: &Connection, id: &str) -> Result<Budget> {
    let sql = format!("SELECT {} FROM budgets WHERE id=?1", BUDGET_COLUMNS);
    let b = conn
        .query_row(&sql, params![id], row_to_budget)
        .optional()?
        .ok_or(FinanceError::NotFound("Budget"))?;
    with_spent(conn, b)
}

fn taken(conn: &Connection, category: Category, month_year: &str, except: &str) -> Result<bool> {
    let n: i64 = conn.query_row(
        "SELECT COUNT(*) FROM budgets WHERE category=?1 AND month_year=?2 AND id<>?3",
        params![category, month_year, except],
        |r| r.get(0),
    )?;
    Ok(n > 0)
}

pub fn create(conn: &Connection, input: NewBudget) -> Result<Budget> {
    require_positive("amount", input.amount)?;
    let month_year = match input.month_year.filter(|m| !m.trim().is_empty()) {
        Some(m) => parse_month(&m)?,
        None => month_of(today()),
    };
    if taken(conn, input.category, &month_year, "")? {
        return Err(FinanceError::conflict("Budget for this category and month already exists").into());
    }
    let ts = now();
    let b = Budget {
        id: new_id(),
        category: input.category,
        amount: input.amount,
        period: input.period,
        month_year,
        spent: Decimal::ZERO,
        is_active: true,
        created_at: ts,
        updated_at: ts,
    };
    conn.execute(
        "INSERT INTO budgets(id, category, amount, period, month_year, is_active, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            b.id,
            b.category,
            b.amount.to_string(),
            b.period,
            b.month_year,
            b.is_active,
            b.created_at,
            b.updated_at
        ],
    )?;
    tracing::info!(id = %b.id, category = %b.category, month = %b.month_year, "budget created");
    with_spent(conn, b)
}

pub fn update(conn: &Connection, id: &str, p: BudgetUpdate) -> Result<Budget> {
    let mut b = get(conn, id)?;
    if let Some(v) = p.category {
        b.category = v;
    }
    if let Some(v) = p.amount {
        require_positive("amount", v)?;
        b.amount = v;
    }
    if let Some(v) = p.period {
        b.period = v;
    }
    if let Some(v) = p.month_year {
        b.month_year = parse_month(&v)?;
    }
    if let Some(v) = p.is_active {
        b.is_active = v;
    }
    if taken(conn, b.category, &b.month_year, &b.id)? {
        return Err(FinanceError::conflict("Budget for this category and month already exists").into());
    }
    b.updated_at = now();
    conn.execute(
        "UPDATE budgets SET category=?2, amount=?3, period=?4, month_year=?5, is_active=?6,
            updated_at=?7
         WHERE id=?1",
        params![
            b.id,
            b.category,
            b.amount.to_string(),
            b.period,
            b.month_year,
            b.is_active,
            b.updated_at
        ],
    )?;
    with_spent(conn, b)
}

pub fn delete(conn: &Connection, id: &str) -> Result<()> {
    if conn.execute("DELETE FROM budgets WHERE id=?1", params![id])? == 0 {
        return Err(FinanceError::NotFound("Budget").into());
    }
    tracing::info!(id, "budget deleted");
    Ok(())
}

#[derive(Debug, Clone, Serialize)]
pub struct BudgetSummary {
    pub month_year: String,
    pub total_budget: Decimal,
    pub total_spent: Decimal,
    pub remaining: Decimal,
    pub utilization_percentage: Decimal,
    pub budgets_count: usize,
    pub over_budget_count: usize,
    pub near_limit_count: usize,
    pub budgets: Vec<Budget>,
}

/// Near the limit means at least 80% used without going over.
pub fn is_near_limit(b: &Budget) -> bool {
    b.spent >= b.amount * Decimal::new(8, 1) && b.spent <= b.amount
}

pub fn summarize(month_year: &str, budgets: Vec<Budget>) -> BudgetSummary {
    let total_budget: Decimal = budgets.iter().map(|b| b.amount).sum();
    let total_spent: Decimal = budgets.iter().map(|b| b.spent).sum();
    let utilization_percentage = percent(total_spent, total_budget).round_dp(2);
    BudgetSummary {
        month_year: month_year.to_string(),
        total_budget,
        total_spent,
        remaining: total_budget - total_spent,
        utilization_percentage,
        budgets_count: budgets.len(),
        over_budget_count: budgets.iter().filter(|b| b.spent > b.amount).count(),
        near_limit_count: budgets.iter().filter(|b| is_near_limit(b)).count(),
        budgets,
    }
}

pub fn summary(conn: &Connection, month_year: &str) -> Result<BudgetSummary> {
    let month_year = parse_month(month_year)?;
    let budgets = list(conn, Some(&month_year))?;
    Ok(summarize(&month_year, budgets))
}
