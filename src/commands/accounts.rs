// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use rusqlite::{Connection, OptionalExtension, Row, params};

use crate::commands::arg;
use crate::error::FinanceError;
use crate::models::{Account, AccountUpdate, NewAccount};
use crate::utils::{
    decimal_at, default_currency, fmt_money, maybe_print_json, new_id, now, parse_decimal,
    pretty_table, require_in_range, require_text,
};

const ACCOUNT_COLUMNS: &str = "id, name, type, balance, currency, created_at, updated_at";

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let input = NewAccount {
                name: arg(sub, "name")?.to_string(),
                r#type: arg(sub, "type")?.parse()?,
                balance: sub
                    .get_one::<String>("balance")
                    .map(|s| parse_decimal(s))
                    .transpose()?
                    .unwrap_or_default(),
                currency: sub.get_one::<String>("currency").cloned(),
            };
            let a = create(conn, input)?;
            println!("Added account {} ({}, {})", a.name, a.r#type, a.currency);
        }
        Some(("list", sub)) => {
            let data = list(conn)?;
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
                let rows = data
                    .iter()
                    .map(|a| {
                        vec![
                            a.name.clone(),
                            a.r#type.to_string(),
                            fmt_money(&a.balance, &a.currency),
                            a.id.clone(),
                        ]
                    })
                    .collect();
                println!("{}", pretty_table(&["Name", "Type", "Balance", "Id"], rows));
            }
        }
        Some(("rm", sub)) => {
            let name = arg(sub, "name")?;
            let a = find_by_name(conn, name)?.ok_or(FinanceError::NotFound("Account"))?;
            delete(conn, &a.id)?;
            println!("Removed account {}", a.name);
        }
        _ => {}
    }
    Ok(())
}

fn row_to_account(r: &Row<'_>) -> rusqlite::Result<Account> {
    Ok(Account {
        id: r.get(0)?,
        name: r.get(1)?,
        r#type: r.get(2)?,
        balance: decimal_at(r, 3)?,
        currency: r.get(4)?,
        created_at: r.get(5)?,
        updated_at: r.get(6)?,
    })
}

pub fn list(conn: &Connection) -> Result<Vec<Account>> {
    let sql = format!(
        "SELECT {} FROM accounts ORDER BY created_at, rowid",
        ACCOUNT_COLUMNS
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([], row_to_account)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

pub fn get(conn: &Connection, id: &str) -> Result<Account> {
    let sql = format!("SELECT {} FROM accounts WHERE id=?1", ACCOUNT_COLUMNS);
    conn.query_row(&sql, params![id], row_to_account)
        .optional()?
        .ok_or_else(|| FinanceError::NotFound("Account").into())
}

/// Exact, case-sensitive lookup; the same match the ledger uses.
pub fn find_by_name(conn: &Connection, name: &str) -> Result<Option<Account>> {
    let sql = format!(
        "SELECT {} FROM accounts WHERE name=?1 ORDER BY created_at LIMIT 1",
        ACCOUNT_COLUMNS
    );
    Ok(conn.query_row(&sql, params![name], row_to_account).optional()?)
}

/// SQLite's NOCASE folds ASCII only, so names are compared after Unicode
/// lowercasing here.
fn name_taken(conn: &Connection, name: &str, except: Option<&str>) -> Result<bool> {
    let wanted = name.to_lowercase();
    let mut stmt = conn.prepare("SELECT id, name FROM accounts")?;
    let rows = stmt.query_map([], |r| Ok((r.get::<_, String>(0)?, r.get::<_, String>(1)?)))?;
    for row in rows {
        let (id, existing) = row?;
        if Some(id.as_str()) != except && existing.to_lowercase() == wanted {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Names are unique ignoring case. The opening balance is taken as given.
pub fn create(conn: &Connection, input: NewAccount) -> Result<Account> {
    let name = input.name.trim().to_string();
    require_text("name", &name)?;
    require_in_range("balance", input.balance)?;
    if name_taken(conn, &name, None)? {
        return Err(FinanceError::conflict("Account name already exists").into());
    }
    let currency = match input.currency.map(|c| c.trim().to_uppercase()) {
        Some(c) if !c.is_empty() => c,
        _ => default_currency(conn)?,
    };
    let ts = now();
    let a = Account {
        id: new_id(),
        name,
        r#type: input.r#type,
        balance: input.balance,
        currency,
        created_at: ts,
        updated_at: ts,
    };
    conn.execute(
        "INSERT INTO accounts(id, name, type, balance, currency, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            a.id,
            a.name,
            a.r#type,
            a.balance.to_string(),
            a.currency,
            a.created_at,
            a.updated_at
        ],
    )?;
    tracing::info!(id = %a.id, name = %a.name, "account created");
    Ok(a)
}

/// Renames and retypes an account. The balance is owned by the ledger and
/// cannot be set here.
pub fn update(conn: &Connection, id: &str, patch: AccountUpdate) -> Result<Account> {
    let mut a = get(conn, id)?;
    if let Some(name) = patch.name {
        let name = name.trim().to_string();
        require_text("name", &name)?;
        if name_taken(conn, &name, Some(id))? {
            return Err(FinanceError::conflict("Account name already exists").into());
        }
        a.name = name;
    }
    if let Some(t) = patch.r#type {
        a.r#type = t;
    }
    if let Some(c) = patch.currency.map(|c| c.trim().to_uppercase()).filter(|c| !c.is_empty()) {
        a.currency = c;
    }
    a.updated_at = now();
    conn.execute(
        "UPDATE accounts SET name=?2, type=?3, currency=?4, updated_at=?5 WHERE id=?1",
        params![a.id, a.name, a.r#type, a.currency, a.updated_at],
    )?;
    Ok(a)
}

/// Transactions that name the account are left in place.
pub fn delete(conn: &Connection, id: &str) -> Result<()> {
    let n = conn.execute("DELETE FROM accounts WHERE id=?1", params![id])?;
    if n == 0 {
        return Err(FinanceError::NotFound("Account").into());
    }
    tracing::info!(id, "account deleted");
    Ok(())
}
