// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::Connection;

use crate::commands::{arg, transactions};
use crate::error::FinanceError;
use crate::models::Transaction;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("transactions", sub)) => {
            let fmt: ExportFormat = arg(sub, "format")?.parse()?;
            let out = arg(sub, "out")?;
            let n = export_transactions(conn, fmt, Path::new(out))?;
            println!("Exported {} transactions to {}", n, out);
            Ok(())
        }
        _ => Ok(()),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl std::str::FromStr for ExportFormat {
    type Err = FinanceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            other => Err(FinanceError::validation(format!(
                "Unknown format: {} (use csv|json)",
                other
            ))),
        }
    }
}

/// Oldest first, ties broken by creation time.
fn chronological(conn: &Connection) -> Result<Vec<Transaction>> {
    let mut txs = transactions::list_all(conn)?;
    txs.sort_by(|a, b| a.date.cmp(&b.date).then(a.created_at.cmp(&b.created_at)));
    Ok(txs)
}

pub fn write_csv<W: std::io::Write>(txs: &[Transaction], w: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(w);
    wtr.write_record([
        "id",
        "date",
        "description",
        "amount",
        "type",
        "category",
        "sub_category",
        "account",
        "payment_method",
        "status",
        "notes",
        "tags",
    ])?;
    for t in txs {
        wtr.write_record([
            t.id.clone(),
            t.date.to_string(),
            t.description.clone(),
            t.amount.to_string(),
            t.r#type.to_string(),
            t.category.to_string(),
            t.sub_category.map(|s| s.to_string()).unwrap_or_default(),
            t.account.clone(),
            t.payment_method.to_string(),
            t.status.to_string(),
            t.notes.clone().unwrap_or_default(),
            t.tags.join(";"),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Writes every transaction to `out` and returns how many were written.
pub fn export_transactions(conn: &Connection, fmt: ExportFormat, out: &Path) -> Result<usize> {
    let txs = chronological(conn)?;
    match fmt {
        ExportFormat::Csv => {
            let file = std::fs::File::create(out)
                .with_context(|| format!("Create {}", out.display()))?;
            write_csv(&txs, file)?;
        }
        ExportFormat::Json => {
            std::fs::write(out, serde_json::to_string_pretty(&txs)?)
                .with_context(|| format!("Write {}", out.display()))?;
        }
    }
    tracing::info!(count = txs.len(), path = %out.display(), "transactions exported");
    Ok(txs.len())
}
