// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use fintrack::commands::exporter::{self, ExportFormat};
use fintrack::commands::transactions;
use fintrack::{cli, db};
use rusqlite::Connection;
use serde_json::json;
use tempfile::tempdir;

fn seeded() -> Connection {
    let mut conn = db::open_in_memory().unwrap();
    for (date, desc, amount, notes, tags) in [
        ("2025-01-09", "Corner Shop", 12, Some("Weekly run"), vec!["home", "food"]),
        ("2025-01-02", "Payroll", 3000, None, vec![]),
    ] {
        let kind = if desc == "Payroll" { "income" } else { "expense" };
        let cat = if desc == "Payroll" { "Salary" } else { "Food" };
        transactions::create(
            &mut conn,
            serde_json::from_value(json!({
                "date": date,
                "description": desc,
                "amount": amount,
                "type": kind,
                "category": cat,
                "account": "Checking",
                "notes": notes,
                "tags": tags,
            }))
            .unwrap(),
        )
        .unwrap();
    }
    conn
}

#[test]
fn export_transactions_streams_pretty_json() {
    let conn = seeded();
    let dir = tempdir().unwrap();
    let out = dir.path().join("tx.json");

    let n = exporter::export_transactions(&conn, ExportFormat::Json, &out).unwrap();
    assert_eq!(n, 2);

    let text = std::fs::read_to_string(&out).unwrap();
    assert!(text.contains('\n'), "expected pretty-printed JSON");
    let v: serde_json::Value = serde_json::from_str(&text).unwrap();
    let rows = v.as_array().unwrap();
    assert_eq!(rows[0]["description"], "Payroll");
    assert_eq!(rows[0]["date"], "2025-01-02");
    assert_eq!(rows[1]["type"], "expense");
    assert_eq!(rows[1]["tags"], json!(["home", "food"]));
}

#[test]
fn export_transactions_writes_csv_header_and_rows() {
    let conn = seeded();
    let dir = tempdir().unwrap();
    let out = dir.path().join("tx.csv");

    exporter::export_transactions(&conn, ExportFormat::Csv, &out).unwrap();
    let mut rdr = csv::Reader::from_path(&out).unwrap();
    let headers = rdr.headers().unwrap().clone();
    assert_eq!(&headers[0], "id");
    assert_eq!(&headers[11], "tags");
    let rows: Vec<csv::StringRecord> = rdr.records().map(|r| r.unwrap()).collect();
    assert_eq!(rows.len(), 2);
    assert_eq!(&rows[1][2], "Corner Shop");
    assert_eq!(&rows[1][3], "12");
    assert_eq!(&rows[1][10], "Weekly run");
    assert_eq!(&rows[1][11], "home;food");
}

#[test]
fn export_rejects_unknown_format_before_writing() {
    let conn = seeded();
    let dir = tempdir().unwrap();
    let out = dir.path().join("tx.xml");
    let matches = cli::build_cli().get_matches_from([
        "fintrack",
        "export",
        "transactions",
        "--format",
        "xml",
        "--out",
        out.to_str().unwrap(),
    ]);
    let (_, sub) = matches.subcommand().unwrap();
    let err = exporter::handle(&conn, sub).unwrap_err();
    assert!(err.to_string().contains("Unknown format"));
    assert!(!out.exists());
}
