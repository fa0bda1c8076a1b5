// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use comfy_table::{Cell, Table, presets::UTF8_FULL};
use once_cell::sync::Lazy;
use regex::Regex;
use rusqlite::{Connection, OptionalExtension, Row, params};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::error::FinanceError;

pub const DEFAULT_CURRENCY_KEY: &str = "default_currency";
pub const BILL_ACCOUNT_KEY: &str = "bill_payment_account";
pub const KNOWN_SETTINGS: &[&str] = &[DEFAULT_CURRENCY_KEY, BILL_ACCOUNT_KEY];

static MONTH_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-(0[1-9]|1[0-2])$").expect("month pattern compiles"));

pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

pub fn now() -> DateTime<Utc> {
    Utc::now()
}

pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Accepts `YYYY-MM-DD` or an RFC 3339 timestamp, keeping only the date part.
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    parse_flexible_date(s).ok_or_else(|| {
        FinanceError::validation(format!("Invalid date '{}', expected YYYY-MM-DD", s)).into()
    })
}

fn parse_flexible_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|d| d.date_naive()))
        .or_else(|| {
            chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|d| d.date())
        })
}

pub fn parse_month(s: &str) -> Result<String> {
    let s = s.trim();
    if !MONTH_RE.is_match(s) {
        return Err(
            FinanceError::validation(format!("Invalid month '{}', expected YYYY-MM", s)).into(),
        );
    }
    Ok(s.to_string())
}

pub fn parse_decimal(s: &str) -> Result<Decimal> {
    s.trim()
        .parse::<Decimal>()
        .map_err(|_| FinanceError::validation(format!("Invalid decimal '{}'", s)).into())
}

/// Day-of-month strings such as "05" or "15".
pub fn parse_day_of_month(s: &str) -> Result<u32> {
    match s.trim().parse::<u32>() {
        Ok(d) if (1..=31).contains(&d) => Ok(d),
        _ => Err(FinanceError::validation(format!(
            "Invalid due date '{}', expected a day of month 1-31",
            s
        ))
        .into()),
    }
}

/// Largest magnitude accepted for any stored amount, quantity or price (10^15).
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(0xA4C6_8000, 0x0003_8D7E, 0, false, 0);

pub fn require_positive(field: &str, v: Decimal) -> Result<()> {
    if v <= Decimal::ZERO {
        return Err(FinanceError::validation(format!("{} must be greater than 0", field)).into());
    }
    require_in_range(field, v)
}

pub fn require_non_negative(field: &str, v: Decimal) -> Result<()> {
    if v < Decimal::ZERO {
        return Err(FinanceError::validation(format!("{} must not be negative", field)).into());
    }
    require_in_range(field, v)
}

pub fn require_in_range(field: &str, v: Decimal) -> Result<()> {
    if v.abs() > MAX_AMOUNT {
        return Err(
            FinanceError::validation(format!("{} must not exceed {}", field, MAX_AMOUNT)).into(),
        );
    }
    Ok(())
}

/// Turns the `None` of a checked operation into a validation error.
pub fn in_range(v: Option<Decimal>, what: &str) -> Result<Decimal> {
    v.ok_or_else(|| FinanceError::validation(format!("{} is out of range", what)).into())
}

pub fn checked_sum<I>(values: I, what: &str) -> Result<Decimal>
where
    I: IntoIterator<Item = Decimal>,
{
    values
        .into_iter()
        .try_fold(Decimal::ZERO, |acc, v| in_range(acc.checked_add(v), what))
}

/// `part / whole * 100`, zero when `whole` is not positive. Saturates instead
/// of overflowing when `whole` is tiny.
pub fn percent(part: Decimal, whole: Decimal) -> Decimal {
    if whole <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    let saturated = if part.is_sign_negative() {
        Decimal::MIN
    } else {
        Decimal::MAX
    };
    part.checked_div(whole)
        .and_then(|q| q.checked_mul(Decimal::ONE_HUNDRED))
        .unwrap_or(saturated)
}

pub fn require_text(field: &str, s: &str) -> Result<()> {
    if s.trim().is_empty() {
        return Err(FinanceError::validation(format!("{} must not be empty", field)).into());
    }
    Ok(())
}

pub fn month_of(date: NaiveDate) -> String {
    date.format("%Y-%m").to_string()
}

/// Half-open range `[first day, first day of next month)` for a `YYYY-MM` bucket.
pub fn month_bounds(month: &str) -> Result<(NaiveDate, NaiveDate)> {
    let month = parse_month(month)?;
    let start = NaiveDate::parse_from_str(&format!("{}-01", month), "%Y-%m-%d")
        .map_err(|_| FinanceError::validation(format!("Invalid month '{}'", month)))?;
    let (y, m) = next_month(start.year(), start.month());
    let end = NaiveDate::from_ymd_opt(y, m, 1)
        .ok_or_else(|| FinanceError::validation(format!("Invalid month '{}'", month)))?;
    Ok((start, end))
}

pub fn next_month(year: i32, month: u32) -> (i32, u32) {
    if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    }
}

pub fn days_in_month(year: i32, month: u32) -> u32 {
    let (ny, nm) = next_month(year, month);
    NaiveDate::from_ymd_opt(ny, nm, 1)
        .and_then(|d| d.pred_opt())
        .map(|d| d.day())
        .unwrap_or(28)
}

pub fn fmt_money(d: &Decimal, ccy: &str) -> String {
    format!("{} {}", ccy, d.round_dp(2))
}

pub fn pretty_table(headers: &[&str], rows: Vec<Vec<String>>) -> Table {
    let mut t = Table::new();
    t.load_preset(UTF8_FULL);
    t.set_header(headers.iter().map(|h| Cell::new(*h)));
    for r in rows {
        t.add_row(r.into_iter().map(Cell::new));
    }
    t
}

pub fn maybe_print_json<T: serde::Serialize>(
    json_flag: bool,
    jsonl_flag: bool,
    v: &T,
) -> Result<bool> {
    if json_flag {
        println!("{}", serde_json::to_string_pretty(v)?);
        return Ok(true);
    }
    if jsonl_flag {
        // If v is an array, stream each element; else stream single line
        let val = serde_json::to_value(v)?;
        if let Some(arr) = val.as_array() {
            for item in arr {
                println!("{}", serde_json::to_string(item)?);
            }
        } else {
            println!("{}", serde_json::to_string(&val)?);
        }
        return Ok(true);
    }
    Ok(false)
}

/// Decimals are stored as TEXT to keep them exact.
pub fn decimal_at(r: &Row<'_>, idx: usize) -> rusqlite::Result<Decimal> {
    let s: String = r.get(idx)?;
    s.parse::<Decimal>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

pub fn tags_at(r: &Row<'_>, idx: usize) -> rusqlite::Result<Vec<String>> {
    let s: String = r.get(idx)?;
    serde_json::from_str(&s).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

// Persisted settings
pub fn get_setting(conn: &Connection, key: &str) -> Result<Option<String>> {
    let v: Option<String> = conn
        .query_row(
            "SELECT value FROM settings WHERE key=?1",
            params![key],
            |r| r.get(0),
        )
        .optional()?;
    Ok(v)
}

pub fn set_setting(conn: &Connection, key: &str, value: &str) -> Result<()> {
    if !KNOWN_SETTINGS.contains(&key) {
        return Err(FinanceError::validation(format!(
            "Unknown setting '{}' (known: {})",
            key,
            KNOWN_SETTINGS.join(", ")
        ))
        .into());
    }
    conn.execute(
        "INSERT INTO settings(key, value) VALUES(?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value=excluded.value",
        params![key, value],
    )?;
    Ok(())
}

pub fn default_currency(conn: &Connection) -> Result<String> {
    Ok(get_setting(conn, DEFAULT_CURRENCY_KEY)?.unwrap_or_else(|| "IDR".to_string()))
}

/// Account debited by legacy bill payments.
pub fn bill_payment_account(conn: &Connection) -> Result<String> {
    Ok(get_setting(conn, BILL_ACCOUNT_KEY)?.unwrap_or_else(|| "Cash".to_string()))
}

/// Serde adapters for business dates that may arrive as full timestamps.
pub mod serde_date {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &NaiveDate, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&d.format("%Y-%m-%d").to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(d)?;
        super::parse_flexible_date(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid date '{}'", raw)))
    }

    pub mod option {
        use chrono::NaiveDate;
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(d: &Option<NaiveDate>, s: S) -> Result<S::Ok, S::Error> {
            match d {
                Some(d) => s.serialize_str(&d.format("%Y-%m-%d").to_string()),
                None => s.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveDate>, D::Error> {
            match Option::<String>::deserialize(d)? {
                Some(raw) if !raw.trim().is_empty() => super::super::parse_flexible_date(&raw)
                    .map(Some)
                    .ok_or_else(|| serde::de::Error::custom(format!("invalid date '{}'", raw))),
                _ => Ok(None),
            }
        }
    }
}
