// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Stocks, time deposits, gold and mutual funds. Each instrument lives in its
//! own table; [`InstrumentKind`] dispatches the generic `/investments/detailed`
//! surface onto them.

use anyhow::Result;
use chrono::{Months, NaiveDate};
use rusqlite::{Connection, OptionalExtension, Row, params};
use rust_decimal::Decimal;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::FinanceError;
use crate::models::{
    Deposit, DepositUpdate, Gold, GoldUpdate, InstrumentKind, MutualFund, MutualFundUpdate,
    NewDeposit, NewGold, NewMutualFund, NewStock, Stock, StockUpdate,
};
use crate::utils::{
    checked_sum, decimal_at, in_range, new_id, now, require_in_range, require_non_negative,
    require_positive, require_text, today,
};

fn maturity(start: NaiveDate, tenor_months: u32) -> Result<NaiveDate> {
    start
        .checked_add_months(Months::new(tenor_months))
        .ok_or_else(|| FinanceError::validation("Deposit maturity is out of range").into())
}

fn not_found(kind: InstrumentKind) -> FinanceError {
    match kind {
        InstrumentKind::Stocks => FinanceError::NotFound("Stock"),
        InstrumentKind::Deposits => FinanceError::NotFound("Deposit"),
        InstrumentKind::Gold => FinanceError::NotFound("Gold"),
        InstrumentKind::MutualFunds => FinanceError::NotFound("Mutual fund"),
    }
}

fn delete_from(conn: &Connection, kind: InstrumentKind, id: &str) -> Result<()> {
    let sql = format!("DELETE FROM {} WHERE id=?1", kind.as_str());
    if conn.execute(&sql, params![id])? == 0 {
        return Err(not_found(kind).into());
    }
    tracing::info!(kind = %kind, id, "investment deleted");
    Ok(())
}

// ------------------------------------------------------------------ stocks

const STOCK_COLUMNS: &str = "id, ticker, name, securities, lots, buy_price, current_price, \
     buy_date, notes, created_at, updated_at";

fn row_to_stock(r: &Row<'_>) -> rusqlite::Result<Stock> {
    Ok(Stock {
        id: r.get(0)?,
        ticker: r.get(1)?,
        name: r.get(2)?,
        securities: r.get(3)?,
        lots: decimal_at(r, 4)?,
        buy_price: decimal_at(r, 5)?,
        current_price: decimal_at(r, 6)?,
        buy_date: r.get(7)?,
        notes: r.get(8)?,
        created_at: r.get(9)?,
        updated_at: r.get(10)?,
    })
}

pub fn list_stocks(conn: &Connection) -> Result<Vec<Stock>> {
    let sql = format!("SELECT {} FROM stocks ORDER BY created_at, rowid", STOCK_COLUMNS);
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([], row_to_stock)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

pub fn get_stock(conn: &Connection, id: &str) -> Result<Stock> {
    let sql = format!("SELECT {} FROM stocks WHERE id=?1", STOCK_COLUMNS);
    conn.query_row(&sql, params![id], row_to_stock)
        .optional()?
        .ok_or_else(|| not_found(InstrumentKind::Stocks).into())
}

fn validate_stock(s: &Stock) -> Result<()> {
    require_text("ticker", &s.ticker)?;
    require_positive("lots", s.lots)?;
    require_non_negative("buy_price", s.buy_price)?;
    require_non_negative("current_price", s.current_price)?;
    require_value(s.current_value())
}

fn save_stock(conn: &Connection, s: &Stock) -> Result<()> {
    conn.execute(
        "INSERT INTO stocks(id, ticker, name, securities, lots, buy_price, current_price,
            buy_date, notes, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
         ON CONFLICT(id) DO UPDATE SET ticker=excluded.ticker, name=excluded.name,
            securities=excluded.securities, lots=excluded.lots, buy_price=excluded.buy_price,
            current_price=excluded.current_price, buy_date=excluded.buy_date,
            notes=excluded.notes, updated_at=excluded.updated_at",
        params![
            s.id,
            s.ticker,
            s.name,
            s.securities,
            s.lots.to_string(),
            s.buy_price.to_string(),
            s.current_price.to_string(),
            s.buy_date,
            s.notes,
            s.created_at,
            s.updated_at,
        ],
    )?;
    Ok(())
}

pub fn create_stock(conn: &Connection, input: NewStock) -> Result<Stock> {
    let ts = now();
    let s = Stock {
        id: new_id(),
        ticker: input.ticker.trim().to_uppercase(),
        name: input.name,
        securities: input.securities,
        lots: input.lots,
        buy_price: input.buy_price,
        current_price: input.current_price,
        buy_date: input.buy_date.unwrap_or_else(today),
        notes: input.notes,
        created_at: ts,
        updated_at: ts,
    };
    validate_stock(&s)?;
    save_stock(conn, &s)?;
    tracing::info!(id = %s.id, ticker = %s.ticker, "stock added");
    Ok(s)
}

pub fn update_stock(conn: &Connection, id: &str, p: StockUpdate) -> Result<Stock> {
    let mut s = get_stock(conn, id)?;
    if let Some(v) = p.ticker {
        s.ticker = v.trim().to_uppercase();
    }
    if let Some(v) = p.name {
        s.name = v;
    }
    if let Some(v) = p.securities {
        s.securities = v;
    }
    if let Some(v) = p.lots {
        s.lots = v;
    }
    if let Some(v) = p.buy_price {
        s.buy_price = v;
    }
    if let Some(v) = p.current_price {
        s.current_price = v;
    }
    if let Some(v) = p.buy_date {
        s.buy_date = v;
    }
    if p.notes.is_some() {
        s.notes = p.notes;
    }
    validate_stock(&s)?;
    s.updated_at = now();
    save_stock(conn, &s)?;
    Ok(s)
}

pub fn delete_stock(conn: &Connection, id: &str) -> Result<()> {
    delete_from(conn, InstrumentKind::Stocks, id)
}

// ---------------------------------------------------------------- deposits

const DEPOSIT_COLUMNS: &str = "id, bank_name, amount, tenor_months, interest_rate, start_date, \
     maturity_date, is_auto_renewal, notes, created_at, updated_at";

fn row_to_deposit(r: &Row<'_>) -> rusqlite::Result<Deposit> {
    Ok(Deposit {
        id: r.get(0)?,
        bank_name: r.get(1)?,
        amount: decimal_at(r, 2)?,
        tenor_months: r.get(3)?,
        interest_rate: decimal_at(r, 4)?,
        start_date: r.get(5)?,
        maturity_date: r.get(6)?,
        is_auto_renewal: r.get(7)?,
        notes: r.get(8)?,
        created_at: r.get(9)?,
        updated_at: r.get(10)?,
    })
}

pub fn list_deposits(conn: &Connection) -> Result<Vec<Deposit>> {
    let sql = format!("SELECT {} FROM deposits ORDER BY created_at, rowid", DEPOSIT_COLUMNS);
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([], row_to_deposit)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

pub fn get_deposit(conn: &Connection, id: &str) -> Result<Deposit> {
    let sql = format!("SELECT {} FROM deposits WHERE id=?1", DEPOSIT_COLUMNS);
    conn.query_row(&sql, params![id], row_to_deposit)
        .optional()?
        .ok_or_else(|| not_found(InstrumentKind::Deposits).into())
}

fn validate_deposit(d: &Deposit) -> Result<()> {
    require_text("bank_name", &d.bank_name)?;
    require_positive("amount", d.amount)?;
    require_non_negative("interest_rate", d.interest_rate)?;
    if d.tenor_months == 0 {
        return Err(FinanceError::validation("tenor_months must be greater than 0").into());
    }
    Ok(())
}

fn save_deposit(conn: &Connection, d: &Deposit) -> Result<()> {
    conn.execute(
        "INSERT INTO deposits(id, bank_name, amount, tenor_months, interest_rate, start_date,
            maturity_date, is_auto_renewal, notes, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
         ON CONFLICT(id) DO UPDATE SET bank_name=excluded.bank_name, amount=excluded.amount,
            tenor_months=excluded.tenor_months, interest_rate=excluded.interest_rate,
            start_date=excluded.start_date, maturity_date=excluded.maturity_date,
            is_auto_renewal=excluded.is_auto_renewal, notes=excluded.notes,
            updated_at=excluded.updated_at",
        params![
            d.id,
            d.bank_name,
            d.amount.to_string(),
            d.tenor_months,
            d.interest_rate.to_string(),
            d.start_date,
            d.maturity_date,
            d.is_auto_renewal,
            d.notes,
            d.created_at,
            d.updated_at,
        ],
    )?;
    Ok(())
}

/// The maturity date is always derived as start date plus tenor.
pub fn create_deposit(conn: &Connection, input: NewDeposit) -> Result<Deposit> {
    let ts = now();
    let start = input.start_date.unwrap_or_else(today);
    let mut d = Deposit {
        id: new_id(),
        bank_name: input.bank_name.trim().to_string(),
        amount: input.amount,
        tenor_months: input.tenor_months,
        interest_rate: input.interest_rate,
        start_date: start,
        maturity_date: start,
        is_auto_renewal: input.is_auto_renewal,
        notes: input.notes,
        created_at: ts,
        updated_at: ts,
    };
    validate_deposit(&d)?;
    d.maturity_date = maturity(d.start_date, d.tenor_months)?;
    save_deposit(conn, &d)?;
    tracing::info!(id = %d.id, bank = %d.bank_name, "deposit added");
    Ok(d)
}

pub fn update_deposit(conn: &Connection, id: &str, p: DepositUpdate) -> Result<Deposit> {
    let mut d = get_deposit(conn, id)?;
    if let Some(v) = p.bank_name {
        d.bank_name = v.trim().to_string();
    }
    if let Some(v) = p.amount {
        d.amount = v;
    }
    if let Some(v) = p.tenor_months {
        d.tenor_months = v;
    }
    if let Some(v) = p.interest_rate {
        d.interest_rate = v;
    }
    if let Some(v) = p.start_date {
        d.start_date = v;
    }
    if let Some(v) = p.is_auto_renewal {
        d.is_auto_renewal = v;
    }
    if p.notes.is_some() {
        d.notes = p.notes;
    }
    validate_deposit(&d)?;
    d.maturity_date = maturity(d.start_date, d.tenor_months)?;
    d.updated_at = now();
    save_deposit(conn, &d)?;
    Ok(d)
}

pub fn delete_deposit(conn: &Connection, id: &str) -> Result<()> {
    delete_from(conn, InstrumentKind::Deposits, id)
}

// -------------------------------------------------------------------- gold

const GOLD_COLUMNS: &str = "id, type, weight_grams, buy_price_per_gram, current_price_per_gram, \
     purchase_location, buy_date, certificate_number, notes, created_at, updated_at";

fn row_to_gold(r: &Row<'_>) -> rusqlite::Result<Gold> {
    Ok(Gold {
        id: r.get(0)?,
        r#type: r.get(1)?,
        weight_grams: decimal_at(r, 2)?,
        buy_price_per_gram: decimal_at(r, 3)?,
        current_price_per_gram: decimal_at(r, 4)?,
        purchase_location: r.get(5)?,
        buy_date: r.get(6)?,
        certificate_number: r.get(7)?,
        notes: r.get(8)?,
        created_at: r.get(9)?,
        updated_at: r.get(10)?,
    })
}

pub fn list_gold(conn: &Connection) -> Result<Vec<Gold>> {
    let sql = format!("SELECT {} FROM gold ORDER BY created_at, rowid", GOLD_COLUMNS);
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([], row_to_gold)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

pub fn get_gold(conn: &Connection, id: &str) -> Result<Gold> {
    let sql = format!("SELECT {} FROM gold WHERE id=?1", GOLD_COLUMNS);
    conn.query_row(&sql, params![id], row_to_gold)
        .optional()?
        .ok_or_else(|| not_found(InstrumentKind::Gold).into())
}

fn validate_gold(g: &Gold) -> Result<()> {
    require_positive("weight_grams", g.weight_grams)?;
    require_non_negative("buy_price_per_gram", g.buy_price_per_gram)?;
    require_non_negative("current_price_per_gram", g.current_price_per_gram)?;
    require_value(g.current_value())
}

fn save_gold(conn: &Connection, g: &Gold) -> Result<()> {
    conn.execute(
        "INSERT INTO gold(id, type, weight_grams, buy_price_per_gram, current_price_per_gram,
            purchase_location, buy_date, certificate_number, notes, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
         ON CONFLICT(id) DO UPDATE SET type=excluded.type, weight_grams=excluded.weight_grams,
            buy_price_per_gram=excluded.buy_price_per_gram,
            current_price_per_gram=excluded.current_price_per_gram,
            purchase_location=excluded.purchase_location, buy_date=excluded.buy_date,
            certificate_number=excluded.certificate_number, notes=excluded.notes,
            updated_at=excluded.updated_at",
        params![
            g.id,
            g.r#type,
            g.weight_grams.to_string(),
            g.buy_price_per_gram.to_string(),
            g.current_price_per_gram.to_string(),
            g.purchase_location,
            g.buy_date,
            g.certificate_number,
            g.notes,
            g.created_at,
            g.updated_at,
        ],
    )?;
    Ok(())
}

pub fn create_gold(conn: &Connection, input: NewGold) -> Result<Gold> {
    let ts = now();
    let g = Gold {
        id: new_id(),
        r#type: input.r#type,
        weight_grams: input.weight_grams,
        buy_price_per_gram: input.buy_price_per_gram,
        current_price_per_gram: input.current_price_per_gram,
        purchase_location: input.purchase_location,
        buy_date: input.buy_date.unwrap_or_else(today),
        certificate_number: input.certificate_number,
        notes: input.notes,
        created_at: ts,
        updated_at: ts,
    };
    validate_gold(&g)?;
    save_gold(conn, &g)?;
    tracing::info!(id = %g.id, grams = %g.weight_grams, "gold added");
    Ok(g)
}

pub fn update_gold(conn: &Connection, id: &str, p: GoldUpdate) -> Result<Gold> {
    let mut g = get_gold(conn, id)?;
    if let Some(v) = p.r#type {
        g.r#type = v;
    }
    if let Some(v) = p.weight_grams {
        g.weight_grams = v;
    }
    if let Some(v) = p.buy_price_per_gram {
        g.buy_price_per_gram = v;
    }
    if let Some(v) = p.current_price_per_gram {
        g.current_price_per_gram = v;
    }
    if let Some(v) = p.purchase_location {
        g.purchase_location = v;
    }
    if let Some(v) = p.buy_date {
        g.buy_date = v;
    }
    if p.certificate_number.is_some() {
        g.certificate_number = p.certificate_number;
    }
    if p.notes.is_some() {
        g.notes = p.notes;
    }
    validate_gold(&g)?;
    g.updated_at = now();
    save_gold(conn, &g)?;
    Ok(g)
}

pub fn delete_gold(conn: &Connection, id: &str) -> Result<()> {
    delete_from(conn, InstrumentKind::Gold, id)
}

// ------------------------------------------------------------ mutual funds

const FUND_COLUMNS: &str = "id, product_name, fund_manager, type, units, buy_nav, current_nav, \
     buy_date, notes, created_at, updated_at";

fn row_to_fund(r: &Row<'_>) -> rusqlite::Result<MutualFund> {
    Ok(MutualFund {
        id: r.get(0)?,
        product_name: r.get(1)?,
        fund_manager: r.get(2)?,
        r#type: r.get(3)?,
        units: decimal_at(r, 4)?,
        buy_nav: decimal_at(r, 5)?,
        current_nav: decimal_at(r, 6)?,
        buy_date: r.get(7)?,
        notes: r.get(8)?,
        created_at: r.get(9)?,
        updated_at: r.get(10)?,
    })
}

pub fn list_mutual_funds(conn: &Connection) -> Result<Vec<MutualFund>> {
    let sql = format!("SELECT {} FROM mutual_funds ORDER BY created_at, rowid", FUND_COLUMNS);
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([], row_to_fund)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

pub fn get_mutual_fund(conn: &Connection, id: &str) -> Result<MutualFund> {
    let sql = format!("SELECT {} FROM mutual_funds WHERE id=?1", FUND_COLUMNS);
    conn.query_row(&sql, params![id], row_to_fund)
        .optional()?
        .ok_or_else(|| not_found(InstrumentKind::MutualFunds).into())
}

fn validate_fund(f: &MutualFund) -> Result<()> {
    require_text("product_name", &f.product_name)?;
    require_positive("units", f.units)?;
    require_non_negative("buy_nav", f.buy_nav)?;
    require_non_negative("current_nav", f.current_nav)?;
    require_value(f.current_value())
}

fn save_fund(conn: &Connection, f: &MutualFund) -> Result<()> {
    conn.execute(
        "INSERT INTO mutual_funds(id, product_name, fund_manager, type, units, buy_nav,
            current_nav, buy_date, notes, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
         ON CONFLICT(id) DO UPDATE SET product_name=excluded.product_name,
            fund_manager=excluded.fund_manager, type=excluded.type, units=excluded.units,
            buy_nav=excluded.buy_nav, current_nav=excluded.current_nav,
            buy_date=excluded.buy_date, notes=excluded.notes, updated_at=excluded.updated_at",
        params![
            f.id,
            f.product_name,
            f.fund_manager,
            f.r#type,
            f.units.to_string(),
            f.buy_nav.to_string(),
            f.current_nav.to_string(),
            f.buy_date,
            f.notes,
            f.created_at,
            f.updated_at,
        ],
    )?;
    Ok(())
}

pub fn create_mutual_fund(conn: &Connection, input: NewMutualFund) -> Result<MutualFund> {
    let ts = now();
    let f = MutualFund {
        id: new_id(),
        product_name: input.product_name.trim().to_string(),
        fund_manager: input.fund_manager,
        r#type: input.r#type,
        units: input.units,
        buy_nav: input.buy_nav,
        current_nav: input.current_nav,
        buy_date: input.buy_date.unwrap_or_else(today),
        notes: input.notes,
        created_at: ts,
        updated_at: ts,
    };
    validate_fund(&f)?;
    save_fund(conn, &f)?;
    tracing::info!(id = %f.id, product = %f.product_name, "mutual fund added");
    Ok(f)
}

pub fn update_mutual_fund(conn: &Connection, id: &str, p: MutualFundUpdate) -> Result<MutualFund> {
    let mut f = get_mutual_fund(conn, id)?;
    if let Some(v) = p.product_name {
        f.product_name = v.trim().to_string();
    }
    if let Some(v) = p.fund_manager {
        f.fund_manager = v;
    }
    if let Some(v) = p.r#type {
        f.r#type = v;
    }
    if let Some(v) = p.units {
        f.units = v;
    }
    if let Some(v) = p.buy_nav {
        f.buy_nav = v;
    }
    if let Some(v) = p.current_nav {
        f.current_nav = v;
    }
    if let Some(v) = p.buy_date {
        f.buy_date = v;
    }
    if p.notes.is_some() {
        f.notes = p.notes;
    }
    validate_fund(&f)?;
    f.updated_at = now();
    save_fund(conn, &f)?;
    Ok(f)
}

pub fn delete_mutual_fund(conn: &Connection, id: &str) -> Result<()> {
    delete_from(conn, InstrumentKind::MutualFunds, id)
}

// ---------------------------------------------------------------- rollups

/// A holding's value must stay within the same bound as a single amount.
fn require_value(value: Option<Decimal>) -> Result<()> {
    require_in_range("current value", in_range(value, "current value")?)
}

fn value_of<I>(values: I, what: &str) -> Result<Decimal>
where
    I: IntoIterator<Item = Option<Decimal>>,
{
    values
        .into_iter()
        .try_fold(Decimal::ZERO, |acc, v| {
            in_range(v.and_then(|v| acc.checked_add(v)), what)
        })
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct DetailedInvestments {
    pub stocks: Vec<Stock>,
    pub deposits: Vec<Deposit>,
    pub gold: Vec<Gold>,
    pub mutual_funds: Vec<MutualFund>,
}

impl DetailedInvestments {
    pub fn load(conn: &Connection) -> Result<Self> {
        Ok(DetailedInvestments {
            stocks: list_stocks(conn)?,
            deposits: list_deposits(conn)?,
            gold: list_gold(conn)?,
            mutual_funds: list_mutual_funds(conn)?,
        })
    }

    pub fn totals(&self) -> Result<InvestmentTotals> {
        Ok(InvestmentTotals {
            stocks: value_of(self.stocks.iter().map(Stock::current_value), "stocks")?,
            deposits: value_of(self.deposits.iter().map(Deposit::current_value), "deposits")?,
            gold: value_of(self.gold.iter().map(Gold::current_value), "gold")?,
            mutual_funds: value_of(
                self.mutual_funds.iter().map(MutualFund::current_value),
                "mutual funds",
            )?,
        })
    }
}

/// Current value per instrument class.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct InvestmentTotals {
    pub stocks: Decimal,
    pub deposits: Decimal,
    pub gold: Decimal,
    pub mutual_funds: Decimal,
}

impl InvestmentTotals {
    pub fn total(&self) -> Result<Decimal> {
        checked_sum(
            [self.stocks, self.deposits, self.gold, self.mutual_funds],
            "total investments",
        )
    }
}

pub fn totals(conn: &Connection) -> Result<InvestmentTotals> {
    DetailedInvestments::load(conn)?.totals()
}

/// The flat summary served at `GET /investments`, keyed by the local
/// instrument names the dashboard front end expects.
#[derive(Debug, Clone, Serialize)]
pub struct LegacyInvestments {
    pub saham: Decimal,
    pub deposito: Decimal,
    pub emas: Decimal,
    pub reksadana: Decimal,
}

impl From<InvestmentTotals> for LegacyInvestments {
    fn from(t: InvestmentTotals) -> Self {
        LegacyInvestments {
            saham: t.stocks,
            deposito: t.deposits,
            emas: t.gold,
            reksadana: t.mutual_funds,
        }
    }
}

// --------------------------------------------------- dispatch by kind name

fn decode<T: DeserializeOwned>(body: serde_json::Value) -> Result<T> {
    serde_json::from_value(body).map_err(|e| FinanceError::validation(e.to_string()).into())
}

/// Creates an instrument of `kind` from a JSON body and returns its id.
pub fn create_detailed(
    conn: &Connection,
    kind: InstrumentKind,
    body: serde_json::Value,
) -> Result<String> {
    Ok(match kind {
        InstrumentKind::Stocks => create_stock(conn, decode(body)?)?.id,
        InstrumentKind::Deposits => create_deposit(conn, decode(body)?)?.id,
        InstrumentKind::Gold => create_gold(conn, decode(body)?)?.id,
        InstrumentKind::MutualFunds => create_mutual_fund(conn, decode(body)?)?.id,
    })
}

pub fn update_detailed(
    conn: &Connection,
    kind: InstrumentKind,
    id: &str,
    body: serde_json::Value,
) -> Result<()> {
    match kind {
        InstrumentKind::Stocks => update_stock(conn, id, decode(body)?).map(drop),
        InstrumentKind::Deposits => update_deposit(conn, id, decode(body)?).map(drop),
        InstrumentKind::Gold => update_gold(conn, id, decode(body)?).map(drop),
        InstrumentKind::MutualFunds => update_mutual_fund(conn, id, decode(body)?).map(drop),
    }
}

pub fn delete_detailed(conn: &Connection, kind: InstrumentKind, id: &str) -> Result<()> {
    delete_from(conn, kind, id)
}
