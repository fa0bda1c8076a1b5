// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::collections::BTreeMap;

use anyhow::Result;
use chrono::NaiveDate;
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::commands::investments::{DetailedInvestments, InvestmentTotals};
use crate::commands::{accounts, debts, goals, recurring, transactions};
use crate::models::{
    Account, Debt, FinancialGoal, RecurringTransaction, Transaction, TransactionType,
};
use crate::utils::{
    checked_sum, in_range, maybe_print_json, month_of, percent, pretty_table, today,
};

const RECENT_TRANSACTIONS: usize = 10;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("dashboard", sub)) => {
            let d = dashboard(conn, today())?;
            if !maybe_print_json(sub.get_flag("json"), false, &d)? {
                let rows = vec![
                    vec!["Liquid assets".into(), format!("{:.2}", d.liquid_assets)],
                    vec!["Investments".into(), format!("{:.2}", d.total_investments)],
                    vec!["Total assets".into(), format!("{:.2}", d.total_assets)],
                    vec!["Liabilities".into(), format!("{:.2}", d.total_liabilities)],
                    vec!["Net worth".into(), format!("{:.2}", d.net_worth)],
                    vec!["Income".into(), format!("{:.2}", d.total_income)],
                    vec!["Expense".into(), format!("{:.2}", d.total_expense)],
                    vec!["Active debts".into(), d.active_debts.to_string()],
                ];
                println!("{}", pretty_table(&["Metric", "Value"], rows));
            }
        }
        Some(("balance-sheet", sub)) => {
            let b = balance_sheet(conn)?;
            if !maybe_print_json(sub.get_flag("json"), false, &b)? {
                let inv = &b.assets.investments;
                let rows = vec![
                    vec!["Assets".into(), "Liquid".into(), format!("{:.2}", b.assets.liquid_assets)],
                    vec!["Assets".into(), "Stocks".into(), format!("{:.2}", inv.stocks)],
                    vec!["Assets".into(), "Deposits".into(), format!("{:.2}", inv.deposits)],
                    vec!["Assets".into(), "Gold".into(), format!("{:.2}", inv.gold)],
                    vec!["Assets".into(), "Mutual funds".into(), format!("{:.2}", inv.mutual_funds)],
                    vec!["Assets".into(), "Total".into(), format!("{:.2}", b.assets.total)],
                    vec!["Liabilities".into(), "Total".into(), format!("{:.2}", b.liabilities.total)],
                    vec!["Equity".into(), "Net worth".into(), format!("{:.2}", b.equity.net_worth)],
                ];
                println!("{}", pretty_table(&["Section", "Line", "Amount"], rows));
            }
        }
        Some(("ratios", sub)) => {
            let r = ratios(conn)?;
            if !maybe_print_json(sub.get_flag("json"), false, &r)? {
                let rows = vec![
                    vec!["Debt to asset %".into(), r.debt_to_asset_ratio.to_string()],
                    vec!["Emergency fund (months)".into(), r.emergency_fund_months.to_string()],
                    vec!["Investment %".into(), r.investment_ratio.to_string()],
                    vec!["Liquid asset %".into(), r.liquid_asset_ratio.to_string()],
                ];
                println!("{}", pretty_table(&["Ratio", "Value"], rows));
            }
        }
        Some(("monthly", sub)) => {
            let data = monthly(conn)?;
            if !maybe_print_json(sub.get_flag("json"), false, &data)? {
                let rows = data
                    .iter()
                    .map(|(m, f)| {
                        vec![
                            m.clone(),
                            format!("{:.2}", f.income),
                            format!("{:.2}", f.expense),
                        ]
                    })
                    .collect();
                println!("{}", pretty_table(&["Month", "Income", "Expense"], rows));
            }
        }
        Some(("category", sub)) => {
            let data = by_category(conn)?;
            if !maybe_print_json(sub.get_flag("json"), false, &data)? {
                let mut items: Vec<_> = data.into_iter().collect();
                items.sort_by(|a, b| b.1.cmp(&a.1));
                let rows = items
                    .into_iter()
                    .map(|(c, amt)| vec![c, format!("{:.2}", amt)])
                    .collect();
                println!("{}", pretty_table(&["Category", "Amount"], rows));
            }
        }
        _ => {}
    }
    Ok(())
}

/// The accounting equation over the current state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NetWorth {
    pub liquid_assets: Decimal,
    pub total_investments: Decimal,
    pub total_assets: Decimal,
    pub total_liabilities: Decimal,
    pub net_worth: Decimal,
}

impl NetWorth {
    /// Liabilities count active debts only.
    pub fn compute(
        accounts: &[Account],
        investments: &InvestmentTotals,
        debts: &[Debt],
    ) -> Result<Self> {
        let liquid_assets = checked_sum(accounts.iter().map(|a| a.balance), "liquid assets")?;
        let total_investments = investments.total()?;
        let total_assets = in_range(
            liquid_assets.checked_add(total_investments),
            "total assets",
        )?;
        let total_liabilities = checked_sum(
            debts
                .iter()
                .filter(|d| d.is_active)
                .map(|d| d.current_balance),
            "total liabilities",
        )?;
        Ok(NetWorth {
            liquid_assets,
            total_investments,
            total_assets,
            total_liabilities,
            net_worth: in_range(total_assets.checked_sub(total_liabilities), "net worth")?,
        })
    }

    pub fn load(conn: &Connection) -> Result<Self> {
        NetWorth::compute(
            &accounts::list(conn)?,
            &DetailedInvestments::load(conn)?.totals()?,
            &debts::list_active(conn)?,
        )
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct InvestmentCounts {
    pub stocks: usize,
    pub deposits: usize,
    pub gold: usize,
    pub mutual_funds: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub total_assets: Decimal,
    pub total_liabilities: Decimal,
    pub net_worth: Decimal,
    pub liquid_assets: Decimal,
    pub total_investments: Decimal,
    pub investments_breakdown: InvestmentTotals,
    pub cash_balance: Decimal,
    pub total_income: Decimal,
    pub total_expense: Decimal,
    pub total_transactions: usize,
    pub accounts: Vec<Account>,
    pub recent_transactions: Vec<Transaction>,
    pub recurring_bills: Vec<RecurringTransaction>,
    pub active_debts: usize,
    pub total_debt_amount: Decimal,
    pub financial_goals: Vec<FinancialGoal>,
    pub investment_items_count: InvestmentCounts,
}

pub fn dashboard(conn: &Connection, today: NaiveDate) -> Result<Dashboard> {
    let accounts = accounts::list(conn)?;
    let holdings = DetailedInvestments::load(conn)?;
    let breakdown = holdings.totals()?;
    let active = debts::list_active(conn)?;
    let nw = NetWorth::compute(&accounts, &breakdown, &active)?;

    let all = transactions::list_all(conn)?;
    let stats = transactions::summarize(&all);
    let recent = all.into_iter().take(RECENT_TRANSACTIONS).collect();

    Ok(Dashboard {
        total_assets: nw.total_assets,
        total_liabilities: nw.total_liabilities,
        net_worth: nw.net_worth,
        liquid_assets: nw.liquid_assets,
        total_investments: nw.total_investments,
        investments_breakdown: breakdown,
        cash_balance: nw.liquid_assets,
        total_income: stats.total_income,
        total_expense: stats.total_expense,
        total_transactions: stats.total_transactions,
        accounts,
        recent_transactions: recent,
        recurring_bills: recurring::list_merged(conn, today)?,
        active_debts: active.len(),
        total_debt_amount: nw.total_liabilities,
        financial_goals: goals::list(conn)?,
        investment_items_count: InvestmentCounts {
            stocks: holdings.stocks.len(),
            deposits: holdings.deposits.len(),
            gold: holdings.gold.len(),
            mutual_funds: holdings.mutual_funds.len(),
        },
    })
}

#[derive(Debug, Clone, Serialize)]
pub struct InvestmentLines {
    pub stocks: Decimal,
    pub deposits: Decimal,
    pub gold: Decimal,
    pub mutual_funds: Decimal,
    pub total: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct Assets {
    pub liquid_assets: Decimal,
    pub investments: InvestmentLines,
    pub total: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct Liabilities {
    pub total: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct Equity {
    pub net_worth: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct BalanceSheet {
    pub assets: Assets,
    pub liabilities: Liabilities,
    pub equity: Equity,
}

pub fn balance_sheet(conn: &Connection) -> Result<BalanceSheet> {
    let accounts = accounts::list(conn)?;
    let inv = DetailedInvestments::load(conn)?.totals()?;
    let nw = NetWorth::compute(&accounts, &inv, &debts::list_active(conn)?)?;
    Ok(BalanceSheet {
        assets: Assets {
            liquid_assets: nw.liquid_assets,
            investments: InvestmentLines {
                stocks: inv.stocks,
                deposits: inv.deposits,
                gold: inv.gold,
                mutual_funds: inv.mutual_funds,
                total: nw.total_investments,
            },
            total: nw.total_assets,
        },
        liabilities: Liabilities {
            total: nw.total_liabilities,
        },
        equity: Equity {
            net_worth: nw.net_worth,
        },
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Ratios {
    pub debt_to_asset_ratio: Decimal,
    pub emergency_fund_months: Decimal,
    pub investment_ratio: Decimal,
    pub liquid_asset_ratio: Decimal,
}

fn percent_of(part: Decimal, whole: Decimal) -> Decimal {
    percent(part, whole).round_dp(2)
}

impl Ratios {
    /// `total_expense` is all-time spending, read as a year's worth.
    pub fn compute(nw: &NetWorth, total_expense: Decimal) -> Self {
        let monthly_expense = total_expense / Decimal::from(12);
        let emergency_fund_months =
            (percent(nw.liquid_assets, monthly_expense) / Decimal::ONE_HUNDRED).round_dp(2);
        Ratios {
            debt_to_asset_ratio: percent_of(nw.total_liabilities, nw.total_assets),
            emergency_fund_months,
            investment_ratio: percent_of(nw.total_investments, nw.total_assets),
            liquid_asset_ratio: percent_of(nw.liquid_assets, nw.total_assets),
        }
    }
}

pub fn ratios(conn: &Connection) -> Result<Ratios> {
    let nw = NetWorth::load(conn)?;
    let stats = transactions::stats(conn)?;
    Ok(Ratios::compute(&nw, stats.total_expense))
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct MonthFlow {
    pub income: Decimal,
    pub expense: Decimal,
}

/// Income and expense per `YYYY-MM`, oldest month first.
pub fn monthly_flows(txs: &[Transaction]) -> BTreeMap<String, MonthFlow> {
    let mut map: BTreeMap<String, MonthFlow> = BTreeMap::new();
    for t in txs {
        let entry = map.entry(month_of(t.date)).or_default();
        match t.r#type {
            TransactionType::Income => entry.income += t.amount,
            TransactionType::Expense => entry.expense += t.amount,
        }
    }
    map
}

pub fn monthly(conn: &Connection) -> Result<BTreeMap<String, MonthFlow>> {
    Ok(monthly_flows(&transactions::list_all(conn)?))
}

/// Total amount per category, income and expense alike.
pub fn by_category(conn: &Connection) -> Result<BTreeMap<String, Decimal>> {
    let mut map: BTreeMap<String, Decimal> = BTreeMap::new();
    for t in transactions::list_all(conn)? {
        *map.entry(t.category.to_string()).or_insert(Decimal::ZERO) += t.amount;
    }
    Ok(map)
}
