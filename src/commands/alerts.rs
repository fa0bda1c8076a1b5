// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Budget, goal and bill warnings. Nothing is stored; every call re-derives
//! the list from current data.

use anyhow::Result;
use chrono::{Datelike, NaiveDate};
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::commands::{bills, budgets, goals, recurring};
use crate::models::{Budget, Category, FinancialGoal, TransactionType};
use crate::utils::{maybe_print_json, month_of, percent, pretty_table, today};

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    let data = evaluate(conn, today())?;
    if !maybe_print_json(m.get_flag("json"), m.get_flag("jsonl"), &data)? {
        if data.is_empty() {
            println!("No alerts");
            return Ok(());
        }
        let rows = data
            .iter()
            .map(|a| {
                vec![
                    a.severity.as_str().to_string(),
                    a.title.clone(),
                    a.message.clone(),
                ]
            })
            .collect();
        println!("{}", pretty_table(&["Severity", "Alert", "Detail"], rows));
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    BudgetExceeded,
    BudgetWarning,
    GoalAlmost,
    GoalMilestone,
    BillDueSoon,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    High,
    Medium,
    Low,
    Info,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::High => "high",
            Severity::Medium => "medium",
            Severity::Low => "low",
            Severity::Info => "info",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AlertSubject {
    Budget {
        category: Category,
        spent: Decimal,
        budget: Decimal,
    },
    Goal {
        goal_name: String,
        progress: Decimal,
    },
    Bill {
        bill_name: String,
        amount: Decimal,
        days_until_due: u32,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Alert {
    #[serde(rename = "type")]
    pub kind: AlertKind,
    pub severity: Severity,
    pub title: String,
    pub message: String,
    #[serde(flatten)]
    pub subject: AlertSubject,
}

const GOAL_MILESTONES: [u32; 2] = [50, 75];

/// Exceeded at 100% of the limit, warning from 80%.
pub fn budget_alert(b: &Budget) -> Option<Alert> {
    let pct = percent(b.spent, b.amount);
    let (kind, severity, title, message) = if pct >= Decimal::ONE_HUNDRED {
        (
            AlertKind::BudgetExceeded,
            Severity::High,
            format!("{} budget exceeded", b.category),
            format!("You have spent {:.0}% of the {} budget", pct, b.category),
        )
    } else if pct >= Decimal::from(80) {
        (
            AlertKind::BudgetWarning,
            Severity::Medium,
            format!("{} budget almost used up", b.category),
            format!("{:.0}% of the {} budget is used", pct, b.category),
        )
    } else {
        return None;
    };
    Some(Alert {
        kind,
        severity,
        title,
        message,
        subject: AlertSubject::Budget {
            category: b.category,
            spent: b.spent,
            budget: b.amount,
        },
    })
}

/// Achieved goals raise nothing. From 90% a goal is "almost there"; below
/// that each milestone m with m <= progress <= m + 10 is reported.
pub fn goal_alerts(g: &FinancialGoal) -> Vec<Alert> {
    if g.is_achieved {
        return Vec::new();
    }
    let progress = g.progress();
    let subject = || AlertSubject::Goal {
        goal_name: g.name.clone(),
        progress: progress.round_dp(2),
    };
    if progress >= Decimal::from(90) && progress < Decimal::ONE_HUNDRED {
        return vec![Alert {
            kind: AlertKind::GoalAlmost,
            severity: Severity::Low,
            title: "Goal almost reached".to_string(),
            message: format!("Goal '{}' is at {:.0}%", g.name, progress),
            subject: subject(),
        }];
    }
    if progress < Decimal::from(50) {
        return Vec::new();
    }
    GOAL_MILESTONES
        .iter()
        .map(|&m| (m, Decimal::from(m)))
        .filter(|(_, m)| progress >= *m && progress <= *m + Decimal::TEN)
        .map(|(m, _)| Alert {
            kind: AlertKind::GoalMilestone,
            severity: Severity::Info,
            title: format!("{}% milestone reached", m),
            message: format!("Goal '{}' has reached {}%", g.name, m),
            subject: subject(),
        })
        .collect()
}

/// Due within the next three days of the current month. Due today or
/// already past is not flagged.
pub fn bill_due_alert(name: &str, amount: Decimal, due_day: u32, today: NaiveDate) -> Option<Alert> {
    let days = i64::from(due_day) - i64::from(today.day());
    if !(1..=3).contains(&days) {
        return None;
    }
    Some(Alert {
        kind: AlertKind::BillDueSoon,
        severity: Severity::Medium,
        title: "Bill due soon".to_string(),
        message: format!("Bill '{}' is due in {} day(s)", name, days),
        subject: AlertSubject::Bill {
            bill_name: name.to_string(),
            amount,
            days_until_due: days as u32,
        },
    })
}

/// Budget alerts for the month of `today`, then goals, then bills.
pub fn evaluate(conn: &Connection, today: NaiveDate) -> Result<Vec<Alert>> {
    let mut out = Vec::new();

    for b in budgets::list(conn, Some(&month_of(today)))? {
        out.extend(budget_alert(&b));
    }

    for g in goals::list(conn)? {
        out.extend(goal_alerts(&g));
    }

    for b in bills::list_active(conn)? {
        match b.due_date.trim().parse::<u32>() {
            Ok(day) => out.extend(bill_due_alert(&b.name, b.amount, day, today)),
            Err(_) => tracing::warn!(bill = %b.id, due = %b.due_date, "bill has no usable due day"),
        }
    }
    for r in recurring::list(conn, today)? {
        if r.is_active && r.r#type == TransactionType::Expense {
            out.extend(bill_due_alert(&r.name, r.amount, r.day_of_month, today));
        }
    }

    tracing::debug!(count = out.len(), "alerts evaluated");
    Ok(out)
}
