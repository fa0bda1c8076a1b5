// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use rusqlite::{Connection, OptionalExtension, Row, params};
use serde::Serialize;

use crate::commands::arg;
use crate::error::FinanceError;
use crate::models::{
    DEFAULT_GOAL_COLOR, FinancialGoal, GoalContribution, GoalUpdate, NewContribution, NewGoal,
};
use crate::utils::{
    decimal_at, maybe_print_json, new_id, now, parse_decimal, pretty_table, require_non_negative,
    require_positive, require_text,
};

const GOAL_COLUMNS: &str = "id, name, target_amount, current_amount, target_date, category, \
     is_achieved, notes, color, created_at, updated_at";

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("list", sub)) => {
            let data = list(conn)?;
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
                let rows = data
                    .iter()
                    .map(|g| {
                        vec![
                            g.name.clone(),
                            format!("{:.2}", g.current_amount),
                            format!("{:.2}", g.target_amount),
                            format!("{:.1}%", g.progress()),
                            g.target_date.to_string(),
                            if g.is_achieved { "yes".into() } else { "no".into() },
                            g.id.clone(),
                        ]
                    })
                    .collect();
                println!(
                    "{}",
                    pretty_table(
                        &["Goal", "Saved", "Target", "Progress", "By", "Achieved", "Id"],
                        rows,
                    )
                );
            }
        }
        Some(("contribute", sub)) => {
            let id = arg(sub, "id")?;
            let out = contribute(
                conn,
                id,
                NewContribution {
                    amount: parse_decimal(arg(sub, "amount")?)?,
                    notes: sub.get_one::<String>("notes").cloned(),
                },
            )?;
            println!(
                "{}: {:.2} of {:.2} ({:.1}%){}",
                out.goal.name,
                out.goal.current_amount,
                out.goal.target_amount,
                out.goal.progress(),
                if out.goal.is_achieved { " - achieved" } else { "" }
            );
        }
        _ => {}
    }
    Ok(())
}

fn row_to_goal(r: &Row<'_>) -> rusqlite::Result<FinancialGoal> {
    Ok(FinancialGoal {
        id: r.get(0)?,
        name: r.get(1)?,
        target_amount: decimal_at(r, 2)?,
        current_amount: decimal_at(r, 3)?,
        target_date: r.get(4)?,
        category: r.get(5)?,
        is_achieved: r.get(6)?,
        notes: r.get(7)?,
        color: r.get(8)?,
        created_at: r.get(9)?,
        updated_at: r.get(10)?,
    })
}

pub fn list(conn: &Connection) -> Result<Vec<FinancialGoal>> {
    let sql = format!("SELECT {} FROM goals ORDER BY target_date, name", GOAL_COLUMNS);
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([], row_to_goal)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

pub fn get(conn: &Connection, id: &str) -> Result<FinancialGoal> {
    let sql = format!("SELECT {} FROM goals WHERE id=?1", GOAL_COLUMNS);
    conn.query_row(&sql, params![id], row_to_goal)
        .optional()?
        .ok_or_else(|| FinanceError::NotFound("Goal").into())
}

fn validate(g: &FinancialGoal) -> Result<()> {
    require_text("name", &g.name)?;
    require_positive("target_amount", g.target_amount)?;
    require_non_negative("current_amount", g.current_amount)?;
    Ok(())
}

fn save(conn: &Connection, g: &FinancialGoal) -> Result<()> {
    conn.execute(
        "INSERT INTO goals(id, name, target_amount, current_amount, target_date, category,
            is_achieved, notes, color, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
         ON CONFLICT(id) DO UPDATE SET name=excluded.name, target_amount=excluded.target_amount,
            current_amount=excluded.current_amount, target_date=excluded.target_date,
            category=excluded.category, is_achieved=excluded.is_achieved, notes=excluded.notes,
            color=excluded.color, updated_at=excluded.updated_at",
        params![
            g.id,
            g.name,
            g.target_amount.to_string(),
            g.current_amount.to_string(),
            g.target_date,
            g.category,
            g.is_achieved,
            g.notes,
            g.color,
            g.created_at,
            g.updated_at,
        ],
    )?;
    Ok(())
}

pub fn create(conn: &Connection, input: NewGoal) -> Result<FinancialGoal> {
    let ts = now();
    let g = FinancialGoal {
        id: new_id(),
        name: input.name.trim().to_string(),
        target_amount: input.target_amount,
        current_amount: input.current_amount,
        target_date: input.target_date,
        category: input.category,
        is_achieved: input.current_amount >= input.target_amount,
        notes: input.notes,
        color: input
            .color
            .filter(|c| !c.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_GOAL_COLOR.to_string()),
        created_at: ts,
        updated_at: ts,
    };
    validate(&g)?;
    save(conn, &g)?;
    tracing::info!(id = %g.id, name = %g.name, "goal created");
    Ok(g)
}

/// Setting `current_amount` at or above the target marks the goal achieved.
pub fn update(conn: &Connection, id: &str, p: GoalUpdate) -> Result<FinancialGoal> {
    let mut g = get(conn, id)?;
    if let Some(v) = p.name {
        g.name = v.trim().to_string();
    }
    if let Some(v) = p.target_amount {
        g.target_amount = v;
    }
    if let Some(v) = p.target_date {
        g.target_date = v;
    }
    if let Some(v) = p.category {
        g.category = v;
    }
    if let Some(v) = p.is_achieved {
        g.is_achieved = v;
    }
    if p.notes.is_some() {
        g.notes = p.notes;
    }
    if let Some(v) = p.color {
        g.color = v;
    }
    if let Some(v) = p.current_amount {
        g.current_amount = v;
        if g.current_amount >= g.target_amount {
            g.is_achieved = true;
        }
    }
    validate(&g)?;
    g.updated_at = now();
    save(conn, &g)?;
    Ok(g)
}

/// Contributions are kept.
pub fn delete(conn: &Connection, id: &str) -> Result<()> {
    if conn.execute("DELETE FROM goals WHERE id=?1", params![id])? == 0 {
        return Err(FinanceError::NotFound("Goal").into());
    }
    tracing::info!(id, "goal deleted");
    Ok(())
}

#[derive(Debug, Clone, Serialize)]
pub struct ContributionOutcome {
    pub goal: FinancialGoal,
    pub contribution: GoalContribution,
}

/// Adds to the saved amount and logs the contribution. Achievement is sticky.
pub fn contribute(
    conn: &mut Connection,
    goal_id: &str,
    input: NewContribution,
) -> Result<ContributionOutcome> {
    require_positive("amount", input.amount)?;
    let db = conn.transaction()?;
    let mut goal = get(&db, goal_id)?;
    let ts = now();
    goal.current_amount += input.amount;
    goal.is_achieved = goal.is_achieved || goal.current_amount >= goal.target_amount;
    goal.updated_at = ts;
    save(&db, &goal)?;

    let c = GoalContribution {
        id: new_id(),
        goal_id: goal.id.clone(),
        amount: input.amount,
        date: ts,
        notes: input.notes,
    };
    db.execute(
        "INSERT INTO goal_contributions(id, goal_id, amount, date, notes) VALUES (?1, ?2, ?3, ?4, ?5)",
        params![c.id, c.goal_id, c.amount.to_string(), c.date, c.notes],
    )?;
    db.commit()?;
    tracing::info!(goal = %goal.id, amount = %c.amount, achieved = goal.is_achieved, "goal contribution");
    Ok(ContributionOutcome {
        goal,
        contribution: c,
    })
}

/// Newest first.
pub fn contributions(conn: &Connection, goal_id: &str) -> Result<Vec<GoalContribution>> {
    let mut stmt = conn.prepare(
        "SELECT id, goal_id, amount, date, notes FROM goal_contributions
         WHERE goal_id=?1 ORDER BY date DESC, rowid DESC",
    )?;
    let rows = stmt.query_map(params![goal_id], |r| {
        Ok(GoalContribution {
            id: r.get(0)?,
            goal_id: r.get(1)?,
            amount: decimal_at(r, 2)?,
            date: r.get(3)?,
            notes: r.get(4)?,
        })
    })?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}
