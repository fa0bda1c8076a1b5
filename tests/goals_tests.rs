// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use fintrack::commands::goals;
use fintrack::db;
use fintrack::error::FinanceError;
use fintrack::models::{DEFAULT_GOAL_COLOR, GoalUpdate, NewContribution};
use rusqlite::Connection;
use rust_decimal_macros::dec;
use serde_json::json;

fn setup() -> Connection {
    db::open_in_memory().unwrap()
}

fn goal(conn: &Connection, target: i64, current: i64) -> String {
    let input = serde_json::from_value(json!({
        "name": "Emergency fund",
        "target_amount": target,
        "current_amount": current,
        "target_date": "2026-12-31",
        "category": "Savings",
    }))
    .unwrap();
    goals::create(conn, input).unwrap().id
}

fn contribution(amount: i64) -> NewContribution {
    serde_json::from_value(json!({ "amount": amount })).unwrap()
}

#[test]
fn create_fills_defaults() {
    let conn = setup();
    let id = goal(&conn, 1000, 0);
    let g = goals::get(&conn, &id).unwrap();
    assert_eq!(g.color, DEFAULT_GOAL_COLOR);
    assert!(!g.is_achieved);
    assert!(goals::create(
        &conn,
        serde_json::from_value(json!({
            "name": "Bad",
            "target_amount": 0,
            "target_date": "2026-01-01",
            "category": "x",
        }))
        .unwrap()
    )
    .is_err());
}

#[test]
fn contributions_accumulate_and_achievement_sticks() {
    let mut conn = setup();
    let id = goal(&conn, 1000, 0);

    let out = goals::contribute(&mut conn, &id, contribution(400)).unwrap();
    assert_eq!(out.goal.current_amount, dec!(400));
    assert!(!out.goal.is_achieved);

    let out = goals::contribute(&mut conn, &id, contribution(600)).unwrap();
    assert_eq!(out.goal.current_amount, dec!(1000));
    assert!(out.goal.is_achieved);

    // Raising the target afterwards does not un-achieve the goal.
    let patch = GoalUpdate {
        target_amount: Some(dec!(5000)),
        ..Default::default()
    };
    goals::update(&conn, &id, patch).unwrap();
    let out = goals::contribute(&mut conn, &id, contribution(1)).unwrap();
    assert!(out.goal.is_achieved);

    let log = goals::contributions(&conn, &id).unwrap();
    assert_eq!(log.len(), 3);
    assert_eq!(log[0].amount, dec!(1));
    assert_eq!(log[2].amount, dec!(400));
}

#[test]
fn update_current_at_target_marks_achieved() {
    let conn = setup();
    let id = goal(&conn, 1000, 100);
    let patch = GoalUpdate {
        current_amount: Some(dec!(1000)),
        ..Default::default()
    };
    assert!(goals::update(&conn, &id, patch).unwrap().is_achieved);
}

#[test]
fn contributing_to_unknown_goal_is_not_found() {
    let mut conn = setup();
    let err = goals::contribute(&mut conn, "missing", contribution(10)).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<FinanceError>(),
        Some(FinanceError::NotFound("Goal"))
    ));
}

#[test]
fn deleting_a_goal_keeps_its_contributions() {
    let mut conn = setup();
    let id = goal(&conn, 1000, 0);
    goals::contribute(&mut conn, &id, contribution(10)).unwrap();
    goals::delete(&conn, &id).unwrap();
    assert_eq!(goals::contributions(&conn, &id).unwrap().len(), 1);
    assert!(goals::delete(&conn, &id).is_err());
}
