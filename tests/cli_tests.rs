// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use fintrack::cli::{DEFAULT_ADDR, build_cli};
use fintrack::db;
use fintrack::utils::{get_setting, set_setting};

#[test]
fn cli_definition_is_consistent() {
    build_cli().debug_assert();
}

#[test]
fn serve_defaults_to_local_port() {
    let m = build_cli()
        .try_get_matches_from(["fintrack", "serve"])
        .unwrap();
    let (_, sub) = m.subcommand().unwrap();
    assert_eq!(sub.get_one::<String>("addr").unwrap(), DEFAULT_ADDR);
}

#[test]
fn db_flag_is_global() {
    let m = build_cli()
        .try_get_matches_from(["fintrack", "account", "list", "--db", "/tmp/x.sqlite"])
        .unwrap();
    assert_eq!(m.get_one::<String>("db").unwrap(), "/tmp/x.sqlite");
}

#[test]
fn tx_add_requires_amount() {
    let r = build_cli().try_get_matches_from([
        "fintrack",
        "tx",
        "add",
        "--account",
        "Cash",
        "--description",
        "x",
        "--category",
        "Food",
    ]);
    assert!(r.is_err());
}

#[test]
fn settings_round_trip_and_reject_unknown_keys() {
    let conn = db::open_in_memory().unwrap();
    assert_eq!(get_setting(&conn, "default_currency").unwrap(), None);
    set_setting(&conn, "default_currency", "USD").unwrap();
    assert_eq!(
        get_setting(&conn, "default_currency").unwrap().as_deref(),
        Some("USD")
    );
    assert!(set_setting(&conn, "base_currency", "EUR").is_err());
}
