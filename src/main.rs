// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::path::PathBuf;

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use fintrack::{cli, commands, db, server, utils};

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("fintrack=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    init_tracing();

    let cli = cli::build_cli();
    let matches = cli.get_matches();

    let db_arg = matches.get_one::<String>("db").map(PathBuf::from);
    let mut conn = db::open_or_init(db_arg.as_deref())?;

    match matches.subcommand() {
        Some(("init", _)) => {
            let path = match &db_arg {
                Some(p) => p.clone(),
                None => db::db_path()?,
            };
            println!("Database initialized at {}", path.display());
        }
        Some(("serve", sub)) => {
            let addr = commands::arg(sub, "addr")?.clone();
            let rt = tokio::runtime::Runtime::new()?;
            conn = rt.block_on(server::serve(conn, &addr))?;
        }
        Some(("config", sub)) => match sub.subcommand() {
            Some(("get", m)) => {
                let key = commands::arg(m, "key")?;
                match utils::get_setting(&conn, key)? {
                    Some(v) => println!("{}", v),
                    None => println!("{} is not set", key),
                }
            }
            Some(("set", m)) => {
                let key = commands::arg(m, "key")?;
                let value = commands::arg(m, "value")?;
                utils::set_setting(&conn, key, value)?;
                println!("{} = {}", key, value);
            }
            _ => {}
        },
        Some(("account", sub)) => commands::accounts::handle(&conn, sub)?,
        Some(("tx", sub)) => commands::transactions::handle(&mut conn, sub)?,
        Some(("budget", sub)) => commands::budgets::handle(&conn, sub)?,
        Some(("goal", sub)) => commands::goals::handle(&mut conn, sub)?,
        Some(("recurring", sub)) => commands::recurring::handle(&mut conn, sub)?,
        Some(("debt", sub)) => commands::debts::handle(&mut conn, sub)?,
        Some(("report", sub)) => commands::reports::handle(&conn, sub)?,
        Some(("alerts", sub)) => commands::alerts::handle(&conn, sub)?,
        Some(("categorize", sub)) => commands::categorize::handle(sub)?,
        Some(("export", sub)) => commands::exporter::handle(&conn, sub)?,
        _ => {
            cli::build_cli().print_help()?;
            println!();
        }
    }
    db::close(conn)
}
