// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, value_parser};

pub const DEFAULT_ADDR: &str = "127.0.0.1:8001";

fn json_flags(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .help("Print JSON"),
    )
    .arg(
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .conflicts_with("json")
            .help("Print one JSON object per line"),
    )
}

fn json_flag(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .help("Print JSON"),
    )
}

fn opt(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name).long(name).help(help)
}

fn req(name: &'static str, help: &'static str) -> Arg {
    opt(name, help).required(true)
}

pub fn build_cli() -> Command {
    Command::new("fintrack")
        .about("Personal finance tracker: accounts, transactions, budgets, goals and net worth")
        .version(clap::crate_version!())
        .arg(
            Arg::new("db")
                .long("db")
                .env("FINTRACK_DB")
                .global(true)
                .help("Path to the SQLite database (defaults to the platform data dir)"),
        )
        .subcommand(Command::new("init").about("Create the database and schema"))
        .subcommand(
            Command::new("serve").about("Run the HTTP API").arg(
                Arg::new("addr")
                    .long("addr")
                    .env("FINTRACK_ADDR")
                    .default_value(DEFAULT_ADDR)
                    .help("Listen address"),
            ),
        )
        .subcommand(
            Command::new("config")
                .about("Persisted settings")
                .subcommand(
                    Command::new("get")
                        .about("Show a setting")
                        .arg(Arg::new("key").required(true)),
                )
                .subcommand(
                    Command::new("set")
                        .about("Change a setting")
                        .arg(Arg::new("key").required(true))
                        .arg(Arg::new("value").required(true)),
                ),
        )
        .subcommand(
            Command::new("account")
                .about("Manage accounts")
                .subcommand(
                    Command::new("add")
                        .about("Add an account")
                        .arg(req("name", "Unique account name"))
                        .arg(req("type", "Bank, E-Wallet, Cash, Investment, Credit Card, Other"))
                        .arg(opt("balance", "Opening balance"))
                        .arg(opt("currency", "Currency code (defaults to the configured one)")),
                )
                .subcommand(json_flags(Command::new("list").about("List accounts")))
                .subcommand(
                    Command::new("rm")
                        .about("Remove an account")
                        .arg(req("name", "Account name")),
                ),
        )
        .subcommand(
            Command::new("tx")
                .about("Record and search transactions")
                .subcommand(
                    Command::new("add")
                        .about("Record a transaction")
                        .arg(req("account", "Account name"))
                        .arg(req("amount", "Positive amount"))
                        .arg(req("description", "What it was"))
                        .arg(req("category", "Category, e.g. Food or Salary"))
                        .arg(opt("type", "income or expense").default_value("expense"))
                        .arg(opt("date", "YYYY-MM-DD (defaults to today)"))
                        .arg(opt("sub-category", "Active, Passive, Needs, Wants"))
                        .arg(opt("method", "Payment method (defaults to Cash)"))
                        .arg(opt("status", "Completed, Pending, Cancelled"))
                        .arg(opt("notes", "Free text"))
                        .arg(opt("tag", "Tag (repeatable)").action(ArgAction::Append)),
                )
                .subcommand(json_flags(
                    Command::new("list")
                        .about("Search transactions")
                        .arg(opt("search", "Text in description or notes"))
                        .arg(opt("type", "income or expense"))
                        .arg(opt("category", "Category"))
                        .arg(opt("account", "Account name"))
                        .arg(opt("status", "Status"))
                        .arg(opt("from", "First date (inclusive)"))
                        .arg(opt("to", "Last date (inclusive)"))
                        .arg(opt("min", "Minimum amount"))
                        .arg(opt("max", "Maximum amount"))
                        .arg(opt(
                            "sort",
                            "date, amount, description, category, account, created_at",
                        ))
                        .arg(
                            Arg::new("asc")
                                .long("asc")
                                .action(ArgAction::SetTrue)
                                .help("Ascending order"),
                        )
                        .arg(opt("limit", "Maximum rows").value_parser(value_parser!(usize))),
                ))
                .subcommand(
                    Command::new("rm")
                        .about("Delete a transaction")
                        .arg(req("id", "Transaction id")),
                )
                .subcommand(json_flag(
                    Command::new("stats").about("Totals and per-category breakdown"),
                )),
        )
        .subcommand(
            Command::new("budget")
                .about("Monthly category budgets")
                .subcommand(
                    Command::new("set")
                        .about("Create or change a budget")
                        .arg(req("category", "Category"))
                        .arg(req("amount", "Limit"))
                        .arg(opt("month", "YYYY-MM (defaults to this month)")),
                )
                .subcommand(json_flags(
                    Command::new("list")
                        .about("Budgets with spending")
                        .arg(opt("month", "YYYY-MM")),
                ))
                .subcommand(json_flag(
                    Command::new("summary")
                        .about("Month totals")
                        .arg(opt("month", "YYYY-MM (defaults to this month)")),
                )),
        )
        .subcommand(
            Command::new("goal")
                .about("Savings goals")
                .subcommand(json_flags(Command::new("list").about("List goals")))
                .subcommand(
                    Command::new("contribute")
                        .about("Add money to a goal")
                        .arg(req("id", "Goal id"))
                        .arg(req("amount", "Amount"))
                        .arg(opt("notes", "Free text")),
                ),
        )
        .subcommand(
            Command::new("recurring")
                .about("Recurring bills and income")
                .subcommand(json_flags(Command::new("list").about("List recurring items")))
                .subcommand(
                    Command::new("pay")
                        .about("Pay an item for a month")
                        .arg(req("id", "Recurring item id"))
                        .arg(opt("month", "YYYY-MM (defaults to this month)")),
                ),
        )
        .subcommand(
            Command::new("debt")
                .about("Debts")
                .subcommand(json_flags(
                    Command::new("list").about("List debts").arg(
                        Arg::new("all")
                            .long("all")
                            .action(ArgAction::SetTrue)
                            .help("Include paid-off debts"),
                    ),
                ))
                .subcommand(
                    Command::new("pay")
                        .about("Pay down a debt")
                        .arg(req("id", "Debt id"))
                        .arg(req("amount", "Amount"))
                        .arg(req("account", "Account paid from"))
                        .arg(opt("notes", "Free text")),
                ),
        )
        .subcommand(
            Command::new("report")
                .about("Aggregate views")
                .subcommand(json_flag(Command::new("dashboard").about("Net worth overview")))
                .subcommand(json_flag(
                    Command::new("balance-sheet").about("Assets, liabilities, equity"),
                ))
                .subcommand(json_flag(Command::new("ratios").about("Financial health ratios")))
                .subcommand(json_flag(Command::new("monthly").about("Income and expense per month")))
                .subcommand(json_flag(Command::new("category").about("Totals per category"))),
        )
        .subcommand(json_flags(
            Command::new("alerts").about("Budget, goal and bill warnings"),
        ))
        .subcommand(json_flag(
            Command::new("categorize")
                .about("Suggest a category for a description")
                .arg(Arg::new("text").required(true)),
        ))
        .subcommand(
            Command::new("export").about("Export data").subcommand(
                Command::new("transactions")
                    .about("Export transactions")
                    .arg(req("format", "csv or json"))
                    .arg(req("out", "Output file")),
            ),
        )
}
