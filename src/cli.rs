// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{crate_version, Arg, ArgAction, Command};

fn json_flags(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .help("Print as pretty JSON"),
    )
    .arg(
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .help("Print as JSON lines"),
    )
}

fn user_arg(required: bool) -> Arg {
    Arg::new("user")
        .long("user")
        .value_parser(clap::value_parser!(i64))
        .required(required)
        .help("User id")
}

pub fn build_cli() -> Command {
    Command::new("pocketledger")
        .version(crate_version!())
        .about("Personal finance and credit card tracker")
        .subcommand_required(false)
        .subcommand(Command::new("init").about("Create the database if missing"))
        .subcommand(
            Command::new("user")
                .about("Manage user profiles")
                .subcommand(
                    Command::new("add")
                        .about("Register a user profile")
                        .arg(Arg::new("name").long("name").required(true))
                        .arg(Arg::new("phone").long("phone").required(true).help("10-digit phone"))
                        .arg(Arg::new("email").long("email").required(true))
                        .arg(Arg::new("employment-status").long("employment-status"))
                        .arg(Arg::new("company").long("company"))
                        .arg(Arg::new("salary").long("salary").help("Monthly salary"))
                        .arg(
                            Arg::new("salary-day")
                                .long("salary-day")
                                .value_parser(clap::value_parser!(u32).range(1..=31)),
                        ),
                )
                .subcommand(json_flags(Command::new("list").about("List users")))
                .subcommand(
                    Command::new("update")
                        .about("Update a user profile")
                        .arg(Arg::new("id").long("id").value_parser(clap::value_parser!(i64)).required(true))
                        .arg(Arg::new("name").long("name"))
                        .arg(Arg::new("phone").long("phone"))
                        .arg(Arg::new("employment-status").long("employment-status"))
                        .arg(Arg::new("company").long("company"))
                        .arg(Arg::new("salary").long("salary"))
                        .arg(
                            Arg::new("salary-day")
                                .long("salary-day")
                                .value_parser(clap::value_parser!(u32).range(1..=31)),
                        )
                        .arg(
                            Arg::new("onboarded")
                                .long("onboarded")
                                .action(ArgAction::SetTrue)
                                .help("Mark onboarding as completed"),
                        ),
                ),
        )
        .subcommand(
            Command::new("bank")
                .about("Manage bank accounts")
                .subcommand(
                    Command::new("add")
                        .about("Link a bank account")
                        .arg(user_arg(true))
                        .arg(Arg::new("bank").long("bank").required(true))
                        .arg(Arg::new("number").long("number").required(true).help("Account number (only last 4 digits are stored)"))
                        .arg(Arg::new("ifsc").long("ifsc").required(true))
                        .arg(Arg::new("type").long("type").required(true).help("Savings/Current"))
                        .arg(Arg::new("branch").long("branch"))
                        .arg(Arg::new("upi").long("upi"))
                        .arg(Arg::new("balance").long("balance").help("Opening balance"))
                        .arg(
                            Arg::new("secondary")
                                .long("secondary")
                                .action(ArgAction::SetTrue)
                                .help("Do not mark as the primary account"),
                        ),
                )
                .subcommand(json_flags(
                    Command::new("list").about("List a user's bank accounts").arg(user_arg(true)),
                ))
                .subcommand(
                    Command::new("rm")
                        .about("Delete a bank account")
                        .arg(Arg::new("id").long("id").value_parser(clap::value_parser!(i64)).required(true)),
                ),
        )
        .subcommand(
            Command::new("card")
                .about("Manage cards")
                .subcommand(
                    Command::new("add")
                        .about("Add a credit or debit card")
                        .arg(user_arg(true))
                        .arg(Arg::new("type").long("type").required(true).help("credit|debit"))
                        .arg(Arg::new("number").long("number").required(true).help("Card number (only last 4 digits are stored)"))
                        .arg(Arg::new("holder").long("holder").required(true))
                        .arg(Arg::new("bank").long("bank").required(true))
                        .arg(Arg::new("expiry").long("expiry").required(true).help("MM/YY"))
                        .arg(Arg::new("provider").long("provider").required(true).help("Visa/Mastercard/..."))
                        .arg(Arg::new("name").long("name").help("Card product name"))
                        .arg(Arg::new("limit").long("limit").help("Credit limit"))
                        .arg(
                            Arg::new("outstanding")
                                .long("outstanding")
                                .help("Outstanding carried over from before tracking"),
                        )
                        .arg(
                            Arg::new("billing-day")
                                .long("billing-day")
                                .value_parser(clap::value_parser!(u32).range(1..=31)),
                        )
                        .arg(
                            Arg::new("due-day")
                                .long("due-day")
                                .value_parser(clap::value_parser!(u32).range(1..=31)),
                        )
                        .arg(Arg::new("daily-limit").long("daily-limit").help("Debit card daily limit"))
                        .arg(
                            Arg::new("linked-account")
                                .long("linked-account")
                                .value_parser(clap::value_parser!(i64))
                                .help("Bank account id backing a debit card"),
                        ),
                )
                .subcommand(json_flags(
                    Command::new("list").about("List a user's cards").arg(user_arg(true)),
                ))
                .subcommand(
                    Command::new("show")
                        .about("Show one card with its outstanding")
                        .arg(Arg::new("id").long("id").value_parser(clap::value_parser!(i64)).required(true)),
                ),
        )
        .subcommand(
            Command::new("tx")
                .about("Record and query transactions")
                .subcommand(
                    Command::new("add")
                        .about("Record a transaction")
                        .arg(user_arg(true))
                        .arg(Arg::new("amount").long("amount").required(true))
                        .arg(Arg::new("category").long("category").required(true))
                        .arg(
                            Arg::new("kind")
                                .long("kind")
                                .default_value("expense")
                                .help("income|expense"),
                        )
                        .arg(Arg::new("merchant").long("merchant"))
                        .arg(Arg::new("note").long("note"))
                        .arg(Arg::new("date").long("date").help("YYYY-MM-DD, default today"))
                        .arg(
                            Arg::new("card")
                                .long("card")
                                .value_parser(clap::value_parser!(i64))
                                .help("Card id the payment went through"),
                        )
                        .arg(
                            Arg::new("bank-account")
                                .long("bank-account")
                                .value_parser(clap::value_parser!(i64)),
                        )
                        .arg(
                            Arg::new("mode")
                                .long("mode")
                                .default_value("cash")
                                .help("cash|upi|debit-card|credit-card|bank-transfer"),
                        )
                        .arg(
                            Arg::new("status")
                                .long("status")
                                .default_value("completed")
                                .help("completed|pending|failed"),
                        ),
                )
                .subcommand(json_flags(
                    Command::new("list")
                        .about("List transactions, newest first")
                        .arg(user_arg(false))
                        .arg(
                            Arg::new("card")
                                .long("card")
                                .value_parser(clap::value_parser!(i64)),
                        )
                        .arg(Arg::new("category").long("category"))
                        .arg(Arg::new("kind").long("kind").help("income|expense"))
                        .arg(Arg::new("from").long("from").help("Inclusive lower date bound"))
                        .arg(Arg::new("to").long("to").help("Inclusive upper date bound"))
                        .arg(
                            Arg::new("limit")
                                .long("limit")
                                .value_parser(clap::value_parser!(usize)),
                        )
                        .arg(
                            Arg::new("offset")
                                .long("offset")
                                .value_parser(clap::value_parser!(usize)),
                        ),
                ))
                .subcommand(
                    Command::new("edit")
                        .about("Edit a transaction; the card balance is reconciled")
                        .arg(Arg::new("id").long("id").value_parser(clap::value_parser!(i64)).required(true))
                        .arg(Arg::new("amount").long("amount"))
                        .arg(Arg::new("kind").long("kind"))
                        .arg(Arg::new("category").long("category"))
                        .arg(Arg::new("merchant").long("merchant"))
                        .arg(Arg::new("note").long("note"))
                        .arg(Arg::new("date").long("date"))
                        .arg(Arg::new("mode").long("mode"))
                        .arg(
                            Arg::new("card")
                                .long("card")
                                .value_parser(clap::value_parser!(i64)),
                        )
                        .arg(
                            Arg::new("detach-card")
                                .long("detach-card")
                                .action(ArgAction::SetTrue)
                                .conflicts_with("card")
                                .help("Unlink the card"),
                        )
                        .arg(Arg::new("status").long("status")),
                )
                .subcommand(
                    Command::new("rm")
                        .about("Delete a transaction, reversing its balance effect")
                        .arg(Arg::new("id").long("id").value_parser(clap::value_parser!(i64)).required(true)),
                ),
        )
        .subcommand(
            Command::new("budget")
                .about("Monthly budgets")
                .subcommand(
                    Command::new("set")
                        .about("Set (or replace) the budget for a month")
                        .arg(user_arg(true))
                        .arg(Arg::new("month").long("month").required(true).help("MM-YYYY"))
                        .arg(Arg::new("total").long("total").required(true))
                        .arg(
                            Arg::new("category")
                                .long("category")
                                .action(ArgAction::Append)
                                .help("NAME=AMOUNT, repeatable; replaces the whole map"),
                        )
                        .arg(Arg::new("savings-goal").long("savings-goal")),
                )
                .subcommand(json_flags(
                    Command::new("show")
                        .about("Show a month's budget")
                        .arg(user_arg(true))
                        .arg(Arg::new("month").long("month").required(true).help("MM-YYYY")),
                ))
                .subcommand(json_flags(
                    Command::new("list").about("List a user's budgets").arg(user_arg(true)),
                ))
                .subcommand(json_flags(
                    Command::new("report")
                        .about("Budget vs actual spend per category")
                        .arg(user_arg(true))
                        .arg(Arg::new("month").long("month").required(true).help("MM-YYYY")),
                )),
        )
        .subcommand(
            Command::new("export").about("Export data").subcommand(
                Command::new("transactions")
                    .about("Export the transaction ledger")
                    .arg(user_arg(false))
                    .arg(Arg::new("out").long("out").required(true))
                    .arg(
                        Arg::new("format")
                            .long("format")
                            .default_value("csv")
                            .help("csv|json"),
                    ),
            ),
        )
        .subcommand(
            Command::new("doctor")
                .about("Audit card balances and referential health")
                .arg(
                    Arg::new("fix")
                        .long("fix")
                        .action(ArgAction::SetTrue)
                        .help("Rewrite drifted balances from the ledger"),
                ),
        )
}
