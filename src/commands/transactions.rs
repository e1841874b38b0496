// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::ledger::{self, TransactionFilter};
use crate::models::{PaymentMode, TransactionInput, TransactionPatch, TxnKind, TxnStatus};
use crate::utils::{maybe_print_json, parse_date, parse_decimal, pretty_table};
use anyhow::Result;
use rusqlite::Connection;
use serde::Serialize;

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        Some(("edit", sub)) => edit(conn, sub)?,
        Some(("rm", sub)) => rm(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn add(conn: &mut Connection, sub: &clap::ArgMatches) -> Result<()> {
    let date = match sub.get_one::<String>("date") {
        Some(s) => parse_date(s)?,
        None => chrono::Local::now().date_naive(),
    };
    let input = TransactionInput {
        user_id: *sub.get_one::<i64>("user").unwrap(),
        kind: sub.get_one::<String>("kind").unwrap().parse::<TxnKind>()?,
        amount: parse_decimal(sub.get_one::<String>("amount").unwrap())?,
        category: sub.get_one::<String>("category").unwrap().trim().to_string(),
        merchant: sub.get_one::<String>("merchant").map(|s| s.trim().to_string()),
        note: sub.get_one::<String>("note").map(|s| s.trim().to_string()),
        date,
        card_id: sub.get_one::<i64>("card").copied(),
        bank_account_id: sub.get_one::<i64>("bank-account").copied(),
        payment_mode: sub.get_one::<String>("mode").unwrap().parse::<PaymentMode>()?,
        status: sub.get_one::<String>("status").unwrap().parse::<TxnStatus>()?,
    };
    let created = ledger::create_transaction(conn, &input)?;
    println!(
        "Recorded {} of {} in '{}' on {} (id: {})",
        created.kind, created.amount, created.category, created.date, created.id
    );
    Ok(())
}

fn edit(conn: &mut Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id = *sub.get_one::<i64>("id").unwrap();
    let patch = TransactionPatch {
        kind: sub
            .get_one::<String>("kind")
            .map(|s| s.parse::<TxnKind>())
            .transpose()?,
        amount: sub
            .get_one::<String>("amount")
            .map(|s| parse_decimal(s))
            .transpose()?,
        category: sub.get_one::<String>("category").map(|s| s.trim().to_string()),
        merchant: sub.get_one::<String>("merchant").map(|s| s.trim().to_string()),
        note: sub.get_one::<String>("note").map(|s| s.trim().to_string()),
        date: sub.get_one::<String>("date").map(|s| parse_date(s)).transpose()?,
        payment_mode: sub
            .get_one::<String>("mode")
            .map(|s| s.parse::<PaymentMode>())
            .transpose()?,
        card_id: if sub.get_flag("detach-card") {
            Some(None)
        } else {
            sub.get_one::<i64>("card").copied().map(Some)
        },
        status: sub
            .get_one::<String>("status")
            .map(|s| s.parse::<TxnStatus>())
            .transpose()?,
    };
    let updated = ledger::update_transaction(conn, id, &patch)?;
    println!(
        "Updated transaction {} ({} of {} in '{}')",
        updated.id, updated.kind, updated.amount, updated.category
    );
    Ok(())
}

fn rm(conn: &mut Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id = *sub.get_one::<i64>("id").unwrap();
    ledger::delete_transaction(conn, id)?;
    println!("Deleted transaction {}", id);
    Ok(())
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let data = query_rows(conn, sub)?;
    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        let rows: Vec<Vec<String>> = data
            .iter()
            .map(|r| {
                vec![
                    r.id.to_string(),
                    r.date.clone(),
                    r.kind.clone(),
                    r.amount.clone(),
                    r.category.clone(),
                    r.merchant.clone(),
                    r.mode.clone(),
                    r.card.clone(),
                    r.status.clone(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["Id", "Date", "Kind", "Amount", "Category", "Merchant", "Mode", "Card", "Status"],
                rows,
            )
        );
    }
    Ok(())
}

#[derive(Serialize)]
pub struct TransactionRow {
    pub id: i64,
    pub date: String,
    pub kind: String,
    pub amount: String,
    pub category: String,
    pub merchant: String,
    pub mode: String,
    pub card: String,
    pub status: String,
}

pub fn query_rows(conn: &Connection, sub: &clap::ArgMatches) -> Result<Vec<TransactionRow>> {
    let filter = TransactionFilter {
        user_id: sub.get_one::<i64>("user").copied(),
        card_id: sub.get_one::<i64>("card").copied(),
        category: sub.get_one::<String>("category").map(|s| s.trim().to_string()),
        kind: sub
            .get_one::<String>("kind")
            .map(|s| s.parse::<TxnKind>())
            .transpose()?,
        date_from: sub.get_one::<String>("from").map(|s| parse_date(s)).transpose()?,
        date_to: sub.get_one::<String>("to").map(|s| parse_date(s)).transpose()?,
        limit: sub.get_one::<usize>("limit").copied(),
        offset: sub.get_one::<usize>("offset").copied(),
    };
    let txns = ledger::list_transactions(conn, &filter)?;
    Ok(txns
        .into_iter()
        .map(|t| TransactionRow {
            id: t.id,
            date: t.date.to_string(),
            kind: t.kind.to_string(),
            amount: t.amount.to_string(),
            category: t.category,
            merchant: t.merchant.unwrap_or_default(),
            mode: t.payment_mode.to_string(),
            card: t.card_id.map(|c| c.to_string()).unwrap_or_default(),
            status: t.status.to_string(),
        })
        .collect())
}
