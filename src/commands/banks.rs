// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::utils::{
    ensure_user, last_four, maybe_print_json, parse_decimal, pretty_table, validate_ifsc,
};
use anyhow::Result;
use rusqlite::{params, Connection};
use rust_decimal::Decimal;
use serde::Serialize;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        Some(("rm", sub)) => rm(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn add(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let user_id = *sub.get_one::<i64>("user").unwrap();
    ensure_user(conn, user_id)?;
    let bank = sub.get_one::<String>("bank").unwrap().trim().to_string();
    let number = last_four(sub.get_one::<String>("number").unwrap())?;
    let ifsc = validate_ifsc(sub.get_one::<String>("ifsc").unwrap())?;
    let acct_type = sub.get_one::<String>("type").unwrap().trim().to_string();
    let branch = sub.get_one::<String>("branch").map(|s| s.trim().to_string());
    let upi = sub.get_one::<String>("upi").map(|s| s.trim().to_string());
    let balance = sub
        .get_one::<String>("balance")
        .map(|s| parse_decimal(s))
        .transpose()?
        .unwrap_or(Decimal::ZERO);
    let primary = !sub.get_flag("secondary");

    conn.execute(
        "INSERT INTO bank_accounts(user_id, bank_name, account_number, ifsc_code,
                                   account_type, branch_name, upi_id, is_primary, balance)
         VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9)",
        params![
            user_id,
            bank,
            number,
            ifsc,
            acct_type,
            branch,
            upi,
            primary as i64,
            balance.to_string()
        ],
    )?;
    println!(
        "Linked {} account ****{} (id: {})",
        bank,
        number,
        conn.last_insert_rowid()
    );
    Ok(())
}

#[derive(Serialize)]
struct BankRow {
    id: i64,
    bank: String,
    number: String,
    ifsc: String,
    r#type: String,
    primary: bool,
    balance: String,
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let user_id = *sub.get_one::<i64>("user").unwrap();
    let mut stmt = conn.prepare(
        "SELECT id, bank_name, account_number, ifsc_code, account_type, is_primary, balance
         FROM bank_accounts WHERE user_id=?1 ORDER BY is_primary DESC, id",
    )?;
    let rows = stmt.query_map(params![user_id], |r| {
        Ok(BankRow {
            id: r.get(0)?,
            bank: r.get(1)?,
            number: r.get(2)?,
            ifsc: r.get(3)?,
            r#type: r.get(4)?,
            primary: r.get::<_, i64>(5)? != 0,
            balance: r.get(6)?,
        })
    })?;
    let mut data = Vec::new();
    for row in rows {
        data.push(row?);
    }
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let rows: Vec<Vec<String>> = data
            .iter()
            .map(|a| {
                vec![
                    a.id.to_string(),
                    a.bank.clone(),
                    format!("****{}", a.number),
                    a.ifsc.clone(),
                    a.r#type.clone(),
                    if a.primary { "yes".into() } else { "".into() },
                    a.balance.clone(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["Id", "Bank", "Number", "IFSC", "Type", "Primary", "Balance"],
                rows
            )
        );
    }
    Ok(())
}

fn rm(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id = *sub.get_one::<i64>("id").unwrap();
    let deleted = conn.execute("DELETE FROM bank_accounts WHERE id=?1", params![id])?;
    if deleted == 0 {
        anyhow::bail!("Bank account {} not found", id);
    }
    println!("Removed bank account {}", id);
    Ok(())
}
