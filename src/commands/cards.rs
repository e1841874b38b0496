// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::ledger;
use crate::models::CardType;
use crate::utils::{
    ensure_user, last_four, maybe_print_json, parse_decimal, pretty_table, validate_expiry,
};
use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};
use rust_decimal::Decimal;
use serde::Serialize;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        Some(("show", sub)) => show(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn add(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let user_id = *sub.get_one::<i64>("user").unwrap();
    ensure_user(conn, user_id)?;
    let card_type: CardType = sub.get_one::<String>("type").unwrap().parse()?;
    let number = last_four(sub.get_one::<String>("number").unwrap())?;
    let holder = sub.get_one::<String>("holder").unwrap().trim().to_string();
    let bank = sub.get_one::<String>("bank").unwrap().trim().to_string();
    let expiry = validate_expiry(sub.get_one::<String>("expiry").unwrap())?;
    let provider = sub.get_one::<String>("provider").unwrap().trim().to_string();
    let card_name = sub.get_one::<String>("name").map(|s| s.trim().to_string());
    let credit_limit = sub
        .get_one::<String>("limit")
        .map(|s| parse_decimal(s))
        .transpose()?;
    let opening = sub
        .get_one::<String>("outstanding")
        .map(|s| parse_decimal(s))
        .transpose()?
        .unwrap_or(Decimal::ZERO);
    let billing_day = sub.get_one::<u32>("billing-day").copied();
    let due_day = sub.get_one::<u32>("due-day").copied();
    let daily_limit = sub
        .get_one::<String>("daily-limit")
        .map(|s| parse_decimal(s))
        .transpose()?;
    let linked_account = sub.get_one::<i64>("linked-account").copied();
    if let Some(account_id) = linked_account {
        let owner: Option<i64> = conn
            .query_row(
                "SELECT user_id FROM bank_accounts WHERE id=?1",
                params![account_id],
                |r| r.get(0),
            )
            .optional()?;
        match owner {
            None => anyhow::bail!("Bank account {} not found", account_id),
            Some(owner) if owner != user_id => {
                anyhow::bail!("Bank account {} does not belong to user {}", account_id, user_id)
            }
            Some(_) => {}
        }
    }

    conn.execute(
        "INSERT INTO cards(user_id, card_type, last_four, holder_name, bank_name, expiry,
                           provider, card_name, credit_limit, opening_outstanding,
                           current_outstanding, billing_day, due_day, daily_limit,
                           linked_account_id)
         VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11,?12,?13,?14,?15)",
        params![
            user_id,
            card_type.as_str(),
            number,
            holder,
            bank,
            expiry,
            provider,
            card_name,
            credit_limit.map(|l| l.to_string()),
            opening.to_string(),
            // the running outstanding starts at the carried-over value
            opening.to_string(),
            billing_day,
            due_day,
            daily_limit.map(|l| l.to_string()),
            linked_account
        ],
    )?;
    println!(
        "Added {} card ****{} (id: {})",
        card_type,
        number,
        conn.last_insert_rowid()
    );
    Ok(())
}

#[derive(Serialize)]
struct CardRow {
    id: i64,
    r#type: String,
    number: String,
    bank: String,
    provider: String,
    expiry: String,
    status: String,
    outstanding: String,
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let user_id = *sub.get_one::<i64>("user").unwrap();
    let mut stmt = conn.prepare(
        "SELECT id, card_type, last_four, bank_name, provider, expiry, status,
                current_outstanding
         FROM cards WHERE user_id=?1 ORDER BY id",
    )?;
    let rows = stmt.query_map(params![user_id], |r| {
        Ok(CardRow {
            id: r.get(0)?,
            r#type: r.get(1)?,
            number: r.get(2)?,
            bank: r.get(3)?,
            provider: r.get(4)?,
            expiry: r.get(5)?,
            status: r.get(6)?,
            outstanding: r.get(7)?,
        })
    })?;
    let mut data = Vec::new();
    for row in rows {
        data.push(row?);
    }
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let rows: Vec<Vec<String>> = data
            .iter()
            .map(|c| {
                vec![
                    c.id.to_string(),
                    c.r#type.clone(),
                    format!("****{}", c.number),
                    c.bank.clone(),
                    c.provider.clone(),
                    c.expiry.clone(),
                    c.status.clone(),
                    c.outstanding.clone(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["Id", "Type", "Number", "Bank", "Provider", "Expiry", "Status", "Outstanding"],
                rows
            )
        );
    }
    Ok(())
}

fn show(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id = *sub.get_one::<i64>("id").unwrap();
    let row = conn
        .query_row(
            "SELECT card_type, last_four, holder_name, bank_name, expiry, provider,
                    card_name, credit_limit, opening_outstanding, current_outstanding,
                    billing_day, due_day, status
             FROM cards WHERE id=?1",
            params![id],
            |r| {
                Ok((
                    r.get::<_, String>(0)?,
                    r.get::<_, String>(1)?,
                    r.get::<_, String>(2)?,
                    r.get::<_, String>(3)?,
                    r.get::<_, String>(4)?,
                    r.get::<_, String>(5)?,
                    r.get::<_, Option<String>>(6)?,
                    r.get::<_, Option<String>>(7)?,
                    r.get::<_, String>(8)?,
                    r.get::<_, String>(9)?,
                    r.get::<_, Option<i64>>(10)?,
                    r.get::<_, Option<i64>>(11)?,
                    r.get::<_, String>(12)?,
                ))
            },
        )
        .optional()?
        .with_context(|| format!("Card {} not found", id))?;
    let (card_type, number, holder, bank, expiry, provider, name, limit, opening, current, billing, due, status) =
        row;
    let per_ledger = ledger::recompute_outstanding(conn, id)?;

    let mut rows = vec![
        vec!["Type".to_string(), card_type],
        vec!["Number".to_string(), format!("****{}", number)],
        vec!["Holder".to_string(), holder],
        vec!["Bank".to_string(), bank],
        vec!["Expiry".to_string(), expiry],
        vec!["Provider".to_string(), provider],
        vec!["Status".to_string(), status],
        vec!["Opening outstanding".to_string(), opening],
        vec!["Current outstanding".to_string(), current],
        vec!["Outstanding per ledger".to_string(), per_ledger.to_string()],
    ];
    if let Some(name) = name {
        rows.push(vec!["Card name".to_string(), name]);
    }
    if let Some(limit) = limit {
        rows.push(vec!["Credit limit".to_string(), limit]);
    }
    if let Some(day) = billing {
        rows.push(vec!["Billing day".to_string(), day.to_string()]);
    }
    if let Some(day) = due {
        rows.push(vec!["Due day".to_string(), day.to_string()]);
    }
    println!("{}", pretty_table(&["Field", "Value"], rows));
    Ok(())
}
