// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use rusqlite::{params_from_iter, Connection};
use serde_json::json;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("transactions", sub)) => export_transactions(conn, sub),
        _ => Ok(()),
    }
}

fn export_transactions(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let fmt = sub.get_one::<String>("format").unwrap().to_lowercase();
    let out = sub.get_one::<String>("out").unwrap();
    let user_id = sub.get_one::<i64>("user").copied();

    let mut sql = String::from(
        "SELECT t.date, t.kind, t.amount, t.category, t.merchant, t.payment_mode,
                c.last_four, t.status, t.note
         FROM transactions t
         LEFT JOIN cards c ON t.card_id=c.id
         WHERE 1=1",
    );
    let mut args: Vec<String> = Vec::new();
    if let Some(user_id) = user_id {
        sql.push_str(" AND t.user_id=?");
        args.push(user_id.to_string());
    }
    sql.push_str(" ORDER BY t.date, t.id");

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params_from_iter(args.iter()), |r| {
        Ok((
            r.get::<_, String>(0)?,
            r.get::<_, String>(1)?,
            r.get::<_, String>(2)?,
            r.get::<_, String>(3)?,
            r.get::<_, Option<String>>(4)?,
            r.get::<_, String>(5)?,
            r.get::<_, Option<String>>(6)?,
            r.get::<_, String>(7)?,
            r.get::<_, Option<String>>(8)?,
        ))
    })?;

    match fmt.as_str() {
        "csv" => {
            let mut wtr = csv::Writer::from_path(out)?;
            wtr.write_record([
                "date", "kind", "amount", "category", "merchant", "mode", "card", "status", "note",
            ])?;
            for row in rows {
                let (date, kind, amount, category, merchant, mode, card, status, note) = row?;
                wtr.write_record([
                    date,
                    kind,
                    amount,
                    category,
                    merchant.unwrap_or_default(),
                    mode,
                    card.map(|c| format!("****{}", c)).unwrap_or_default(),
                    status,
                    note.unwrap_or_default(),
                ])?;
            }
            wtr.flush()?;
        }
        "json" => {
            let mut items = Vec::new();
            for row in rows {
                let (date, kind, amount, category, merchant, mode, card, status, note) = row?;
                items.push(json!({
                    "date": date, "kind": kind, "amount": amount, "category": category,
                    "merchant": merchant, "mode": mode, "card": card, "status": status,
                    "note": note
                }));
            }
            std::fs::write(out, serde_json::to_string_pretty(&items)?)?;
        }
        _ => anyhow::bail!("Unknown format: {} (use csv|json)", fmt),
    }
    println!("Exported transactions to {}", out);
    Ok(())
}
