// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::utils::{maybe_print_json, parse_decimal, pretty_table, validate_phone};
use anyhow::Result;
use rusqlite::{params, Connection};
use serde::Serialize;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        Some(("update", sub)) => update(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn add(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let name = sub.get_one::<String>("name").unwrap().trim().to_string();
    let phone = validate_phone(sub.get_one::<String>("phone").unwrap())?;
    let email = sub
        .get_one::<String>("email")
        .unwrap()
        .trim()
        .to_lowercase();
    let employment = sub.get_one::<String>("employment-status").map(|s| s.trim().to_string());
    let company = sub.get_one::<String>("company").map(|s| s.trim().to_string());
    let salary = sub
        .get_one::<String>("salary")
        .map(|s| parse_decimal(s))
        .transpose()?;
    let salary_day = sub.get_one::<u32>("salary-day").copied();

    conn.execute(
        "INSERT INTO users(full_name, phone, email, employment_status, company_name,
                           monthly_salary, salary_day)
         VALUES (?1,?2,?3,?4,?5,?6,?7)",
        params![
            name,
            phone,
            email,
            employment,
            company,
            salary.map(|s| s.to_string()),
            salary_day
        ],
    )
    .map_err(|e| match e {
        rusqlite::Error::SqliteFailure(err, _)
            if err.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            anyhow::Error::new(crate::error::Error::Conflict(format!(
                "Email '{}' is already registered",
                email
            )))
        }
        other => other.into(),
    })?;
    println!("Added user '{}' (id: {})", name, conn.last_insert_rowid());
    Ok(())
}

#[derive(Serialize)]
struct UserRow {
    id: i64,
    name: String,
    phone: String,
    email: String,
    onboarded: bool,
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let mut stmt = conn.prepare(
        "SELECT id, full_name, phone, email, onboarding_completed FROM users ORDER BY id",
    )?;
    let rows = stmt.query_map([], |r| {
        Ok(UserRow {
            id: r.get(0)?,
            name: r.get(1)?,
            phone: r.get(2)?,
            email: r.get(3)?,
            onboarded: r.get::<_, i64>(4)? != 0,
        })
    })?;
    let mut data = Vec::new();
    for row in rows {
        data.push(row?);
    }
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let rows: Vec<Vec<String>> = data
            .iter()
            .map(|u| {
                vec![
                    u.id.to_string(),
                    u.name.clone(),
                    u.phone.clone(),
                    u.email.clone(),
                    if u.onboarded { "yes".into() } else { "no".into() },
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["Id", "Name", "Phone", "Email", "Onboarded"], rows)
        );
    }
    Ok(())
}

fn update(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id = *sub.get_one::<i64>("id").unwrap();

    let mut sets: Vec<&str> = Vec::new();
    let mut args: Vec<String> = Vec::new();
    if let Some(name) = sub.get_one::<String>("name") {
        sets.push("full_name=?");
        args.push(name.trim().to_string());
    }
    if let Some(phone) = sub.get_one::<String>("phone") {
        sets.push("phone=?");
        args.push(validate_phone(phone)?);
    }
    if let Some(status) = sub.get_one::<String>("employment-status") {
        sets.push("employment_status=?");
        args.push(status.trim().to_string());
    }
    if let Some(company) = sub.get_one::<String>("company") {
        sets.push("company_name=?");
        args.push(company.trim().to_string());
    }
    if let Some(salary) = sub.get_one::<String>("salary") {
        sets.push("monthly_salary=?");
        args.push(parse_decimal(salary)?.to_string());
    }
    if let Some(day) = sub.get_one::<u32>("salary-day") {
        sets.push("salary_day=?");
        args.push(day.to_string());
    }
    if sub.get_flag("onboarded") {
        sets.push("onboarding_completed=1");
    }
    if sets.is_empty() {
        println!("Nothing to update");
        return Ok(());
    }
    sets.push("updated_at=datetime('now')");

    let sql = format!("UPDATE users SET {} WHERE id=?", sets.join(", "));
    args.push(id.to_string());
    let changed = conn.execute(&sql, rusqlite::params_from_iter(args.iter()))?;
    if changed == 0 {
        anyhow::bail!("User {} not found", id);
    }
    println!("Updated user {}", id);
    Ok(())
}
