// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::collections::BTreeMap;

use crate::budget::{self, validate_month_year};
use crate::utils::{maybe_print_json, parse_decimal, pretty_table};
use anyhow::{Context, Result};
use rusqlite::{params, Connection};
use rust_decimal::Decimal;
use serde::Serialize;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("set", sub)) => set(conn, sub)?,
        Some(("show", sub)) => show(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        Some(("report", sub)) => report(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn set(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let user_id = *sub.get_one::<i64>("user").unwrap();
    let month = sub.get_one::<String>("month").unwrap();
    let total = parse_decimal(sub.get_one::<String>("total").unwrap())?;
    let savings_goal = sub
        .get_one::<String>("savings-goal")
        .map(|s| parse_decimal(s))
        .transpose()?;

    let mut categories = BTreeMap::new();
    if let Some(entries) = sub.get_many::<String>("category") {
        for entry in entries {
            let (name, amount) = entry
                .split_once('=')
                .with_context(|| format!("Invalid category '{}', expected NAME=AMOUNT", entry))?;
            categories.insert(name.trim().to_string(), parse_decimal(amount)?);
        }
    }

    let input = crate::models::BudgetInput {
        total_budget: total,
        categories,
        savings_goal,
    };
    let saved = budget::upsert_budget(conn, user_id, month, &input)?;
    println!(
        "Budget set for {} ({} categories, total {})",
        saved.month_year,
        saved.categories.len(),
        saved.total_budget
    );
    Ok(())
}

fn show(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let user_id = *sub.get_one::<i64>("user").unwrap();
    let month = sub.get_one::<String>("month").unwrap();
    let found = budget::get_budget(conn, user_id, month)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &found)? {
        let mut rows = vec![
            vec!["Month".to_string(), found.month_year.clone()],
            vec!["Total".to_string(), found.total_budget.to_string()],
        ];
        if let Some(goal) = found.savings_goal {
            rows.push(vec!["Savings goal".to_string(), goal.to_string()]);
        }
        for (category, amount) in &found.categories {
            rows.push(vec![format!("  {}", category), amount.to_string()]);
        }
        rows.push(vec!["Updated".to_string(), found.updated_at.clone()]);
        println!("{}", pretty_table(&["Field", "Value"], rows));
    }
    Ok(())
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let user_id = *sub.get_one::<i64>("user").unwrap();
    let budgets = budget::list_budgets(conn, user_id)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &budgets)? {
        let rows: Vec<Vec<String>> = budgets
            .iter()
            .map(|b| {
                vec![
                    b.month_year.clone(),
                    b.total_budget.to_string(),
                    b.categories.len().to_string(),
                    b.savings_goal.map(|g| g.to_string()).unwrap_or_default(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["Month", "Total", "Categories", "Savings goal"], rows)
        );
    }
    Ok(())
}

#[derive(Serialize)]
pub struct ReportRow {
    pub category: String,
    pub budget: String,
    pub spent: String,
    pub remaining: String,
}

fn report(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let user_id = *sub.get_one::<i64>("user").unwrap();
    let month = sub.get_one::<String>("month").unwrap();
    let data = report_rows(conn, user_id, month)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let rows: Vec<Vec<String>> = data
            .iter()
            .map(|r| {
                vec![
                    r.category.clone(),
                    r.budget.clone(),
                    r.spent.clone(),
                    r.remaining.clone(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["Category", "Budget", "Spent", "Remaining"], rows)
        );
    }
    Ok(())
}

/// Budget vs actual for one month: each budgeted category against the sum
/// of that month's expense transactions.
pub fn report_rows(conn: &Connection, user_id: i64, month: &str) -> Result<Vec<ReportRow>> {
    let month = validate_month_year(month)?;
    let found = budget::get_budget(conn, user_id, &month)?;

    // MM-YYYY key -> the YYYY-MM prefix transaction dates carry
    let (mm, yyyy) = month
        .split_once('-')
        .with_context(|| format!("Invalid month key '{}'", month))?;
    let ym = format!("{}-{}", yyyy, mm);

    let mut data = Vec::new();
    for (category, budgeted) in &found.categories {
        let spent = sum_spent(conn, user_id, category, &ym)?;
        data.push(ReportRow {
            category: category.clone(),
            budget: budgeted.to_string(),
            spent: spent.to_string(),
            remaining: (*budgeted - spent).to_string(),
        });
    }

    // Unbudgeted categories with spending still show up, over budget 0
    let mut stmt = conn.prepare(
        "SELECT DISTINCT category FROM transactions
         WHERE user_id=?1 AND kind='expense' AND substr(date,1,7)=?2 ORDER BY category",
    )?;
    let extra = stmt
        .query_map(params![user_id, ym], |r| r.get::<_, String>(0))?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    for category in extra {
        if found.categories.contains_key(&category) {
            continue;
        }
        let spent = sum_spent(conn, user_id, &category, &ym)?;
        data.push(ReportRow {
            category,
            budget: "0".to_string(),
            spent: spent.to_string(),
            remaining: (-spent).to_string(),
        });
    }
    Ok(data)
}

fn sum_spent(conn: &Connection, user_id: i64, category: &str, ym: &str) -> Result<Decimal> {
    let mut stmt = conn.prepare(
        "SELECT amount FROM transactions
         WHERE user_id=?1 AND kind='expense' AND category=?2 AND substr(date,1,7)=?3",
    )?;
    let mut rows = stmt.query(params![user_id, category, ym])?;
    let mut total = Decimal::ZERO;
    while let Some(r) = rows.next()? {
        let raw: String = r.get(0)?;
        total += raw
            .parse::<Decimal>()
            .with_context(|| format!("Invalid amount '{}' in transactions", raw))?;
    }
    Ok(total)
}
