// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Monthly budgets, one record per (user, month) key. An upsert replaces
//! the mutable fields wholesale; the category map is never merged, so a
//! category the user removed does not linger.

use std::collections::BTreeMap;

use rusqlite::{params, Connection, OptionalExtension};
use rust_decimal::Decimal;

use crate::error::Error;
use crate::models::{Budget, BudgetInput};

/// Validate an `MM-YYYY` month key, returning the trimmed form.
pub fn validate_month_year(s: &str) -> Result<String, Error> {
    let s = s.trim();
    chrono::NaiveDate::parse_from_str(&format!("01-{}", s), "%d-%m-%Y").map_err(|_| {
        Error::Validation(format!("Invalid month '{}', expected MM-YYYY", s))
    })?;
    Ok(s.to_string())
}

/// Update-if-exists-else-insert keyed by (user, month). On conflict the
/// total, category map and savings goal are replaced and `updated_at`
/// bumped; `created_at` is preserved.
pub fn upsert_budget(
    conn: &Connection,
    user_id: i64,
    month_year: &str,
    input: &BudgetInput,
) -> Result<Budget, Error> {
    let month = validate_month_year(month_year)?;
    if input.total_budget < Decimal::ZERO {
        return Err(Error::Validation(format!(
            "Total budget must not be negative, got {}",
            input.total_budget
        )));
    }
    for (category, amount) in &input.categories {
        if *amount < Decimal::ZERO {
            return Err(Error::Validation(format!(
                "Budget for '{}' must not be negative, got {}",
                category, amount
            )));
        }
    }
    ensure_user(conn, user_id)?;

    let categories = serde_json::to_string(&input.categories)?;
    conn.execute(
        "INSERT INTO budgets(user_id, month_year, total_budget, categories, savings_goal)
         VALUES (?1,?2,?3,?4,?5)
         ON CONFLICT(user_id, month_year) DO UPDATE SET
             total_budget=excluded.total_budget,
             categories=excluded.categories,
             savings_goal=excluded.savings_goal,
             updated_at=datetime('now')",
        params![
            user_id,
            month,
            input.total_budget.to_string(),
            categories,
            input.savings_goal.map(|g| g.to_string())
        ],
    )?;
    get_budget(conn, user_id, &month)
}

pub fn get_budget(conn: &Connection, user_id: i64, month_year: &str) -> Result<Budget, Error> {
    let month = validate_month_year(month_year)?;
    let raw = conn
        .query_row(
            "SELECT id, user_id, month_year, total_budget, categories, savings_goal,
                    created_at, updated_at
             FROM budgets WHERE user_id=?1 AND month_year=?2",
            params![user_id, month],
            RawBudget::read,
        )
        .optional()?;
    raw.ok_or_else(|| Error::not_found("Budget", format!("{}/{}", user_id, month)))?
        .finish()
}

/// All budgets for a user, newest month first.
pub fn list_budgets(conn: &Connection, user_id: i64) -> Result<Vec<Budget>, Error> {
    let mut stmt = conn.prepare(
        "SELECT id, user_id, month_year, total_budget, categories, savings_goal,
                created_at, updated_at
         FROM budgets WHERE user_id=?1
         ORDER BY substr(month_year,4,4) DESC, substr(month_year,1,2) DESC",
    )?;
    let raws = stmt
        .query_map(params![user_id], RawBudget::read)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    raws.into_iter().map(RawBudget::finish).collect()
}

fn ensure_user(conn: &Connection, user_id: i64) -> Result<(), Error> {
    let hit: Option<i64> = conn
        .query_row("SELECT id FROM users WHERE id=?1", params![user_id], |r| {
            r.get(0)
        })
        .optional()?;
    hit.map(|_| ())
        .ok_or_else(|| Error::not_found("User", user_id))
}

fn parse_amount(raw: &str) -> Result<Decimal, Error> {
    raw.parse::<Decimal>().map_err(|_| Error::CorruptAmount {
        table: "budgets",
        raw: raw.to_string(),
    })
}

struct RawBudget {
    id: i64,
    user_id: i64,
    month_year: String,
    total_budget: String,
    categories: String,
    savings_goal: Option<String>,
    created_at: String,
    updated_at: String,
}

impl RawBudget {
    fn read(r: &rusqlite::Row<'_>) -> rusqlite::Result<RawBudget> {
        Ok(RawBudget {
            id: r.get(0)?,
            user_id: r.get(1)?,
            month_year: r.get(2)?,
            total_budget: r.get(3)?,
            categories: r.get(4)?,
            savings_goal: r.get(5)?,
            created_at: r.get(6)?,
            updated_at: r.get(7)?,
        })
    }

    fn finish(self) -> Result<Budget, Error> {
        let categories: BTreeMap<String, Decimal> = serde_json::from_str(&self.categories)?;
        let savings_goal = match self.savings_goal {
            Some(raw) => Some(parse_amount(&raw)?),
            None => None,
        };
        Ok(Budget {
            id: self.id,
            user_id: self.user_id,
            month_year: self.month_year,
            total_budget: parse_amount(&self.total_budget)?,
            categories,
            savings_goal,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}
