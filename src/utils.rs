// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use comfy_table::{presets::UTF8_FULL, Cell, Table};
use once_cell::sync::Lazy;
use regex::Regex;
use rusqlite::{params, Connection, OptionalExtension};
use rust_decimal::Decimal;

static PHONE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]{10}$").unwrap());
static IFSC_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z]{4}0[A-Z0-9]{6}$").unwrap());
static EXPIRY_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(0[1-9]|1[0-2])/[0-9]{2}$").unwrap());

pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", s))
}

pub fn parse_decimal(s: &str) -> Result<Decimal> {
    s.trim()
        .parse::<Decimal>()
        .with_context(|| format!("Invalid decimal '{}'", s))
}

pub fn validate_phone(s: &str) -> Result<String> {
    let s = s.trim();
    if !PHONE_RE.is_match(s) {
        anyhow::bail!("Invalid phone '{}', expected 10 digits", s);
    }
    Ok(s.to_string())
}

pub fn validate_ifsc(s: &str) -> Result<String> {
    let s = s.trim().to_uppercase();
    if !IFSC_RE.is_match(&s) {
        anyhow::bail!("Invalid IFSC '{}'", s);
    }
    Ok(s)
}

pub fn validate_expiry(s: &str) -> Result<String> {
    let s = s.trim();
    if !EXPIRY_RE.is_match(s) {
        anyhow::bail!("Invalid expiry '{}', expected MM/YY", s);
    }
    Ok(s.to_string())
}

/// Keep only the last four digits of a card or account number.
pub fn last_four(number: &str) -> Result<String> {
    let digits: Vec<char> = number.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() < 4 {
        anyhow::bail!("Card/account number '{}' has fewer than 4 digits", number);
    }
    Ok(digits[digits.len() - 4..].iter().collect())
}

pub fn pretty_table(headers: &[&str], rows: Vec<Vec<String>>) -> Table {
    let mut t = Table::new();
    t.load_preset(UTF8_FULL);
    t.set_header(headers.iter().map(|h| Cell::new(*h)));
    for r in rows {
        t.add_row(r.into_iter().map(Cell::new));
    }
    t
}

pub fn ensure_user(conn: &Connection, user_id: i64) -> Result<()> {
    let hit: Option<i64> = conn
        .query_row("SELECT id FROM users WHERE id=?1", params![user_id], |r| {
            r.get(0)
        })
        .optional()?;
    hit.map(|_| ())
        .with_context(|| format!("User {} not found", user_id))
}

pub fn maybe_print_json<T: serde::Serialize>(
    json_flag: bool,
    jsonl_flag: bool,
    v: &T,
) -> Result<bool> {
    if json_flag {
        println!("{}", serde_json::to_string_pretty(v)?);
        return Ok(true);
    }
    if jsonl_flag {
        // If v is an array, stream each element; else stream single line
        let val = serde_json::to_value(v)?;
        if let Some(arr) = val.as_array() {
            for item in arr {
                println!("{}", serde_json::to_string(item)?);
            }
        } else {
            println!("{}", serde_json::to_string(&val)?);
        }
        return Ok(true);
    }
    Ok(false)
}
