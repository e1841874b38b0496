// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::collections::BTreeMap;

use pocketledger::budget;
use pocketledger::error::Error;
use pocketledger::models::BudgetInput;
use rusqlite::Connection;
use rust_decimal::Decimal;

fn setup() -> Connection {
    let conn = pocketledger::db::open_in_memory().unwrap();
    conn.execute(
        "INSERT INTO users(full_name, phone, email) VALUES('Asha Rao','9876543210','asha@example.com')",
        [],
    )
    .unwrap();
    conn
}

fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

fn input(total: &str, categories: &[(&str, &str)], goal: Option<&str>) -> BudgetInput {
    BudgetInput {
        total_budget: dec(total),
        categories: categories
            .iter()
            .map(|(k, v)| (k.to_string(), dec(v)))
            .collect::<BTreeMap<_, _>>(),
        savings_goal: goal.map(dec),
    }
}

#[test]
fn upsert_twice_keeps_single_record_and_replaces_categories() {
    let conn = setup();
    budget::upsert_budget(&conn, 1, "01-2025", &input("20000", &[("food", "5000")], None))
        .unwrap();
    let second = budget::upsert_budget(
        &conn,
        1,
        "01-2025",
        &input("22000", &[("food", "6000"), ("travel", "2000")], None),
    )
    .unwrap();

    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM budgets", [], |r| r.get(0))
        .unwrap();
    assert_eq!(count, 1);
    assert_eq!(second.total_budget, dec("22000"));
    assert_eq!(second.categories.len(), 2);
    assert_eq!(second.categories["food"], dec("6000"));
    assert_eq!(second.categories["travel"], dec("2000"));
}

#[test]
fn upsert_preserves_created_at_and_bumps_updated_at() {
    let conn = setup();
    budget::upsert_budget(&conn, 1, "03-2025", &input("15000", &[], None)).unwrap();
    conn.execute(
        "UPDATE budgets SET created_at='2020-01-01 00:00:00', updated_at='2020-01-01 00:00:00'",
        [],
    )
    .unwrap();

    let replaced =
        budget::upsert_budget(&conn, 1, "03-2025", &input("18000", &[("rent", "9000")], None))
            .unwrap();
    assert_eq!(replaced.created_at, "2020-01-01 00:00:00");
    assert_ne!(replaced.updated_at, "2020-01-01 00:00:00");
    assert_eq!(replaced.total_budget, dec("18000"));
}

#[test]
fn savings_goal_is_replaced_not_merged() {
    let conn = setup();
    budget::upsert_budget(&conn, 1, "02-2025", &input("10000", &[], Some("3000"))).unwrap();
    let replaced = budget::upsert_budget(&conn, 1, "02-2025", &input("10000", &[], None)).unwrap();
    assert_eq!(replaced.savings_goal, None);
}

#[test]
fn malformed_month_rejected_before_write() {
    let conn = setup();
    for month in ["2025-01", "13-2025", "jan-2025", "012025"] {
        let err = budget::upsert_budget(&conn, 1, month, &input("1000", &[], None)).unwrap_err();
        assert!(matches!(err, Error::Validation(_)), "month '{}': {:?}", month, err);
    }
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM budgets", [], |r| r.get(0))
        .unwrap();
    assert_eq!(count, 0);
}

#[test]
fn negative_amounts_rejected() {
    let conn = setup();
    let err = budget::upsert_budget(&conn, 1, "01-2025", &input("-1", &[], None)).unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
    let err = budget::upsert_budget(&conn, 1, "01-2025", &input("1000", &[("food", "-5")], None))
        .unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
}

#[test]
fn unknown_user_rejected() {
    let conn = setup();
    let err = budget::upsert_budget(&conn, 42, "01-2025", &input("1000", &[], None)).unwrap_err();
    assert!(matches!(err, Error::NotFound { .. }));
}

#[test]
fn get_missing_budget_not_found() {
    let conn = setup();
    let err = budget::get_budget(&conn, 1, "06-2025").unwrap_err();
    assert!(matches!(err, Error::NotFound { .. }));
}

#[test]
fn budgets_for_same_month_are_per_user() {
    let conn = setup();
    conn.execute(
        "INSERT INTO users(full_name, phone, email) VALUES('Vik Shah','9123456780','vik@example.com')",
        [],
    )
    .unwrap();
    budget::upsert_budget(&conn, 1, "01-2025", &input("20000", &[], None)).unwrap();
    budget::upsert_budget(&conn, 2, "01-2025", &input("9000", &[], None)).unwrap();

    assert_eq!(
        budget::get_budget(&conn, 1, "01-2025").unwrap().total_budget,
        dec("20000")
    );
    assert_eq!(
        budget::get_budget(&conn, 2, "01-2025").unwrap().total_budget,
        dec("9000")
    );
}

#[test]
fn report_compares_budget_with_month_spend() {
    let conn = setup();
    budget::upsert_budget(
        &conn,
        1,
        "01-2025",
        &input("20000", &[("food", "5000"), ("travel", "2000")], None),
    )
    .unwrap();

    let rows: &[(&str, &str, &str, &str)] = &[
        ("2025-01-04", "expense", "1200", "food"),
        ("2025-01-18", "expense", "300", "food"),
        ("2025-01-20", "expense", "99", "misc"),
        ("2025-02-01", "expense", "888", "food"),   // next month
        ("2025-01-25", "income", "45000", "food"),  // income never counts as spend
    ];
    for (date, kind, amount, category) in rows {
        conn.execute(
            "INSERT INTO transactions(user_id, kind, amount, category, date, payment_mode, status)
             VALUES(1, ?1, ?2, ?3, ?4, 'Cash', 'completed')",
            rusqlite::params![kind, amount, category, date],
        )
        .unwrap();
    }

    let report = pocketledger::commands::budgets::report_rows(&conn, 1, "01-2025").unwrap();
    let food = report.iter().find(|r| r.category == "food").unwrap();
    assert_eq!(food.budget, "5000");
    assert_eq!(food.spent, "1500");
    assert_eq!(food.remaining, "3500");

    let travel = report.iter().find(|r| r.category == "travel").unwrap();
    assert_eq!(travel.spent, "0");
    assert_eq!(travel.remaining, "2000");

    let misc = report.iter().find(|r| r.category == "misc").unwrap();
    assert_eq!(misc.budget, "0");
    assert_eq!(misc.spent, "99");
    assert_eq!(misc.remaining, "-99");
}

#[test]
fn list_budgets_newest_month_first() {
    let conn = setup();
    for (month, total) in [("12-2024", "100"), ("02-2025", "300"), ("01-2025", "200")] {
        budget::upsert_budget(&conn, 1, month, &input(total, &[], None)).unwrap();
    }
    let months: Vec<String> = budget::list_budgets(&conn, 1)
        .unwrap()
        .into_iter()
        .map(|b| b.month_year)
        .collect();
    assert_eq!(months, ["02-2025", "01-2025", "12-2024"]);
}
