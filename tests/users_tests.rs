// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use pocketledger::{cli, commands::users};
use rusqlite::Connection;

fn setup() -> Connection {
    pocketledger::db::open_in_memory().unwrap()
}

fn run(conn: &Connection, args: &[&str]) -> anyhow::Result<()> {
    let cli = cli::build_cli();
    let matches = cli.get_matches_from(args);
    if let Some(("user", user_m)) = matches.subcommand() {
        users::handle(conn, user_m)
    } else {
        panic!("user command not parsed");
    }
}

#[test]
fn user_add_normalizes_and_stores_profile() {
    let conn = setup();
    run(
        &conn,
        &[
            "pocketledger", "user", "add",
            "--name", " Asha Rao ",
            "--phone", " 9876543210 ",
            "--email", "Asha@Example.com",
            "--employment-status", "Employed",
            "--salary", "85000",
            "--salary-day", "1",
        ],
    )
    .unwrap();

    let (name, email, salary): (String, String, Option<String>) = conn
        .query_row(
            "SELECT full_name, email, monthly_salary FROM users WHERE id=1",
            [],
            |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)),
        )
        .unwrap();
    assert_eq!(name, "Asha Rao");
    assert_eq!(email, "asha@example.com");
    assert_eq!(salary.as_deref(), Some("85000"));
}

#[test]
fn user_add_rejects_bad_phone() {
    let conn = setup();
    let err = run(
        &conn,
        &[
            "pocketledger", "user", "add",
            "--name", "Asha Rao",
            "--phone", "12345",
            "--email", "asha@example.com",
        ],
    )
    .unwrap_err();
    assert!(err.to_string().contains("Invalid phone"));
}

#[test]
fn duplicate_email_is_a_conflict() {
    let conn = setup();
    let args = [
        "pocketledger", "user", "add",
        "--name", "Asha Rao",
        "--phone", "9876543210",
        "--email", "asha@example.com",
    ];
    run(&conn, &args).unwrap();
    let err = run(&conn, &args).unwrap_err();
    assert!(err.to_string().contains("already registered"));
}

#[test]
fn user_update_marks_onboarding_complete() {
    let conn = setup();
    run(
        &conn,
        &[
            "pocketledger", "user", "add",
            "--name", "Asha Rao",
            "--phone", "9876543210",
            "--email", "asha@example.com",
        ],
    )
    .unwrap();
    run(
        &conn,
        &["pocketledger", "user", "update", "--id", "1", "--onboarded"],
    )
    .unwrap();

    let onboarded: i64 = conn
        .query_row("SELECT onboarding_completed FROM users WHERE id=1", [], |r| {
            r.get(0)
        })
        .unwrap();
    assert_eq!(onboarded, 1);
}

#[test]
fn update_of_missing_user_errors() {
    let conn = setup();
    let err = run(
        &conn,
        &["pocketledger", "user", "update", "--id", "7", "--name", "Nobody"],
    )
    .unwrap_err();
    assert!(err.to_string().contains("not found"));
}
