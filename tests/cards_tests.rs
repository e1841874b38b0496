// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use pocketledger::{cli, commands::cards};
use rusqlite::Connection;

fn setup() -> Connection {
    let conn = pocketledger::db::open_in_memory().unwrap();
    conn.execute(
        "INSERT INTO users(full_name, phone, email) VALUES('Asha Rao','9876543210','asha@example.com')",
        [],
    )
    .unwrap();
    conn
}

fn run(conn: &Connection, args: &[&str]) -> anyhow::Result<()> {
    let cli = cli::build_cli();
    let matches = cli.get_matches_from(args);
    if let Some(("card", card_m)) = matches.subcommand() {
        cards::handle(conn, card_m)
    } else {
        panic!("card command not parsed");
    }
}

#[test]
fn card_add_stores_only_last_four_digits() {
    let conn = setup();
    run(
        &conn,
        &[
            "pocketledger", "card", "add",
            "--user", "1",
            "--type", "credit",
            "--number", "4111 1111 1111 4242",
            "--holder", "Asha Rao",
            "--bank", "HDFC",
            "--expiry", "08/27",
            "--provider", "Visa",
            "--limit", "150000",
            "--outstanding", "1200.50",
        ],
    )
    .unwrap();

    let (stored, opening, current): (String, String, String) = conn
        .query_row(
            "SELECT last_four, opening_outstanding, current_outstanding FROM cards WHERE id=1",
            [],
            |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)),
        )
        .unwrap();
    assert_eq!(stored, "4242");
    assert_eq!(opening, "1200.50");
    assert_eq!(current, "1200.50");
}

#[test]
fn card_add_rejects_bad_expiry() {
    let conn = setup();
    let err = run(
        &conn,
        &[
            "pocketledger", "card", "add",
            "--user", "1",
            "--type", "credit",
            "--number", "4111111111114242",
            "--holder", "Asha Rao",
            "--bank", "HDFC",
            "--expiry", "13/27",
            "--provider", "Visa",
        ],
    )
    .unwrap_err();
    assert!(err.to_string().contains("Invalid expiry"));
}

#[test]
fn card_add_rejects_unknown_type() {
    let conn = setup();
    let err = run(
        &conn,
        &[
            "pocketledger", "card", "add",
            "--user", "1",
            "--type", "prepaid",
            "--number", "4111111111114242",
            "--holder", "Asha Rao",
            "--bank", "HDFC",
            "--expiry", "08/27",
            "--provider", "Visa",
        ],
    )
    .unwrap_err();
    assert!(err.to_string().contains("Unknown card type"));
}

#[test]
fn debit_card_linked_account_must_belong_to_user() {
    let conn = setup();
    conn.execute(
        "INSERT INTO users(full_name, phone, email) VALUES('Vik Shah','9123456780','vik@example.com')",
        [],
    )
    .unwrap();
    conn.execute(
        "INSERT INTO bank_accounts(user_id, bank_name, account_number, ifsc_code, account_type)
         VALUES(2,'SBI','1234','SBIN0001234','Savings')",
        [],
    )
    .unwrap();

    let err = run(
        &conn,
        &[
            "pocketledger", "card", "add",
            "--user", "1",
            "--type", "debit",
            "--number", "5500 0000 0000 1881",
            "--holder", "Asha Rao",
            "--bank", "SBI",
            "--expiry", "11/26",
            "--provider", "Mastercard",
            "--linked-account", "1",
        ],
    )
    .unwrap_err();
    assert!(err.to_string().contains("does not belong to user"));
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM cards", [], |r| r.get(0))
        .unwrap();
    assert_eq!(count, 0);
}
