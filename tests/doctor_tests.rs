// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use pocketledger::ledger;
use pocketledger::models::{PaymentMode, TransactionInput, TxnKind, TxnStatus};
use pocketledger::error::Error;
use rusqlite::Connection;
use rust_decimal::Decimal;

fn setup() -> Connection {
    let mut conn = pocketledger::db::open_in_memory().unwrap();
    conn.execute(
        "INSERT INTO users(full_name, phone, email) VALUES('Asha Rao','9876543210','asha@example.com')",
        [],
    )
    .unwrap();
    conn.execute(
        "INSERT INTO cards(user_id, card_type, last_four, holder_name, bank_name, expiry, provider)
         VALUES(1,'credit','4242','Asha Rao','HDFC','08/27','Visa')",
        [],
    )
    .unwrap();
    let input = TransactionInput {
        user_id: 1,
        kind: TxnKind::Expense,
        amount: "500".parse().unwrap(),
        category: "Shopping".into(),
        merchant: None,
        note: None,
        date: NaiveDate::from_ymd_opt(2025, 1, 15).unwrap(),
        card_id: Some(1),
        bank_account_id: None,
        payment_mode: PaymentMode::CreditCard,
        status: TxnStatus::Completed,
    };
    ledger::create_transaction(&mut conn, &input).unwrap();
    conn
}

fn outstanding(conn: &Connection) -> Decimal {
    let raw: String = conn
        .query_row("SELECT current_outstanding FROM cards WHERE id=1", [], |r| {
            r.get(0)
        })
        .unwrap();
    raw.parse().unwrap()
}

#[test]
fn clean_ledger_audits_clean() {
    let conn = setup();
    assert!(ledger::audit_outstanding(&conn).unwrap().is_empty());
}

#[test]
fn audit_flags_manual_corruption() {
    let conn = setup();
    conn.execute("UPDATE cards SET current_outstanding='999' WHERE id=1", [])
        .unwrap();

    let drifts = ledger::audit_outstanding(&conn).unwrap();
    assert_eq!(drifts.len(), 1);
    assert_eq!(drifts[0].card_id, 1);
    assert_eq!(drifts[0].recorded, "999".parse::<Decimal>().unwrap());
    assert_eq!(drifts[0].computed, "500".parse::<Decimal>().unwrap());
}

#[test]
fn check_surfaces_drift_as_error() {
    let conn = setup();
    assert!(ledger::check_outstanding(&conn, 1).is_ok());

    conn.execute("UPDATE cards SET current_outstanding='123' WHERE id=1", [])
        .unwrap();
    let err = ledger::check_outstanding(&conn, 1).unwrap_err();
    assert!(matches!(err, Error::Drift { card_id: 1, .. }), "got {:?}", err);

    let err = ledger::check_outstanding(&conn, 42).unwrap_err();
    assert!(matches!(err, Error::NotFound { .. }), "got {:?}", err);
}

#[test]
fn repair_rewrites_from_ledger() {
    let mut conn = setup();
    conn.execute("UPDATE cards SET current_outstanding='999' WHERE id=1", [])
        .unwrap();

    let repaired = ledger::repair_outstanding(&mut conn).unwrap();
    assert_eq!(repaired.len(), 1);
    assert_eq!(outstanding(&conn), "500".parse::<Decimal>().unwrap());
    assert!(ledger::audit_outstanding(&conn).unwrap().is_empty());
}

#[test]
fn doctor_fix_via_cli_repairs_drift() {
    let mut conn = setup();
    conn.execute("UPDATE cards SET current_outstanding='750' WHERE id=1", [])
        .unwrap();

    let cli = pocketledger::cli::build_cli();
    let matches = cli.get_matches_from(["pocketledger", "doctor", "--fix"]);
    if let Some(("doctor", doctor_m)) = matches.subcommand() {
        pocketledger::commands::doctor::handle(&mut conn, doctor_m).unwrap();
    } else {
        panic!("doctor command not parsed");
    }
    assert_eq!(outstanding(&conn), "500".parse::<Decimal>().unwrap());
}

#[test]
fn opening_outstanding_respected_by_audit() {
    let conn = setup();
    // the card carried 250 from before tracking; recorded total reflects it
    conn.execute(
        "UPDATE cards SET opening_outstanding='250', current_outstanding='750' WHERE id=1",
        [],
    )
    .unwrap();
    assert!(ledger::audit_outstanding(&conn).unwrap().is_empty());
}

#[test]
fn audit_flags_unlinked_credit_transactions_as_issue_rows() {
    let mut conn = setup();
    // a credit-mode transaction with no card produces no balance effect
    let input = TransactionInput {
        user_id: 1,
        kind: TxnKind::Expense,
        amount: "75".parse().unwrap(),
        category: "Dining".into(),
        merchant: None,
        note: None,
        date: NaiveDate::from_ymd_opt(2025, 1, 16).unwrap(),
        card_id: None,
        bank_account_id: None,
        payment_mode: PaymentMode::CreditCard,
        status: TxnStatus::Completed,
    };
    ledger::create_transaction(&mut conn, &input).unwrap();

    let unlinked: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM transactions WHERE payment_mode='Credit Card' AND card_id IS NULL",
            [],
            |r| r.get(0),
        )
        .unwrap();
    assert_eq!(unlinked, 1);
    // balances remain consistent either way
    assert!(ledger::audit_outstanding(&conn).unwrap().is_empty());
    assert_eq!(outstanding(&conn), "500".parse::<Decimal>().unwrap());

    let cli = pocketledger::cli::build_cli();
    let matches = cli.get_matches_from(["pocketledger", "doctor"]);
    if let Some(("doctor", doctor_m)) = matches.subcommand() {
        pocketledger::commands::doctor::handle(&mut conn, doctor_m).unwrap();
    } else {
        panic!("doctor command not parsed");
    }
}

#[test]
fn audit_flags_orphaned_user_reference() {
    let conn = setup();
    // defeat the FK cascade deliberately to simulate external damage
    conn.execute("PRAGMA foreign_keys = OFF", []).unwrap();
    conn.execute("DELETE FROM users WHERE id=1", []).unwrap();

    let orphans: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM transactions t LEFT JOIN users u ON t.user_id=u.id WHERE u.id IS NULL",
            [],
            |r| r.get(0),
        )
        .unwrap();
    assert_eq!(orphans, 1);
}
