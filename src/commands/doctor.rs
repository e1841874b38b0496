// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::ledger;
use crate::utils::pretty_table;
use anyhow::Result;
use rusqlite::Connection;

/// Consistency audit. Card balances are derivable from the ledger, so any
/// disagreement found here is repairable with --fix.
pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    let fix = m.get_flag("fix");
    let mut rows = Vec::new();

    // 1) Outstanding drift: maintained aggregate vs ledger recompute
    let drifts = ledger::audit_outstanding(conn)?;
    for d in &drifts {
        rows.push(vec![
            "outstanding_drift".to_string(),
            format!(
                "card {}: recorded {}, ledger says {}",
                d.card_id, d.recorded, d.computed
            ),
        ]);
    }

    // 2) Credit-card transactions that never got a card link
    let unlinked = {
        let mut stmt = conn.prepare(
            "SELECT id FROM transactions WHERE payment_mode='Credit Card' AND card_id IS NULL",
        )?;
        stmt.query_map([], |r| r.get::<_, i64>(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?
    };
    for id in unlinked {
        rows.push(vec![
            "credit_txn_no_card".to_string(),
            format!("transaction {}", id),
        ]);
    }

    // 3) Transactions pointing at users that no longer exist
    let orphans = {
        let mut stmt = conn.prepare(
            "SELECT t.id FROM transactions t LEFT JOIN users u ON t.user_id=u.id WHERE u.id IS NULL",
        )?;
        stmt.query_map([], |r| r.get::<_, i64>(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?
    };
    for id in orphans {
        rows.push(vec![
            "txn_user_missing".to_string(),
            format!("transaction {}", id),
        ]);
    }

    if rows.is_empty() {
        println!("✅ doctor: no issues found");
        return Ok(());
    }
    println!("{}", pretty_table(&["Issue", "Detail"], rows));

    if fix && !drifts.is_empty() {
        let repaired = ledger::repair_outstanding(conn)?;
        for d in &repaired {
            println!("Repaired card {}: {} -> {}", d.card_id, d.recorded, d.computed);
        }
    }
    Ok(())
}
