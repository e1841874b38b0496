// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! The transaction ledger and the card-outstanding projection.
//!
//! A card's `current_outstanding` is never ground truth: it is
//! `opening_outstanding` plus the sum of every live credit-card charge
//! linked to the card. Every mutation here keeps that invariant by
//! applying the signed delta of the change to the card row inside the
//! same store transaction as the ledger write, so a failure anywhere
//! rolls back both records. `recompute_outstanding` rebuilds the value
//! from the ledger alone and is the recovery path when the two disagree.

use chrono::NaiveDate;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::error::Error;
use crate::models::{
    PaymentMode, Transaction, TransactionInput, TransactionPatch, TxnKind, TxnStatus,
};

const TXN_COLS: &str = "id, user_id, kind, amount, category, merchant, note, date, \
                        card_id, bank_account_id, payment_mode, status, created_at";

/// Record a transaction and apply its balance effect to the linked card.
pub fn create_transaction(
    conn: &mut Connection,
    input: &TransactionInput,
) -> Result<Transaction, Error> {
    if input.amount <= Decimal::ZERO {
        return Err(Error::Validation(format!(
            "Amount must be positive, got {}",
            input.amount
        )));
    }
    let tx = conn.transaction()?;
    if let Some(card_id) = input.card_id {
        ensure_owned(&tx, "cards", "Card", card_id, input.user_id)?;
    }
    if let Some(account_id) = input.bank_account_id {
        ensure_owned(&tx, "bank_accounts", "Bank account", account_id, input.user_id)?;
    }
    tx.execute(
        "INSERT INTO transactions(user_id, kind, amount, category, merchant, note, date,
                                  card_id, bank_account_id, payment_mode, status)
         VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11)",
        params![
            input.user_id,
            input.kind.as_str(),
            input.amount.to_string(),
            input.category,
            input.merchant,
            input.note,
            input.date.to_string(),
            input.card_id,
            input.bank_account_id,
            input.payment_mode.as_str(),
            input.status.as_str()
        ],
    )?;
    let id = tx.last_insert_rowid();
    if let Some((card_id, amount)) = charge_effect(input.card_id, input.payment_mode, input.amount)
    {
        adjust_outstanding(&tx, card_id, amount)?;
    }
    let created = fetch_transaction(&tx, id)?;
    tx.commit()?;
    Ok(created)
}

/// Apply a partial update and reconcile the projection: the old effect is
/// reversed and the new one applied, collapsing to a single `new - old`
/// adjustment when the card stays the same.
pub fn update_transaction(
    conn: &mut Connection,
    id: i64,
    patch: &TransactionPatch,
) -> Result<Transaction, Error> {
    let tx = conn.transaction()?;
    let old = fetch_transaction(&tx, id)?;

    let mut new = old.clone();
    if let Some(kind) = patch.kind {
        new.kind = kind;
    }
    if let Some(amount) = patch.amount {
        new.amount = amount;
    }
    if let Some(ref category) = patch.category {
        new.category = category.clone();
    }
    if let Some(ref merchant) = patch.merchant {
        new.merchant = Some(merchant.clone());
    }
    if let Some(ref note) = patch.note {
        new.note = Some(note.clone());
    }
    if let Some(date) = patch.date {
        new.date = date;
    }
    if let Some(mode) = patch.payment_mode {
        new.payment_mode = mode;
    }
    if let Some(card_id) = patch.card_id {
        new.card_id = card_id;
    }
    if let Some(status) = patch.status {
        new.status = status;
    }

    if new.amount <= Decimal::ZERO {
        return Err(Error::Validation(format!(
            "Amount must be positive, got {}",
            new.amount
        )));
    }
    if let Some(card_id) = new.card_id {
        if old.card_id != Some(card_id) {
            ensure_owned(&tx, "cards", "Card", card_id, new.user_id)?;
        }
    }

    let old_effect = charge_effect(old.card_id, old.payment_mode, old.amount);
    let new_effect = charge_effect(new.card_id, new.payment_mode, new.amount);
    match (old_effect, new_effect) {
        (Some((old_card, old_amt)), Some((new_card, new_amt))) if old_card == new_card => {
            let delta = new_amt - old_amt;
            if !delta.is_zero() {
                adjust_outstanding(&tx, old_card, delta)?;
            }
        }
        (old_effect, new_effect) => {
            if let Some((card_id, amount)) = old_effect {
                adjust_outstanding(&tx, card_id, -amount)?;
            }
            if let Some((card_id, amount)) = new_effect {
                adjust_outstanding(&tx, card_id, amount)?;
            }
        }
    }

    tx.execute(
        "UPDATE transactions
         SET kind=?1, amount=?2, category=?3, merchant=?4, note=?5, date=?6,
             card_id=?7, bank_account_id=?8, payment_mode=?9, status=?10
         WHERE id=?11",
        params![
            new.kind.as_str(),
            new.amount.to_string(),
            new.category,
            new.merchant,
            new.note,
            new.date.to_string(),
            new.card_id,
            new.bank_account_id,
            new.payment_mode.as_str(),
            new.status.as_str(),
            id
        ],
    )?;
    let updated = fetch_transaction(&tx, id)?;
    tx.commit()?;
    Ok(updated)
}

/// Reverse the stored balance effect, then remove the ledger row. Uses
/// the amount and linkage as stored, so a delete undoes exactly what the
/// matching create applied.
pub fn delete_transaction(conn: &mut Connection, id: i64) -> Result<(), Error> {
    let tx = conn.transaction()?;
    let old = fetch_transaction(&tx, id)?;
    if let Some((card_id, amount)) = charge_effect(old.card_id, old.payment_mode, old.amount) {
        adjust_outstanding(&tx, card_id, -amount)?;
    }
    tx.execute("DELETE FROM transactions WHERE id=?1", params![id])?;
    tx.commit()?;
    Ok(())
}

pub fn get_transaction(conn: &Connection, id: i64) -> Result<Transaction, Error> {
    fetch_transaction(conn, id)
}

/// Which transactions `list_transactions` returns. All filters are ANDed;
/// date bounds are inclusive.
#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    pub user_id: Option<i64>,
    pub card_id: Option<i64>,
    pub category: Option<String>,
    pub kind: Option<TxnKind>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

/// Filtered, reverse-chronological reads over the ledger.
pub fn list_transactions(
    conn: &Connection,
    filter: &TransactionFilter,
) -> Result<Vec<Transaction>, Error> {
    let mut sql = format!("SELECT {} FROM transactions WHERE 1=1", TXN_COLS);
    let mut args: Vec<String> = Vec::new();

    if let Some(user_id) = filter.user_id {
        sql.push_str(" AND user_id=?");
        args.push(user_id.to_string());
    }
    if let Some(card_id) = filter.card_id {
        sql.push_str(" AND card_id=?");
        args.push(card_id.to_string());
    }
    if let Some(ref category) = filter.category {
        sql.push_str(" AND category=?");
        args.push(category.clone());
    }
    if let Some(kind) = filter.kind {
        sql.push_str(" AND kind=?");
        args.push(kind.as_str().to_string());
    }
    if let Some(from) = filter.date_from {
        sql.push_str(" AND date>=?");
        args.push(from.to_string());
    }
    if let Some(to) = filter.date_to {
        sql.push_str(" AND date<=?");
        args.push(to.to_string());
    }
    sql.push_str(" ORDER BY date DESC, id DESC");
    match (filter.limit, filter.offset) {
        (Some(limit), offset) => {
            sql.push_str(" LIMIT ?");
            args.push(limit.to_string());
            if let Some(offset) = offset {
                sql.push_str(" OFFSET ?");
                args.push(offset.to_string());
            }
        }
        (None, Some(offset)) => {
            // SQLite needs a LIMIT clause to accept OFFSET; -1 means unbounded
            sql.push_str(" LIMIT -1 OFFSET ?");
            args.push(offset.to_string());
        }
        (None, None) => {}
    }

    let mut stmt = conn.prepare(&sql)?;
    let raws = stmt
        .query_map(params_from_iter(args.iter()), RawTxn::read)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    raws.into_iter().map(RawTxn::finish).collect()
}

/// Ground truth: opening outstanding plus the sum of all live credit-card
/// charges linked to the card.
pub fn recompute_outstanding(conn: &Connection, card_id: i64) -> Result<Decimal, Error> {
    let opening: Option<String> = conn
        .query_row(
            "SELECT opening_outstanding FROM cards WHERE id=?1",
            params![card_id],
            |r| r.get(0),
        )
        .optional()?;
    let opening = opening.ok_or_else(|| Error::not_found("Card", card_id))?;
    let mut total = parse_amount("cards", &opening)?;

    let mut stmt =
        conn.prepare("SELECT amount FROM transactions WHERE card_id=?1 AND payment_mode=?2")?;
    let mut rows = stmt.query(params![card_id, PaymentMode::CreditCard.as_str()])?;
    while let Some(r) = rows.next()? {
        let raw: String = r.get(0)?;
        total += parse_amount("transactions", &raw)?;
    }
    Ok(total)
}

/// Fail with a drift error if a card's maintained outstanding disagrees
/// with the ledger recompute.
pub fn check_outstanding(conn: &Connection, card_id: i64) -> Result<(), Error> {
    let raw: Option<String> = conn
        .query_row(
            "SELECT current_outstanding FROM cards WHERE id=?1",
            params![card_id],
            |r| r.get(0),
        )
        .optional()?;
    let raw = raw.ok_or_else(|| Error::not_found("Card", card_id))?;
    let recorded = parse_amount("cards", &raw)?;
    let computed = recompute_outstanding(conn, card_id)?;
    if recorded != computed {
        return Err(Error::Drift {
            card_id,
            recorded,
            computed,
        });
    }
    Ok(())
}

/// A card whose maintained outstanding disagrees with the recompute.
#[derive(Debug, Clone, Serialize)]
pub struct OutstandingDrift {
    pub card_id: i64,
    pub recorded: Decimal,
    pub computed: Decimal,
}

/// Compare every card's maintained outstanding against the ledger.
pub fn audit_outstanding(conn: &Connection) -> Result<Vec<OutstandingDrift>, Error> {
    let mut stmt = conn.prepare("SELECT id, current_outstanding FROM cards ORDER BY id")?;
    let cards = stmt
        .query_map([], |r| Ok((r.get::<_, i64>(0)?, r.get::<_, String>(1)?)))?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    let mut drifts = Vec::new();
    for (card_id, raw) in cards {
        let recorded = parse_amount("cards", &raw)?;
        let computed = recompute_outstanding(conn, card_id)?;
        if recorded != computed {
            drifts.push(OutstandingDrift {
                card_id,
                recorded,
                computed,
            });
        }
    }
    Ok(drifts)
}

/// Rewrite every drifted aggregate from the ledger recompute. Returns the
/// drifts that were repaired.
pub fn repair_outstanding(conn: &mut Connection) -> Result<Vec<OutstandingDrift>, Error> {
    let tx = conn.transaction()?;
    let drifts = audit_outstanding(&tx)?;
    for drift in &drifts {
        tx.execute(
            "UPDATE cards SET current_outstanding=?1 WHERE id=?2",
            params![drift.computed.to_string(), drift.card_id],
        )?;
    }
    tx.commit()?;
    Ok(drifts)
}

/// The balance effect of a transaction: `Some((card, amount))` for a
/// credit-card charge linked to a card, `None` otherwise. The direction
/// rule lives here and nowhere else.
fn charge_effect(
    card_id: Option<i64>,
    mode: PaymentMode,
    amount: Decimal,
) -> Option<(i64, Decimal)> {
    match (card_id, mode) {
        (Some(card_id), PaymentMode::CreditCard) => Some((card_id, amount)),
        _ => None,
    }
}

/// Additive adjustment of a card's outstanding. The read-then-write is
/// safe because callers hold the enclosing store transaction, which
/// serializes writers.
fn adjust_outstanding(
    tx: &rusqlite::Transaction<'_>,
    card_id: i64,
    delta: Decimal,
) -> Result<(), Error> {
    let raw: Option<String> = tx
        .query_row(
            "SELECT current_outstanding FROM cards WHERE id=?1",
            params![card_id],
            |r| r.get(0),
        )
        .optional()?;
    let raw = raw.ok_or_else(|| Error::not_found("Card", card_id))?;
    let current = parse_amount("cards", &raw)?;
    tx.execute(
        "UPDATE cards SET current_outstanding=?1 WHERE id=?2",
        params![(current + delta).to_string(), card_id],
    )?;
    Ok(())
}

fn ensure_owned(
    conn: &Connection,
    table: &str,
    entity: &'static str,
    id: i64,
    user_id: i64,
) -> Result<(), Error> {
    let owner: Option<i64> = conn
        .query_row(
            &format!("SELECT user_id FROM {} WHERE id=?1", table),
            params![id],
            |r| r.get(0),
        )
        .optional()?;
    match owner {
        None => Err(Error::not_found(entity, id)),
        Some(owner) if owner != user_id => Err(Error::Validation(format!(
            "{} {} does not belong to user {}",
            entity, id, user_id
        ))),
        Some(_) => Ok(()),
    }
}

fn fetch_transaction(conn: &Connection, id: i64) -> Result<Transaction, Error> {
    let raw = conn
        .query_row(
            &format!("SELECT {} FROM transactions WHERE id=?1", TXN_COLS),
            params![id],
            RawTxn::read,
        )
        .optional()?;
    raw.ok_or_else(|| Error::not_found("Transaction", id))?
        .finish()
}

fn parse_amount(table: &'static str, raw: &str) -> Result<Decimal, Error> {
    raw.parse::<Decimal>().map_err(|_| Error::CorruptAmount {
        table,
        raw: raw.to_string(),
    })
}

/// A transactions row as stored; `finish` parses the TEXT columns back
/// into domain types.
struct RawTxn {
    id: i64,
    user_id: i64,
    kind: String,
    amount: String,
    category: String,
    merchant: Option<String>,
    note: Option<String>,
    date: String,
    card_id: Option<i64>,
    bank_account_id: Option<i64>,
    payment_mode: String,
    status: String,
    created_at: String,
}

impl RawTxn {
    fn read(r: &rusqlite::Row<'_>) -> rusqlite::Result<RawTxn> {
        Ok(RawTxn {
            id: r.get(0)?,
            user_id: r.get(1)?,
            kind: r.get(2)?,
            amount: r.get(3)?,
            category: r.get(4)?,
            merchant: r.get(5)?,
            note: r.get(6)?,
            date: r.get(7)?,
            card_id: r.get(8)?,
            bank_account_id: r.get(9)?,
            payment_mode: r.get(10)?,
            status: r.get(11)?,
            created_at: r.get(12)?,
        })
    }

    fn finish(self) -> Result<Transaction, Error> {
        let date = NaiveDate::parse_from_str(&self.date, "%Y-%m-%d")
            .map_err(|_| Error::Validation(format!("Invalid stored date '{}'", self.date)))?;
        Ok(Transaction {
            id: self.id,
            user_id: self.user_id,
            kind: self.kind.parse::<TxnKind>()?,
            amount: parse_amount("transactions", &self.amount)?,
            category: self.category,
            merchant: self.merchant,
            note: self.note,
            date,
            card_id: self.card_id,
            bank_account_id: self.bank_account_id,
            payment_mode: self.payment_mode.parse::<PaymentMode>()?,
            status: self.status.parse::<TxnStatus>()?,
            created_at: self.created_at,
        })
    }
}
