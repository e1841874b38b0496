// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rust_decimal::Decimal;
use thiserror::Error;

/// Errors surfaced by the ledger and budget cores.
#[derive(Debug, Error)]
pub enum Error {
    /// Input rejected before any write (non-positive amount, malformed
    /// month string, bad phone/IFSC, ...).
    #[error("{0}")]
    Validation(String),

    /// A referenced record does not exist.
    #[error("{entity} {key} not found")]
    NotFound { entity: &'static str, key: String },

    /// A uniqueness constraint was violated.
    #[error("{0}")]
    Conflict(String),

    /// A maintained aggregate no longer matches its ledger recompute.
    /// Surfaced by the doctor audit, never swallowed.
    #[error("card {card_id} outstanding drifted: recorded {recorded}, ledger says {computed}")]
    Drift {
        card_id: i64,
        recorded: Decimal,
        computed: Decimal,
    },

    /// A stored amount failed to parse back into a decimal.
    #[error("corrupt amount '{raw}' in {table}")]
    CorruptAmount { table: &'static str, raw: String },

    #[error(transparent)]
    Store(#[from] rusqlite::Error),

    #[error(transparent)]
    Encode(#[from] serde_json::Error),
}

impl Error {
    pub fn not_found(entity: &'static str, key: impl ToString) -> Self {
        Error::NotFound {
            entity,
            key: key.to_string(),
        }
    }
}
