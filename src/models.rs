// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::Error;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub full_name: String,
    pub phone: String,
    pub email: String,
    pub employment_status: Option<String>,
    pub company_name: Option<String>,
    pub monthly_salary: Option<Decimal>,
    pub salary_day: Option<u32>,
    pub onboarding_completed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BankAccount {
    pub id: i64,
    pub user_id: i64,
    pub bank_name: String,
    pub account_number: String,
    pub ifsc_code: String,
    pub account_type: String,
    pub branch_name: Option<String>,
    pub upi_id: Option<String>,
    pub is_primary: bool,
    pub balance: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Card {
    pub id: i64,
    pub user_id: i64,
    pub card_type: CardType,
    pub last_four: String,
    pub holder_name: String,
    pub bank_name: String,
    pub expiry: String, // MM/YY
    pub provider: String,
    pub card_name: Option<String>,
    pub credit_limit: Option<Decimal>,
    /// Outstanding carried over at card creation; anchors recomputes.
    pub opening_outstanding: Decimal,
    /// Running sum maintained by the ledger: opening + all live charges.
    pub current_outstanding: Decimal,
    pub billing_day: Option<u32>,
    pub due_day: Option<u32>,
    pub status: String,
    pub daily_limit: Option<Decimal>,
    pub linked_account_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub user_id: i64,
    pub kind: TxnKind,
    pub amount: Decimal, // always > 0; direction derives from kind/mode
    pub category: String,
    pub merchant: Option<String>,
    pub note: Option<String>,
    pub date: NaiveDate,
    pub card_id: Option<i64>,
    pub bank_account_id: Option<i64>,
    pub payment_mode: PaymentMode,
    pub status: TxnStatus,
    pub created_at: String,
}

/// Fields accepted when recording a new transaction.
#[derive(Debug, Clone)]
pub struct TransactionInput {
    pub user_id: i64,
    pub kind: TxnKind,
    pub amount: Decimal,
    pub category: String,
    pub merchant: Option<String>,
    pub note: Option<String>,
    pub date: NaiveDate,
    pub card_id: Option<i64>,
    pub bank_account_id: Option<i64>,
    pub payment_mode: PaymentMode,
    pub status: TxnStatus,
}

/// Partial update for an existing transaction. `None` leaves a field
/// untouched; `card_id: Some(None)` detaches the card.
#[derive(Debug, Clone, Default)]
pub struct TransactionPatch {
    pub kind: Option<TxnKind>,
    pub amount: Option<Decimal>,
    pub category: Option<String>,
    pub merchant: Option<String>,
    pub note: Option<String>,
    pub date: Option<NaiveDate>,
    pub payment_mode: Option<PaymentMode>,
    pub card_id: Option<Option<i64>>,
    pub status: Option<TxnStatus>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Budget {
    pub id: i64,
    pub user_id: i64,
    pub month_year: String, // MM-YYYY
    pub total_budget: Decimal,
    pub categories: BTreeMap<String, Decimal>,
    pub savings_goal: Option<Decimal>,
    pub created_at: String,
    pub updated_at: String,
}

/// Mutable budget fields; an upsert replaces all of them wholesale.
#[derive(Debug, Clone)]
pub struct BudgetInput {
    pub total_budget: Decimal,
    pub categories: BTreeMap<String, Decimal>,
    pub savings_goal: Option<Decimal>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CardType {
    #[serde(rename = "credit")]
    Credit,
    #[serde(rename = "debit")]
    Debit,
}

impl CardType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CardType::Credit => "credit",
            CardType::Debit => "debit",
        }
    }
}

impl FromStr for CardType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        match s.trim().to_lowercase().as_str() {
            "credit" => Ok(CardType::Credit),
            "debit" => Ok(CardType::Debit),
            other => Err(Error::Validation(format!(
                "Unknown card type '{}', expected credit|debit",
                other
            ))),
        }
    }
}

impl fmt::Display for CardType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TxnKind {
    #[serde(rename = "income")]
    Income,
    #[serde(rename = "expense")]
    Expense,
}

impl TxnKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TxnKind::Income => "income",
            TxnKind::Expense => "expense",
        }
    }
}

impl FromStr for TxnKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        match s.trim().to_lowercase().as_str() {
            "income" => Ok(TxnKind::Income),
            "expense" => Ok(TxnKind::Expense),
            other => Err(Error::Validation(format!(
                "Unknown transaction kind '{}', expected income|expense",
                other
            ))),
        }
    }
}

impl fmt::Display for TxnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TxnStatus {
    #[serde(rename = "completed")]
    Completed,
    #[serde(rename = "pending")]
    Pending,
    #[serde(rename = "failed")]
    Failed,
}

impl TxnStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TxnStatus::Completed => "completed",
            TxnStatus::Pending => "pending",
            TxnStatus::Failed => "failed",
        }
    }
}

impl FromStr for TxnStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        match s.trim().to_lowercase().as_str() {
            "completed" => Ok(TxnStatus::Completed),
            "pending" => Ok(TxnStatus::Pending),
            "failed" => Ok(TxnStatus::Failed),
            other => Err(Error::Validation(format!(
                "Unknown status '{}', expected completed|pending|failed",
                other
            ))),
        }
    }
}

impl fmt::Display for TxnStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a transaction was paid. Only `Credit Card` affects a card's
/// outstanding balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentMode {
    #[serde(rename = "Cash")]
    Cash,
    #[serde(rename = "UPI")]
    Upi,
    #[serde(rename = "Debit Card")]
    DebitCard,
    #[serde(rename = "Credit Card")]
    CreditCard,
    #[serde(rename = "Bank Transfer")]
    BankTransfer,
}

impl PaymentMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMode::Cash => "Cash",
            PaymentMode::Upi => "UPI",
            PaymentMode::DebitCard => "Debit Card",
            PaymentMode::CreditCard => "Credit Card",
            PaymentMode::BankTransfer => "Bank Transfer",
        }
    }
}

impl FromStr for PaymentMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        let norm: String = s
            .trim()
            .to_lowercase()
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '_'))
            .collect();
        match norm.as_str() {
            "cash" => Ok(PaymentMode::Cash),
            "upi" => Ok(PaymentMode::Upi),
            "debitcard" => Ok(PaymentMode::DebitCard),
            "creditcard" => Ok(PaymentMode::CreditCard),
            "banktransfer" => Ok(PaymentMode::BankTransfer),
            _ => Err(Error::Validation(format!(
                "Unknown payment mode '{}', expected cash|upi|debit-card|credit-card|bank-transfer",
                s
            ))),
        }
    }
}

impl fmt::Display for PaymentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
