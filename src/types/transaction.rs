//! Transaction-related types for the wallet ledger
//!
//! This module defines transaction types, persisted transaction records and
//! the draft form a transaction takes before it is applied.

use super::error::LedgerError;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Wallet identifier
pub type WalletId = u64;

/// Transaction identifier
pub type TransactionId = u64;

/// Transaction types supported by the ledger
///
/// Serialized exactly as persisted: `"CREDIT"` or `"DEBIT"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionType {
    /// Add funds to a wallet
    ///
    /// Always permitted.
    Credit,

    /// Remove funds from a wallet
    ///
    /// Requires the resulting balance to stay at or above zero.
    Debit,
}

impl TransactionType {
    /// The persisted name of this type
    pub const fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Credit => "CREDIT",
            TransactionType::Debit => "DEBIT",
        }
    }

    /// The type that undoes the balance effect of this one
    pub const fn inverse(self) -> Self {
        match self {
            TransactionType::Credit => TransactionType::Debit,
            TransactionType::Debit => TransactionType::Credit,
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CREDIT" => Ok(TransactionType::Credit),
            "DEBIT" => Ok(TransactionType::Debit),
            other => Err(LedgerError::invalid_transaction_type(other)),
        }
    }
}

/// A committed transaction record
///
/// Created only inside a successful commit and never mutated afterwards.
/// A reversal produces a new record; it does not touch the original.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Unique transaction identifier assigned by the store
    pub id: TransactionId,

    /// The wallet this transaction was applied to
    pub wallet_id: WalletId,

    /// Non-negative amount; the direction is carried by `tx_type`
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,

    /// CREDIT or DEBIT
    #[serde(rename = "type")]
    pub tx_type: TransactionType,

    /// The wallet balance immediately after this transaction was applied
    #[serde(with = "rust_decimal::serde::float")]
    pub closing_balance: Decimal,

    /// Free text; reversals record their provenance here
    pub description: Option<String>,

    /// When the transaction was saved
    pub created_at: DateTime<Utc>,
}

/// A proposed transaction that has not been applied yet
///
/// Has no id and no closing balance; both are assigned when the draft is
/// applied and saved inside a transactional unit.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionDraft {
    /// Target wallet
    pub wallet_id: WalletId,

    /// CREDIT or DEBIT
    pub tx_type: TransactionType,

    /// Requested amount
    pub amount: Decimal,

    /// Optional free text
    pub description: Option<String>,
}

impl TransactionDraft {
    /// Create a draft without a description
    pub fn new(wallet_id: WalletId, tx_type: TransactionType, amount: Decimal) -> Self {
        TransactionDraft {
            wallet_id,
            tx_type,
            amount,
            description: None,
        }
    }

    /// Attach a description to the draft
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case::credit("CREDIT", TransactionType::Credit)]
    #[case::debit("DEBIT", TransactionType::Debit)]
    fn test_parse_valid_types(#[case] input: &str, #[case] expected: TransactionType) {
        assert_eq!(input.parse::<TransactionType>().unwrap(), expected);
        assert_eq!(expected.to_string(), input);
    }

    #[rstest]
    #[case::dummy("DUMMY")]
    #[case::lowercase("credit")]
    #[case::empty("")]
    fn test_parse_invalid_types(#[case] input: &str) {
        let err = input.parse::<TransactionType>().unwrap_err();
        assert!(matches!(err, LedgerError::InvalidTransactionType { .. }));
    }

    #[test]
    fn test_inverse_flips_type() {
        assert_eq!(TransactionType::Credit.inverse(), TransactionType::Debit);
        assert_eq!(TransactionType::Debit.inverse(), TransactionType::Credit);
    }

    #[test]
    fn test_transaction_wire_shape() {
        let tx = Transaction {
            id: 3,
            wallet_id: 1,
            amount: Decimal::new(500, 0),
            tx_type: TransactionType::Credit,
            closing_balance: Decimal::new(1500, 0),
            description: Some("Revert of: 2".to_string()),
            created_at: Utc::now(),
        };

        let value = serde_json::to_value(&tx).unwrap();

        assert_eq!(value["wallet_id"], json!(1));
        assert_eq!(value["amount"], json!(500.0));
        assert_eq!(value["type"], json!("CREDIT"));
        assert_eq!(value["closing_balance"], json!(1500.0));
        assert_eq!(value["description"], json!("Revert of: 2"));
    }
}
