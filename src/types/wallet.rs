//! Wallet-related types for the wallet ledger
//!
//! This module defines the Wallet structure that holds the running balance
//! of a single account.

use super::transaction::WalletId;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Wallet state
///
/// Represents a single account with a running balance. The balance only
/// changes as part of a committed transactional unit, and always equals the
/// sum of the effects of every committed transaction on the wallet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wallet {
    /// The wallet ID, assigned by the store at creation
    pub id: WalletId,

    /// Current balance
    ///
    /// Credits add to it, debits subtract from it. It never goes below zero
    /// through the transaction processor.
    #[serde(with = "rust_decimal::serde::float")]
    pub balance: Decimal,

    /// When the wallet was created
    pub created_at: DateTime<Utc>,

    /// When the wallet balance was last written
    pub updated_at: DateTime<Utc>,
}

impl Wallet {
    /// Create a new wallet with a zero balance
    ///
    /// # Arguments
    ///
    /// * `id` - The wallet ID assigned by the store
    pub fn new(id: WalletId) -> Self {
        let now = Utc::now();
        Wallet {
            id,
            balance: Decimal::ZERO,
            created_at: now,
            updated_at: now,
        }
    }

    /// Create a wallet with a given balance (useful for seeding and tests)
    pub fn with_balance(id: WalletId, balance: Decimal) -> Self {
        Wallet {
            balance,
            ..Wallet::new(id)
        }
    }
}
