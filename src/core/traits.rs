//! Core traits for the ledger store and its transactional units
//!
//! The transaction processor only talks to storage through these traits, so
//! the in-memory store used by the binary and the tests can be replaced with
//! a database-backed one without touching the processing logic.

use crate::types::{Transaction, TransactionDraft, TransactionId, Wallet, WalletId};
use crate::types::LedgerError;
use async_trait::async_trait;
use rust_decimal::Decimal;

/// Durable keyed storage for wallets and transactions
///
/// Implementations must serialize transactional units per wallet: while a
/// unit for a wallet is open, no other unit for that wallet may be opened.
/// This is the row-level lock that prevents lost balance updates.
#[async_trait]
pub trait LedgerStore: Send + Sync + 'static {
    /// Transactional unit type handed out by [`LedgerStore::begin_unit`]
    type Unit: LedgerUnit;

    /// Create a wallet with a zero balance
    async fn create_wallet(&self) -> Result<Wallet, LedgerError>;

    /// Get a committed wallet by ID
    async fn get_wallet(&self, id: WalletId) -> Result<Option<Wallet>, LedgerError>;

    /// Get a committed transaction by ID
    async fn get_transaction(&self, id: TransactionId) -> Result<Option<Transaction>, LedgerError>;

    /// List committed transactions of a wallet, newest first
    async fn list_transactions(&self, wallet_id: WalletId)
        -> Result<Vec<Transaction>, LedgerError>;

    /// Open a transactional unit scoped to one wallet
    ///
    /// Waits until no other unit for the same wallet is open.
    async fn begin_unit(&self, wallet_id: WalletId) -> Result<Self::Unit, LedgerError>;
}

/// An atomic group of writes against one wallet
///
/// Writes are only visible to readers after [`LedgerUnit::commit`] returns
/// `Ok`. Dropping a unit without committing rolls it back.
#[async_trait]
pub trait LedgerUnit: Send + 'static {
    /// Read the wallet this unit is scoped to, including staged writes
    async fn load_wallet(&mut self) -> Result<Option<Wallet>, LedgerError>;

    /// Stage a wallet write
    async fn save_wallet(&mut self, wallet: &Wallet) -> Result<(), LedgerError>;

    /// Stage a new transaction record and return it with its assigned id
    async fn save_transaction(
        &mut self,
        draft: TransactionDraft,
        closing_balance: Decimal,
    ) -> Result<Transaction, LedgerError>;

    /// Make every staged write visible at once
    async fn commit(self) -> Result<(), LedgerError>;

    /// Discard every staged write
    fn rollback(self);
}
