//! Thread-safe in-memory ledger store
//!
//! This module provides the `MemoryLedgerStore`, which keeps wallets and
//! transactions in memory and hands out transactional units that hold a
//! per-wallet lock.
//!
//! # Design
//!
//! Committed wallets and transactions live together behind one `RwLock`, so
//! a commit publishes the new balance and the new records in a single write
//! and readers never see one without the other. The lock is never held
//! across an `.await`.
//!
//! Every wallet also owns a `tokio::sync::Mutex<()>` kept in a `DashMap`;
//! [`MemoryLedgerStore::begin_unit`] acquires it as an owned guard that the
//! returned [`MemoryUnit`] keeps until it is committed or dropped. Units for
//! different wallets proceed in parallel, units for the same wallet are
//! serialized, so a balance read through a unit cannot go stale before that
//! unit commits.
//!
//! Writes inside a unit are staged in the unit itself and published in
//! `commit`. Dropping a unit discards the staged writes, which is the
//! rollback.

use crate::core::traits::{LedgerStore, LedgerUnit};
use crate::types::{LedgerError, Transaction, TransactionDraft, TransactionId, Wallet, WalletId};
use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use rust_decimal::Decimal;
use std::cmp::Reverse;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::debug;

/// Committed state, always read and written as a whole
#[derive(Debug, Default)]
struct Committed {
    wallets: HashMap<WalletId, Wallet>,
    transactions: HashMap<TransactionId, Transaction>,
}

/// Shared state behind a [`MemoryLedgerStore`]
#[derive(Debug)]
struct Inner {
    committed: RwLock<Committed>,
    /// One row lock per wallet, created together with the wallet
    locks: DashMap<WalletId, Arc<Mutex<()>>>,
    next_wallet_id: AtomicU64,
    next_transaction_id: AtomicU64,
}

impl Inner {
    // Poisoning is ignored; writers only insert into the maps
    fn read(&self) -> RwLockReadGuard<'_, Committed> {
        self.committed.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Committed> {
        self.committed.write().unwrap_or_else(PoisonError::into_inner)
    }
}

/// In-memory ledger store with per-wallet row locks
///
/// Cloning is cheap and every clone sees the same data.
#[derive(Debug, Clone)]
pub struct MemoryLedgerStore {
    inner: Arc<Inner>,
}

impl MemoryLedgerStore {
    /// Create an empty store
    ///
    /// Wallet and transaction ids both start at 1.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                committed: RwLock::new(Committed::default()),
                locks: DashMap::new(),
                next_wallet_id: AtomicU64::new(1),
                next_transaction_id: AtomicU64::new(1),
            }),
        }
    }

    /// Insert a wallet with an opening balance, bypassing the processor
    ///
    /// Used to load existing balances (and by tests to set up a scenario).
    /// The wallet gets the next free id.
    pub fn seed_wallet(&self, balance: Decimal) -> Wallet {
        let id = self.inner.next_wallet_id.fetch_add(1, Ordering::SeqCst);
        let wallet = Wallet::with_balance(id, balance);
        self.insert_wallet(wallet.clone());
        wallet
    }

    /// Number of committed transactions across all wallets
    pub fn transaction_count(&self) -> usize {
        self.inner.read().transactions.len()
    }

    fn insert_wallet(&self, wallet: Wallet) {
        self.inner
            .locks
            .entry(wallet.id)
            .or_insert_with(|| Arc::new(Mutex::new(())));
        self.inner.write().wallets.insert(wallet.id, wallet);
    }
}

impl Default for MemoryLedgerStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LedgerStore for MemoryLedgerStore {
    type Unit = MemoryUnit;

    async fn create_wallet(&self) -> Result<Wallet, LedgerError> {
        let id = self.inner.next_wallet_id.fetch_add(1, Ordering::SeqCst);
        let wallet = Wallet::new(id);
        self.insert_wallet(wallet.clone());
        debug!(wallet = id, "created wallet");
        Ok(wallet)
    }

    async fn get_wallet(&self, id: WalletId) -> Result<Option<Wallet>, LedgerError> {
        Ok(self.inner.read().wallets.get(&id).cloned())
    }

    async fn get_transaction(&self, id: TransactionId) -> Result<Option<Transaction>, LedgerError> {
        Ok(self.inner.read().transactions.get(&id).cloned())
    }

    async fn list_transactions(
        &self,
        wallet_id: WalletId,
    ) -> Result<Vec<Transaction>, LedgerError> {
        let mut transactions: Vec<Transaction> = self
            .inner
            .read()
            .transactions
            .values()
            .filter(|tx| tx.wallet_id == wallet_id)
            .cloned()
            .collect();
        // Newest first; ids break ties between records saved in the same instant
        transactions.sort_by_key(|tx| Reverse((tx.created_at, tx.id)));
        Ok(transactions)
    }

    async fn begin_unit(&self, wallet_id: WalletId) -> Result<MemoryUnit, LedgerError> {
        // Clone the lock out of the map so no shard guard is held across the await.
        // A wallet that does not exist gets a private lock; load_wallet reports it missing.
        let lock = self
            .inner
            .locks
            .get(&wallet_id)
            .map(|entry| Arc::clone(entry.value()))
            .unwrap_or_else(|| Arc::new(Mutex::new(())));

        let guard = lock.lock_owned().await;
        debug!(wallet = wallet_id, "opened unit");

        Ok(MemoryUnit {
            inner: Arc::clone(&self.inner),
            wallet_id,
            _guard: guard,
            staged_wallet: None,
            staged_transactions: Vec::new(),
            committed: false,
        })
    }
}

/// Transactional unit of a [`MemoryLedgerStore`]
///
/// Holds the wallet's row lock for its whole lifetime.
#[derive(Debug)]
pub struct MemoryUnit {
    inner: Arc<Inner>,
    wallet_id: WalletId,
    _guard: OwnedMutexGuard<()>,
    staged_wallet: Option<Wallet>,
    staged_transactions: Vec<Transaction>,
    committed: bool,
}

impl MemoryUnit {
    fn check_scope(&self, wallet_id: WalletId, operation: &str) -> Result<(), LedgerError> {
        if wallet_id != self.wallet_id {
            return Err(LedgerError::store(
                operation,
                format!(
                    "unit is scoped to wallet {}, not wallet {}",
                    self.wallet_id, wallet_id
                ),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl LedgerUnit for MemoryUnit {
    async fn load_wallet(&mut self) -> Result<Option<Wallet>, LedgerError> {
        if let Some(wallet) = &self.staged_wallet {
            return Ok(Some(wallet.clone()));
        }
        Ok(self.inner.read().wallets.get(&self.wallet_id).cloned())
    }

    async fn save_wallet(&mut self, wallet: &Wallet) -> Result<(), LedgerError> {
        self.check_scope(wallet.id, "save_wallet")?;
        let mut wallet = wallet.clone();
        wallet.updated_at = Utc::now();
        self.staged_wallet = Some(wallet);
        Ok(())
    }

    async fn save_transaction(
        &mut self,
        draft: TransactionDraft,
        closing_balance: Decimal,
    ) -> Result<Transaction, LedgerError> {
        self.check_scope(draft.wallet_id, "save_transaction")?;
        // Ids reserved by a unit that rolls back are never reused
        let id = self.inner.next_transaction_id.fetch_add(1, Ordering::SeqCst);
        let transaction = Transaction {
            id,
            wallet_id: draft.wallet_id,
            amount: draft.amount,
            tx_type: draft.tx_type,
            closing_balance,
            description: draft.description,
            created_at: Utc::now(),
        };
        self.staged_transactions.push(transaction.clone());
        Ok(transaction)
    }

    async fn commit(mut self) -> Result<(), LedgerError> {
        let staged_wallet = self.staged_wallet.take();
        let staged_transactions = std::mem::take(&mut self.staged_transactions);
        let count = staged_transactions.len();

        {
            let mut committed = self.inner.write();
            for transaction in staged_transactions {
                committed.transactions.insert(transaction.id, transaction);
            }
            if let Some(wallet) = staged_wallet {
                committed.wallets.insert(wallet.id, wallet);
            }
        }
        self.committed = true;

        debug!(wallet = self.wallet_id, transactions = count, "committed unit");
        Ok(())
    }

    fn rollback(self) {
        // Drop does the work
    }
}

impl Drop for MemoryUnit {
    fn drop(&mut self) {
        if !self.committed {
            debug!(
                wallet = self.wallet_id,
                discarded_transactions = self.staged_transactions.len(),
                discarded_wallet = self.staged_wallet.is_some(),
                "rolled back unit"
            );
        }
    }
}
