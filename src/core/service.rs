//! Ledger service
//!
//! The operations the request layer calls: wallet creation and lookup,
//! transaction listing, and the two mutating operations that go through the
//! [`TransactionProcessor`]. Read-only operations talk to the store directly,
//! under the same deadline the processor uses.

use crate::core::processor::{with_deadline, ProcessorConfig, TransactionProcessor};
use crate::core::traits::LedgerStore;
use crate::types::{LedgerError, Transaction, TransactionId, Wallet, WalletId};
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::info;

/// Ledger operations exposed to the request layer
pub struct LedgerService<S: LedgerStore> {
    store: Arc<S>,
    processor: TransactionProcessor<S>,
}

impl<S: LedgerStore> LedgerService<S> {
    /// Create a service over `store`
    pub fn new(store: Arc<S>, config: ProcessorConfig) -> Self {
        let processor = TransactionProcessor::new(Arc::clone(&store), config);
        Self { store, processor }
    }

    /// The processor backing the mutating operations
    pub fn processor(&self) -> &TransactionProcessor<S> {
        &self.processor
    }

    /// Create a wallet with a zero balance
    pub async fn create_wallet(&self) -> Result<Wallet, LedgerError> {
        let wallet = with_deadline("create_wallet", self.timeout(), self.store.create_wallet()).await?;
        info!(wallet = wallet.id, "wallet created");
        Ok(wallet)
    }

    /// Get a wallet
    ///
    /// # Errors
    ///
    /// `WalletNotFound` if the id is unknown.
    pub async fn get_wallet(&self, id: WalletId) -> Result<Wallet, LedgerError> {
        with_deadline("get_wallet", self.timeout(), self.store.get_wallet(id))
            .await?
            .ok_or_else(|| LedgerError::wallet_not_found(id))
    }

    /// List a wallet's transactions, newest first
    ///
    /// # Errors
    ///
    /// `WalletNotFound` if the id is unknown.
    pub async fn list_wallet_transactions(
        &self,
        id: WalletId,
    ) -> Result<Vec<Transaction>, LedgerError> {
        self.get_wallet(id).await?;
        with_deadline("list_transactions", self.timeout(), self.store.list_transactions(id)).await
    }

    /// Apply a credit or debit, see [`TransactionProcessor::process`]
    pub async fn create_transaction(
        &self,
        wallet_id: WalletId,
        tx_type: &str,
        amount: Decimal,
    ) -> Result<Transaction, LedgerError> {
        self.processor.process(wallet_id, tx_type, amount).await
    }

    /// Revert a transaction, see [`TransactionProcessor::revert`]
    pub async fn revert_transaction(
        &self,
        transaction_id: TransactionId,
    ) -> Result<Transaction, LedgerError> {
        self.processor.revert(transaction_id).await
    }

    fn timeout(&self) -> std::time::Duration {
        self.processor.config().store_timeout
    }
}
