//! Transaction processing
//!
//! This module provides the TransactionProcessor that validates a proposed
//! credit or debit, applies it to the wallet balance and records it, all
//! inside one transactional unit of the ledger store.
//!
//! The processor enforces business rules such as:
//! - Only CREDIT and DEBIT are accepted, checked before the store is touched
//! - Amounts are never negative
//! - Debits never take a balance below zero
//! - A wallet balance and its new transaction record are committed together
//!   or not at all

use crate::core::reversal::synthesize_reversal;
use crate::core::rules;
use crate::core::traits::{LedgerStore, LedgerUnit};
use crate::types::{LedgerError, Transaction, TransactionDraft, TransactionId, WalletId};
use rust_decimal::Decimal;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, instrument, warn};

/// Default deadline for store interactions, in milliseconds
pub const DEFAULT_STORE_TIMEOUT_MS: u64 = 5000;

/// Configuration for the transaction processor
#[derive(Clone, Debug)]
pub struct ProcessorConfig {
    /// Deadline for each store interaction
    ///
    /// For `process` this covers the whole transactional unit, from opening
    /// it (which waits for the wallet's row lock) to commit.
    pub store_timeout: Duration,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            store_timeout: Duration::from_millis(DEFAULT_STORE_TIMEOUT_MS),
        }
    }
}

/// Run a store future under a deadline
///
/// On expiry the future is dropped, which rolls back any unit it owned.
pub(crate) async fn with_deadline<T, F>(
    operation: &str,
    timeout: Duration,
    future: F,
) -> Result<T, LedgerError>
where
    F: Future<Output = Result<T, LedgerError>>,
{
    match tokio::time::timeout(timeout, future).await {
        Ok(result) => result,
        Err(_) => {
            warn!(operation, timeout_ms = timeout.as_millis() as u64, "store deadline exceeded");
            Err(LedgerError::store_timeout(operation, timeout))
        }
    }
}

/// Transaction processor
///
/// Orchestrates read-validate-apply-commit against a [`LedgerStore`]. Cheap
/// to clone; clones share the store.
pub struct TransactionProcessor<S: LedgerStore> {
    store: Arc<S>,
    config: ProcessorConfig,
}

impl<S: LedgerStore> Clone for TransactionProcessor<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            config: self.config.clone(),
        }
    }
}

impl<S: LedgerStore> TransactionProcessor<S> {
    /// Create a new TransactionProcessor
    ///
    /// # Arguments
    ///
    /// * `store` - The ledger store to read from and commit to
    /// * `config` - Deadlines for store interactions
    pub fn new(store: Arc<S>, config: ProcessorConfig) -> Self {
        Self { store, config }
    }

    /// The configuration this processor was built with
    pub fn config(&self) -> &ProcessorConfig {
        &self.config
    }

    /// Process a credit or debit request
    ///
    /// Parses the raw type and hands the request to [`Self::process_draft`].
    ///
    /// # Arguments
    ///
    /// * `wallet_id` - The wallet to apply the transaction to
    /// * `tx_type` - Raw type, must be `CREDIT` or `DEBIT`
    /// * `amount` - Non-negative amount
    ///
    /// # Returns
    ///
    /// * `Ok(Transaction)` - The committed transaction, with its closing balance
    /// * `Err(LedgerError)` - If validation or the store failed
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The type is unknown (`InvalidTransactionType`, no store access)
    /// - The amount is negative (`InvalidAmount`, no store access)
    /// - The wallet does not exist (`WalletNotFound`)
    /// - A debit exceeds the balance (`InsufficientFunds`)
    /// - Any store step fails or times out (`Store`/`StoreTimeout`, unit rolled back)
    pub async fn process(
        &self,
        wallet_id: WalletId,
        tx_type: &str,
        amount: Decimal,
    ) -> Result<Transaction, LedgerError> {
        let tx_type = rules::parse_type(tx_type)?;
        self.process_draft(TransactionDraft::new(wallet_id, tx_type, amount))
            .await
    }

    /// Apply a typed draft
    ///
    /// Used directly by reversals, which carry a description.
    ///
    /// # Errors
    ///
    /// Same as [`Self::process`], minus type parsing.
    #[instrument(
        name = "process_transaction",
        skip(self, draft),
        fields(wallet = draft.wallet_id, tx_type = %draft.tx_type, amount = %draft.amount)
    )]
    pub async fn process_draft(&self, draft: TransactionDraft) -> Result<Transaction, LedgerError> {
        rules::validate_amount(draft.amount)?;

        let result = with_deadline("process", self.config.store_timeout, self.apply(draft)).await;
        match &result {
            Ok(transaction) => info!(
                tx = transaction.id,
                closing_balance = %transaction.closing_balance,
                "transaction committed"
            ),
            Err(error) => warn!(%error, "transaction rejected"),
        }
        result
    }

    /// Revert a committed transaction
    ///
    /// Loads the original, checks its wallet still exists, synthesizes the
    /// inverse draft and processes it like a fresh request. The original is
    /// left untouched; the reversal is a new record.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The transaction does not exist (`TransactionNotFound`)
    /// - Its wallet does not exist (`WalletNotFound`)
    /// - Reverting a CREDIT would overdraw the wallet (`InsufficientFunds`)
    /// - Any store step fails or times out
    #[instrument(name = "revert_transaction", skip(self))]
    pub async fn revert(&self, transaction_id: TransactionId) -> Result<Transaction, LedgerError> {
        let timeout = self.config.store_timeout;

        let original = with_deadline(
            "get_transaction",
            timeout,
            self.store.get_transaction(transaction_id),
        )
        .await?
        .ok_or_else(|| LedgerError::transaction_not_found(transaction_id))?;

        with_deadline("get_wallet", timeout, self.store.get_wallet(original.wallet_id))
            .await?
            .ok_or_else(|| LedgerError::wallet_not_found(original.wallet_id))?;

        self.process_draft(synthesize_reversal(&original)).await
    }

    /// Read-validate-apply-commit inside one unit
    ///
    /// Every early return drops the unit, which rolls it back and releases
    /// the wallet's row lock.
    async fn apply(&self, draft: TransactionDraft) -> Result<Transaction, LedgerError> {
        let mut unit = self.store.begin_unit(draft.wallet_id).await?;

        // Read under the row lock so the balance cannot go stale before commit
        let mut wallet = unit
            .load_wallet()
            .await?
            .ok_or_else(|| LedgerError::wallet_not_found(draft.wallet_id))?;

        if !rules::can_apply(&wallet, draft.tx_type, draft.amount) {
            return Err(LedgerError::insufficient_funds(
                wallet.id,
                wallet.balance,
                draft.amount,
            ));
        }

        wallet.balance = rules::compute_new_balance(&wallet, draft.tx_type, draft.amount)?;
        unit.save_wallet(&wallet).await?;

        let transaction = unit.save_transaction(draft, wallet.balance).await?;

        // Second write of the same value keeps the store consistent with the record
        unit.save_wallet(&wallet).await?;

        unit.commit().await?;
        Ok(transaction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::memory_store::{MemoryLedgerStore, MemoryUnit};
    use crate::types::{TransactionType, Wallet};
    use async_trait::async_trait;
    use rstest::rstest;

    fn dec(value: i64) -> Decimal {
        Decimal::new(value, 0)
    }

    fn setup(balance: i64) -> (Arc<MemoryLedgerStore>, TransactionProcessor<MemoryLedgerStore>, Wallet) {
        let store = Arc::new(MemoryLedgerStore::new());
        let wallet = store.seed_wallet(dec(balance));
        let processor = TransactionProcessor::new(Arc::clone(&store), ProcessorConfig::default());
        (store, processor, wallet)
    }

    async fn balance_of(store: &MemoryLedgerStore, wallet_id: WalletId) -> Decimal {
        store.get_wallet(wallet_id).await.unwrap().unwrap().balance
    }

    #[tokio::test]
    async fn test_credit_increases_balance() {
        let (store, processor, wallet) = setup(1000);

        let tx = processor.process(wallet.id, "CREDIT", dec(500)).await.unwrap();

        assert_eq!(tx.wallet_id, wallet.id);
        assert_eq!(tx.amount, dec(500));
        assert_eq!(tx.tx_type, TransactionType::Credit);
        assert_eq!(tx.closing_balance, dec(1500));
        assert_eq!(tx.description, None);
        assert_eq!(balance_of(&store, wallet.id).await, dec(1500));
        assert_eq!(store.get_transaction(tx.id).await.unwrap(), Some(tx));
    }

    #[rstest]
    #[case::partial(1000, 400, 600)]
    #[case::exact_balance(1000, 1000, 0)]
    #[case::zero_amount(1000, 0, 1000)]
    #[tokio::test]
    async fn test_debit_within_balance_succeeds(
        #[case] balance: i64,
        #[case] amount: i64,
        #[case] expected: i64,
    ) {
        let (store, processor, wallet) = setup(balance);

        let tx = processor.process(wallet.id, "DEBIT", dec(amount)).await.unwrap();

        assert_eq!(tx.closing_balance, dec(expected));
        assert_eq!(balance_of(&store, wallet.id).await, dec(expected));
    }

    #[tokio::test]
    async fn test_debit_above_balance_fails_without_side_effects() {
        let (store, processor, wallet) = setup(1500);

        let err = processor.process(wallet.id, "DEBIT", dec(2000)).await.unwrap_err();

        assert_eq!(
            err,
            LedgerError::insufficient_funds(wallet.id, dec(1500), dec(2000))
        );
        assert_eq!(balance_of(&store, wallet.id).await, dec(1500));
        assert_eq!(store.transaction_count(), 0);
    }

    #[rstest]
    #[case::unknown_type("DUMMY", 10)]
    #[case::lowercase_type("credit", 10)]
    #[tokio::test]
    async fn test_invalid_type_rejected_before_store(#[case] tx_type: &str, #[case] amount: i64) {
        // Wallet 77 does not exist: the type check must fire first
        let (store, processor, _) = setup(0);

        let err = processor.process(77, tx_type, dec(amount)).await.unwrap_err();

        assert!(matches!(err, LedgerError::InvalidTransactionType { .. }));
        assert_eq!(store.transaction_count(), 0);
    }

    #[tokio::test]
    async fn test_negative_amount_rejected() {
        let (store, processor, wallet) = setup(100);

        let err = processor.process(wallet.id, "CREDIT", dec(-5)).await.unwrap_err();

        assert_eq!(err, LedgerError::invalid_amount(dec(-5)));
        assert_eq!(balance_of(&store, wallet.id).await, dec(100));
    }

    #[tokio::test]
    async fn test_unknown_wallet_is_not_found() {
        let (store, processor, _) = setup(0);

        let err = processor.process(999, "CREDIT", dec(1)).await.unwrap_err();

        assert_eq!(err, LedgerError::wallet_not_found(999));
        assert!(store.get_wallet(999).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_revert_debit_restores_balance() {
        let (store, processor, wallet) = setup(1000);
        let debit = processor.process(wallet.id, "DEBIT", dec(300)).await.unwrap();

        let reversal = processor.revert(debit.id).await.unwrap();

        assert_eq!(reversal.tx_type, TransactionType::Credit);
        assert_eq!(reversal.amount, dec(300));
        assert_eq!(reversal.closing_balance, dec(1000));
        assert_eq!(reversal.description, Some(format!("Revert of: {}", debit.id)));
        assert_ne!(reversal.id, debit.id);
        assert_eq!(balance_of(&store, wallet.id).await, dec(1000));
        // The original record is untouched
        assert_eq!(store.get_transaction(debit.id).await.unwrap(), Some(debit));
    }

    #[tokio::test]
    async fn test_revert_credit_fails_when_funds_were_spent() {
        let (store, processor, wallet) = setup(0);
        let credit = processor.process(wallet.id, "CREDIT", dec(500)).await.unwrap();
        processor.process(wallet.id, "DEBIT", dec(400)).await.unwrap();

        let err = processor.revert(credit.id).await.unwrap_err();

        assert_eq!(err, LedgerError::insufficient_funds(wallet.id, dec(100), dec(500)));
        assert_eq!(balance_of(&store, wallet.id).await, dec(100));
        assert_eq!(store.transaction_count(), 2);
    }

    #[tokio::test]
    async fn test_revert_unknown_transaction_is_not_found() {
        let (store, processor, _) = setup(50);

        let err = processor.revert(12345).await.unwrap_err();

        assert_eq!(err, LedgerError::transaction_not_found(12345));
        assert_eq!(store.transaction_count(), 0);
    }

    #[tokio::test]
    async fn test_end_to_end_scenario() {
        let (store, processor, wallet) = setup(1000);

        let credit = processor.process(wallet.id, "CREDIT", dec(500)).await.unwrap();
        assert_eq!(credit.closing_balance, dec(1500));
        assert_eq!(balance_of(&store, wallet.id).await, dec(1500));

        let err = processor.process(wallet.id, "DEBIT", dec(2000)).await.unwrap_err();
        assert!(matches!(err, LedgerError::InsufficientFunds { .. }));
        assert_eq!(balance_of(&store, wallet.id).await, dec(1500));

        let reversal = processor.revert(credit.id).await.unwrap();
        assert_eq!(reversal.closing_balance, dec(1000));
        assert_eq!(balance_of(&store, wallet.id).await, dec(1000));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_debits_never_overdraw() {
        let (store, processor, wallet) = setup(1000);

        let tasks: Vec<_> = (0..50)
            .map(|_| {
                let processor = processor.clone();
                tokio::spawn(async move { processor.process(wallet.id, "DEBIT", dec(30)).await })
            })
            .collect();

        let mut succeeded = 0;
        for task in futures::future::join_all(tasks).await {
            match task.unwrap() {
                Ok(_) => succeeded += 1,
                Err(err) => assert!(matches!(err, LedgerError::InsufficientFunds { .. })),
            }
        }

        // 1000 / 30 = 33 debits fit, 10 remains
        assert_eq!(succeeded, 33);
        assert_eq!(balance_of(&store, wallet.id).await, dec(10));
        assert_eq!(store.transaction_count(), 33);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_credits_do_not_lose_updates() {
        let (store, processor, wallet) = setup(0);

        let tasks: Vec<_> = (1..=100)
            .map(|i| {
                let processor = processor.clone();
                tokio::spawn(async move { processor.process(wallet.id, "CREDIT", dec(i)).await })
            })
            .collect();

        for task in futures::future::join_all(tasks).await {
            task.unwrap().unwrap();
        }

        assert_eq!(balance_of(&store, wallet.id).await, dec(5050));

        // Every closing balance is distinct and the newest record matches the wallet
        let listed = store.list_transactions(wallet.id).await.unwrap();
        assert_eq!(listed.len(), 100);
        let mut closing: Vec<Decimal> = listed.iter().map(|tx| tx.closing_balance).collect();
        closing.sort();
        closing.dedup();
        assert_eq!(closing.len(), 100);
        assert_eq!(closing.last(), Some(&dec(5050)));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_readers_never_see_half_committed_credit() {
        use std::sync::atomic::{AtomicBool, Ordering};

        let (store, processor, wallet) = setup(0);
        let done = Arc::new(AtomicBool::new(false));

        // Credits only, so the wallet can never be behind its newest record
        let reader = {
            let store = Arc::clone(&store);
            let done = Arc::clone(&done);
            tokio::spawn(async move {
                while !done.load(Ordering::Acquire) {
                    let newest = store.transaction_count() as TransactionId;
                    if let Some(tx) = store.get_transaction(newest).await.unwrap() {
                        let balance = store.get_wallet(wallet.id).await.unwrap().unwrap().balance;
                        assert!(
                            balance >= tx.closing_balance,
                            "wallet balance {} behind transaction {} closing at {}",
                            balance,
                            tx.id,
                            tx.closing_balance
                        );
                    }
                    tokio::task::yield_now().await;
                }
            })
        };

        for _ in 0..5_000 {
            processor.process(wallet.id, "CREDIT", dec(1)).await.unwrap();
        }
        done.store(true, Ordering::Release);

        reader.await.unwrap();
        assert_eq!(balance_of(&store, wallet.id).await, dec(5000));
        assert_eq!(store.transaction_count(), 5000);
    }

    #[tokio::test]
    async fn test_timeout_rolls_back_and_releases_lock() {
        let store = Arc::new(MemoryLedgerStore::new());
        let wallet = store.seed_wallet(dec(100));
        let processor = TransactionProcessor::new(
            Arc::clone(&store),
            ProcessorConfig {
                store_timeout: Duration::from_millis(50),
            },
        );

        // Hold the row lock so the processor cannot open its unit in time
        let held = store.begin_unit(wallet.id).await.unwrap();
        let err = processor.process(wallet.id, "CREDIT", dec(5)).await.unwrap_err();
        assert!(matches!(err, LedgerError::StoreTimeout { .. }));
        drop(held);

        assert_eq!(balance_of(&store, wallet.id).await, dec(100));
        assert_eq!(store.transaction_count(), 0);

        // Lock is free again
        let tx = processor.process(wallet.id, "CREDIT", dec(5)).await.unwrap();
        assert_eq!(tx.closing_balance, dec(105));
    }

    /// Step of a unit at which [`FaultyStore`] injects a failure
    #[derive(Clone, Copy, Debug, PartialEq)]
    enum FailAt {
        FirstWalletSave,
        TransactionSave,
        SecondWalletSave,
        Commit,
        /// Not a failure: commit hangs until the deadline drops the unit
        StallOnCommit,
    }

    /// Store that delegates to a MemoryLedgerStore but fails one unit step
    struct FaultyStore {
        inner: MemoryLedgerStore,
        fail_at: FailAt,
    }

    struct FaultyUnit {
        inner: MemoryUnit,
        fail_at: FailAt,
        wallet_saves: usize,
    }

    fn injected(operation: &str) -> LedgerError {
        LedgerError::store(operation, "injected failure")
    }

    #[async_trait]
    impl LedgerStore for FaultyStore {
        type Unit = FaultyUnit;

        async fn create_wallet(&self) -> Result<Wallet, LedgerError> {
            self.inner.create_wallet().await
        }

        async fn get_wallet(&self, id: WalletId) -> Result<Option<Wallet>, LedgerError> {
            self.inner.get_wallet(id).await
        }

        async fn get_transaction(
            &self,
            id: TransactionId,
        ) -> Result<Option<Transaction>, LedgerError> {
            self.inner.get_transaction(id).await
        }

        async fn list_transactions(
            &self,
            wallet_id: WalletId,
        ) -> Result<Vec<Transaction>, LedgerError> {
            self.inner.list_transactions(wallet_id).await
        }

        async fn begin_unit(&self, wallet_id: WalletId) -> Result<FaultyUnit, LedgerError> {
            Ok(FaultyUnit {
                inner: self.inner.begin_unit(wallet_id).await?,
                fail_at: self.fail_at,
                wallet_saves: 0,
            })
        }
    }

    #[async_trait]
    impl LedgerUnit for FaultyUnit {
        async fn load_wallet(&mut self) -> Result<Option<Wallet>, LedgerError> {
            self.inner.load_wallet().await
        }

        async fn save_wallet(&mut self, wallet: &Wallet) -> Result<(), LedgerError> {
            let nth = self.wallet_saves;
            self.wallet_saves += 1;
            match (self.fail_at, nth) {
                (FailAt::FirstWalletSave, 0) | (FailAt::SecondWalletSave, 1) => {
                    Err(injected("save_wallet"))
                }
                _ => self.inner.save_wallet(wallet).await,
            }
        }

        async fn save_transaction(
            &mut self,
            draft: TransactionDraft,
            closing_balance: Decimal,
        ) -> Result<Transaction, LedgerError> {
            if self.fail_at == FailAt::TransactionSave {
                return Err(injected("save_transaction"));
            }
            self.inner.save_transaction(draft, closing_balance).await
        }

        async fn commit(self) -> Result<(), LedgerError> {
            if self.fail_at == FailAt::Commit {
                // Dropping the inner unit discards everything staged
                return Err(injected("commit"));
            }
            if self.fail_at == FailAt::StallOnCommit {
                tokio::time::sleep(Duration::from_secs(5)).await;
            }
            self.inner.commit().await
        }

        fn rollback(self) {
            self.inner.rollback();
        }
    }

    #[rstest]
    #[case::first_wallet_save(FailAt::FirstWalletSave, "save_wallet")]
    #[case::transaction_save(FailAt::TransactionSave, "save_transaction")]
    #[case::second_wallet_save(FailAt::SecondWalletSave, "save_wallet")]
    #[case::commit(FailAt::Commit, "commit")]
    #[tokio::test]
    async fn test_store_failure_inside_unit_leaves_no_partial_state(
        #[case] fail_at: FailAt,
        #[case] operation: &str,
    ) {
        let memory = MemoryLedgerStore::new();
        let wallet = memory.seed_wallet(dec(1000));
        let store = Arc::new(FaultyStore {
            inner: memory.clone(),
            fail_at,
        });
        let processor = TransactionProcessor::new(store, ProcessorConfig::default());

        let err = processor.process(wallet.id, "CREDIT", dec(500)).await.unwrap_err();

        assert_eq!(err, injected(operation));
        assert_eq!(balance_of(&memory, wallet.id).await, dec(1000));
        assert_eq!(memory.transaction_count(), 0);

        // The failed unit released the row lock
        let mut unit = memory.begin_unit(wallet.id).await.unwrap();
        assert_eq!(unit.load_wallet().await.unwrap().unwrap().balance, dec(1000));
    }

    #[tokio::test]
    async fn test_timeout_inside_unit_discards_staged_writes() {
        let memory = MemoryLedgerStore::new();
        let wallet = memory.seed_wallet(dec(100));
        let store = Arc::new(FaultyStore {
            inner: memory.clone(),
            fail_at: FailAt::StallOnCommit,
        });
        let processor = TransactionProcessor::new(
            store,
            ProcessorConfig {
                store_timeout: Duration::from_millis(50),
            },
        );

        // Both wallet saves and the transaction save are staged when the deadline hits
        let err = processor.process(wallet.id, "CREDIT", dec(5)).await.unwrap_err();

        assert!(matches!(err, LedgerError::StoreTimeout { .. }));
        assert_eq!(balance_of(&memory, wallet.id).await, dec(100));
        assert_eq!(memory.transaction_count(), 0);

        // The dropped unit released the row lock
        let reopened =
            tokio::time::timeout(Duration::from_millis(50), memory.begin_unit(wallet.id)).await;
        let mut unit = reopened.expect("row lock still held").unwrap();
        assert_eq!(unit.load_wallet().await.unwrap().unwrap().balance, dec(100));
    }
}
