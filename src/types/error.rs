//! Error types for the wallet ledger
//!
//! This module defines all error types that can occur while processing
//! wallet transactions.
//!
//! # Error Categories
//!
//! - **Validation**: unknown transaction type, negative amount, malformed request
//! - **Not found**: unknown wallet or transaction id
//! - **Rejected**: insufficient funds, arithmetic overflow
//! - **Store**: read, write or commit failures and exceeded deadlines
//!
//! A store error raised inside a transactional unit always comes with a
//! rollback of that unit.

use super::transaction::{TransactionId, WalletId};
use rust_decimal::Decimal;
use std::time::Duration;
use thiserror::Error;

/// Main error type for the ledger
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LedgerError {
    /// Transaction type is neither CREDIT nor DEBIT
    ///
    /// Raised before any store access.
    #[error("Invalid transaction type '{tx_type}'")]
    InvalidTransactionType {
        /// The rejected type string
        tx_type: String,
    },

    /// Amount is negative
    #[error("Invalid amount {amount}: amounts must not be negative")]
    InvalidAmount {
        /// The rejected amount
        amount: Decimal,
    },

    /// Request could not be parsed (malformed body, non-numeric id, ...)
    #[error("Invalid request: {message}")]
    InvalidRequest {
        /// Description of what was wrong
        message: String,
    },

    /// No wallet with the given id exists
    #[error("Wallet {wallet} not found")]
    WalletNotFound {
        /// The wallet id that was looked up
        wallet: WalletId,
    },

    /// No transaction with the given id exists
    #[error("Transaction {tx} not found")]
    TransactionNotFound {
        /// The transaction id that was looked up
        tx: TransactionId,
    },

    /// Debit would take the balance below zero
    ///
    /// The wallet is left unchanged and no transaction is recorded.
    #[error("Insufficient funds for wallet {wallet}: balance {balance}, requested {requested}")]
    InsufficientFunds {
        /// Wallet id
        wallet: WalletId,
        /// Balance at the time of the check
        balance: Decimal,
        /// Requested debit amount
        requested: Decimal,
    },

    /// Balance arithmetic would overflow
    #[error("Arithmetic overflow in {operation} for wallet {wallet}")]
    ArithmeticOverflow {
        /// Operation that would overflow
        operation: String,
        /// Wallet id
        wallet: WalletId,
    },

    /// The ledger store failed to read, write or commit
    #[error("Store error during {operation}: {message}")]
    Store {
        /// Store operation that failed
        operation: String,
        /// Description of the failure
        message: String,
    },

    /// A store call did not finish before its deadline
    #[error("Store deadline of {timeout_ms}ms exceeded during {operation}")]
    StoreTimeout {
        /// Store operation that timed out
        operation: String,
        /// The deadline in milliseconds
        timeout_ms: u64,
    },
}

/// Coarse classification of a [`LedgerError`]
///
/// The request layer maps each kind to one response status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed input; nothing was attempted against the store
    Validation,
    /// Referenced entity does not exist
    NotFound,
    /// Well-formed request refused by the balance rules
    Rejected,
    /// Store failure; any open unit was rolled back
    Store,
}

impl LedgerError {
    /// Classify this error
    pub const fn kind(&self) -> ErrorKind {
        match self {
            LedgerError::InvalidTransactionType { .. }
            | LedgerError::InvalidAmount { .. }
            | LedgerError::InvalidRequest { .. } => ErrorKind::Validation,
            LedgerError::WalletNotFound { .. } | LedgerError::TransactionNotFound { .. } => {
                ErrorKind::NotFound
            }
            LedgerError::InsufficientFunds { .. } | LedgerError::ArithmeticOverflow { .. } => {
                ErrorKind::Rejected
            }
            LedgerError::Store { .. } | LedgerError::StoreTimeout { .. } => ErrorKind::Store,
        }
    }

    /// Stable machine-readable code for API responses
    pub const fn error_code(&self) -> &'static str {
        match self {
            LedgerError::InvalidTransactionType { .. } => "invalid_transaction_type",
            LedgerError::InvalidAmount { .. } => "invalid_amount",
            LedgerError::InvalidRequest { .. } => "invalid_request",
            LedgerError::WalletNotFound { .. } => "wallet_not_found",
            LedgerError::TransactionNotFound { .. } => "transaction_not_found",
            LedgerError::InsufficientFunds { .. } => "insufficient_funds",
            LedgerError::ArithmeticOverflow { .. } => "arithmetic_overflow",
            LedgerError::Store { .. } => "store_error",
            LedgerError::StoreTimeout { .. } => "store_timeout",
        }
    }
}

// Helper functions for creating common errors

impl LedgerError {
    /// Create an InvalidTransactionType error
    pub fn invalid_transaction_type(tx_type: &str) -> Self {
        LedgerError::InvalidTransactionType {
            tx_type: tx_type.to_string(),
        }
    }

    /// Create an InvalidAmount error
    pub fn invalid_amount(amount: Decimal) -> Self {
        LedgerError::InvalidAmount { amount }
    }

    /// Create an InvalidRequest error
    pub fn invalid_request(message: impl Into<String>) -> Self {
        LedgerError::InvalidRequest {
            message: message.into(),
        }
    }

    /// Create a WalletNotFound error
    pub fn wallet_not_found(wallet: WalletId) -> Self {
        LedgerError::WalletNotFound { wallet }
    }

    /// Create a TransactionNotFound error
    pub fn transaction_not_found(tx: TransactionId) -> Self {
        LedgerError::TransactionNotFound { tx }
    }

    /// Create an InsufficientFunds error
    pub fn insufficient_funds(wallet: WalletId, balance: Decimal, requested: Decimal) -> Self {
        LedgerError::InsufficientFunds {
            wallet,
            balance,
            requested,
        }
    }

    /// Create an ArithmeticOverflow error
    pub fn arithmetic_overflow(operation: &str, wallet: WalletId) -> Self {
        LedgerError::ArithmeticOverflow {
            operation: operation.to_string(),
            wallet,
        }
    }

    /// Create a Store error
    pub fn store(operation: &str, message: impl Into<String>) -> Self {
        LedgerError::Store {
            operation: operation.to_string(),
            message: message.into(),
        }
    }

    /// Create a StoreTimeout error
    pub fn store_timeout(operation: &str, timeout: Duration) -> Self {
        LedgerError::StoreTimeout {
            operation: operation.to_string(),
            timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
        }
    }
}
