//! Wallet Ledger Library
//! # Overview
//!
//! This library provides a ledger service that tracks per-wallet balances and
//! records the transactions that mutate them, served over HTTP.
//!
//! # Architecture
//!
//! The system is organized into several key components:
//!
//! - [`types`] - Core data types (Wallet, Transaction, errors)
//! - [`cli`] - Command-line and environment configuration
//! - [`core`] - Business logic components:
//!   - [`core::rules`] - Pure balance rules
//!   - [`core::processor`] - Atomic read-validate-apply-commit
//!   - [`core::reversal`] - Inverse transaction synthesis
//!   - [`core::service`] - Operations exposed to the request layer
//!   - [`core::memory_store`] - In-memory ledger store with per-wallet locks
//! - [`api`] - HTTP routes and error responses
//! - [`telemetry`] - Tracing setup
//!
//! # Transaction Types
//!
//! - **CREDIT**: Add funds to a wallet (always permitted)
//! - **DEBIT**: Remove funds from a wallet (balance must stay at or above zero)
//!
//! A transaction is reverted by applying a new transaction of the opposite
//! type for the same amount; the original record is never modified.
//!
//! # Consistency
//!
//! Each mutation runs in one transactional unit of the store that holds the
//! wallet's row lock, so the balance update and the new transaction record
//! are committed together, and concurrent mutations of one wallet are
//! serialized.

// Module declarations
pub mod api;
pub mod cli;
pub mod core;
pub mod telemetry;
pub mod types;

pub use crate::core::{LedgerService, LedgerStore, MemoryLedgerStore, ProcessorConfig, TransactionProcessor};
pub use types::{
    ErrorKind, LedgerError, Transaction, TransactionDraft, TransactionId, TransactionType, Wallet,
    WalletId,
};
