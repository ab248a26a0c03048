//! Types module
//!
//! Contains core data structures used throughout the application.
//! This module organizes types into logical submodules:
//! - `wallet`: Wallet state
//! - `transaction`: Transaction records, drafts and identifiers
//! - `error`: Error types for the ledger

pub mod error;
pub mod transaction;
pub mod wallet;

pub use error::{ErrorKind, LedgerError};
pub use transaction::{Transaction, TransactionDraft, TransactionId, TransactionType, WalletId};
pub use wallet::Wallet;
