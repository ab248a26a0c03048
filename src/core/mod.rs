//! Core business logic module
//!
//! This module contains the transaction processing components:
//! - `traits` - Ledger store and transactional unit abstractions
//! - `rules` - Pure balance rules
//! - `processor` - Read-validate-apply-commit orchestration
//! - `reversal` - Inverse transaction synthesis
//! - `service` - Operations exposed to the request layer
//! - `memory_store` - Thread-safe in-memory ledger store

pub mod memory_store;
pub mod processor;
pub mod reversal;
pub mod rules;
pub mod service;
pub mod traits;

pub use memory_store::{MemoryLedgerStore, MemoryUnit};
pub use processor::{ProcessorConfig, TransactionProcessor, DEFAULT_STORE_TIMEOUT_MS};
pub use service::LedgerService;
pub use traits::{LedgerStore, LedgerUnit};
