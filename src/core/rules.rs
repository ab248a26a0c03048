//! Balance rules
//!
//! Pure decision functions used by the transaction processor: whether a
//! transaction type is known, whether a transaction may be applied to a
//! wallet, and what the resulting balance is. None of these touch the store.
//!
//! Balances are `rust_decimal::Decimal`, so repeated credits and debits do
//! not drift the way binary floating point would.

use crate::types::{LedgerError, TransactionType, Wallet};
use rust_decimal::Decimal;

/// Check whether a raw type string is a known transaction type
///
/// Only the exact persisted names `CREDIT` and `DEBIT` are accepted.
pub fn is_valid_type(tx_type: &str) -> bool {
    parse_type(tx_type).is_ok()
}

/// Parse a raw type string
///
/// # Errors
///
/// Returns `InvalidTransactionType` for anything other than `CREDIT` or `DEBIT`.
pub fn parse_type(tx_type: &str) -> Result<TransactionType, LedgerError> {
    tx_type.parse()
}

/// Reject negative amounts
///
/// The direction of a transaction is carried by its type, so a negative
/// amount is never meaningful. Zero is allowed.
pub fn validate_amount(amount: Decimal) -> Result<(), LedgerError> {
    if amount < Decimal::ZERO {
        return Err(LedgerError::invalid_amount(amount));
    }
    Ok(())
}

/// Check whether a transaction may be applied to a wallet
///
/// Credits are always permitted. Debits require `balance - amount >= 0`;
/// a resulting balance of exactly zero is allowed.
///
/// # Arguments
///
/// * `wallet` - Current wallet state
/// * `tx_type` - CREDIT or DEBIT
/// * `amount` - Non-negative amount
pub fn can_apply(wallet: &Wallet, tx_type: TransactionType, amount: Decimal) -> bool {
    match tx_type {
        TransactionType::Credit => true,
        TransactionType::Debit => wallet.balance >= amount,
    }
}

/// Compute the balance after applying a transaction
///
/// # Returns
///
/// * `balance + amount` for CREDIT
/// * `balance - amount` for DEBIT
///
/// # Errors
///
/// Returns `ArithmeticOverflow` if the decimal result is out of range.
pub fn compute_new_balance(
    wallet: &Wallet,
    tx_type: TransactionType,
    amount: Decimal,
) -> Result<Decimal, LedgerError> {
    match tx_type {
        TransactionType::Credit => wallet
            .balance
            .checked_add(amount)
            .ok_or_else(|| LedgerError::arithmetic_overflow("credit", wallet.id)),
        TransactionType::Debit => wallet
            .balance
            .checked_sub(amount)
            .ok_or_else(|| LedgerError::arithmetic_overflow("debit", wallet.id)),
    }
}
