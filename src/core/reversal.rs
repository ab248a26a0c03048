//! Reversal synthesis
//!
//! Builds the inverse of an existing transaction. The result is a plain
//! draft that goes through the transaction processor like any other request,
//! including the sufficient-funds check.

use crate::types::{Transaction, TransactionDraft, TransactionId};

/// Description recorded on a reversal of `original`
pub fn reversal_description(original: TransactionId) -> String {
    format!("Revert of: {}", original)
}

/// Build the draft that undoes `original`
///
/// Flips the type, keeps the wallet and amount, and records the original id
/// in the description. Reverting a CREDIT therefore debits the wallet and can
/// fail with insufficient funds if the credited amount was spent since.
pub fn synthesize_reversal(original: &Transaction) -> TransactionDraft {
    TransactionDraft::new(
        original.wallet_id,
        original.tx_type.inverse(),
        original.amount,
    )
    .with_description(reversal_description(original.id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TransactionType;
    use chrono::Utc;
    use rstest::rstest;
    use rust_decimal::Decimal;

    fn committed(id: TransactionId, tx_type: TransactionType) -> Transaction {
        Transaction {
            id,
            wallet_id: 4,
            amount: Decimal::new(25050, 2),
            tx_type,
            closing_balance: Decimal::new(100000, 2),
            description: None,
            created_at: Utc::now(),
        }
    }

    #[rstest]
    #[case::credit_becomes_debit(TransactionType::Credit, TransactionType::Debit)]
    #[case::debit_becomes_credit(TransactionType::Debit, TransactionType::Credit)]
    fn test_reversal_flips_type(#[case] original: TransactionType, #[case] expected: TransactionType) {
        let draft = synthesize_reversal(&committed(17, original));

        assert_eq!(draft.tx_type, expected);
        assert_eq!(draft.wallet_id, 4);
        assert_eq!(draft.amount, Decimal::new(25050, 2));
        assert_eq!(draft.description.as_deref(), Some("Revert of: 17"));
    }

    #[test]
    fn test_reversal_of_reversal_restores_type() {
        let first = committed(1, TransactionType::Credit);
        let mut second = committed(2, synthesize_reversal(&first).tx_type);
        second.description = Some(reversal_description(1));

        let draft = synthesize_reversal(&second);
        assert_eq!(draft.tx_type, TransactionType::Credit);
        assert_eq!(draft.description.as_deref(), Some("Revert of: 2"));
    }
}
