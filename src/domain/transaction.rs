//! Transaction records
//!
//! Immutable, timestamped records of balance-affecting events. Constructors
//! enforce the source/destination shape per kind, so a malformed record
//! cannot be built.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Amount, Currency, TransactionKind};

/// An immutable record of a deposit, withdrawal or transfer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub transaction_id: Uuid,
    pub kind: TransactionKind,
    pub amount: Amount,
    pub currency: Currency,
    /// Absent for pure deposits
    pub source_account: Option<String>,
    /// Absent for pure withdrawals
    pub destination_account: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl Transaction {
    /// A deposit into `destination` from outside the ledger.
    pub fn deposit(
        destination: impl Into<String>,
        amount: Amount,
        currency: Currency,
        description: Option<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            transaction_id: Uuid::new_v4(),
            kind: TransactionKind::Deposit,
            amount,
            currency,
            source_account: None,
            destination_account: Some(destination.into()),
            description,
            timestamp,
        }
    }

    /// A withdrawal from `source` to outside the ledger.
    pub fn withdrawal(
        source: impl Into<String>,
        amount: Amount,
        currency: Currency,
        description: Option<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            transaction_id: Uuid::new_v4(),
            kind: TransactionKind::Withdrawal,
            amount,
            currency,
            source_account: Some(source.into()),
            destination_account: None,
            description,
            timestamp,
        }
    }

    /// A paired debit/credit between two accounts, recorded as one record.
    pub fn transfer(
        source: impl Into<String>,
        destination: impl Into<String>,
        amount: Amount,
        currency: Currency,
        description: Option<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            transaction_id: Uuid::new_v4(),
            kind: TransactionKind::Transfer,
            amount,
            currency,
            source_account: Some(source.into()),
            destination_account: Some(destination.into()),
            description,
            timestamp,
        }
    }

    /// Whether this transaction touched the given account, in either
    /// direction. History queries branch exhaustively on the kind here.
    pub fn touches(&self, account_name: &str) -> bool {
        match self.kind {
            TransactionKind::Deposit => {
                self.destination_account.as_deref() == Some(account_name)
            }
            TransactionKind::Withdrawal => self.source_account.as_deref() == Some(account_name),
            TransactionKind::Transfer => {
                self.source_account.as_deref() == Some(account_name)
                    || self.destination_account.as_deref() == Some(account_name)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn amount(v: rust_decimal::Decimal) -> Amount {
        Amount::new(v).unwrap()
    }

    #[test]
    fn test_deposit_shape() {
        let tx = Transaction::deposit("checking_1", amount(dec!(50)), Currency::Usd, None, Utc::now());
        assert_eq!(tx.kind, TransactionKind::Deposit);
        assert!(tx.source_account.is_none());
        assert_eq!(tx.destination_account.as_deref(), Some("checking_1"));
    }

    #[test]
    fn test_withdrawal_shape() {
        let tx =
            Transaction::withdrawal("checking_1", amount(dec!(50)), Currency::Usd, None, Utc::now());
        assert_eq!(tx.kind, TransactionKind::Withdrawal);
        assert_eq!(tx.source_account.as_deref(), Some("checking_1"));
        assert!(tx.destination_account.is_none());
    }

    #[test]
    fn test_transfer_references_both_accounts() {
        let tx = Transaction::transfer(
            "checking_1",
            "savings_2",
            amount(dec!(50)),
            Currency::Usd,
            Some("rent".to_string()),
            Utc::now(),
        );
        assert_eq!(tx.kind, TransactionKind::Transfer);
        assert!(tx.touches("checking_1"));
        assert!(tx.touches("savings_2"));
        assert!(!tx.touches("loan_3"));
    }

    #[test]
    fn test_touches_ignores_unrelated_side() {
        let deposit =
            Transaction::deposit("checking_1", amount(dec!(10)), Currency::Usd, None, Utc::now());
        assert!(deposit.touches("checking_1"));
        assert!(!deposit.touches("savings_2"));

        let withdrawal =
            Transaction::withdrawal("checking_1", amount(dec!(10)), Currency::Usd, None, Utc::now());
        assert!(withdrawal.touches("checking_1"));
        assert!(!withdrawal.touches("savings_2"));
    }
}
