//! Domain error types
//!
//! Business rule violations raised by the ledger store, independent of the
//! web layer. The HTTP mapping lives in `crate::error`.

use thiserror::Error;

use super::Currency;

/// Errors produced by ledger and user-directory operations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum LedgerError {
    /// Malformed input: non-positive amount, same-account transfer, bad field
    #[error("Invalid request: {0}")]
    Validation(String),

    /// Withdrawal or transfer exceeds the available balance
    #[error("Insufficient funds: required {required}, available {available}")]
    InsufficientFunds {
        required: rust_decimal::Decimal,
        available: rust_decimal::Decimal,
    },

    /// Transfer between accounts holding different currencies
    #[error("Currency mismatch: {source_currency} vs {destination}")]
    CurrencyMismatch {
        source_currency: Currency,
        destination: Currency,
    },

    /// Source and destination of a transfer are the same account
    #[error("Cannot transfer to the same account")]
    SameAccountTransfer,

    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("Account not found: {0}")]
    AccountNotFound(String),

    #[error("User already exists: {0}")]
    DuplicateUser(String),

    /// Deleting an account that still holds funds
    #[error("Account {account} has a non-zero balance of {balance}")]
    NonZeroBalance {
        account: String,
        balance: rust_decimal::Decimal,
    },

    /// Deleting a user that still owns accounts
    #[error("User {username} still owns {count} account(s)")]
    UserHasAccounts { username: String, count: usize },
}

impl LedgerError {
    /// Create a validation error from any displayable cause
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create an insufficient funds error
    pub fn insufficient_funds(
        required: rust_decimal::Decimal,
        available: rust_decimal::Decimal,
    ) -> Self {
        Self::InsufficientFunds {
            required,
            available,
        }
    }

    /// Check if this error means a referenced entity does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::UserNotFound(_) | Self::AccountNotFound(_))
    }

    /// Check if this error is a state conflict (duplicate key, busy entity)
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            Self::DuplicateUser(_) | Self::NonZeroBalance { .. } | Self::UserHasAccounts { .. }
        )
    }
}

impl From<super::AmountError> for LedgerError {
    fn from(err: super::AmountError) -> Self {
        LedgerError::Validation(err.to_string())
    }
}
