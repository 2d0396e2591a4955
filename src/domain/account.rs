//! Bank account records
//!
//! An account is keyed by a generated, unique account name and owned by a
//! single user. The balance is managed exclusively by the ledger store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{AccountStatus, AccountType, Balance, Currency, LedgerError};

/// A single bank account.
///
/// # Invariants
/// - `balance` is never negative (enforced by [`Balance`])
/// - `currency` is fixed at creation
/// - `account_name` is unique across the store and derived from the type and
///   the short account number, e.g. `checking_1a2b3`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BankAccount {
    pub account_name: String,
    /// Username of the owning user
    pub owner: String,
    pub account_type: AccountType,
    pub currency: Currency,
    pub balance: Balance,
    pub status: AccountStatus,
    pub account_id: Uuid,
    /// Short human-facing number, the first five characters of the id
    pub account_number: String,
    pub created_at: DateTime<Utc>,
}

impl BankAccount {
    /// Create a new account with the given initial balance.
    pub fn new(
        owner: impl Into<String>,
        account_type: AccountType,
        currency: Currency,
        initial_balance: Balance,
    ) -> Result<Self, LedgerError> {
        let owner = owner.into();
        if owner.trim().is_empty() {
            return Err(LedgerError::validation("An account must have an owner"));
        }

        let account_id = Uuid::new_v4();
        let account_number: String = account_id.simple().to_string().chars().take(5).collect();
        let account_name = format!("{}_{}", account_type.label(), account_number);

        Ok(Self {
            account_name,
            owner,
            account_type,
            currency,
            balance: initial_balance,
            status: AccountStatus::default(),
            account_id,
            account_number,
            created_at: Utc::now(),
        })
    }

    /// Apply a partial metadata update. Balance and currency are not
    /// touchable through this path; only the ledger mutates balances.
    pub fn apply_update(&mut self, update: AccountUpdate) {
        if let Some(account_type) = update.account_type {
            self.account_type = account_type;
        }
        if let Some(status) = update.status {
            self.status = status;
        }
    }
}

/// Partial update of account metadata.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AccountUpdate {
    #[serde(default)]
    pub account_type: Option<AccountType>,
    #[serde(default)]
    pub status: Option<AccountStatus>,
}
