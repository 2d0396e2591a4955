//! Closed enumerations for accounts, transactions and currencies.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The type of a bank account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountType {
    Savings,
    Checking,
    Credit,
    Loan,
}

impl AccountType {
    /// Lowercase label used when generating account names.
    pub fn label(&self) -> &'static str {
        match self {
            AccountType::Savings => "savings",
            AccountType::Checking => "checking",
            AccountType::Credit => "credit",
            AccountType::Loan => "loan",
        }
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for AccountType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "SAVINGS" => Ok(AccountType::Savings),
            "CHECKING" => Ok(AccountType::Checking),
            "CREDIT" => Ok(AccountType::Credit),
            "LOAN" => Ok(AccountType::Loan),
            other => Err(format!("Unknown account type: {other}")),
        }
    }
}

/// The status of a bank account.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountStatus {
    #[default]
    Active,
    Closed,
    Frozen,
    Pending,
}

/// The kind of a balance-affecting event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionKind {
    /// Money entering an account from outside the ledger.
    Deposit,
    /// Money leaving an account to outside the ledger.
    Withdrawal,
    /// A paired debit/credit between two accounts.
    Transfer,
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TransactionKind::Deposit => "DEPOSIT",
            TransactionKind::Withdrawal => "WITHDRAWAL",
            TransactionKind::Transfer => "TRANSFER",
        };
        f.write_str(s)
    }
}

/// Supported currencies. Fixed at account creation; no conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Usd,
    Eur,
    Gbp,
    Jpy,
    Chf,
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
            Currency::Gbp => "GBP",
            Currency::Jpy => "JPY",
            Currency::Chf => "CHF",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_type_parse_case_insensitive() {
        assert_eq!("checking".parse::<AccountType>(), Ok(AccountType::Checking));
        assert_eq!("SAVINGS".parse::<AccountType>(), Ok(AccountType::Savings));
        assert!("money_market".parse::<AccountType>().is_err());
    }

    #[test]
    fn test_enum_serde_uppercase() {
        assert_eq!(
            serde_json::to_string(&TransactionKind::Deposit).unwrap(),
            "\"DEPOSIT\""
        );
        assert_eq!(serde_json::to_string(&Currency::Usd).unwrap(), "\"USD\"");
        let status: AccountStatus = serde_json::from_str("\"FROZEN\"").unwrap();
        assert_eq!(status, AccountStatus::Frozen);
    }

    #[test]
    fn test_default_status_is_active() {
        assert_eq!(AccountStatus::default(), AccountStatus::Active);
    }
}
