//! Domain layer
//!
//! Entity records, value types and the domain error taxonomy. No I/O here.

mod account;
mod amount;
mod enums;
mod error;
mod transaction;
mod user;

pub use account::{AccountUpdate, BankAccount};
pub use amount::{Amount, AmountError, Balance};
pub use enums::{AccountStatus, AccountType, Currency, TransactionKind};
pub use error::LedgerError;
pub use transaction::Transaction;
pub use user::{ContactInfo, User, UserUpdate};
