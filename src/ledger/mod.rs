//! Ledger module
//!
//! The in-memory authority for account balances and transaction history.

mod store;

pub use store::{DeletePolicy, Ledger};
