//! In-memory ledger store
//!
//! The single authority for users, accounts and transaction history. All
//! balance mutation goes through here; handlers never touch state directly.
//!
//! The whole state sits behind one `RwLock`. Writers serialize, so the paired
//! debit/credit of a transfer is atomic with respect to every reader, and a
//! single global lock cannot deadlock regardless of which accounts a transfer
//! touches.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::domain::{
    AccountType, AccountUpdate, Amount, Balance, BankAccount, ContactInfo, Currency, LedgerError,
    Transaction, User, UserUpdate,
};

/// Resolution of the delete-policy open questions, surfaced as configuration
/// instead of hidden behavior.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeletePolicy {
    /// Permit deleting an account that still holds funds
    pub allow_nonzero_account_delete: bool,
    /// Deleting a user removes their accounts instead of failing
    pub cascade_user_delete: bool,
}

#[derive(Debug, Default)]
struct LedgerState {
    /// username -> user
    users: HashMap<String, User>,
    /// account_name -> account
    accounts: HashMap<String, BankAccount>,
    /// username -> account names, insertion order preserved
    owner_index: HashMap<String, Vec<String>>,
    /// Append-only transaction log, timestamp ascending
    transactions: Vec<Transaction>,
    /// High-water mark keeping log timestamps monotonic
    last_timestamp: Option<DateTime<Utc>>,
}

impl LedgerState {
    /// Next log timestamp: wall clock, clamped to never run backwards.
    fn next_timestamp(&mut self) -> DateTime<Utc> {
        let mut ts = Utc::now();
        if let Some(last) = self.last_timestamp {
            if ts < last {
                ts = last;
            }
        }
        self.last_timestamp = Some(ts);
        ts
    }

    fn account(&self, account_name: &str) -> Result<&BankAccount, LedgerError> {
        self.accounts
            .get(account_name)
            .ok_or_else(|| LedgerError::AccountNotFound(account_name.to_string()))
    }

    fn account_mut(&mut self, account_name: &str) -> Result<&mut BankAccount, LedgerError> {
        self.accounts
            .get_mut(account_name)
            .ok_or_else(|| LedgerError::AccountNotFound(account_name.to_string()))
    }

    /// Look up an account that must belong to `owner`. An account owned by
    /// someone else is reported as not found, same as a missing one.
    fn owned_account(&self, owner: &str, account_name: &str) -> Result<&BankAccount, LedgerError> {
        if !self.users.contains_key(owner) {
            return Err(LedgerError::UserNotFound(owner.to_string()));
        }
        let account = self.account(account_name)?;
        if account.owner != owner {
            return Err(LedgerError::AccountNotFound(account_name.to_string()));
        }
        Ok(account)
    }
}

/// The in-memory ledger. Cheap to share: construct once at startup and hand a
/// reference (or `Arc`) to every consumer.
#[derive(Debug)]
pub struct Ledger {
    inner: RwLock<LedgerState>,
    policy: DeletePolicy,
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new(DeletePolicy::default())
    }
}

impl Ledger {
    pub fn new(policy: DeletePolicy) -> Self {
        Self {
            inner: RwLock::new(LedgerState::default()),
            policy,
        }
    }

    // A poisoned lock means a writer panicked mid-mutation; the state is
    // still structurally sound (every mutation validates before writing), so
    // recover the guard rather than propagate the panic.
    fn read(&self) -> RwLockReadGuard<'_, LedgerState> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, LedgerState> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    // =====================================================================
    // User directory
    // =====================================================================

    /// Create a user. Fails with `DuplicateUser` if the username is taken.
    pub fn create_user(
        &self,
        username: &str,
        first_name: &str,
        last_name: &str,
        contact_info: ContactInfo,
    ) -> Result<User, LedgerError> {
        let user = User::new(username, first_name, last_name, contact_info)?;

        let mut state = self.write();
        if state.users.contains_key(username) {
            return Err(LedgerError::DuplicateUser(username.to_string()));
        }
        state.users.insert(username.to_string(), user.clone());
        state.owner_index.entry(username.to_string()).or_default();

        tracing::info!(username, "user created");
        Ok(user)
    }

    pub fn get_user(&self, username: &str) -> Result<User, LedgerError> {
        self.read()
            .users
            .get(username)
            .cloned()
            .ok_or_else(|| LedgerError::UserNotFound(username.to_string()))
    }

    /// All users, sorted by username for stable output.
    pub fn list_users(&self) -> Vec<User> {
        let state = self.read();
        let mut users: Vec<User> = state.users.values().cloned().collect();
        users.sort_by(|a, b| a.username.cmp(&b.username));
        users
    }

    /// Update user metadata. The username itself is immutable.
    pub fn update_user(&self, username: &str, update: UserUpdate) -> Result<User, LedgerError> {
        let mut state = self.write();
        let user = state
            .users
            .get_mut(username)
            .ok_or_else(|| LedgerError::UserNotFound(username.to_string()))?;
        user.apply_update(update)?;
        Ok(user.clone())
    }

    /// Delete a user. With accounts still attached this fails with a
    /// conflict, unless the cascade policy is enabled, in which case the
    /// accounts are removed too.
    pub fn delete_user(&self, username: &str) -> Result<(), LedgerError> {
        let mut state = self.write();
        if !state.users.contains_key(username) {
            return Err(LedgerError::UserNotFound(username.to_string()));
        }

        let owned = state.owner_index.get(username).cloned().unwrap_or_default();
        if !owned.is_empty() {
            if !self.policy.cascade_user_delete {
                return Err(LedgerError::UserHasAccounts {
                    username: username.to_string(),
                    count: owned.len(),
                });
            }
            for account_name in &owned {
                state.accounts.remove(account_name);
            }
            tracing::warn!(username, count = owned.len(), "cascading account delete");
        }

        state.users.remove(username);
        state.owner_index.remove(username);
        tracing::info!(username, "user deleted");
        Ok(())
    }

    // =====================================================================
    // Accounts
    // =====================================================================

    /// Create an account for `owner` with an initial deposit (>= 0). A
    /// positive initial deposit is recorded as the account's first DEPOSIT
    /// transaction.
    pub fn create_account(
        &self,
        owner: &str,
        account_type: AccountType,
        currency: Currency,
        initial_deposit: Decimal,
    ) -> Result<BankAccount, LedgerError> {
        if initial_deposit < Decimal::ZERO {
            return Err(LedgerError::validation("Initial deposit cannot be negative"));
        }
        let balance = Balance::new(initial_deposit)?;

        let mut state = self.write();
        if !state.users.contains_key(owner) {
            return Err(LedgerError::UserNotFound(owner.to_string()));
        }

        let account = BankAccount::new(owner, account_type, currency, balance)?;

        // A zero opening balance gets no transaction: amounts are strictly
        // positive.
        if let Ok(amount) = Amount::new(initial_deposit) {
            let ts = state.next_timestamp();
            let tx = Transaction::deposit(
                account.account_name.clone(),
                amount,
                currency,
                Some("Initial deposit".to_string()),
                ts,
            );
            state.transactions.push(tx);
        }

        state
            .owner_index
            .entry(owner.to_string())
            .or_default()
            .push(account.account_name.clone());
        state
            .accounts
            .insert(account.account_name.clone(), account.clone());

        tracing::info!(
            owner,
            account = %account.account_name,
            balance = %account.balance,
            "account created"
        );
        Ok(account)
    }

    pub fn get_account(&self, account_name: &str) -> Result<BankAccount, LedgerError> {
        self.read().account(account_name).map(Clone::clone)
    }

    /// Look up an account scoped under its owner, for the path-style routes
    /// that name both.
    pub fn get_owned_account(
        &self,
        owner: &str,
        account_name: &str,
    ) -> Result<BankAccount, LedgerError> {
        self.read().owned_account(owner, account_name).map(Clone::clone)
    }

    /// All accounts belonging to `owner`, in creation order.
    pub fn list_accounts(&self, owner: &str) -> Result<Vec<BankAccount>, LedgerError> {
        let state = self.read();
        if !state.users.contains_key(owner) {
            return Err(LedgerError::UserNotFound(owner.to_string()));
        }
        let names = state.owner_index.get(owner).cloned().unwrap_or_default();
        Ok(names
            .iter()
            .filter_map(|name| state.accounts.get(name).cloned())
            .collect())
    }

    /// Every account in the store, grouped by owner.
    pub fn list_all_accounts(&self) -> HashMap<String, Vec<BankAccount>> {
        let state = self.read();
        state
            .owner_index
            .iter()
            .map(|(owner, names)| {
                let accounts = names
                    .iter()
                    .filter_map(|name| state.accounts.get(name).cloned())
                    .collect();
                (owner.clone(), accounts)
            })
            .collect()
    }

    /// Update account metadata (type, status). Balance and currency are out
    /// of reach here.
    pub fn update_account(
        &self,
        owner: &str,
        account_name: &str,
        update: AccountUpdate,
    ) -> Result<BankAccount, LedgerError> {
        let mut state = self.write();
        state.owned_account(owner, account_name)?;
        let account = state.account_mut(account_name)?;
        account.apply_update(update);
        Ok(account.clone())
    }

    /// Delete an account. Fails with a conflict while funds remain, unless
    /// the nonzero-delete policy is enabled.
    pub fn delete_account(&self, owner: &str, account_name: &str) -> Result<(), LedgerError> {
        let mut state = self.write();
        let account = state.owned_account(owner, account_name)?;

        if !account.balance.is_zero() && !self.policy.allow_nonzero_account_delete {
            return Err(LedgerError::NonZeroBalance {
                account: account_name.to_string(),
                balance: account.balance.value(),
            });
        }

        state.accounts.remove(account_name);
        if let Some(names) = state.owner_index.get_mut(owner) {
            names.retain(|name| name != account_name);
        }
        tracing::info!(owner, account = account_name, "account deleted");
        Ok(())
    }

    // =====================================================================
    // Balance mutation
    // =====================================================================

    /// Deposit into an account. Returns the new balance and the recorded
    /// transaction.
    pub fn deposit(
        &self,
        account_name: &str,
        amount: Decimal,
        currency: Option<Currency>,
        description: Option<String>,
    ) -> Result<(Balance, Transaction), LedgerError> {
        let amount = Amount::new(amount)?;

        let mut state = self.write();
        let account = state.account(account_name)?;
        if let Some(offered) = currency {
            if offered != account.currency {
                return Err(LedgerError::CurrencyMismatch {
                    source_currency: offered,
                    destination: account.currency,
                });
            }
        }
        let account_currency = account.currency;
        let new_balance = account.balance.credit(&amount)?;

        let ts = state.next_timestamp();
        let tx = Transaction::deposit(account_name, amount, account_currency, description, ts);
        state.account_mut(account_name)?.balance = new_balance;
        state.transactions.push(tx.clone());

        tracing::debug!(account = account_name, %amount, balance = %new_balance, "deposit");
        Ok((new_balance, tx))
    }

    /// Withdraw from an account. Fails with `InsufficientFunds` rather than
    /// letting the balance go negative.
    pub fn withdraw(
        &self,
        account_name: &str,
        amount: Decimal,
        currency: Option<Currency>,
        description: Option<String>,
    ) -> Result<(Balance, Transaction), LedgerError> {
        let amount = Amount::new(amount)?;

        let mut state = self.write();
        let account = state.account(account_name)?;
        if let Some(offered) = currency {
            if offered != account.currency {
                return Err(LedgerError::CurrencyMismatch {
                    source_currency: offered,
                    destination: account.currency,
                });
            }
        }
        if !account.balance.is_sufficient_for(&amount) {
            return Err(LedgerError::insufficient_funds(
                amount.value(),
                account.balance.value(),
            ));
        }
        let account_currency = account.currency;
        let new_balance = account.balance.debit(&amount)?;

        let ts = state.next_timestamp();
        let tx = Transaction::withdrawal(account_name, amount, account_currency, description, ts);
        state.account_mut(account_name)?.balance = new_balance;
        state.transactions.push(tx.clone());

        tracing::debug!(account = account_name, %amount, balance = %new_balance, "withdrawal");
        Ok((new_balance, tx))
    }

    /// Transfer between two accounts: debit the source, credit the
    /// destination, record exactly one TRANSFER referencing both. The write
    /// lock is held across all three steps, so no reader can observe the
    /// debit without the credit.
    pub fn transfer(
        &self,
        source: &str,
        destination: &str,
        amount: Decimal,
        description: Option<String>,
    ) -> Result<Transaction, LedgerError> {
        if source == destination {
            return Err(LedgerError::SameAccountTransfer);
        }
        let amount = Amount::new(amount)?;

        let mut state = self.write();
        let source_account = state.account(source)?;
        let destination_account = state.account(destination)?;

        // No implicit conversion between currencies.
        if source_account.currency != destination_account.currency {
            return Err(LedgerError::CurrencyMismatch {
                source_currency: source_account.currency,
                destination: destination_account.currency,
            });
        }
        if !source_account.balance.is_sufficient_for(&amount) {
            return Err(LedgerError::insufficient_funds(
                amount.value(),
                source_account.balance.value(),
            ));
        }

        let currency = source_account.currency;
        let new_source_balance = source_account.balance.debit(&amount)?;
        let new_destination_balance = destination_account.balance.credit(&amount)?;

        let ts = state.next_timestamp();
        let tx = Transaction::transfer(source, destination, amount, currency, description, ts);
        state.account_mut(source)?.balance = new_source_balance;
        state.account_mut(destination)?.balance = new_destination_balance;
        state.transactions.push(tx.clone());

        tracing::info!(
            source,
            destination,
            %amount,
            transaction_id = %tx.transaction_id,
            "transfer"
        );
        Ok(tx)
    }

    // =====================================================================
    // Queries
    // =====================================================================

    pub fn get_balance(&self, account_name: &str) -> Result<Balance, LedgerError> {
        Ok(self.read().account(account_name)?.balance)
    }

    /// Every transaction that touched the account, timestamp ascending. The
    /// log is append-only with monotonic timestamps, so log order is time
    /// order.
    pub fn get_history(&self, account_name: &str) -> Result<Vec<Transaction>, LedgerError> {
        let state = self.read();
        state.account(account_name)?;
        Ok(state
            .transactions
            .iter()
            .filter(|tx| tx.touches(account_name))
            .cloned()
            .collect())
    }

    /// The full transaction log.
    pub fn list_all_transactions(&self) -> Vec<Transaction> {
        self.read().transactions.clone()
    }
}
