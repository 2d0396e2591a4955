//! API Routes
//!
//! HTTP endpoint definitions. Handlers are thin: parse the request, call the
//! ledger, serialize the result.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::{
    AccountType, AccountUpdate, BankAccount, ContactInfo, Currency, Transaction, User, UserUpdate,
};
use crate::error::AppError;
use crate::ledger::Ledger;

// =========================================================================
// Request/Response types
// =========================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub contact_info: ContactInfo,
}

#[derive(Debug, Serialize)]
pub struct UsersListResponse {
    pub users: Vec<User>,
    pub count: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateAccountRequest {
    pub account_type: AccountType,
    pub currency: Currency,
    pub initial_deposit: Decimal,
}

#[derive(Debug, Serialize)]
pub struct AllAccountsResponse {
    pub accounts: HashMap<String, Vec<BankAccount>>,
    pub users_with_accounts_count: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MutationRequest {
    pub amount: Decimal,
    #[serde(default)]
    pub currency: Option<Currency>,
    #[serde(default)]
    pub description: Option<String>,
}

/// New balance plus the transaction that produced it
#[derive(Debug, Serialize)]
pub struct BalanceChangeResponse {
    pub account_name: String,
    pub balance: Decimal,
    pub transaction: Transaction,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TransferRequest {
    pub source_account: String,
    pub destination_account: String,
    pub amount: Decimal,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    #[serde(default)]
    pub balance: Option<String>,
    #[serde(default)]
    pub transactions: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub account_name: String,
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub balance: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transactions: Option<Vec<Transaction>>,
}

#[derive(Debug, Serialize)]
pub struct TransactionsListResponse {
    pub count: usize,
    pub transactions: Vec<Transaction>,
}

/// Lenient boolean flag: `?balance=true`, `?balance=1`, `?balance=yes`
fn flag(value: &Option<String>) -> bool {
    matches!(
        value.as_deref().map(str::to_ascii_lowercase).as_deref(),
        Some("true") | Some("1") | Some("yes")
    )
}

// =========================================================================
// API Router
// =========================================================================

/// Create the API router
pub fn create_router() -> Router<Arc<Ledger>> {
    Router::new()
        // User directory
        .route("/users", post(create_user))
        .route("/users", get(list_users))
        .route("/users/:username", get(get_user))
        .route("/users/:username", put(update_user))
        .route("/users/:username", delete(delete_user))
        // Accounts
        .route("/accounts", get(list_all_accounts))
        .route("/accounts/:username", post(create_account))
        .route("/accounts/:username", get(list_accounts))
        .route("/accounts/:username/:account_name", put(update_account))
        .route("/accounts/:username/:account_name", delete(delete_account))
        // Balance mutation
        .route("/accounts/deposit/:username/:account_name", post(deposit))
        .route("/accounts/withdraw/:username/:account_name", post(withdraw))
        .route("/accounts/transfer", post(transfer))
        // Queries
        .route("/accounts/history/:account_name", get(get_history))
        .route("/transactions", get(list_transactions))
}

// =========================================================================
// POST /users
// =========================================================================

/// Create a new user
async fn create_user(
    State(ledger): State<Arc<Ledger>>,
    Json(request): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<User>), AppError> {
    let user = ledger.create_user(
        &request.username,
        &request.first_name,
        &request.last_name,
        request.contact_info,
    )?;
    Ok((StatusCode::CREATED, Json(user)))
}

// =========================================================================
// GET /users
// =========================================================================

/// List all users
async fn list_users(State(ledger): State<Arc<Ledger>>) -> Json<UsersListResponse> {
    let users = ledger.list_users();
    let count = users.len();
    Json(UsersListResponse { users, count })
}

// =========================================================================
// GET /users/:username
// =========================================================================

/// Get user by username
async fn get_user(
    State(ledger): State<Arc<Ledger>>,
    Path(username): Path<String>,
) -> Result<Json<User>, AppError> {
    Ok(Json(ledger.get_user(&username)?))
}

// =========================================================================
// PUT /users/:username
// =========================================================================

/// Update user metadata
async fn update_user(
    State(ledger): State<Arc<Ledger>>,
    Path(username): Path<String>,
    Json(update): Json<UserUpdate>,
) -> Result<Json<User>, AppError> {
    Ok(Json(ledger.update_user(&username, update)?))
}

// =========================================================================
// DELETE /users/:username
// =========================================================================

/// Delete a user. Conflicts while accounts remain, unless cascade is
/// configured.
async fn delete_user(
    State(ledger): State<Arc<Ledger>>,
    Path(username): Path<String>,
) -> Result<StatusCode, AppError> {
    ledger.delete_user(&username)?;
    Ok(StatusCode::NO_CONTENT)
}

// =========================================================================
// POST /accounts/:username
// =========================================================================

/// Open an account for a user, with an initial deposit
async fn create_account(
    State(ledger): State<Arc<Ledger>>,
    Path(username): Path<String>,
    Json(request): Json<CreateAccountRequest>,
) -> Result<(StatusCode, Json<BankAccount>), AppError> {
    let account = ledger.create_account(
        &username,
        request.account_type,
        request.currency,
        request.initial_deposit,
    )?;
    Ok((StatusCode::CREATED, Json(account)))
}

// =========================================================================
// GET /accounts
// =========================================================================

/// All accounts in the store, grouped by owner
async fn list_all_accounts(State(ledger): State<Arc<Ledger>>) -> Json<AllAccountsResponse> {
    let accounts = ledger.list_all_accounts();
    let users_with_accounts_count = accounts.values().filter(|v| !v.is_empty()).count();
    Json(AllAccountsResponse {
        accounts,
        users_with_accounts_count,
    })
}

// =========================================================================
// GET /accounts/:username
// =========================================================================

/// A user's accounts
async fn list_accounts(
    State(ledger): State<Arc<Ledger>>,
    Path(username): Path<String>,
) -> Result<Json<Vec<BankAccount>>, AppError> {
    Ok(Json(ledger.list_accounts(&username)?))
}

// =========================================================================
// PUT /accounts/:username/:account_name
// =========================================================================

/// Update account metadata
async fn update_account(
    State(ledger): State<Arc<Ledger>>,
    Path((username, account_name)): Path<(String, String)>,
    Json(update): Json<AccountUpdate>,
) -> Result<Json<BankAccount>, AppError> {
    Ok(Json(ledger.update_account(&username, &account_name, update)?))
}

// =========================================================================
// DELETE /accounts/:username/:account_name
// =========================================================================

/// Delete an account. Conflicts while funds remain, unless configured
/// otherwise.
async fn delete_account(
    State(ledger): State<Arc<Ledger>>,
    Path((username, account_name)): Path<(String, String)>,
) -> Result<StatusCode, AppError> {
    ledger.delete_account(&username, &account_name)?;
    Ok(StatusCode::NO_CONTENT)
}

// =========================================================================
// POST /accounts/deposit/:username/:account_name
// =========================================================================

/// Deposit into an account
async fn deposit(
    State(ledger): State<Arc<Ledger>>,
    Path((username, account_name)): Path<(String, String)>,
    Json(request): Json<MutationRequest>,
) -> Result<Json<BalanceChangeResponse>, AppError> {
    ledger.get_owned_account(&username, &account_name)?;
    let (balance, transaction) = ledger.deposit(
        &account_name,
        request.amount,
        request.currency,
        request.description,
    )?;
    Ok(Json(BalanceChangeResponse {
        account_name,
        balance: balance.value(),
        transaction,
    }))
}

// =========================================================================
// POST /accounts/withdraw/:username/:account_name
// =========================================================================

/// Withdraw from an account
async fn withdraw(
    State(ledger): State<Arc<Ledger>>,
    Path((username, account_name)): Path<(String, String)>,
    Json(request): Json<MutationRequest>,
) -> Result<Json<BalanceChangeResponse>, AppError> {
    ledger.get_owned_account(&username, &account_name)?;
    let (balance, transaction) = ledger.withdraw(
        &account_name,
        request.amount,
        request.currency,
        request.description,
    )?;
    Ok(Json(BalanceChangeResponse {
        account_name,
        balance: balance.value(),
        transaction,
    }))
}

// =========================================================================
// POST /accounts/transfer
// =========================================================================

/// Transfer between two accounts
async fn transfer(
    State(ledger): State<Arc<Ledger>>,
    Json(request): Json<TransferRequest>,
) -> Result<Json<Transaction>, AppError> {
    let transaction = ledger.transfer(
        &request.source_account,
        &request.destination_account,
        request.amount,
        request.description,
    )?;
    Ok(Json(transaction))
}

// =========================================================================
// GET /accounts/history/:account_name
// =========================================================================

/// Balance and/or transaction history for an account, selected by the
/// `balance` and `transactions` query flags
async fn get_history(
    State(ledger): State<Arc<Ledger>>,
    Path(account_name): Path<String>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<HistoryResponse>, AppError> {
    let account = ledger.get_account(&account_name)?;

    let balance = flag(&query.balance).then(|| account.balance.value());
    let transactions = if flag(&query.transactions) {
        Some(ledger.get_history(&account_name)?)
    } else {
        None
    };

    Ok(Json(HistoryResponse {
        account_name,
        username: account.owner,
        balance,
        transactions,
    }))
}

// =========================================================================
// GET /transactions
// =========================================================================

/// The full transaction log
async fn list_transactions(State(ledger): State<Arc<Ledger>>) -> Json<TransactionsListResponse> {
    let transactions = ledger.list_all_transactions();
    let count = transactions.len();
    Json(TransactionsListResponse {
        count,
        transactions,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_parsing() {
        assert!(flag(&Some("true".to_string())));
        assert!(flag(&Some("TRUE".to_string())));
        assert!(flag(&Some("1".to_string())));
        assert!(flag(&Some("yes".to_string())));
        assert!(!flag(&Some("false".to_string())));
        assert!(!flag(&Some("0".to_string())));
        assert!(!flag(&None));
    }
}
