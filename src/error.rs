//! Error handling module
//!
//! App-level error type and HTTP response conversion. Domain errors from the
//! ledger are mapped onto the four-way taxonomy: validation (400), not found
//! (404), conflict (409), insufficient funds (422).

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::domain::LedgerError;

/// Application-wide Result type
pub type AppResult<T> = Result<T, AppError>;

/// Application error types
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    // Domain errors
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    // Server errors (5xx)
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub error_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_code, details) = match &self {
            // 400 Bad Request
            AppError::InvalidRequest(msg) => {
                (StatusCode::BAD_REQUEST, "invalid_request", Some(msg.clone()))
            }

            AppError::Ledger(ref err) => match err {
                // 400 Bad Request
                LedgerError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "invalid_request", Some(msg.clone()))
                }
                LedgerError::SameAccountTransfer => {
                    (StatusCode::BAD_REQUEST, "same_account_transfer", None)
                }
                LedgerError::CurrencyMismatch { .. } => (
                    StatusCode::BAD_REQUEST,
                    "currency_mismatch",
                    Some(err.to_string()),
                ),

                // 404 Not Found
                LedgerError::UserNotFound(name) => {
                    (StatusCode::NOT_FOUND, "user_not_found", Some(name.clone()))
                }
                LedgerError::AccountNotFound(name) => (
                    StatusCode::NOT_FOUND,
                    "account_not_found",
                    Some(name.clone()),
                ),

                // 409 Conflict
                LedgerError::DuplicateUser(name) => {
                    (StatusCode::CONFLICT, "duplicate_user", Some(name.clone()))
                }
                LedgerError::NonZeroBalance { .. } => (
                    StatusCode::CONFLICT,
                    "non_zero_balance",
                    Some(err.to_string()),
                ),
                LedgerError::UserHasAccounts { .. } => (
                    StatusCode::CONFLICT,
                    "user_has_accounts",
                    Some(err.to_string()),
                ),

                // 422 Unprocessable Entity
                LedgerError::InsufficientFunds { .. } => (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "insufficient_funds",
                    Some(err.to_string()),
                ),
            },

            // 500 Internal Server Error
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", None)
            }
            AppError::Config(e) => {
                tracing::error!("Config error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "config_error", None)
            }
        };

        let body = ErrorResponse {
            error: self.to_string(),
            error_code: error_code.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn status_of(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_taxonomy_status_mapping() {
        assert_eq!(
            status_of(LedgerError::validation("bad").into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(LedgerError::SameAccountTransfer.into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(LedgerError::UserNotFound("alice".into()).into()),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(LedgerError::DuplicateUser("alice".into()).into()),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(LedgerError::insufficient_funds(dec!(100), dec!(50)).into()),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[test]
    fn test_nonzero_balance_is_conflict() {
        let err: AppError = LedgerError::NonZeroBalance {
            account: "checking_1".into(),
            balance: dec!(50),
        }
        .into();
        assert_eq!(status_of(err), StatusCode::CONFLICT);
    }
}
