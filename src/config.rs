//! Configuration module
//!
//! Loads configuration from environment variables, including the two
//! delete-policy knobs that govern destructive operations.

use std::env;

use crate::ledger::DeletePolicy;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host
    pub host: String,

    /// Server port
    pub port: u16,

    /// Environment (development, production)
    pub environment: String,

    /// Permit deleting accounts that still hold funds
    pub allow_nonzero_account_delete: bool,

    /// Deleting a user removes their accounts instead of failing
    pub cascade_user_delete: bool,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());

        let port = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("PORT"))?;

        let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());

        let allow_nonzero_account_delete = parse_bool_env("ALLOW_NONZERO_ACCOUNT_DELETE")?;
        let cascade_user_delete = parse_bool_env("CASCADE_USER_DELETE")?;

        Ok(Self {
            host,
            port,
            environment,
            allow_nonzero_account_delete,
            cascade_user_delete,
        })
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// The delete policy implied by this configuration
    pub fn delete_policy(&self) -> DeletePolicy {
        DeletePolicy {
            allow_nonzero_account_delete: self.allow_nonzero_account_delete,
            cascade_user_delete: self.cascade_user_delete,
        }
    }
}

fn parse_bool_env(name: &'static str) -> Result<bool, ConfigError> {
    match env::var(name) {
        Err(_) => Ok(false),
        Ok(value) => match value.to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" => Ok(true),
            "false" | "0" | "no" | "" => Ok(false),
            _ => Err(ConfigError::InvalidValue(name)),
        },
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnv(&'static str),

    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(&'static str),
}
