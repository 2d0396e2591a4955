//! User records
//!
//! A user is keyed by a unique username, which is immutable once created.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::LedgerError;

/// Contact details for a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactInfo {
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// A bank customer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique, immutable key
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub contact_info: ContactInfo,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Create a new user, validating that the identifying fields are present.
    pub fn new(
        username: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        contact_info: ContactInfo,
    ) -> Result<Self, LedgerError> {
        let username = username.into();
        let first_name = first_name.into();
        let last_name = last_name.into();

        if username.trim().is_empty() || first_name.trim().is_empty() || last_name.trim().is_empty()
        {
            return Err(LedgerError::validation(
                "Username, first name, and last name cannot be empty",
            ));
        }
        if contact_info.email.trim().is_empty() {
            return Err(LedgerError::validation("Email cannot be empty"));
        }

        Ok(Self {
            username,
            first_name,
            last_name,
            contact_info,
            user_id: Uuid::new_v4(),
            created_at: Utc::now(),
        })
    }

    /// Apply a partial update. The username is never touched.
    pub fn apply_update(&mut self, update: UserUpdate) -> Result<(), LedgerError> {
        if let Some(first_name) = update.first_name {
            if first_name.trim().is_empty() {
                return Err(LedgerError::validation("First name cannot be empty"));
            }
            self.first_name = first_name;
        }
        if let Some(last_name) = update.last_name {
            if last_name.trim().is_empty() {
                return Err(LedgerError::validation("Last name cannot be empty"));
            }
            self.last_name = last_name;
        }
        if let Some(email) = update.email {
            if email.trim().is_empty() {
                return Err(LedgerError::validation("Email cannot be empty"));
            }
            self.contact_info.email = email;
        }
        if let Some(phone) = update.phone {
            self.contact_info.phone = Some(phone);
        }
        Ok(())
    }
}

/// Partial update of user metadata.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserUpdate {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}
