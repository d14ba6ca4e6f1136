use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::error::ValidationError;

/// Identifier wrapper for registered accounts.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AccountId(pub String);

/// A registered account. The password hash is a PHC string and is never
/// serialized; none of the account endpoints echo it back.
#[derive(Debug, Clone)]
pub struct Account {
    pub id: AccountId,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Sign-up payload.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
}

impl RegisterRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = ValidationError::new();
        if !is_valid_email(self.email.trim()) {
            errors.push("email", "Enter a valid email address.");
        }
        if self.password.chars().count() < 4 {
            errors.push("password", "Ensure this field has at least 4 characters.");
        }
        errors.into_result()
    }
}

/// Login payload. The email is matched exactly as provided.
#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Canonical form used for uniqueness checks and storage.
pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

pub(crate) fn is_valid_email(value: &str) -> bool {
    if value.is_empty() || value.contains(char::is_whitespace) {
        return false;
    }
    match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    }
}
