use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use argon2::password_hash::{
    rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
};
use argon2::Argon2;
use chrono::Utc;
use uuid::Uuid;

use super::domain::{normalize_email, Account, AccountId, Credentials, RegisterRequest};
use super::repository::{AccountRepository, IdentityStoreError, TokenRepository};
use crate::error::ValidationError;

static ACCOUNT_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_account_id() -> AccountId {
    let id = ACCOUNT_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    AccountId(format!("acct-{id:06}"))
}

// Verified against when a login names an unknown email, so that path costs
// the same argon2 work as a wrong password for a known account.
const UNKNOWN_ACCOUNT_HASH: &str =
    "$argon2id$v=19$m=19456,t=2,p=1$gZiV/M1gPc22ElAH/Jh1Hw$CWOrkoo7oJBQ/iyh7uJ0LO2aLEfrHwTWllSAxT0zRno";

/// Service composing account storage, password hashing, and token issuance.
pub struct IdentityService<U, T> {
    accounts: Arc<U>,
    tokens: Arc<T>,
}

impl<U, T> IdentityService<U, T>
where
    U: AccountRepository + 'static,
    T: TokenRepository + 'static,
{
    pub fn new(accounts: Arc<U>, tokens: Arc<T>) -> Self {
        Self { accounts, tokens }
    }

    /// Create an account from a sign-up request. The email is stored
    /// case-normalized; the password is stored only as an argon2 PHC string.
    pub fn register(&self, request: RegisterRequest) -> Result<Account, IdentityError> {
        request.validate()?;

        let account = Account {
            id: next_account_id(),
            email: normalize_email(&request.email),
            password_hash: hash_password(&request.password)?,
            created_at: Utc::now(),
        };

        Ok(self.accounts.insert(account)?)
    }

    /// Verify credentials and return the account's bearer token, issuing one
    /// on first login. Unknown email and wrong password are indistinguishable
    /// to the caller.
    pub fn login(&self, credentials: &Credentials) -> Result<String, IdentityError> {
        match self.accounts.find_by_email(&credentials.email)? {
            Some(account) if verify_password(&credentials.password, &account.password_hash) => {
                let candidate = Uuid::new_v4().simple().to_string();
                Ok(self.tokens.get_or_issue(&account.id, candidate)?)
            }
            Some(_) => Err(IdentityError::InvalidCredentials),
            None => {
                let _ = verify_password(&credentials.password, UNKNOWN_ACCOUNT_HASH);
                Err(IdentityError::InvalidCredentials)
            }
        }
    }

    /// Revoke the presented token. Unknown tokens are an authentication
    /// failure, not a no-op.
    pub fn logout(&self, token: &str) -> Result<(), IdentityError> {
        if self.tokens.revoke(token)? {
            Ok(())
        } else {
            Err(IdentityError::Unauthorized)
        }
    }

    /// Resolve a bearer token to its account.
    pub fn authenticate(&self, token: &str) -> Result<Account, IdentityError> {
        let account_id = self
            .tokens
            .lookup(token)?
            .ok_or(IdentityError::Unauthorized)?;
        self.accounts
            .find(&account_id)?
            .ok_or(IdentityError::Unauthorized)
    }
}

/// Object-safe view of token authentication, so routers outside this module
/// can hold an `Arc<dyn Authenticator>` without the store type parameters.
pub trait Authenticator: Send + Sync {
    fn account_for_token(&self, token: &str) -> Option<Account>;
}

impl<U, T> Authenticator for IdentityService<U, T>
where
    U: AccountRepository + 'static,
    T: TokenRepository + 'static,
{
    fn account_for_token(&self, token: &str) -> Option<Account> {
        self.authenticate(token).ok()
    }
}

/// Error raised by the identity service.
#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("email already registered")]
    DuplicateEmail,
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("authentication required")]
    Unauthorized,
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("unable to hash password")]
    Credential,
    #[error(transparent)]
    Store(IdentityStoreError),
}

impl From<IdentityStoreError> for IdentityError {
    fn from(value: IdentityStoreError) -> Self {
        match value {
            IdentityStoreError::DuplicateEmail => Self::DuplicateEmail,
            other => Self::Store(other),
        }
    }
}

fn hash_password(raw: &str) -> Result<String, IdentityError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(raw.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| IdentityError::Credential)
}

pub(crate) fn verify_password(raw: &str, stored: &str) -> bool {
    PasswordHash::new(stored)
        .map(|parsed| {
            Argon2::default()
                .verify_password(raw.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}
