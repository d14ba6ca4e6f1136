use super::domain::{Account, AccountId};

/// Storage abstraction for accounts.
pub trait AccountRepository: Send + Sync {
    /// Persist a new account. The case-normalized email uniqueness check and
    /// the row write must happen in one atomic unit; a clash yields
    /// [`IdentityStoreError::DuplicateEmail`].
    fn insert(&self, account: Account) -> Result<Account, IdentityStoreError>;

    /// Exact-match lookup by stored email.
    fn find_by_email(&self, email: &str) -> Result<Option<Account>, IdentityStoreError>;

    fn find(&self, id: &AccountId) -> Result<Option<Account>, IdentityStoreError>;
}

/// Storage abstraction for bearer tokens, one token per account.
pub trait TokenRepository: Send + Sync {
    /// Return the token bound to `account`, storing `candidate` as its token
    /// if none exists yet.
    fn get_or_issue(
        &self,
        account: &AccountId,
        candidate: String,
    ) -> Result<String, IdentityStoreError>;

    fn lookup(&self, token: &str) -> Result<Option<AccountId>, IdentityStoreError>;

    /// Delete `token`, returning whether it was present.
    fn revoke(&self, token: &str) -> Result<bool, IdentityStoreError>;
}

/// Error enumeration for identity store failures.
#[derive(Debug, thiserror::Error)]
pub enum IdentityStoreError {
    #[error("email already registered")]
    DuplicateEmail,
    #[error("identity store unavailable: {0}")]
    Unavailable(String),
}
