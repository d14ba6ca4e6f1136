//! Accounts, credential verification, and opaque bearer tokens.
//!
//! Storage is abstracted behind [`AccountRepository`] and [`TokenRepository`]
//! so the service can be exercised against in-memory tables; the HTTP surface
//! lives in [`router`]. Passwords are argon2-hashed at the service boundary
//! and never leave it.

pub mod domain;
pub mod repository;
pub mod router;
pub mod service;


pub use domain::{Account, AccountId, Credentials, RegisterRequest};
pub use repository::{AccountRepository, IdentityStoreError, TokenRepository};
pub use router::{identity_router, token_from_headers};
pub use service::{Authenticator, IdentityError, IdentityService};
