use std::collections::HashMap;

use super::applications::Application;
use super::domain::{Advert, AdvertId, AdvertUpdate};

/// Storage abstraction for adverts.
///
/// The conditional operations bundle each check-then-act pair into a single
/// call: implementations must serialize the state read and the mutation (one
/// mutex, one transaction with row locks, or equivalent) so concurrent
/// lifecycle calls on the same advert cannot interleave between the check and
/// the write.
pub trait AdvertRepository: Send + Sync {
    fn insert(&self, advert: Advert) -> Result<Advert, StoreError>;

    fn fetch(&self, id: &AdvertId) -> Result<Option<Advert>, StoreError>;

    fn list(&self) -> Result<Vec<Advert>, StoreError>;

    /// Apply the present fields and bump `updated_at`.
    fn update_fields(&self, id: &AdvertId, update: &AdvertUpdate) -> Result<Advert, StoreError>;

    /// Force the publish flag to `published`. Idempotent: setting the current
    /// state again succeeds and returns the advert unchanged.
    fn set_published(&self, id: &AdvertId, published: bool) -> Result<Advert, StoreError>;

    /// Delete the advert and cascade its applications, but only while it is
    /// unpublished; fails with [`StoreError::StillPublished`] otherwise.
    fn delete_unpublished(&self, id: &AdvertId) -> Result<(), StoreError>;
}

/// Storage abstraction for applications, owned one-to-many by adverts.
pub trait ApplicationRepository: Send + Sync {
    /// Insert an application iff its advert is currently published; fails
    /// with [`StoreError::NotPublished`] otherwise. The publish-state check
    /// and the insert happen in one atomic unit.
    fn insert_for_published(&self, application: Application) -> Result<Application, StoreError>;

    /// Applications for one advert, oldest first.
    fn list_for(&self, advert: &AdvertId) -> Result<Vec<Application>, StoreError>;

    fn count_for(&self, advert: &AdvertId) -> Result<usize, StoreError>;

    /// Application counts for every advert that has at least one.
    fn counts(&self) -> Result<HashMap<AdvertId, usize>, StoreError>;
}

/// Error enumeration for advert/application store failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("advert not found")]
    NotFound,
    #[error("advert is published")]
    StillPublished,
    #[error("advert is not published")]
    NotPublished,
    #[error("store unavailable: {0}")]
    Unavailable(String),
}
