use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::domain::AdvertId;
use super::repository::{AdvertRepository, StoreError};

/// Payload handed to the queue for one deferred publish. The broker delivers
/// it to a worker no earlier than `eta`; durability and retry policy are the
/// broker's concern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishJob {
    pub advert_id: AdvertId,
    pub eta: DateTime<Utc>,
}

/// Client side of the message queue. Enqueuing is fire-and-forget: it returns
/// as soon as the broker has accepted the message.
pub trait PublishQueue: Send + Sync {
    fn enqueue(&self, job: PublishJob) -> Result<(), QueueError>;
}

/// Queue transport error.
#[derive(Debug, thiserror::Error)]
pub enum QueueError {
    #[error("queue transport unavailable: {0}")]
    Transport(String),
}

/// Job body the worker runtime invokes once the eta has passed: force the
/// advert to published. Last-write-wins — intervening unpublishes are
/// overridden — and idempotent, because `set_published` is.
pub fn run_publish_job<R>(repository: &R, advert_id: &AdvertId) -> Result<(), StoreError>
where
    R: AdvertRepository + ?Sized,
{
    let advert = repository.set_published(advert_id, true)?;
    info!(advert_id = %advert.id.0, "scheduled publish applied");
    Ok(())
}
